//! Migration-specific error types.
//!
//! ## Security Note
//!
//! Error messages must not carry the password sent to the legacy directory.

use kc_federation::FederationError;
use thiserror::Error;

/// Errors talking to the legacy user directory.
#[derive(Debug, Error)]
pub enum MigrationError {
    /// Invalid configuration.
    #[error("Migration configuration error: {0}")]
    Configuration(String),

    /// The base URI could not be parsed.
    #[error("Invalid base URI: {0}")]
    InvalidUrl(#[from] url::ParseError),

    /// The directory has no record for the identifier.
    #[error("User not found in legacy directory: {0}")]
    UserNotFound(String),

    /// The directory answered with a status that is neither success nor
    /// "not found".
    #[error("Legacy directory answered with unexpected status {status}")]
    UnexpectedStatus {
        /// HTTP status code.
        status: u16,
    },

    /// The directory answered successfully with a body we cannot decode.
    #[error("Legacy directory protocol error: {0}")]
    Protocol(String),

    /// Transport failure.
    #[error("Legacy directory request failed: {0}")]
    Http(#[from] reqwest::Error),
}

impl MigrationError {
    /// Creates a configuration error.
    #[must_use]
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Configuration(msg.into())
    }

    /// Creates a user not found error.
    #[must_use]
    pub fn user_not_found(identifier: impl Into<String>) -> Self {
        Self::UserNotFound(identifier.into())
    }

    /// Checks if the directory reported that the user does not exist.
    #[must_use]
    pub const fn is_user_not_found(&self) -> bool {
        matches!(self, Self::UserNotFound(_))
    }

    /// Checks if this is a transport failure.
    #[must_use]
    pub const fn is_connection_error(&self) -> bool {
        matches!(self, Self::Http(_))
    }
}

/// Result type for migration operations.
pub type MigrationResult<T> = Result<T, MigrationError>;

impl From<MigrationError> for FederationError {
    fn from(err: MigrationError) -> Self {
        match err {
            MigrationError::Configuration(msg) => FederationError::Configuration(msg),
            MigrationError::InvalidUrl(e) => FederationError::Configuration(e.to_string()),
            MigrationError::UserNotFound(identifier) => FederationError::UserNotFound(identifier),
            MigrationError::UnexpectedStatus { status } => {
                FederationError::UserLookup(format!("legacy directory answered {status}"))
            }
            MigrationError::Protocol(msg) => FederationError::Protocol(msg),
            MigrationError::Http(e) if e.is_timeout() => FederationError::Timeout(e.to_string()),
            MigrationError::Http(e) => FederationError::Connection(e.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_categories() {
        assert!(MigrationError::user_not_found("jdoe@example.com").is_user_not_found());
        assert!(!MigrationError::UnexpectedStatus { status: 500 }.is_user_not_found());
        assert!(!MigrationError::config("missing").is_connection_error());
    }

    #[test]
    fn converts_into_federation_error() {
        let err: FederationError = MigrationError::user_not_found("jdoe@example.com").into();
        assert!(err.is_user_not_found());

        let err: FederationError = MigrationError::UnexpectedStatus { status: 502 }.into();
        assert!(matches!(err, FederationError::UserLookup(msg) if msg.contains("502")));

        let err: FederationError = MigrationError::config("no base URI").into();
        assert!(matches!(err, FederationError::Configuration(_)));
    }

    #[test]
    fn invalid_url_is_a_configuration_error() {
        let parse_err = url::Url::parse("not a url").unwrap_err();
        let err: FederationError = MigrationError::from(parse_err).into();
        assert!(matches!(err, FederationError::Configuration(_)));
    }
}
