//! Federation error types.
//!
//! Callers of a provider see one of these. Expected outcomes such as an
//! unknown user or a wrong password are not errors; providers report them
//! as `None` and `false`.

use thiserror::Error;

/// Errors that can occur during federation operations.
#[derive(Debug, Error)]
pub enum FederationError {
    /// Configuration error.
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Connection error to external system.
    #[error("Connection error: {0}")]
    Connection(String),

    /// Operation timed out.
    #[error("Operation timed out: {0}")]
    Timeout(String),

    /// User not found in external system.
    #[error("User not found: {0}")]
    UserNotFound(String),

    /// The external record's identity disagrees with the requested key.
    #[error("Local and remote users differ: [{requested} != {remote}]")]
    IdentityMismatch {
        /// Normalized identifier that was looked up.
        requested: String,
        /// Identifier the external store reported for that record.
        remote: String,
    },

    /// User lookup failed on the external side.
    #[error("User lookup error: {0}")]
    UserLookup(String),

    /// The external system answered with something we cannot interpret.
    #[error("Protocol error: {0}")]
    Protocol(String),

    /// Provider is read-only for this operation.
    #[error("Provider is read-only: cannot {0}")]
    ReadOnly(String),

    /// Storage error when reading or persisting local users.
    #[error("Storage error: {0}")]
    Storage(#[from] kc_storage::StorageError),
}

impl FederationError {
    /// Creates a configuration error.
    #[must_use]
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Configuration(msg.into())
    }

    /// Creates a connection error.
    #[must_use]
    pub fn connection(msg: impl Into<String>) -> Self {
        Self::Connection(msg.into())
    }

    /// Creates a user not found error.
    #[must_use]
    pub fn user_not_found(username: impl Into<String>) -> Self {
        Self::UserNotFound(username.into())
    }

    /// Creates an identity mismatch error.
    #[must_use]
    pub fn identity_mismatch(requested: impl Into<String>, remote: impl Into<String>) -> Self {
        Self::IdentityMismatch {
            requested: requested.into(),
            remote: remote.into(),
        }
    }

    /// Creates a read-only error.
    #[must_use]
    pub fn read_only(operation: impl Into<String>) -> Self {
        Self::ReadOnly(operation.into())
    }

    /// Checks if this is a connection error.
    #[must_use]
    pub const fn is_connection_error(&self) -> bool {
        matches!(self, Self::Connection(_) | Self::Timeout(_))
    }

    /// Checks if this is a user not found error.
    #[must_use]
    pub const fn is_user_not_found(&self) -> bool {
        matches!(self, Self::UserNotFound(_))
    }

    /// Checks if this is an identity mismatch.
    #[must_use]
    pub const fn is_identity_mismatch(&self) -> bool {
        matches!(self, Self::IdentityMismatch { .. })
    }

    /// Checks if this is a read-only violation.
    #[must_use]
    pub const fn is_read_only(&self) -> bool {
        matches!(self, Self::ReadOnly(_))
    }
}

/// Result type for federation operations.
pub type FederationResult<T> = Result<T, FederationError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_categories() {
        assert!(FederationError::connection("refused").is_connection_error());
        assert!(FederationError::Timeout("GET".to_string()).is_connection_error());
        assert!(FederationError::user_not_found("jdoe").is_user_not_found());
        assert!(FederationError::read_only("update password").is_read_only());
        assert!(FederationError::identity_mismatch("a@x.io", "b@x.io").is_identity_mismatch());
    }

    #[test]
    fn identity_mismatch_names_both_sides() {
        let err = FederationError::identity_mismatch("a@example.com", "b@example.com");
        assert_eq!(
            err.to_string(),
            "Local and remote users differ: [a@example.com != b@example.com]"
        );
    }

    #[test]
    fn storage_errors_convert() {
        let err: FederationError = kc_storage::StorageError::Internal("boom".to_string()).into();
        assert!(matches!(err, FederationError::Storage(_)));
    }
}
