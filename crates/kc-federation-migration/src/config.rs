//! Migration provider configuration.
//!
//! The only operator-facing setting is the legacy directory's base URI,
//! stored on the component under [`BASE_URI_KEY`]. Timeouts are handed to
//! the HTTP client as-is.

use std::time::Duration;

use kc_federation::FederationConfig;
use serde::{Deserialize, Serialize};
use url::Url;

use crate::error::{MigrationError, MigrationResult};

/// Component config key holding the legacy directory base URI.
pub const BASE_URI_KEY: &str = "base_uri";

/// Default time allowed to establish a connection.
pub const DEFAULT_CONNECTION_TIMEOUT: Duration = Duration::from_secs(5);

/// Default time allowed to read a response.
pub const DEFAULT_READ_TIMEOUT: Duration = Duration::from_secs(30);

/// Typed configuration of a migration provider instance.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MigrationConfig {
    /// Base address of the legacy directory, e.g.
    /// `http://localhost:9081/migration`.
    pub base_uri: Url,

    /// Connection timeout.
    pub connection_timeout: Duration,

    /// Read timeout.
    pub read_timeout: Duration,
}

impl MigrationConfig {
    /// Creates a configuration with default timeouts.
    #[must_use]
    pub const fn new(base_uri: Url) -> Self {
        Self {
            base_uri,
            connection_timeout: DEFAULT_CONNECTION_TIMEOUT,
            read_timeout: DEFAULT_READ_TIMEOUT,
        }
    }

    /// Parses and validates a base URI.
    ///
    /// ## Errors
    ///
    /// Returns an error if the URI does not parse or fails [`Self::validate`].
    pub fn parse(base_uri: &str) -> MigrationResult<Self> {
        let config = Self::new(Url::parse(base_uri.trim())?);
        config.validate()?;
        Ok(config)
    }

    /// Reads the configuration from a stored component.
    ///
    /// ## Errors
    ///
    /// Returns `MigrationError::Configuration` if `base_uri` is missing or
    /// blank, and the errors of [`Self::parse`] otherwise.
    pub fn from_component(model: &FederationConfig) -> MigrationResult<Self> {
        let base_uri = model
            .get(BASE_URI_KEY)
            .map(str::trim)
            .filter(|value| !value.is_empty())
            .ok_or_else(|| MigrationError::config(format!("missing required setting '{BASE_URI_KEY}'")))?;
        Self::parse(base_uri)
    }

    /// Sets the connection timeout.
    #[must_use]
    pub const fn connection_timeout(mut self, timeout: Duration) -> Self {
        self.connection_timeout = timeout;
        self
    }

    /// Sets the read timeout.
    #[must_use]
    pub const fn read_timeout(mut self, timeout: Duration) -> Self {
        self.read_timeout = timeout;
        self
    }

    /// Validates the configuration.
    ///
    /// ## Errors
    ///
    /// Returns `MigrationError::Configuration` unless the base URI is an
    /// `http` or `https` URL with a host.
    pub fn validate(&self) -> MigrationResult<()> {
        match self.base_uri.scheme() {
            "http" | "https" => {}
            other => {
                return Err(MigrationError::config(format!(
                    "base URI must use http or https, got '{other}'"
                )));
            }
        }

        if self.base_uri.host_str().map_or(true, str::is_empty) {
            return Err(MigrationError::config("base URI has no host"));
        }

        Ok(())
    }
}
