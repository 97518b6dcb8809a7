//! Storage ids for federated users.
//!
//! Users that live in a federation provider's store are addressed by a
//! composite id `f:<provider id>:<external id>`. Ids without the `f:` prefix
//! belong to local storage and are their own external id.

use std::fmt;

const FEDERATED_PREFIX: &str = "f:";

/// A decoded user storage id.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StorageId {
    provider_id: Option<String>,
    external_id: String,
}

impl StorageId {
    /// Decodes a storage id.
    #[must_use]
    pub fn parse(id: &str) -> Self {
        if let Some(rest) = id.strip_prefix(FEDERATED_PREFIX) {
            if let Some((provider_id, external_id)) = rest.split_once(':') {
                return Self {
                    provider_id: Some(provider_id.to_string()),
                    external_id: external_id.to_string(),
                };
            }
        }

        Self {
            provider_id: None,
            external_id: id.to_string(),
        }
    }

    /// Builds the storage id of a user owned by a provider.
    #[must_use]
    pub fn federated(provider_id: impl Into<String>, external_id: impl Into<String>) -> Self {
        Self {
            provider_id: Some(provider_id.into()),
            external_id: external_id.into(),
        }
    }

    /// Returns the provider component id, if this is a federated id.
    #[must_use]
    pub fn provider_id(&self) -> Option<&str> {
        self.provider_id.as_deref()
    }

    /// Returns the id the owning store knows the user by.
    #[must_use]
    pub fn external_id(&self) -> &str {
        &self.external_id
    }

    /// Checks if this id addresses local storage.
    #[must_use]
    pub const fn is_local(&self) -> bool {
        self.provider_id.is_none()
    }
}

impl fmt::Display for StorageId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.provider_id {
            Some(provider_id) => write!(f, "{FEDERATED_PREFIX}{provider_id}:{}", self.external_id),
            None => f.write_str(&self.external_id),
        }
    }
}
