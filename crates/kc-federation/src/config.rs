//! Federation provider configuration.
//!
//! A [`FederationConfig`] is the stored component an operator creates for a
//! provider instance: its identity, realm, and a flat map of provider-specific
//! settings filled in from the factory's config properties.

use std::collections::HashMap;

use kc_model::FederationLink;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{FederationError, FederationResult};

/// Stored configuration of one federation provider instance.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FederationConfig {
    /// Unique identifier for this provider instance.
    pub id: Uuid,

    /// Realm this provider belongs to.
    pub realm_id: Uuid,

    /// Provider type (the factory id).
    pub provider_type: String,

    /// Display name.
    pub name: String,

    /// Priority for user lookup (lower = higher priority).
    pub priority: i32,

    /// Whether the provider is enabled.
    pub enabled: bool,

    /// Provider-specific configuration.
    pub config: HashMap<String, String>,
}

impl FederationConfig {
    /// Creates a new configuration builder.
    #[must_use]
    pub fn builder() -> FederationConfigBuilder {
        FederationConfigBuilder::new()
    }

    /// Returns the link stamped on users this instance materializes.
    #[must_use]
    pub const fn federation_link(&self) -> FederationLink {
        FederationLink::new(self.id)
    }

    /// Gets a config value by key.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&str> {
        self.config.get(key).map(String::as_str)
    }

    /// Gets a config value as bool.
    #[must_use]
    pub fn get_bool(&self, key: &str) -> Option<bool> {
        self.config.get(key).and_then(|v| v.parse().ok())
    }

    /// Gets a config value that must be present and non-blank.
    ///
    /// ## Errors
    ///
    /// Returns `FederationError::Configuration` if the key is missing or blank.
    pub fn require(&self, key: &str) -> FederationResult<&str> {
        match self.get(key).map(str::trim) {
            Some(value) if !value.is_empty() => Ok(value),
            _ => Err(FederationError::config(format!(
                "missing required setting '{key}'"
            ))),
        }
    }
}

/// Builder for FederationConfig.
#[derive(Debug, Default)]
pub struct FederationConfigBuilder {
    id: Option<Uuid>,
    realm_id: Option<Uuid>,
    provider_type: Option<String>,
    name: Option<String>,
    priority: i32,
    enabled: bool,
    config: HashMap<String, String>,
}

impl FederationConfigBuilder {
    /// Creates a new builder.
    #[must_use]
    pub fn new() -> Self {
        Self {
            enabled: true,
            ..Default::default()
        }
    }

    /// Sets the ID.
    #[must_use]
    pub const fn id(mut self, id: Uuid) -> Self {
        self.id = Some(id);
        self
    }

    /// Sets the realm ID.
    #[must_use]
    pub const fn realm_id(mut self, realm_id: Uuid) -> Self {
        self.realm_id = Some(realm_id);
        self
    }

    /// Sets the provider type.
    #[must_use]
    pub fn provider_type(mut self, provider_type: impl Into<String>) -> Self {
        self.provider_type = Some(provider_type.into());
        self
    }

    /// Sets the name.
    #[must_use]
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Sets the priority.
    #[must_use]
    pub const fn priority(mut self, priority: i32) -> Self {
        self.priority = priority;
        self
    }

    /// Sets whether the provider is enabled.
    #[must_use]
    pub const fn enabled(mut self, enabled: bool) -> Self {
        self.enabled = enabled;
        self
    }

    /// Adds a config value.
    #[must_use]
    pub fn config(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.config.insert(key.into(), value.into());
        self
    }

    /// Builds the configuration.
    ///
    /// ## Errors
    ///
    /// Returns `FederationError::Configuration` if the realm or provider type
    /// is missing. The name defaults to the provider type.
    pub fn build(self) -> FederationResult<FederationConfig> {
        let realm_id = self
            .realm_id
            .ok_or_else(|| FederationError::config("realm_id is required"))?;
        let provider_type = self
            .provider_type
            .ok_or_else(|| FederationError::config("provider_type is required"))?;

        Ok(FederationConfig {
            id: self.id.unwrap_or_else(Uuid::now_v7),
            realm_id,
            name: self.name.unwrap_or_else(|| provider_type.clone()),
            provider_type,
            priority: self.priority,
            enabled: self.enabled,
            config: self.config,
        })
    }
}
