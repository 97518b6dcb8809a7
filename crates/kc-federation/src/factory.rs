//! Provider factories and their configuration metadata.
//!
//! A factory is a singleton registered with the host. It advertises the
//! settings an operator must fill in, validates a stored component against
//! them, and creates a provider instance per session.

use serde::{Deserialize, Serialize};

use crate::config::FederationConfig;
use crate::error::FederationResult;
use crate::provider::UserStorageProvider;
use crate::session::FederationSession;

/// Input widget type of a config property.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub enum ConfigPropertyType {
    /// Free-form text.
    #[default]
    String,
}

/// Metadata describing one operator-facing setting.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProviderConfigProperty {
    /// Key in [`FederationConfig::config`].
    pub name: String,
    /// Field label.
    pub label: String,
    /// Help text shown next to the field.
    pub help_text: String,
    /// Widget type.
    #[serde(rename = "type")]
    pub property_type: ConfigPropertyType,
    /// Value pre-filled for new components.
    pub default_value: Option<String>,
    /// Whether a component is invalid without this setting.
    pub required: bool,
}

impl ProviderConfigProperty {
    /// Starts a string property with the given key.
    #[must_use]
    pub fn string(name: impl Into<String>) -> Self {
        let name = name.into();
        Self {
            label: name.clone(),
            name,
            help_text: String::new(),
            property_type: ConfigPropertyType::String,
            default_value: None,
            required: false,
        }
    }

    /// Sets the label.
    #[must_use]
    pub fn label(mut self, label: impl Into<String>) -> Self {
        self.label = label.into();
        self
    }

    /// Sets the help text.
    #[must_use]
    pub fn help_text(mut self, help_text: impl Into<String>) -> Self {
        self.help_text = help_text.into();
        self
    }

    /// Sets the default value.
    #[must_use]
    pub fn default_value(mut self, value: impl Into<String>) -> Self {
        self.default_value = Some(value.into());
        self
    }

    /// Marks the property as required.
    #[must_use]
    pub const fn required(mut self) -> Self {
        self.required = true;
        self
    }
}

/// Factory for a user storage provider type.
///
/// ## Lifecycle
///
/// 1. `init()` - called once when the factory is registered
/// 2. `post_init()` - called after all factories are registered
/// 3. `create()` - called per session with the stored component
/// 4. `close()` - called at shutdown
pub trait UserStorageProviderFactory: Send + Sync {
    /// Provider type created by this factory.
    type Provider: UserStorageProvider;

    /// Returns the unique identifier of this provider type.
    fn id(&self) -> &'static str;

    /// Returns help text describing this provider type.
    fn help_text(&self) -> &'static str;

    /// Returns the settings an operator can configure.
    fn config_properties(&self) -> Vec<ProviderConfigProperty>;

    /// Validates a stored component before it is saved.
    ///
    /// The default checks that every required property is present.
    ///
    /// ## Errors
    ///
    /// Returns `FederationError::Configuration` for an invalid component.
    fn validate_configuration(&self, model: &FederationConfig) -> FederationResult<()> {
        for property in self.config_properties().iter().filter(|p| p.required) {
            model.require(&property.name)?;
        }
        Ok(())
    }

    /// Creates a provider instance for a session.
    ///
    /// ## Errors
    ///
    /// Returns an error if the component cannot produce a working provider.
    fn create(
        &self,
        session: &FederationSession,
        model: &FederationConfig,
    ) -> FederationResult<Self::Provider>;

    /// Initializes the factory.
    fn init(&mut self) {}

    /// Called after all factories have been initialized.
    fn post_init(&mut self) {}

    /// Called when the factory is being shut down.
    fn close(&self) {}
}
