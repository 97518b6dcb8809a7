//! Factory registering the migration provider with the host.

use kc_federation::{
    FederationConfig, FederationResult, FederationSession, ProviderConfigProperty,
    UserStorageProviderFactory,
};

use crate::config::{MigrationConfig, BASE_URI_KEY};
use crate::provider::MigrationStorageProvider;
use crate::PROVIDER_ID;

/// Creates [`MigrationStorageProvider`] instances from stored components.
#[derive(Debug, Clone, Copy, Default)]
pub struct MigrationProviderFactory;

impl MigrationProviderFactory {
    /// Creates the factory.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }
}

impl UserStorageProviderFactory for MigrationProviderFactory {
    type Provider = MigrationStorageProvider;

    fn id(&self) -> &'static str {
        PROVIDER_ID
    }

    fn help_text(&self) -> &'static str {
        "Migrates users from a legacy user directory on first login"
    }

    fn config_properties(&self) -> Vec<ProviderConfigProperty> {
        vec![ProviderConfigProperty::string(BASE_URI_KEY)
            .label("Base URI")
            .help_text("User Validation Host Base URI")
            .required()]
    }

    fn validate_configuration(&self, model: &FederationConfig) -> FederationResult<()> {
        MigrationConfig::from_component(model)?;
        Ok(())
    }

    fn create(
        &self,
        session: &FederationSession,
        model: &FederationConfig,
    ) -> FederationResult<Self::Provider> {
        let config = MigrationConfig::from_component(model)?;
        Ok(MigrationStorageProvider::new(
            session.clone(),
            model.clone(),
            &config,
        )?)
    }
}
