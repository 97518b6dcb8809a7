//! Migration storage provider.
//!
//! Users move through three states:
//!
//! - **Unknown**: no local record exists
//! - **Provisional**: a local record exists and links to this provider
//! - **Migrated**: the link has been cleared; local storage is authoritative
//!
//! A lookup of an unknown identifier fetches the legacy record and
//! materializes it locally. The first successful password check stores the
//! password locally and clears the link. Nothing ever moves a user back.
//!
//! ## Concurrency
//!
//! The provider does no locking. Two first lookups of the same identifier
//! may both reach the legacy directory; the local store's atomic
//! create-if-absent and idempotent role grants keep the outcome to one user.
//!
//! Updates write the whole record. A lookup re-reads an existing record
//! before completing it and leaves it alone once it holds a local password,
//! which [`is_valid`](CredentialInputValidator::is_valid) stores before
//! clearing the link. A lookup that passes that check just before a
//! concurrent migration stores the password can still write its linked copy
//! after the link is cleared, putting the user back in the provisional state
//! until the next successful password check.

use std::collections::BTreeSet;
use std::sync::Arc;

use kc_federation::{
    CredentialInputUpdater, CredentialInputValidator, FederationConfig, FederationError,
    FederationResult, FederationSession, StorageId, UserLookupProvider, UserStorageProvider,
};
use kc_model::{CredentialInput, CredentialType, Role, User};
use kc_storage::AddedUser;
use uuid::Uuid;

use crate::client::{HttpLegacyUserService, LegacyUserService, RemoteUser, UserCredentialsDto};
use crate::config::MigrationConfig;
use crate::error::MigrationResult;
use crate::{normalize_identifier, PROVIDER_ID};

/// Where a user stands in the migration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MigrationState {
    /// No local record.
    Unknown,
    /// Local record still deferring credential checks to a provider.
    Provisional,
    /// Local record served entirely from local storage.
    Migrated,
}

/// Bridges a legacy user directory into local storage, one user at a time.
pub struct MigrationStorageProvider {
    model: FederationConfig,
    session: FederationSession,
    service: Arc<dyn LegacyUserService>,
}

impl MigrationStorageProvider {
    /// Creates a provider talking HTTP to the configured directory.
    ///
    /// ## Errors
    ///
    /// Returns an error if the configuration is invalid or the HTTP client
    /// cannot be built.
    pub fn new(
        session: FederationSession,
        model: FederationConfig,
        config: &MigrationConfig,
    ) -> MigrationResult<Self> {
        config.validate()?;
        let service = HttpLegacyUserService::new(config)?;
        tracing::info!(
            provider_id = %model.id,
            base_uri = %config.base_uri,
            "Using legacy directory"
        );
        Ok(Self::with_service(session, model, Arc::new(service)))
    }

    /// Creates a provider over an arbitrary directory implementation.
    #[must_use]
    pub fn with_service(
        session: FederationSession,
        model: FederationConfig,
        service: Arc<dyn LegacyUserService>,
    ) -> Self {
        Self {
            model,
            session,
            service,
        }
    }

    /// Reports the migration state of an identifier without contacting the
    /// legacy directory.
    pub async fn migration_state(
        &self,
        realm_id: Uuid,
        identifier: &str,
    ) -> FederationResult<MigrationState> {
        let identifier = normalize_identifier(identifier);
        Ok(match self.find_local(realm_id, &identifier).await? {
            None => MigrationState::Unknown,
            Some(user) if user.is_federated() => MigrationState::Provisional,
            Some(_) => MigrationState::Migrated,
        })
    }

    async fn find_local(&self, realm_id: Uuid, identifier: &str) -> FederationResult<Option<User>> {
        let users = self.session.users();
        if let Some(user) = users.get_by_username(realm_id, identifier).await? {
            return Ok(Some(user));
        }
        Ok(users.get_by_email(realm_id, identifier).await?)
    }

    /// Resolves an identifier, materializing it on first contact.
    async fn resolve(&self, realm_id: Uuid, raw: &str) -> FederationResult<Option<User>> {
        let identifier = normalize_identifier(raw);
        if identifier.is_empty() {
            return Ok(None);
        }

        if let Some(user) = self.find_local(realm_id, &identifier).await? {
            tracing::debug!(username = %identifier, "Serving known user from local storage");
            return Ok(Some(user));
        }

        let remote = match self.service.get_user_details(&identifier).await {
            Ok(remote) => remote,
            Err(e) if e.is_user_not_found() => {
                tracing::info!(username = %identifier, "User not found in legacy directory");
                return Ok(None);
            }
            Err(e) => {
                tracing::warn!(username = %identifier, error = %e, "Legacy directory lookup failed");
                return Err(e.into());
            }
        };

        if remote.email.as_deref() != Some(identifier.as_str()) {
            let remote_email = remote.email.unwrap_or_default();
            tracing::error!(
                username = %identifier,
                remote_email = %remote_email,
                "Local and remote users differ"
            );
            return Err(FederationError::identity_mismatch(identifier, remote_email));
        }

        self.materialize(realm_id, &identifier, remote).await.map(Some)
    }

    /// Creates (or completes) the local copy of a legacy user.
    async fn materialize(
        &self,
        realm_id: Uuid,
        identifier: &str,
        remote: RemoteUser,
    ) -> FederationResult<User> {
        let link = self.federation_link();
        let users = self.session.users();

        let AddedUser { user, created } = users.add_user(realm_id, identifier).await?;
        // An existing record may have been migrated since add_user read it.
        let mut user = if created {
            user
        } else {
            users.get_by_id(realm_id, user.id).await?.unwrap_or(user)
        };
        if !created && !user.is_linked_to(&link) && self.is_settled(realm_id, &user).await? {
            tracing::debug!(username = %identifier, "Local user already settled, leaving as is");
            return Ok(user);
        }

        user.federation_link = Some(link);
        user.enabled = remote.enabled;
        user.email = Some(identifier.to_string());
        user.email_verified = remote.email_verified;
        user.first_name = remote.first_name;
        user.last_name = remote.last_name;
        for (name, values) in remote.attributes.unwrap_or_default() {
            user.set_attribute(name, values);
        }
        user.touch();
        users.update(&user).await?;

        if let Some(roles) = remote.roles {
            for name in &roles {
                self.grant_realm_role(realm_id, &user, name).await?;
            }
        }

        tracing::info!(
            username = %identifier,
            user_id = %user.id,
            created,
            "Materialized user from legacy directory"
        );
        Ok(user)
    }

    /// A record this call did not create is left alone if it belongs to
    /// another provider or already holds a local password.
    async fn is_settled(&self, realm_id: Uuid, user: &User) -> FederationResult<bool> {
        if user.is_federated() {
            return Ok(true);
        }
        Ok(self
            .session
            .credentials()
            .has_credential_type(realm_id, user.id, CredentialType::Password)
            .await?)
    }

    async fn grant_realm_role(&self, realm_id: Uuid, user: &User, name: &str) -> FederationResult<()> {
        match self.session.roles().get_realm_role_by_name(realm_id, name).await? {
            Some(role) => {
                self.session
                    .users()
                    .grant_role(realm_id, user.id, role.id)
                    .await?;
                tracing::info!(username = %user.username, role = %name, "Granted role");
            }
            None => {
                tracing::debug!(username = %user.username, role = %name, "Role not defined in realm, skipping");
            }
        }
        Ok(())
    }

    /// Runs the existence check and login against the legacy directory.
    async fn check_remote_login(&self, username: &str, password: &str) -> bool {
        match self.service.validate_user_exists(username).await {
            Ok(status) if status.is_success() => {}
            Ok(status) => {
                tracing::info!(%username, status = status.as_u16(), "User does not exist in legacy directory");
                return false;
            }
            Err(e) => {
                tracing::warn!(%username, error = %e, "Legacy directory existence check failed");
                return false;
            }
        }

        let credentials = UserCredentialsDto::new(password);
        match self.service.validate_login(username, &credentials).await {
            Ok(status) if status.is_success() => true,
            Ok(status) => {
                tracing::info!(%username, status = status.as_u16(), "Legacy directory rejected credentials");
                false
            }
            Err(e) => {
                tracing::warn!(%username, error = %e, "Legacy directory login check failed");
                false
            }
        }
    }
}

impl std::fmt::Debug for MigrationStorageProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MigrationStorageProvider")
            .field("id", &self.model.id)
            .field("realm_id", &self.model.realm_id)
            .finish_non_exhaustive()
    }
}

impl UserStorageProvider for MigrationStorageProvider {
    fn config(&self) -> &FederationConfig {
        &self.model
    }

    fn provider_type(&self) -> &'static str {
        PROVIDER_ID
    }

    fn pre_remove_realm(&self, realm_id: Uuid) {
        tracing::debug!(%realm_id, "pre_remove_realm: nothing to clean up");
    }

    fn pre_remove_role(&self, _realm_id: Uuid, role: &Role) {
        tracing::debug!(role = %role.name, "pre_remove_role: nothing to clean up");
    }

    fn pre_remove_group(&self, _realm_id: Uuid, group_id: Uuid) {
        tracing::debug!(%group_id, "pre_remove_group: nothing to clean up");
    }
}

impl UserLookupProvider for MigrationStorageProvider {
    async fn get_user_by_id(&self, realm_id: Uuid, id: &str) -> FederationResult<Option<User>> {
        tracing::debug!(%id, "Get by id");
        let storage_id = StorageId::parse(id);
        self.resolve(realm_id, storage_id.external_id()).await
    }

    async fn get_user_by_username(
        &self,
        realm_id: Uuid,
        username: &str,
    ) -> FederationResult<Option<User>> {
        tracing::debug!(%username, "Get by username");
        self.resolve(realm_id, username).await
    }

    async fn get_user_by_email(&self, realm_id: Uuid, email: &str) -> FederationResult<Option<User>> {
        tracing::debug!(%email, "Get by email");
        self.resolve(realm_id, email).await
    }
}

impl CredentialInputValidator for MigrationStorageProvider {
    fn supports_credential_type(&self, credential_type: &str) -> bool {
        CredentialType::is_password(credential_type)
    }

    fn is_configured_for(&self, _realm_id: Uuid, _user: &User, _credential_type: &str) -> bool {
        true
    }

    async fn is_valid(
        &self,
        realm_id: Uuid,
        user: &mut User,
        input: &CredentialInput,
    ) -> FederationResult<bool> {
        let Some(credential) = input.as_value() else {
            return Ok(false);
        };
        if !self.supports_credential_type(credential.credential_type()) {
            return Ok(false);
        }
        if !user.is_linked_to(&self.federation_link()) {
            tracing::debug!(username = %user.username, "User is not owned by this provider");
            return Ok(false);
        }

        if !self.check_remote_login(&user.username, credential.value()).await {
            return Ok(false);
        }

        self.session
            .credentials()
            .update_credential(realm_id, user.id, input)
            .await?;
        user.unlink();
        self.session.users().update(user).await?;

        tracing::info!(username = %user.username, "Credentials stored locally, user migrated");
        Ok(true)
    }
}

impl CredentialInputUpdater for MigrationStorageProvider {
    async fn update_credential(
        &self,
        _realm_id: Uuid,
        user: &User,
        input: &CredentialInput,
    ) -> FederationResult<bool> {
        if input.is_password() {
            tracing::debug!(username = %user.username, "Refusing password update");
            return Err(FederationError::read_only("update password credential"));
        }
        Ok(false)
    }

    async fn disable_credential_type(
        &self,
        _realm_id: Uuid,
        _user: &User,
        credential_type: &str,
    ) -> FederationResult<()> {
        tracing::debug!(%credential_type, "disable_credential_type: nothing to disable");
        Ok(())
    }

    fn disableable_credential_types(&self, _realm_id: Uuid, _user: &User) -> BTreeSet<String> {
        BTreeSet::new()
    }
}
