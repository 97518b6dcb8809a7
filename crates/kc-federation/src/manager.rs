//! Host-side routing between local storage and a federation provider.
//!
//! Local storage is always consulted first. A provider is only asked about
//! users the host cannot find, and only validates credentials for users whose
//! federation link names it. Once a user's link is cleared, every request for
//! that user is served from local storage.

use std::collections::BTreeSet;

use kc_model::{CredentialInput, User};
use uuid::Uuid;

use crate::error::FederationResult;
use crate::provider::{
    CredentialInputUpdater, CredentialInputValidator, UserLookupProvider, UserStorageProvider,
};
use crate::session::FederationSession;
use crate::storage_id::StorageId;

/// Composes one federation provider with the host's local storage.
#[derive(Debug)]
pub struct UserFederationManager<P> {
    session: FederationSession,
    provider: P,
}

impl<P> UserFederationManager<P>
where
    P: UserStorageProvider + UserLookupProvider + CredentialInputValidator + CredentialInputUpdater,
{
    /// Creates a manager over a session and provider.
    #[must_use]
    pub const fn new(session: FederationSession, provider: P) -> Self {
        Self { session, provider }
    }

    /// Returns the federation provider.
    #[must_use]
    pub const fn provider(&self) -> &P {
        &self.provider
    }

    /// Gets a user by username, falling back to the provider.
    pub async fn get_user_by_username(
        &self,
        realm_id: Uuid,
        username: &str,
    ) -> FederationResult<Option<User>> {
        if let Some(user) = self.session.users().get_by_username(realm_id, username).await? {
            return Ok(Some(user));
        }
        self.provider.get_user_by_username(realm_id, username).await
    }

    /// Gets a user by email, falling back to the provider.
    pub async fn get_user_by_email(
        &self,
        realm_id: Uuid,
        email: &str,
    ) -> FederationResult<Option<User>> {
        if let Some(user) = self.session.users().get_by_email(realm_id, email).await? {
            return Ok(Some(user));
        }
        self.provider.get_user_by_email(realm_id, email).await
    }

    /// Gets a user by id, falling back to the provider.
    ///
    /// Local ids are user UUIDs; anything else is handed to the provider to
    /// decode.
    pub async fn get_user_by_id(&self, realm_id: Uuid, id: &str) -> FederationResult<Option<User>> {
        if StorageId::parse(id).is_local() {
            if let Ok(local_id) = Uuid::parse_str(id) {
                if let Some(user) = self.session.users().get_by_id(realm_id, local_id).await? {
                    return Ok(Some(user));
                }
            }
        }
        self.provider.get_user_by_id(realm_id, id).await
    }

    /// Validates a credential for the user.
    ///
    /// `user` is updated in place if the provider migrates it.
    pub async fn validate_credential(
        &self,
        realm_id: Uuid,
        user: &mut User,
        input: &CredentialInput,
    ) -> FederationResult<bool> {
        if self.owns(user) {
            let credential_type = input.credential_type();
            if !self.provider.supports_credential_type(credential_type)
                || !self.provider.is_configured_for(realm_id, user, credential_type)
            {
                return Ok(false);
            }
            return self.provider.is_valid(realm_id, user, input).await;
        }

        if user.is_federated() {
            tracing::debug!(
                username = %user.username,
                "User is linked to another provider, refusing local validation"
            );
            return Ok(false);
        }

        Ok(self
            .session
            .credentials()
            .is_valid(realm_id, user.id, input)
            .await?)
    }

    /// Updates a credential, letting the provider veto or claim it first.
    ///
    /// ## Errors
    ///
    /// Propagates `FederationError::ReadOnly` from the provider.
    pub async fn update_credential(
        &self,
        realm_id: Uuid,
        user: &User,
        input: &CredentialInput,
    ) -> FederationResult<()> {
        if self.owns(user) && self.provider.update_credential(realm_id, user, input).await? {
            return Ok(());
        }

        self.session
            .credentials()
            .update_credential(realm_id, user.id, input)
            .await?;
        Ok(())
    }

    /// Returns the credential types the provider lets the host disable.
    #[must_use]
    pub fn disableable_credential_types(&self, realm_id: Uuid, user: &User) -> BTreeSet<String> {
        if self.owns(user) {
            self.provider.disableable_credential_types(realm_id, user)
        } else {
            BTreeSet::new()
        }
    }

    /// Closes the provider.
    pub async fn close(&self) -> FederationResult<()> {
        self.provider.close().await
    }

    fn owns(&self, user: &User) -> bool {
        user.is_linked_to(&self.provider.federation_link())
    }
}
