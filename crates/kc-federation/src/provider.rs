//! User storage provider capability traits.
//!
//! ## NIST 800-53 Rev5 Controls
//!
//! - IA-2: Identification and Authentication (Organizational Users)
//! - IA-5: Authenticator Management
//!
//! A provider implements [`UserStorageProvider`] plus whichever capability
//! traits it supports. The host composes them; no capability is inherited.

use std::collections::BTreeSet;

use kc_model::{CredentialInput, FederationLink, Role, User};
use uuid::Uuid;

use crate::config::FederationConfig;
use crate::error::FederationResult;

// ============================================================================
// User Storage Provider
// ============================================================================

/// Identity and lifecycle of a federation provider instance.
///
/// The removal hooks let a provider clean up external state before the host
/// deletes a realm, role, or group. They default to no-ops.
#[allow(async_fn_in_trait)]
pub trait UserStorageProvider: Send + Sync {
    /// Returns the provider configuration.
    fn config(&self) -> &FederationConfig;

    /// Returns the provider type identifier.
    fn provider_type(&self) -> &'static str;

    /// Returns the link this instance stamps on users it owns.
    fn federation_link(&self) -> FederationLink {
        self.config().federation_link()
    }

    /// Called before a realm is removed.
    fn pre_remove_realm(&self, _realm_id: Uuid) {}

    /// Called before a role is removed.
    fn pre_remove_role(&self, _realm_id: Uuid, _role: &Role) {}

    /// Called before a group is removed.
    fn pre_remove_group(&self, _realm_id: Uuid, _group_id: Uuid) {}

    /// Closes the provider, releasing any resources.
    async fn close(&self) -> FederationResult<()> {
        Ok(())
    }
}

// ============================================================================
// User Lookup
// ============================================================================

/// Resolves users the host does not know locally.
///
/// `Ok(None)` means the user does not exist anywhere this provider can see.
#[allow(async_fn_in_trait)]
pub trait UserLookupProvider: Send + Sync {
    /// Gets a user by storage id (see [`crate::StorageId`]).
    async fn get_user_by_id(&self, realm_id: Uuid, id: &str) -> FederationResult<Option<User>>;

    /// Gets a user by username.
    async fn get_user_by_username(
        &self,
        realm_id: Uuid,
        username: &str,
    ) -> FederationResult<Option<User>>;

    /// Gets a user by email.
    async fn get_user_by_email(&self, realm_id: Uuid, email: &str)
    -> FederationResult<Option<User>>;
}

// ============================================================================
// Credential Validation
// ============================================================================

/// Validates credentials on behalf of the host.
///
/// ## NIST 800-53 Rev5: IA-5
///
/// Implementations must never log the secret carried by the input.
#[allow(async_fn_in_trait)]
pub trait CredentialInputValidator: Send + Sync {
    /// Checks if the provider can validate the given credential type.
    fn supports_credential_type(&self, credential_type: &str) -> bool;

    /// Checks if the user has a credential of the given type this provider
    /// can validate.
    fn is_configured_for(&self, realm_id: Uuid, user: &User, credential_type: &str) -> bool;

    /// Validates a credential input for the user.
    ///
    /// Returns `Ok(false)` for a credential that does not match. A provider
    /// may update `user` (and persist it) as a side effect of a successful
    /// validation.
    async fn is_valid(
        &self,
        realm_id: Uuid,
        user: &mut User,
        input: &CredentialInput,
    ) -> FederationResult<bool>;
}

// ============================================================================
// Credential Update
// ============================================================================

/// Accepts or refuses credential writes for users a provider owns.
#[allow(async_fn_in_trait)]
pub trait CredentialInputUpdater: Send + Sync {
    /// Updates a credential.
    ///
    /// Returns `Ok(false)` when the provider does not handle this input and
    /// the host should store it locally.
    ///
    /// ## Errors
    ///
    /// Returns `FederationError::ReadOnly` when the provider owns the
    /// credential and refuses the write.
    async fn update_credential(
        &self,
        realm_id: Uuid,
        user: &User,
        input: &CredentialInput,
    ) -> FederationResult<bool>;

    /// Disables all credentials of a type for the user.
    async fn disable_credential_type(
        &self,
        realm_id: Uuid,
        user: &User,
        credential_type: &str,
    ) -> FederationResult<()>;

    /// Returns the credential types that can be disabled for the user.
    fn disableable_credential_types(&self, realm_id: Uuid, user: &User) -> BTreeSet<String>;
}
