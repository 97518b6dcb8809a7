//! Credential manager trait.

use async_trait::async_trait;
use kc_model::{CredentialInput, CredentialType};
use uuid::Uuid;

use crate::error::StorageResult;

/// The host's local credential manager.
///
/// Accepts raw credential inputs and owns how they are hashed and stored.
///
/// ## Security Note
///
/// Implementations must never log or persist plaintext secrets.
#[async_trait]
pub trait CredentialProvider: Send + Sync {
    /// Stores a credential for the user, replacing any existing credential
    /// of the same type.
    ///
    /// ## Errors
    ///
    /// Returns `StorageError::InvalidData` if the input carries no secret
    /// value or declares an unknown type.
    async fn update_credential(
        &self,
        realm_id: Uuid,
        user_id: Uuid,
        input: &CredentialInput,
    ) -> StorageResult<()>;

    /// Checks the input against the user's stored credential.
    ///
    /// Returns `false` when no credential of the declared type is stored.
    async fn is_valid(
        &self,
        realm_id: Uuid,
        user_id: Uuid,
        input: &CredentialInput,
    ) -> StorageResult<bool>;

    /// Checks if the user has a stored credential of the given type.
    async fn has_credential_type(
        &self,
        realm_id: Uuid,
        user_id: Uuid,
        credential_type: CredentialType,
    ) -> StorageResult<bool>;
}
