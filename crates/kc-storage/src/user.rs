//! User storage provider trait.

use async_trait::async_trait;
use kc_model::User;
use uuid::Uuid;

use crate::error::StorageResult;

/// Outcome of [`UserProvider::add_user`].
#[derive(Debug, Clone)]
pub struct AddedUser {
    /// The stored user, either freshly created or already present.
    pub user: User,
    /// Whether this call created the record.
    pub created: bool,
}

/// Provider for local user storage.
///
/// Implementations must be thread-safe and support concurrent access.
///
/// ## Concurrency contract
///
/// Federation providers materialize users on first lookup and do no locking
/// of their own. Two requests may race to materialize the same username, so
/// implementations must guarantee:
///
/// - [`add_user`](Self::add_user) is an atomic create-if-absent: exactly one
///   caller observes `created == true` for a given realm and username.
/// - [`grant_role`](Self::grant_role) is idempotent: granting a role the user
///   already holds is a no-op.
#[async_trait]
pub trait UserProvider: Send + Sync {
    /// Creates a user with the given username, or returns the existing one.
    async fn add_user(&self, realm_id: Uuid, username: &str) -> StorageResult<AddedUser>;

    /// Persists changes to an existing user.
    ///
    /// ## Errors
    ///
    /// Returns `StorageError::NotFound` if the user doesn't exist.
    async fn update(&self, user: &User) -> StorageResult<()>;

    /// Gets a user by ID.
    async fn get_by_id(&self, realm_id: Uuid, id: Uuid) -> StorageResult<Option<User>>;

    /// Gets a user by username.
    async fn get_by_username(&self, realm_id: Uuid, username: &str) -> StorageResult<Option<User>>;

    /// Gets a user by email.
    async fn get_by_email(&self, realm_id: Uuid, email: &str) -> StorageResult<Option<User>>;

    /// Grants a role to a user.
    async fn grant_role(&self, realm_id: Uuid, user_id: Uuid, role_id: Uuid) -> StorageResult<()>;

    /// Gets the roles granted to a user.
    async fn get_roles(&self, realm_id: Uuid, user_id: Uuid) -> StorageResult<Vec<Uuid>>;
}
