//! Host collaborators handed to federation providers.

use std::fmt;
use std::sync::Arc;

use kc_storage::memory::InMemoryStore;
use kc_storage::{CredentialProvider, RoleProvider, UserProvider};
use uuid::Uuid;

/// The host services a provider may use while serving a request.
///
/// Cloning is cheap; all collaborators are shared.
#[derive(Clone)]
pub struct FederationSession {
    id: Uuid,
    users: Arc<dyn UserProvider>,
    roles: Arc<dyn RoleProvider>,
    credentials: Arc<dyn CredentialProvider>,
}

impl FederationSession {
    /// Creates a session over the given collaborators.
    #[must_use]
    pub fn new(
        users: Arc<dyn UserProvider>,
        roles: Arc<dyn RoleProvider>,
        credentials: Arc<dyn CredentialProvider>,
    ) -> Self {
        Self {
            id: Uuid::now_v7(),
            users,
            roles,
            credentials,
        }
    }

    /// Creates a session where one in-memory store plays every role.
    #[must_use]
    pub fn in_memory(store: Arc<InMemoryStore>) -> Self {
        Self::new(store.clone(), store.clone(), store)
    }

    /// Returns the session ID.
    #[must_use]
    pub const fn id(&self) -> Uuid {
        self.id
    }

    /// Local user storage.
    #[must_use]
    pub fn users(&self) -> &dyn UserProvider {
        self.users.as_ref()
    }

    /// Realm role registry.
    #[must_use]
    pub fn roles(&self) -> &dyn RoleProvider {
        self.roles.as_ref()
    }

    /// Local credential manager.
    #[must_use]
    pub fn credentials(&self) -> &dyn CredentialProvider {
        self.credentials.as_ref()
    }
}

impl fmt::Debug for FederationSession {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FederationSession")
            .field("id", &self.id)
            .finish_non_exhaustive()
    }
}
