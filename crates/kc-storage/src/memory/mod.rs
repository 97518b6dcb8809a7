//! In-memory storage backend.
//!
//! Implements every collaborator trait in this crate on top of `DashMap`.
//! The username index is updated through the map's entry API, which makes
//! [`UserProvider::add_user`] an atomic create-if-absent.

mod password;

use std::collections::HashSet;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use kc_model::{Credential, CredentialInput, CredentialType, Role, User};
use uuid::Uuid;

use crate::credential::CredentialProvider;
use crate::error::{StorageError, StorageResult};
use crate::role::RoleProvider;
use crate::user::{AddedUser, UserProvider};

pub use password::{PasswordHasherService, PasswordPolicy};

/// Thread-safe in-memory user store, role registry, and credential manager.
#[derive(Debug, Default)]
pub struct InMemoryStore {
    users: DashMap<Uuid, User>,
    usernames: DashMap<(Uuid, String), Uuid>,
    role_grants: DashMap<Uuid, HashSet<Uuid>>,
    roles: DashMap<(Uuid, String), Role>,
    credentials: DashMap<Uuid, Vec<Credential>>,
    hasher: PasswordHasherService,
    users_created: AtomicUsize,
}

impl InMemoryStore {
    /// Creates an empty store with the default password policy.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates an empty store hashing credentials with the given policy.
    #[must_use]
    pub fn with_password_policy(policy: PasswordPolicy) -> Self {
        Self {
            hasher: PasswordHasherService::new(policy),
            ..Self::default()
        }
    }

    /// Number of users created through [`UserProvider::add_user`].
    #[must_use]
    pub fn users_created(&self) -> usize {
        self.users_created.load(Ordering::SeqCst)
    }

    /// Number of users currently stored.
    #[must_use]
    pub fn user_count(&self) -> usize {
        self.users.len()
    }

    fn user_exists(&self, realm_id: Uuid, user_id: Uuid) -> StorageResult<()> {
        match self.users.get(&user_id) {
            Some(user) if user.realm_id == realm_id => Ok(()),
            _ => Err(StorageError::not_found("User", user_id)),
        }
    }

    fn stored_credential(
        &self,
        user_id: Uuid,
        credential_type: CredentialType,
    ) -> Option<Credential> {
        self.credentials.get(&user_id).and_then(|creds| {
            creds
                .iter()
                .find(|c| c.credential_type == credential_type)
                .cloned()
        })
    }
}

#[async_trait]
impl UserProvider for InMemoryStore {
    async fn add_user(&self, realm_id: Uuid, username: &str) -> StorageResult<AddedUser> {
        match self.usernames.entry((realm_id, username.to_string())) {
            Entry::Occupied(entry) => {
                let id = *entry.get();
                let user = self
                    .users
                    .get(&id)
                    .map(|u| u.clone())
                    .ok_or_else(|| StorageError::Internal(format!("dangling username index for {id}")))?;
                Ok(AddedUser {
                    user,
                    created: false,
                })
            }
            Entry::Vacant(entry) => {
                let user = User::new(realm_id, username);
                self.users.insert(user.id, user.clone());
                entry.insert(user.id);
                self.users_created.fetch_add(1, Ordering::SeqCst);
                tracing::debug!(user_id = %user.id, %username, "Created local user");
                Ok(AddedUser {
                    user,
                    created: true,
                })
            }
        }
    }

    async fn update(&self, user: &User) -> StorageResult<()> {
        let mut stored = self
            .users
            .get_mut(&user.id)
            .ok_or_else(|| StorageError::not_found("User", user.id))?;

        if stored.username != user.username {
            return Err(StorageError::InvalidData(
                "username cannot be changed".to_string(),
            ));
        }
        *stored = user.clone();
        Ok(())
    }

    async fn get_by_id(&self, realm_id: Uuid, id: Uuid) -> StorageResult<Option<User>> {
        Ok(self
            .users
            .get(&id)
            .filter(|u| u.realm_id == realm_id)
            .map(|u| u.clone()))
    }

    async fn get_by_username(&self, realm_id: Uuid, username: &str) -> StorageResult<Option<User>> {
        let id = self
            .usernames
            .get(&(realm_id, username.to_string()))
            .map(|id| *id);

        Ok(id.and_then(|id| self.users.get(&id).map(|u| u.clone())))
    }

    async fn get_by_email(&self, realm_id: Uuid, email: &str) -> StorageResult<Option<User>> {
        Ok(self
            .users
            .iter()
            .find(|u| u.realm_id == realm_id && u.email.as_deref() == Some(email))
            .map(|u| u.clone()))
    }

    async fn grant_role(&self, realm_id: Uuid, user_id: Uuid, role_id: Uuid) -> StorageResult<()> {
        self.user_exists(realm_id, user_id)?;
        self.role_grants.entry(user_id).or_default().insert(role_id);
        Ok(())
    }

    async fn get_roles(&self, realm_id: Uuid, user_id: Uuid) -> StorageResult<Vec<Uuid>> {
        self.user_exists(realm_id, user_id)?;
        let mut roles: Vec<Uuid> = self
            .role_grants
            .get(&user_id)
            .map(|grants| grants.iter().copied().collect())
            .unwrap_or_default();
        roles.sort();
        Ok(roles)
    }
}

#[async_trait]
impl RoleProvider for InMemoryStore {
    async fn create(&self, role: &Role) -> StorageResult<()> {
        match self.roles.entry((role.realm_id, role.name.clone())) {
            Entry::Occupied(_) => Err(StorageError::duplicate("Role", "name", role.name.clone())),
            Entry::Vacant(entry) => {
                entry.insert(role.clone());
                Ok(())
            }
        }
    }

    async fn get_realm_role_by_name(
        &self,
        realm_id: Uuid,
        name: &str,
    ) -> StorageResult<Option<Role>> {
        Ok(self
            .roles
            .get(&(realm_id, name.to_string()))
            .map(|r| r.clone()))
    }
}

#[async_trait]
impl CredentialProvider for InMemoryStore {
    async fn update_credential(
        &self,
        realm_id: Uuid,
        user_id: Uuid,
        input: &CredentialInput,
    ) -> StorageResult<()> {
        self.user_exists(realm_id, user_id)?;

        let value = input.as_value().ok_or_else(|| {
            StorageError::InvalidData("credential input carries no secret value".to_string())
        })?;
        if !input.is_password() {
            return Err(StorageError::InvalidData(format!(
                "unsupported credential type: {}",
                input.credential_type()
            )));
        }

        let credential = Credential::new_password(user_id, realm_id, self.hasher.hash(value.value())?);
        let mut creds = self.credentials.entry(user_id).or_default();
        creds.retain(|c| !c.is_password());
        creds.push(credential);
        Ok(())
    }

    async fn is_valid(
        &self,
        realm_id: Uuid,
        user_id: Uuid,
        input: &CredentialInput,
    ) -> StorageResult<bool> {
        self.user_exists(realm_id, user_id)?;

        let Some(value) = input.as_value() else {
            return Ok(false);
        };
        let Some(credential_type) = CredentialType::parse(input.credential_type()) else {
            return Ok(false);
        };

        match self.stored_credential(user_id, credential_type) {
            Some(stored) => self.hasher.verify(value.value(), &stored.secret_data),
            None => Ok(false),
        }
    }

    async fn has_credential_type(
        &self,
        realm_id: Uuid,
        user_id: Uuid,
        credential_type: CredentialType,
    ) -> StorageResult<bool> {
        self.user_exists(realm_id, user_id)?;
        Ok(self.stored_credential(user_id, credential_type).is_some())
    }
}
