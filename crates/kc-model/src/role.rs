//! Role domain model.
//!
//! Only realm roles are modelled; federation providers grant existing
//! roles by name and never create them.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A realm role.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Role {
    /// Unique identifier.
    pub id: Uuid,
    /// Realm that defines the role.
    pub realm_id: Uuid,
    /// Role name, unique within the realm (e.g. `ROLE_FOO`).
    pub name: String,
    /// When the role was defined.
    pub created_at: DateTime<Utc>,
}

impl Role {
    /// Defines a role in a realm.
    #[must_use]
    pub fn new_realm_role(realm_id: Uuid, name: impl Into<String>) -> Self {
        Self {
            id: Uuid::now_v7(),
            realm_id,
            name: name.into(),
            created_at: Utc::now(),
        }
    }
}
