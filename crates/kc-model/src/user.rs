//! User domain model.
//!
//! A [`User`] is the local record the host keeps for an identity. Users
//! materialized by a federation provider carry a [`FederationLink`] naming
//! that provider until the provider hands authority over to local storage.

use std::collections::HashMap;
use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Typed reference from a local user to the federation provider instance
/// that created it.
///
/// The wrapped value is the provider's component id. A user with a link
/// still defers credential checks to that provider.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FederationLink(Uuid);

impl FederationLink {
    /// Creates a link to the provider with the given component id.
    #[must_use]
    pub const fn new(provider_id: Uuid) -> Self {
        Self(provider_id)
    }

    /// Returns the component id of the linked provider.
    #[must_use]
    pub const fn provider_id(&self) -> Uuid {
        self.0
    }
}

impl fmt::Display for FederationLink {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl From<Uuid> for FederationLink {
    fn from(provider_id: Uuid) -> Self {
        Self(provider_id)
    }
}

/// A local user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    // === Identity ===
    /// Unique identifier.
    pub id: Uuid,
    /// Realm this user belongs to.
    pub realm_id: Uuid,
    /// Unique username within the realm.
    pub username: String,
    /// Whether the user account is enabled.
    pub enabled: bool,

    // === Profile ===
    /// User's first name.
    pub first_name: Option<String>,
    /// User's last name.
    pub last_name: Option<String>,
    /// User's email address.
    pub email: Option<String>,
    /// Whether the email has been verified.
    pub email_verified: bool,

    // === Timestamps ===
    /// When the user was created.
    pub created_at: DateTime<Utc>,
    /// When the user was last updated.
    pub updated_at: DateTime<Utc>,

    // === Federation ===
    /// Provider that still owns credential checks for this user, if any.
    pub federation_link: Option<FederationLink>,

    // === Custom Attributes ===
    /// Custom user attributes.
    pub attributes: HashMap<String, Vec<String>>,
}

impl User {
    /// Creates a new enabled user with the given username.
    #[must_use]
    pub fn new(realm_id: Uuid, username: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::now_v7(),
            realm_id,
            username: username.into(),
            enabled: true,
            first_name: None,
            last_name: None,
            email: None,
            email_verified: false,
            created_at: now,
            updated_at: now,
            federation_link: None,
            attributes: HashMap::new(),
        }
    }

    /// Links the user to a federation provider.
    #[must_use]
    pub const fn with_federation_link(mut self, link: FederationLink) -> Self {
        self.federation_link = Some(link);
        self
    }

    /// Checks if this user still defers to a federation provider.
    #[must_use]
    pub const fn is_federated(&self) -> bool {
        self.federation_link.is_some()
    }

    /// Checks if this user is linked to the given provider.
    #[must_use]
    pub fn is_linked_to(&self, link: &FederationLink) -> bool {
        self.federation_link.as_ref() == Some(link)
    }

    /// Clears the federation link, making local storage authoritative.
    ///
    /// Returns the link that was removed.
    pub fn unlink(&mut self) -> Option<FederationLink> {
        let previous = self.federation_link.take();
        if previous.is_some() {
            self.touch();
        }
        previous
    }

    /// Gets an attribute value.
    #[must_use]
    pub fn get_attribute(&self, name: &str) -> Option<&Vec<String>> {
        self.attributes.get(name)
    }

    /// Gets the first value of an attribute.
    #[must_use]
    pub fn get_first_attribute(&self, name: &str) -> Option<&str> {
        self.attributes
            .get(name)
            .and_then(|v| v.first())
            .map(String::as_str)
    }

    /// Sets an attribute, replacing any previous values.
    pub fn set_attribute(&mut self, name: impl Into<String>, values: Vec<String>) {
        self.attributes.insert(name.into(), values);
    }

    /// Bumps the last-updated timestamp.
    pub fn touch(&mut self) {
        self.updated_at = Utc::now();
    }
}
