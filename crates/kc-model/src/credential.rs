//! Credential domain model.
//!
//! [`Credential`] is what the host stores for a user. [`CredentialInput`] is
//! what a login form or admin call submits for validation or update.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Known credential types.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CredentialType {
    /// Password credential.
    Password,
    /// One-time password credential.
    Otp,
    /// `WebAuthn` credential.
    Webauthn,
}

impl CredentialType {
    /// Returns the string representation used in storage and on the wire.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Password => "password",
            Self::Otp => "otp",
            Self::Webauthn => "webauthn",
        }
    }

    /// Parses a storage type name.
    #[must_use]
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "password" => Some(Self::Password),
            "otp" => Some(Self::Otp),
            "webauthn" => Some(Self::Webauthn),
            _ => None,
        }
    }

    /// Checks whether a type name denotes a password.
    #[must_use]
    pub fn is_password(value: &str) -> bool {
        value == Self::Password.as_str()
    }
}

impl fmt::Display for CredentialType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A stored user credential.
///
/// `secret_data` holds a hash, never the plaintext secret.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Credential {
    /// Unique identifier.
    pub id: Uuid,
    /// User this credential belongs to.
    pub user_id: Uuid,
    /// Realm this credential belongs to.
    pub realm_id: Uuid,
    /// Credential type.
    pub credential_type: CredentialType,
    /// When the credential was created.
    pub created_at: DateTime<Utc>,
    /// Secret data (e.g. a PHC password hash).
    pub secret_data: String,
}

impl Credential {
    /// Creates a password credential from an already-hashed secret.
    #[must_use]
    pub fn new_password(user_id: Uuid, realm_id: Uuid, secret_data: impl Into<String>) -> Self {
        Self {
            id: Uuid::now_v7(),
            user_id,
            realm_id,
            credential_type: CredentialType::Password,
            created_at: Utc::now(),
            secret_data: secret_data.into(),
        }
    }

    /// Checks if this is a password credential.
    #[must_use]
    pub const fn is_password(&self) -> bool {
        matches!(self.credential_type, CredentialType::Password)
    }
}

/// A secret value submitted by a user, tagged with its declared type.
///
/// The value is redacted from `Debug` output.
#[derive(Clone, PartialEq, Eq)]
pub struct UserCredential {
    credential_type: String,
    value: String,
}

impl UserCredential {
    /// Creates a credential value of an arbitrary declared type.
    #[must_use]
    pub fn new(credential_type: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            credential_type: credential_type.into(),
            value: value.into(),
        }
    }

    /// Creates a password value.
    #[must_use]
    pub fn password(value: impl Into<String>) -> Self {
        Self::new(CredentialType::Password.as_str(), value)
    }

    /// Returns the declared credential type.
    #[must_use]
    pub fn credential_type(&self) -> &str {
        &self.credential_type
    }

    /// Returns the secret value.
    #[must_use]
    pub fn value(&self) -> &str {
        &self.value
    }
}

impl fmt::Debug for UserCredential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("UserCredential")
            .field("credential_type", &self.credential_type)
            .field("value", &"[REDACTED]")
            .finish()
    }
}

/// Input submitted for credential validation or update.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CredentialInput {
    /// A secret value typed by the user.
    Value(UserCredential),
    /// A reference to a credential the host already stores (e.g. a
    /// registered security key), carrying no secret.
    Stored {
        /// Declared credential type.
        credential_type: String,
        /// Id of the stored credential.
        credential_id: Uuid,
    },
}

impl CredentialInput {
    /// Creates a password value input.
    #[must_use]
    pub fn password(value: impl Into<String>) -> Self {
        Self::Value(UserCredential::password(value))
    }

    /// Returns the declared credential type.
    #[must_use]
    pub fn credential_type(&self) -> &str {
        match self {
            Self::Value(credential) => credential.credential_type(),
            Self::Stored {
                credential_type, ..
            } => credential_type,
        }
    }

    /// Returns the secret value, if this input carries one.
    #[must_use]
    pub const fn as_value(&self) -> Option<&UserCredential> {
        match self {
            Self::Value(credential) => Some(credential),
            Self::Stored { .. } => None,
        }
    }

    /// Checks if the declared type is a password.
    #[must_use]
    pub fn is_password(&self) -> bool {
        CredentialType::is_password(self.credential_type())
    }
}

impl From<UserCredential> for CredentialInput {
    fn from(credential: UserCredential) -> Self {
        Self::Value(credential)
    }
}
