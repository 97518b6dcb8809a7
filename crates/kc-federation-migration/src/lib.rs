//! # kc-federation-migration
//!
//! One-way user migration from a legacy HTTP user directory.
//!
//! The provider resolves users the host does not know by asking the legacy
//! directory, creates a linked local copy on first contact, and on the first
//! successful password check stores the password locally and clears the
//! link. From then on the user is served entirely from local storage.
//!
//! ## Identifiers
//!
//! Every human-supplied identifier goes through [`normalize_identifier`]
//! before it touches local storage or the legacy directory.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod client;
pub mod config;
pub mod error;
pub mod factory;
pub mod provider;

pub use client::{HttpLegacyUserService, LegacyUserService, RemoteUser, UserCredentialsDto};
pub use config::MigrationConfig;
pub use error::{MigrationError, MigrationResult};
pub use factory::MigrationProviderFactory;
pub use provider::{MigrationState, MigrationStorageProvider};

/// Factory id under which the provider is registered.
pub const PROVIDER_ID: &str = "User Migration API Provider";

/// Canonical form of a username or email: trimmed and lowercased.
#[must_use]
pub fn normalize_identifier(raw: &str) -> String {
    raw.trim().to_lowercase()
}
