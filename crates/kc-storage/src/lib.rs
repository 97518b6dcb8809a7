//! # kc-storage
//!
//! Storage collaborator traits used by federation providers.
//!
//! Providers never own persistence. They reach the host's user store, role
//! registry, and credential manager through these narrow traits:
//!
//! - [`UserProvider`] - create-if-absent, lookup, and mutation of local users
//! - [`RoleProvider`] - resolution of realm roles by name
//! - [`CredentialProvider`] - persistence and verification of credentials
//!
//! [`memory::InMemoryStore`] implements all three and is what the tests and
//! embedded deployments run against.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod credential;
pub mod error;
pub mod memory;
pub mod role;
pub mod user;

pub use credential::CredentialProvider;
pub use error::{StorageError, StorageResult};
pub use role::RoleProvider;
pub use user::{AddedUser, UserProvider};
