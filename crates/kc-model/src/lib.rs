//! # kc-model
//!
//! Domain models shared by the user migration bridge and its host.
//!
//! These are the host-side records the bridge reads and writes: local users,
//! realm roles, stored credentials, and the credential inputs submitted at
//! login time.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod credential;
pub mod role;
pub mod user;

pub use credential::{Credential, CredentialInput, CredentialType, UserCredential};
pub use role::Role;
pub use user::{FederationLink, User};
