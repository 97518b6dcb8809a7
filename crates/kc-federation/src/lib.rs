//! # kc-federation
//!
//! User federation framework for Keycloak Rust.
//!
//! A federation provider bridges an external identity store into the host.
//! Instead of one type implementing a wide plugin interface, each capability
//! is its own trait and the host composes them:
//!
//! - [`UserStorageProvider`] - identity and lifecycle hooks
//! - [`UserLookupProvider`] - lookup by username, email, or storage id
//! - [`CredentialInputValidator`] - credential checks
//! - [`CredentialInputUpdater`] - credential writes
//!
//! [`UserFederationManager`] is the host-side adapter that routes requests
//! between local storage and a provider.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod config;
pub mod error;
pub mod factory;
pub mod manager;
pub mod provider;
pub mod session;
pub mod storage_id;

pub use config::FederationConfig;
pub use error::{FederationError, FederationResult};
pub use factory::{ConfigPropertyType, ProviderConfigProperty, UserStorageProviderFactory};
pub use manager::UserFederationManager;
pub use provider::{
    CredentialInputUpdater, CredentialInputValidator, UserLookupProvider, UserStorageProvider,
};
pub use session::FederationSession;
pub use storage_id::StorageId;
