//! Shared configuration library for Opusbox.
//!
//! This crate centralizes config loading and validation for the
//! object-storage gateway: store endpoint and credentials, bucket naming,
//! descriptor TTL, and the optional batch deadline. The embedding server
//! loads a [`StorageConfig`] here once at startup and passes ownership into
//! the gateway; there is no process-wide config singleton.

pub mod loader;
pub mod models;
pub mod validation;

pub use loader::{ConfigLoad, ConfigLoadError, ConfigLoader};
pub use models::{StorageConfig, StoreCredentials};
pub use validation::{ConfigGuardRailError, ConfigWarning, ConfigWarnings};
