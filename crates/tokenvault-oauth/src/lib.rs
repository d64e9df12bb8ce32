//! # tokenvault-oauth
//!
//! OAuth2 entities and storage traits consumed by an authorization server.
//!
//! This crate provides:
//! - [`Client`] and [`Token`], the entities an authorization server persists
//! - [`ClientStorage`] and [`TokenStorage`], the pluggable storage interface
//! - [`AuthStoreError`], the typed failure every storage backend reports
//! - [`StorageConfig`], collection naming loaded from TOML and the environment
//!
//! ## Modules
//!
//! - [`config`] - Storage configuration and loading
//! - [`error`] - Storage error types
//! - [`storage`] - Storage traits for clients and tokens
//! - [`types`] - Client and token entities
//!
//! Backends live in separate crates (`tokenvault-oauth-docstore`).

pub mod config;
pub mod error;
pub mod storage;
pub mod types;

pub use config::{ConfigError, DEFAULT_CLIENT_COLLECTION, DEFAULT_TOKEN_COLLECTION, StorageConfig};
pub use error::{AuthStoreError, ErrorCategory};
pub use storage::{ClientStorage, TokenStorage};
pub use types::{Client, CodeChallengeMethod, Token};

/// Type alias for storage results.
pub type AuthStoreResult<T> = Result<T, AuthStoreError>;

/// Prelude module for convenient imports.
///
/// ```ignore
/// use tokenvault_oauth::prelude::*;
/// ```
pub mod prelude {
    pub use crate::AuthStoreResult;
    pub use crate::config::{ConfigError, StorageConfig};
    pub use crate::error::{AuthStoreError, ErrorCategory};
    pub use crate::storage::{ClientStorage, TokenStorage};
    pub use crate::types::{Client, CodeChallengeMethod, Token};
}
