//! Document database storage backend for tokenvault-oauth.
//!
//! Stores OAuth clients and tokens in any database implementing the
//! `tokenvault-storage` capability:
//!
//! - OAuth clients, one document per client keyed by client id
//! - Tokens, one record per grant, found again by code, access token or
//!   refresh token
//!
//! # Example
//!
//! ```ignore
//! use std::sync::Arc;
//!
//! use tokenvault_db_memory::InMemoryDatabase;
//! use tokenvault_oauth::{StorageConfig, TokenStorage};
//! use tokenvault_oauth_docstore::DocumentAuthStorage;
//!
//! let db = Arc::new(InMemoryDatabase::new());
//! let storage = DocumentAuthStorage::from_config(db, &StorageConfig::default())?;
//!
//! let token = storage.tokens().get_by_access("A1").await?;
//! ```

pub mod client;
pub mod record;
pub mod token;

pub use client::{DocumentClientStorage, DocumentClientStorageBuilder};
pub use record::{ClientRecord, TokenField, TokenRecord};
pub use token::{DocumentTokenStorage, DocumentTokenStorageBuilder};

use tokenvault_oauth::{AuthStoreError, AuthStoreResult, StorageConfig};
use tokenvault_storage::DynDatabase;

// =============================================================================
// Document Auth Storage
// =============================================================================

/// Client and token storage sharing one database.
#[derive(Debug, Clone)]
pub struct DocumentAuthStorage {
    clients: DocumentClientStorage,
    tokens: DocumentTokenStorage,
}

impl DocumentAuthStorage {
    /// Builds both stores from `config`.
    ///
    /// # Errors
    ///
    /// Returns `AuthStoreError::Configuration` if a collection name is empty.
    pub fn from_config(db: DynDatabase, config: &StorageConfig) -> AuthStoreResult<Self> {
        let clients = DocumentClientStorage::builder()
            .database(db.clone())
            .collection(config.client_collection.as_str())
            .build()?;
        let tokens = DocumentTokenStorage::builder()
            .database(db)
            .collection(config.token_collection.as_str())
            .build()?;

        tracing::debug!(
            client_collection = %clients.collection_name(),
            token_collection = %tokens.collection_name(),
            "document auth storage ready"
        );
        Ok(Self { clients, tokens })
    }

    // -------------------------------------------------------------------------
    // Storage Accessors
    // -------------------------------------------------------------------------

    /// Client storage.
    #[must_use]
    pub fn clients(&self) -> &DocumentClientStorage {
        &self.clients
    }

    /// Token storage.
    #[must_use]
    pub fn tokens(&self) -> &DocumentTokenStorage {
        &self.tokens
    }
}

/// Resolves the collection name a builder uses.
fn collection_name(explicit: Option<String>, default: &str) -> AuthStoreResult<String> {
    match explicit {
        None => Ok(default.to_string()),
        Some(name) if name.is_empty() => Err(AuthStoreError::configuration(
            "collection name must not be empty",
        )),
        Some(name) => Ok(name),
    }
}
