//! OAuth token storage.
//!
//! Every stored token is a [`TokenRecord`] in one collection (`oauth2_tokens`
//! by default). Lookups and deletes run a parameterized filter query on the
//! record's `code`, `access_token` or `refresh_token` attribute; the
//! collection name and the looked-up value are always bind parameters.
//!
//! Each query opens a cursor that this module closes before returning, on the
//! success path and on every error path. A cursor still open when the
//! operation is cancelled is closed in the background.

use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;
use serde_json::Value;
use time::OffsetDateTime;
use tracing::{debug, instrument, warn};

use tokenvault_oauth::storage::TokenStorage;
use tokenvault_oauth::types::Token;
use tokenvault_oauth::{AuthStoreError, AuthStoreResult, DEFAULT_TOKEN_COLLECTION};
use tokenvault_storage::{
    BindVars, Collection, Cursor, DynDatabase, StorageError, StorageResult,
};

use crate::record::{TOKEN_ENTITY, TokenField, TokenRecord};

/// Bind parameter carrying the collection name (`@@collection`).
const COLLECTION_PARAM: &str = "collection";

// =============================================================================
// Document Token Storage
// =============================================================================

/// Token storage backed by a document database.
///
/// Lookups assume at most one record per code, access token and refresh
/// token. When several records match, the last one the cursor yields is
/// returned and the database decides the order. Enforce uniqueness with a
/// unique constraint on the collection if that matters.
#[derive(Clone)]
pub struct DocumentTokenStorage {
    db: DynDatabase,
    collection: String,
}

impl DocumentTokenStorage {
    /// Returns a builder.
    #[must_use]
    pub fn builder() -> DocumentTokenStorageBuilder {
        DocumentTokenStorageBuilder::default()
    }

    /// Name of the collection tokens are stored in.
    #[must_use]
    pub fn collection_name(&self) -> &str {
        &self.collection
    }

    async fn resolve_collection(&self) -> AuthStoreResult<Arc<dyn Collection>> {
        self.db
            .collection(&self.collection)
            .await
            .map_err(|e| AuthStoreError::collection_unavailable(&self.collection, e))
    }

    fn bind_vars(&self, field: TokenField, value: &str) -> BindVars {
        BindVars::new()
            .with_collection(COLLECTION_PARAM, &self.collection)
            .with(field.attribute(), value)
    }

    /// Returns the token whose `field` equals `value`.
    #[instrument(skip_all, fields(collection = %self.collection, field = %field))]
    async fn get_by_query(&self, field: TokenField, value: &str) -> AuthStoreResult<Token> {
        if value.is_empty() {
            return Err(AuthStoreError::not_found(TOKEN_ENTITY, value));
        }

        let vars = self.bind_vars(field, value);
        let mut cursor = self
            .db
            .query(field.lookup_query(), &vars)
            .await
            .map(CursorGuard::new)
            .map_err(|e| AuthStoreError::query(&self.collection, e))?;

        let drained = cursor.drain_last().await;
        let closed = cursor.close().await;

        let document = match (drained, closed) {
            (Ok(document), Ok(())) => document,
            (Ok(_), Err(e)) => return Err(AuthStoreError::query(&self.collection, e)),
            (Err(e), closed) => {
                if let Err(close_err) = closed {
                    warn!(error = %close_err, "failed to close cursor after read error");
                }
                return Err(AuthStoreError::query(&self.collection, e));
            }
        };

        let Some(document) = document else {
            debug!("no matching token");
            return Err(AuthStoreError::not_found(TOKEN_ENTITY, value));
        };

        let token = TokenRecord::from_document(document)?.into_token()?;
        debug!(client_id = %token.client_id, "token loaded");
        Ok(token)
    }

    /// Removes every record whose `field` equals `value`.
    #[instrument(skip_all, fields(collection = %self.collection, field = %field))]
    async fn remove_by_query(&self, field: TokenField, value: &str) -> AuthStoreResult<()> {
        if value.is_empty() {
            return Ok(());
        }

        let vars = self.bind_vars(field, value);
        let mut cursor = self
            .db
            .query(field.remove_query(), &vars)
            .await
            .map(CursorGuard::new)
            .map_err(|e| AuthStoreError::query(&self.collection, e))?;

        cursor
            .close()
            .await
            .map_err(|e| AuthStoreError::query(&self.collection, e))?;

        debug!("tokens removed");
        Ok(())
    }
}

// =============================================================================
// Cursor Guard
// =============================================================================

/// Owns a query cursor until it has been closed.
///
/// If the owning future is dropped first (a timeout or a cancelled request),
/// the cursor is closed on a spawned task instead.
struct CursorGuard {
    cursor: Option<Box<dyn Cursor>>,
}

impl CursorGuard {
    fn new(cursor: Box<dyn Cursor>) -> Self {
        Self {
            cursor: Some(cursor),
        }
    }

    /// Reads the cursor to the end and keeps the last document.
    async fn drain_last(&mut self) -> StorageResult<Option<Value>> {
        let Some(cursor) = self.cursor.as_mut() else {
            return Err(StorageError::cursor("cursor is closed"));
        };
        let mut last = None;
        while cursor.has_more() {
            last = Some(cursor.read_document().await?);
        }
        Ok(last)
    }

    /// Closes the cursor. Only the first call reaches the database.
    async fn close(&mut self) -> StorageResult<()> {
        let Some(cursor) = self.cursor.as_mut() else {
            return Ok(());
        };
        let result = cursor.close().await;
        self.cursor = None;
        result
    }
}

impl Drop for CursorGuard {
    fn drop(&mut self) {
        let Some(mut cursor) = self.cursor.take() else {
            return;
        };
        match tokio::runtime::Handle::try_current() {
            Ok(handle) => {
                debug!("closing cursor abandoned by a cancelled operation");
                handle.spawn(async move {
                    if let Err(e) = cursor.close().await {
                        warn!(error = %e, "failed to close abandoned cursor");
                    }
                });
            }
            Err(_) => warn!("cursor dropped outside a runtime, left unclosed"),
        }
    }
}

impl fmt::Debug for DocumentTokenStorage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DocumentTokenStorage")
            .field("backend", &self.db.backend_name())
            .field("collection", &self.collection)
            .finish()
    }
}

#[async_trait]
impl TokenStorage for DocumentTokenStorage {
    #[instrument(skip_all, fields(collection = %self.collection, client_id = %token.client_id))]
    async fn create(&self, token: &Token) -> AuthStoreResult<()> {
        let record = TokenRecord::from_token(token, OffsetDateTime::now_utc())?;
        let document = record.to_document()?;
        let collection = self.resolve_collection().await?;

        let meta = collection
            .create_document(&document)
            .await
            .map_err(|e| AuthStoreError::write(&self.collection, e))?;

        debug!(key = %meta.key, expires_at = ?record.expires_at, "token stored");
        Ok(())
    }

    async fn get_by_code(&self, code: &str) -> AuthStoreResult<Token> {
        self.get_by_query(TokenField::Code, code).await
    }

    async fn get_by_access(&self, access: &str) -> AuthStoreResult<Token> {
        self.get_by_query(TokenField::Access, access).await
    }

    async fn get_by_refresh(&self, refresh: &str) -> AuthStoreResult<Token> {
        self.get_by_query(TokenField::Refresh, refresh).await
    }

    async fn remove_by_code(&self, code: &str) -> AuthStoreResult<()> {
        self.remove_by_query(TokenField::Code, code).await
    }

    async fn remove_by_access(&self, access: &str) -> AuthStoreResult<()> {
        self.remove_by_query(TokenField::Access, access).await
    }

    async fn remove_by_refresh(&self, refresh: &str) -> AuthStoreResult<()> {
        self.remove_by_query(TokenField::Refresh, refresh).await
    }
}

// =============================================================================
// Builder
// =============================================================================

/// Builder for [`DocumentTokenStorage`].
#[derive(Default)]
pub struct DocumentTokenStorageBuilder {
    db: Option<DynDatabase>,
    collection: Option<String>,
}

impl DocumentTokenStorageBuilder {
    /// Sets the database. Required.
    #[must_use]
    pub fn database(mut self, db: DynDatabase) -> Self {
        self.db = Some(db);
        self
    }

    /// Overrides the collection name.
    #[must_use]
    pub fn collection(mut self, name: impl Into<String>) -> Self {
        self.collection = Some(name.into());
        self
    }

    /// Builds the storage.
    ///
    /// # Errors
    ///
    /// Returns `AuthStoreError::Configuration` if no database was set or the
    /// collection name is empty.
    pub fn build(self) -> AuthStoreResult<DocumentTokenStorage> {
        let db = self
            .db
            .ok_or_else(|| AuthStoreError::configuration("database is required"))?;
        let collection = crate::collection_name(self.collection, DEFAULT_TOKEN_COLLECTION)?;
        Ok(DocumentTokenStorage { db, collection })
    }
}
