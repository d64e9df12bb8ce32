//! Capability traits for document databases.
//!
//! These traits are the whole surface the record stores consume. Backends must
//! be thread-safe (`Send + Sync`); cursors are owned by a single caller.

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::Value;

use crate::StorageResult;
use crate::types::{BindVars, DocumentMeta};

/// A connected document database.
///
/// # Example
///
/// ```ignore
/// use tokenvault_storage::{Database, StorageError};
///
/// async fn read_client(db: &dyn Database, id: &str) -> Result<serde_json::Value, StorageError> {
///     let collection = db.collection("oauth2_clients").await?;
///     collection.read_document(id).await
/// }
/// ```
#[async_trait]
pub trait Database: Send + Sync {
    /// Resolves a collection by name.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::CollectionNotFound` if the collection does not
    /// exist, or an infrastructure error if it cannot be resolved.
    async fn collection(&self, name: &str) -> StorageResult<Arc<dyn Collection>>;

    /// Executes a parameterized query and returns a cursor over its results.
    ///
    /// Collection parameters are written `@@name` in the query text and bound
    /// under `@name`; value parameters are written `@name` and bound under
    /// `name`. The returned cursor must be closed by the caller.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::Query` if the query is malformed or references
    /// unbound parameters, `StorageError::CollectionNotFound` if it targets a
    /// missing collection, or an infrastructure error.
    async fn query(&self, query: &str, bind_vars: &BindVars) -> StorageResult<Box<dyn Cursor>>;

    /// Returns the name of this backend for logging/debugging.
    fn backend_name(&self) -> &'static str;
}

/// A named collection of documents.
#[async_trait]
pub trait Collection: Send + Sync {
    /// Returns the collection name.
    fn name(&self) -> &str;

    /// Creates a new document.
    ///
    /// If the document carries a `_key` attribute it is used as the document
    /// key; otherwise the database assigns one.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::UniqueConstraintViolated` if the key (or a
    /// uniquely constrained attribute) is already taken, and
    /// `StorageError::InvalidDocument` if the value is not a JSON object.
    async fn create_document(&self, document: &Value) -> StorageResult<DocumentMeta>;

    /// Reads the document stored under `key`.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::DocumentNotFound` if no document has that key.
    async fn read_document(&self, key: &str) -> StorageResult<Value>;
}

/// Forward-only cursor over query results.
///
/// A cursor holds a server-side resource until [`Cursor::close`] is called.
/// Callers that may be cancelled mid-read must still arrange for `close` to
/// run, for example from a drop guard.
#[async_trait]
pub trait Cursor: Send {
    /// Returns `true` while more documents can be read.
    fn has_more(&self) -> bool;

    /// Reads the next document.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::Cursor` if the cursor is exhausted or closed, or
    /// an infrastructure error if the next batch cannot be fetched.
    async fn read_document(&mut self) -> StorageResult<Value>;

    /// Releases the cursor.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::Cursor` if the cursor was already closed, or an
    /// infrastructure error if the release request fails.
    async fn close(&mut self) -> StorageResult<()>;
}
