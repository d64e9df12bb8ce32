use std::collections::VecDeque;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use async_trait::async_trait;
use dashmap::DashMap;
use dashmap::mapref::entry::Entry;
use indexmap::IndexMap;
use serde_json::Value;
use tokio::sync::RwLock;
use tracing::debug;
use uuid::Uuid;

use tokenvault_storage::{
    BindVars, Collection, Cursor, Database, DocumentMeta, ID_FIELD, KEY_FIELD, REV_FIELD,
    StorageError, StorageResult,
};

use crate::cursor::{CursorStats, InMemoryCursor};
use crate::factory::{CollectionOptions, InMemoryOptions};
use crate::query::DocumentQuery;

/// In-memory document database.
///
/// This backend provides:
/// - A concurrent registry of named collections
/// - Documents kept in insertion order, so cursors yield them oldest first
/// - Generated document keys when a document carries no `_key`
/// - Sparse unique constraints per collection
/// - The filter query language described in [`crate::query`]
#[derive(Debug, Default)]
pub struct InMemoryDatabase {
    collections: DashMap<String, Arc<InMemoryCollection>>,
    options: InMemoryOptions,
    cursor_stats: Arc<CursorStats>,
}

impl InMemoryDatabase {
    /// Creates an empty database with default options.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates an empty database with the given options.
    pub fn with_options(options: InMemoryOptions) -> Self {
        Self {
            options,
            ..Self::default()
        }
    }

    /// Creates a collection.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::UniqueConstraintViolated` if a collection with
    /// that name already exists.
    pub fn create_collection(
        &self,
        name: &str,
        options: CollectionOptions,
    ) -> StorageResult<Arc<InMemoryCollection>> {
        match self.collections.entry(name.to_string()) {
            Entry::Occupied(_) => Err(StorageError::unique_violation(
                "_collections",
                "name",
                name,
            )),
            Entry::Vacant(entry) => {
                let collection = Arc::new(InMemoryCollection::new(name, options));
                entry.insert(Arc::clone(&collection));
                debug!(collection = name, "collection created");
                Ok(collection)
            }
        }
    }

    /// Returns the named collection, creating it with default options if needed.
    pub fn ensure_collection(&self, name: &str) -> Arc<InMemoryCollection> {
        let entry = self.collections.entry(name.to_string()).or_insert_with(|| {
            Arc::new(InMemoryCollection::new(name, CollectionOptions::default()))
        });
        Arc::clone(entry.value())
    }

    /// Returns `true` if the collection exists.
    pub fn has_collection(&self, name: &str) -> bool {
        self.collections.contains_key(name)
    }

    /// Drops a collection and all of its documents.
    pub fn drop_collection(&self, name: &str) -> bool {
        self.collections.remove(name).is_some()
    }

    /// Returns a snapshot of every document in a collection, in insertion order.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::CollectionNotFound` if the collection does not exist.
    pub async fn documents(&self, name: &str) -> StorageResult<Vec<Value>> {
        let collection = self
            .collections
            .get(name)
            .map(|entry| Arc::clone(entry.value()))
            .ok_or_else(|| StorageError::collection_not_found(name))?;
        Ok(collection.documents.read().await.values().cloned().collect())
    }

    /// Counters for cursors returned by [`Database::query`].
    pub fn cursor_stats(&self) -> &CursorStats {
        &self.cursor_stats
    }

    fn resolve(&self, name: &str) -> StorageResult<Arc<InMemoryCollection>> {
        if let Some(entry) = self.collections.get(name) {
            return Ok(Arc::clone(entry.value()));
        }
        if self.options.auto_create_collections {
            return Ok(self.ensure_collection(name));
        }
        Err(StorageError::collection_not_found(name))
    }
}

#[async_trait]
impl Database for InMemoryDatabase {
    async fn collection(&self, name: &str) -> StorageResult<Arc<dyn Collection>> {
        let collection: Arc<dyn Collection> = self.resolve(name)?;
        Ok(collection)
    }

    async fn query(&self, query: &str, bind_vars: &BindVars) -> StorageResult<Box<dyn Cursor>> {
        let bound = DocumentQuery::parse(query)?.bind(bind_vars)?;
        let collection = self.resolve(&bound.collection)?;

        let results = if bound.remove {
            let mut documents = collection.documents.write().await;
            let before = documents.len();
            documents.retain(|_, document| !bound.matches(document));
            debug!(
                collection = %bound.collection,
                removed = before - documents.len(),
                "documents removed"
            );
            VecDeque::new()
        } else {
            let documents = collection.documents.read().await;
            documents
                .values()
                .filter(|document| bound.matches(document))
                .cloned()
                .collect()
        };

        Ok(Box::new(InMemoryCursor::new(
            results,
            Arc::clone(&self.cursor_stats),
        )))
    }

    fn backend_name(&self) -> &'static str {
        "memory"
    }
}

/// A collection held by [`InMemoryDatabase`].
#[derive(Debug)]
pub struct InMemoryCollection {
    name: String,
    documents: RwLock<IndexMap<String, Value>>,
    unique_fields: Vec<String>,
    revision: AtomicU64,
}

impl InMemoryCollection {
    fn new(name: &str, options: CollectionOptions) -> Self {
        Self {
            name: name.to_string(),
            documents: RwLock::new(IndexMap::new()),
            unique_fields: options.unique_fields,
            revision: AtomicU64::new(1),
        }
    }

    /// Number of documents in the collection.
    pub async fn len(&self) -> usize {
        self.documents.read().await.len()
    }

    /// Returns `true` if the collection holds no documents.
    pub async fn is_empty(&self) -> bool {
        self.documents.read().await.is_empty()
    }

    fn next_revision(&self) -> String {
        self.revision.fetch_add(1, Ordering::SeqCst).to_string()
    }
}

#[async_trait]
impl Collection for InMemoryCollection {
    fn name(&self) -> &str {
        &self.name
    }

    async fn create_document(&self, document: &Value) -> StorageResult<DocumentMeta> {
        let Value::Object(fields) = document else {
            return Err(StorageError::invalid_document(
                "document must be a JSON object",
            ));
        };

        let key = match fields.get(KEY_FIELD) {
            None => Uuid::new_v4().simple().to_string(),
            Some(Value::String(key)) if !key.is_empty() => key.clone(),
            Some(other) => {
                return Err(StorageError::invalid_document(format!(
                    "invalid document key {other}"
                )));
            }
        };

        let mut documents = self.documents.write().await;
        if documents.contains_key(&key) {
            return Err(StorageError::unique_violation(&self.name, KEY_FIELD, key));
        }

        for field in &self.unique_fields {
            let Some(value) = fields.get(field).filter(|value| !value.is_null()) else {
                continue;
            };
            if documents
                .values()
                .any(|existing| existing.get(field) == Some(value))
            {
                return Err(StorageError::unique_violation(
                    &self.name,
                    field,
                    value.as_str().map_or_else(|| value.to_string(), str::to_string),
                ));
            }
        }

        let meta = DocumentMeta::new(&self.name, key, self.next_revision());
        let mut stored = fields.clone();
        stored.insert(KEY_FIELD.to_string(), Value::String(meta.key.clone()));
        stored.insert(ID_FIELD.to_string(), Value::String(meta.id.clone()));
        stored.insert(REV_FIELD.to_string(), Value::String(meta.rev.clone()));
        documents.insert(meta.key.clone(), Value::Object(stored));

        debug!(collection = %self.name, key = %meta.key, "document created");
        Ok(meta)
    }

    async fn read_document(&self, key: &str) -> StorageResult<Value> {
        self.documents
            .read()
            .await
            .get(key)
            .cloned()
            .ok_or_else(|| StorageError::document_not_found(&self.name, key))
    }
}
