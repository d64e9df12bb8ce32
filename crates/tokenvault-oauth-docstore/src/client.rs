//! OAuth client storage.
//!
//! Clients are stored one document per client, keyed by the client id, in a
//! single collection (`oauth2_clients` by default).

use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;
use tracing::{debug, instrument};

use tokenvault_oauth::storage::ClientStorage;
use tokenvault_oauth::types::Client;
use tokenvault_oauth::{AuthStoreError, AuthStoreResult, DEFAULT_CLIENT_COLLECTION};
use tokenvault_storage::{Collection, DynDatabase};

use crate::record::{CLIENT_ENTITY, ClientRecord};

// =============================================================================
// Document Client Storage
// =============================================================================

/// Client storage backed by a document database.
#[derive(Clone)]
pub struct DocumentClientStorage {
    db: DynDatabase,
    collection: String,
}

impl DocumentClientStorage {
    /// Returns a builder.
    #[must_use]
    pub fn builder() -> DocumentClientStorageBuilder {
        DocumentClientStorageBuilder::default()
    }

    /// Name of the collection clients are stored in.
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
}

impl fmt::Debug for DocumentClientStorage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DocumentClientStorage")
            .field("backend", &self.db.backend_name())
            .field("collection", &self.collection)
            .finish()
    }
}

#[async_trait]
impl ClientStorage for DocumentClientStorage {
    #[instrument(skip_all, fields(collection = %self.collection, client_id = %client.id))]
    async fn create(&self, client: &Client) -> AuthStoreResult<()> {
        let document = ClientRecord::from_client(client)?.to_document()?;
        let collection = self.resolve_collection().await?;

        collection
            .create_document(&document)
            .await
            .map_err(|e| AuthStoreError::write(&self.collection, e))?;

        debug!("client stored");
        Ok(())
    }

    #[instrument(skip(self), fields(collection = %self.collection))]
    async fn get_by_id(&self, id: &str) -> AuthStoreResult<Client> {
        let collection = self.resolve_collection().await?;

        let document = collection.read_document(id).await.map_err(|e| {
            if e.is_document_not_found() {
                AuthStoreError::not_found(CLIENT_ENTITY, id)
            } else {
                AuthStoreError::query(&self.collection, e)
            }
        })?;

        let client = ClientRecord::from_document(document)?.into_client()?;
        debug!("client loaded");
        Ok(client)
    }
}

// =============================================================================
// Builder
// =============================================================================

/// Builder for [`DocumentClientStorage`].
#[derive(Default)]
pub struct DocumentClientStorageBuilder {
    db: Option<DynDatabase>,
    collection: Option<String>,
}

impl DocumentClientStorageBuilder {
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
    pub fn build(self) -> AuthStoreResult<DocumentClientStorage> {
        let db = self
            .db
            .ok_or_else(|| AuthStoreError::configuration("database is required"))?;
        let collection = crate::collection_name(self.collection, DEFAULT_CLIENT_COLLECTION)?;
        Ok(DocumentClientStorage { db, collection })
    }
}
