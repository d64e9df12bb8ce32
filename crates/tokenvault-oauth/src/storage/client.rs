//! Client storage trait.

use async_trait::async_trait;

use crate::AuthStoreResult;
use crate::types::Client;

// =============================================================================
// Client Storage Trait
// =============================================================================

/// Storage operations for OAuth 2.0 clients.
///
/// Clients are created once and read many times. There is no update or
/// delete.
///
/// # Example
///
/// ```ignore
/// use tokenvault_oauth::storage::ClientStorage;
///
/// async fn example(storage: &impl ClientStorage) -> AuthStoreResult<()> {
///     let client = storage.get_by_id("my-app").await?;
///     println!("redirects to {}", client.domain);
///     Ok(())
/// }
/// ```
#[async_trait]
pub trait ClientStorage: Send + Sync {
    /// Persist a new client keyed by its id.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The client cannot be serialized
    /// - The collection cannot be resolved
    /// - A client with the same id already exists (`is_conflict()`)
    /// - The write fails
    async fn create(&self, client: &Client) -> AuthStoreResult<()>;

    /// Fetch a client by id.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` if no client has this id, or a storage or
    /// deserialization error.
    async fn get_by_id(&self, id: &str) -> AuthStoreResult<Client>;
}
