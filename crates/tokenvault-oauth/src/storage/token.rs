//! Token storage trait.

use async_trait::async_trait;

use crate::AuthStoreResult;
use crate::types::Token;

/// Storage operations for authorization codes, access tokens and refresh
/// tokens.
///
/// A stored token can be found again by any of its three values. Records are
/// immutable: rotation is `remove_by_*` of the old value followed by
/// `create` of the new token.
#[async_trait]
pub trait TokenStorage: Send + Sync {
    /// Persist a token.
    ///
    /// # Errors
    ///
    /// Returns a serialization, collection or write error.
    async fn create(&self, token: &Token) -> AuthStoreResult<()>;

    /// Find the token issued with this authorization code.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` when nothing matches.
    async fn get_by_code(&self, code: &str) -> AuthStoreResult<Token>;

    /// Find the token carrying this access token.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` when nothing matches.
    async fn get_by_access(&self, access: &str) -> AuthStoreResult<Token>;

    /// Find the token carrying this refresh token.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` when nothing matches.
    async fn get_by_refresh(&self, refresh: &str) -> AuthStoreResult<Token>;

    /// Delete every record with this authorization code.
    ///
    /// Succeeds when nothing matches.
    ///
    /// # Errors
    ///
    /// Returns a `Query` error if the delete fails.
    async fn remove_by_code(&self, code: &str) -> AuthStoreResult<()>;

    /// Delete every record with this access token. Succeeds when nothing matches.
    ///
    /// # Errors
    ///
    /// Returns a `Query` error if the delete fails.
    async fn remove_by_access(&self, access: &str) -> AuthStoreResult<()>;

    /// Delete every record with this refresh token. Succeeds when nothing matches.
    ///
    /// # Errors
    ///
    /// Returns a `Query` error if the delete fails.
    async fn remove_by_refresh(&self, refresh: &str) -> AuthStoreResult<()>;
}
