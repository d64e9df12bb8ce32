//! # tokenvault-storage
//!
//! Document database capability used by the tokenvault stores.
//!
//! This crate defines the narrow interface the OAuth record stores need from a
//! document-oriented database. It does not contain any implementations - those
//! are provided by separate crates (`tokenvault-db-memory`, or an adapter over a
//! real database client).
//!
//! ## Overview
//!
//! - [`Database`] resolves collections by name and executes parameterized queries.
//! - [`Collection`] creates documents and reads them by key.
//! - [`Cursor`] is a forward-only handle over query results that must be closed.
//!
//! ## Example
//!
//! ```ignore
//! use tokenvault_storage::{BindVars, Database, StorageError};
//!
//! async fn count_codes(db: &dyn Database, code: &str) -> Result<usize, StorageError> {
//!     let vars = BindVars::new()
//!         .with_collection("collection", "oauth2_tokens")
//!         .with("code", code);
//!     let mut cursor = db
//!         .query("FOR doc IN @@collection FILTER doc.code == @code RETURN doc", &vars)
//!         .await?;
//!
//!     let mut count = 0;
//!     while cursor.has_more() {
//!         cursor.read_document().await?;
//!         count += 1;
//!     }
//!     cursor.close().await?;
//!     Ok(count)
//! }
//! ```

mod error;
mod traits;
mod types;

pub use error::{ErrorCategory, StorageError};
pub use traits::{Collection, Cursor, Database};
pub use types::{BindVars, DocumentMeta, ID_FIELD, KEY_FIELD, REV_FIELD};

/// Type alias for a storage result.
pub type StorageResult<T> = Result<T, StorageError>;

/// Type alias for a shared database handle.
pub type DynDatabase = std::sync::Arc<dyn Database>;

/// Prelude module for convenient imports.
///
/// ```ignore
/// use tokenvault_storage::prelude::*;
/// ```
pub mod prelude {
    pub use crate::error::{ErrorCategory, StorageError};
    pub use crate::traits::{Collection, Cursor, Database};
    pub use crate::types::{BindVars, DocumentMeta};
    pub use crate::{DynDatabase, StorageResult};
}
