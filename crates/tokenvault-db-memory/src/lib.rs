//! In-memory document database for tokenvault.
//!
//! This crate provides an in-memory implementation of the `Database`,
//! `Collection` and `Cursor` traits from `tokenvault-storage`. It understands
//! the small filter query language used by the OAuth record stores, keeps
//! documents in insertion order, and can enforce sparse unique constraints.
//!
//! # Example
//!
//! ```ignore
//! use tokenvault_db_memory::InMemoryDatabase;
//! use tokenvault_storage::{BindVars, Database};
//!
//! let db = InMemoryDatabase::new();
//! db.ensure_collection("oauth2_tokens");
//!
//! let collection = db.collection("oauth2_tokens").await?;
//! collection.create_document(&serde_json::json!({"code": "abc"})).await?;
//!
//! let vars = BindVars::new()
//!     .with_collection("collection", "oauth2_tokens")
//!     .with("code", "abc");
//! let mut cursor = db
//!     .query("FOR doc IN @@collection FILTER doc.code == @code RETURN doc", &vars)
//!     .await?;
//! ```

pub mod cursor;
pub mod factory;
pub mod query;
pub mod storage;

pub use tokenvault_storage::{Database, StorageError};

pub use cursor::{CursorStats, InMemoryCursor};
pub use factory::{CollectionOptions, InMemoryOptions, create_database};
pub use query::{BoundQuery, DocumentQuery, QueryAction};
pub use storage::{InMemoryCollection, InMemoryDatabase};
