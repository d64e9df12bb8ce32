//! Shared setup for the document storage integration tests.

#![allow(dead_code)]

use std::sync::Arc;

use time::OffsetDateTime;
use time::macros::datetime;
use tokenvault_db_memory::{CollectionOptions, InMemoryDatabase};
use tokenvault_oauth_docstore::{DocumentClientStorage, DocumentTokenStorage};

pub const CLIENTS: &str = "oauth2_clients";
pub const TOKENS: &str = "oauth2_tokens";

/// Fixed issue time used by the token fixtures.
pub const T0: OffsetDateTime = datetime!(2024-06-01 10:00:00 UTC);

/// Installs a test subscriber honouring `RUST_LOG`.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

/// In-memory database with both default collections created.
pub fn memory_db() -> Arc<InMemoryDatabase> {
    init_tracing();
    let db = InMemoryDatabase::new();
    db.ensure_collection(CLIENTS);
    db.ensure_collection(TOKENS);
    Arc::new(db)
}

/// In-memory database whose token collection rejects duplicate lookup values.
pub fn memory_db_with_unique_tokens() -> Arc<InMemoryDatabase> {
    init_tracing();
    let db = InMemoryDatabase::new();
    let options = CollectionOptions::default()
        .with_unique_field("code")
        .with_unique_field("access_token")
        .with_unique_field("refresh_token");
    db.create_collection(TOKENS, options)
        .expect("create token collection");
    Arc::new(db)
}

pub fn client_storage(db: &Arc<InMemoryDatabase>) -> DocumentClientStorage {
    DocumentClientStorage::builder()
        .database(db.clone())
        .build()
        .expect("client storage")
}

pub fn token_storage(db: &Arc<InMemoryDatabase>) -> DocumentTokenStorage {
    DocumentTokenStorage::builder()
        .database(db.clone())
        .build()
        .expect("token storage")
}
