//! Integration tests for client storage on the in-memory database.

mod common;

use std::sync::Arc;

use assert_json_diff::assert_json_eq;
use serde_json::json;
use tokenvault_db_memory::InMemoryDatabase;
use tokenvault_oauth::{AuthStoreError, Client, ClientStorage, ErrorCategory};
use tokenvault_oauth_docstore::DocumentClientStorage;
use tokenvault_storage::Database;

use common::{CLIENTS, client_storage, memory_db};

#[tokio::test]
async fn client_round_trip() {
    let db = memory_db();
    let storage = client_storage(&db);

    let client = Client::new("c1", "s3cret", "https://app.example.com")
        .with_user_id("u1");
    storage.create(&client).await.unwrap();

    let loaded = storage.get_by_id("c1").await.unwrap();
    assert_eq!(loaded, client);
}

#[tokio::test]
async fn public_client_round_trip() {
    let db = memory_db();
    let storage = client_storage(&db);

    let client = Client::new("spa", "", "https://spa.example.com").with_public(true);
    storage.create(&client).await.unwrap();

    let loaded = storage.get_by_id("spa").await.unwrap();
    assert!(loaded.public);
    assert!(loaded.secret.is_empty());
}

#[tokio::test]
async fn missing_client_is_not_found() {
    let db = memory_db();
    let storage = client_storage(&db);
    storage
        .create(&Client::new("c1", "s3cret", "https://app.example.com"))
        .await
        .unwrap();

    let err = storage.get_by_id("missing").await.unwrap_err();
    assert!(err.is_not_found());
    assert_eq!(err.category(), ErrorCategory::NotFound);
    assert_eq!(err.to_string(), "client not found: missing");
}

#[tokio::test]
async fn stored_document_layout() {
    let db = memory_db();
    let storage = client_storage(&db);
    storage
        .create(&Client::new("c1", "s3cret", "https://app.example.com"))
        .await
        .unwrap();

    let mut documents = db.documents(CLIENTS).await.unwrap();
    assert_eq!(documents.len(), 1);
    let mut document = documents.remove(0);
    assert!(document["payload"].is_string());
    document["payload"] = json!("<payload>");
    document["_rev"] = json!("<rev>");

    assert_json_eq!(
        document,
        json!({
            "_key": "c1",
            "_id": "oauth2_clients/c1",
            "_rev": "<rev>",
            "secret": "s3cret",
            "domain": "https://app.example.com",
            "payload": "<payload>",
        })
    );
}

#[tokio::test]
async fn duplicate_client_is_a_conflict() {
    let db = memory_db();
    let storage = client_storage(&db);
    let client = Client::new("c1", "s3cret", "https://app.example.com");
    storage.create(&client).await.unwrap();

    let err = storage.create(&client).await.unwrap_err();
    assert!(matches!(err, AuthStoreError::Write { .. }));
    assert!(err.is_conflict());
    assert_eq!(err.category(), ErrorCategory::Conflict);
    assert!(err.storage_source().unwrap().is_unique_violation());
}

#[tokio::test]
async fn missing_collection_is_unavailable() {
    let db = Arc::new(InMemoryDatabase::new());
    let storage = client_storage(&db);

    let err = storage
        .create(&Client::new("c1", "s3cret", "https://app.example.com"))
        .await
        .unwrap_err();
    assert!(matches!(err, AuthStoreError::CollectionUnavailable { .. }));
    assert!(err.storage_source().unwrap().is_collection_not_found());

    let err = storage.get_by_id("c1").await.unwrap_err();
    assert!(matches!(err, AuthStoreError::CollectionUnavailable { .. }));
}

#[tokio::test]
async fn custom_collection_is_used() {
    let db = memory_db();
    db.ensure_collection("apps");
    let storage = DocumentClientStorage::builder()
        .database(db.clone())
        .collection("apps")
        .build()
        .unwrap();

    storage
        .create(&Client::new("c1", "s3cret", "https://app.example.com"))
        .await
        .unwrap();

    assert_eq!(db.documents("apps").await.unwrap().len(), 1);
    assert!(db.documents(CLIENTS).await.unwrap().is_empty());
}

#[tokio::test]
async fn corrupt_payload_is_not_reported_as_missing() {
    let db = memory_db();
    let collection = db.collection(CLIENTS).await.unwrap();
    collection
        .create_document(&json!({
            "_key": "broken",
            "secret": "s",
            "domain": "d",
            "payload": "e30=!!",
        }))
        .await
        .unwrap();
    collection
        .create_document(&json!({
            "_key": "garbled",
            "payload": "WzEsMiwzXQ==",
        }))
        .await
        .unwrap();

    let storage = client_storage(&db);

    let err = storage.get_by_id("broken").await.unwrap_err();
    assert!(matches!(
        err,
        AuthStoreError::Deserialization {
            entity: "client",
            ..
        }
    ));

    let err = storage.get_by_id("garbled").await.unwrap_err();
    assert!(err.is_serialization_error());
    assert!(!err.is_not_found());
}
