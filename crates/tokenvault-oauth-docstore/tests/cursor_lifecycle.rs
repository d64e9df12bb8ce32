//! Cursor handling of the token store against a database that can fail at
//! every step.
//!
//! Every lookup and delete must close the cursor it opened exactly once,
//! whichever step failed.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use serde_json::{Value, json};
use time::OffsetDateTime;
use tokenvault_oauth::{AuthStoreError, Token, TokenStorage};
use tokenvault_oauth_docstore::{DocumentTokenStorage, TokenRecord};
use tokenvault_storage::{
    BindVars, Collection, Cursor, Database, StorageError, StorageResult,
};

// =============================================================================
// Mock Database
// =============================================================================

#[derive(Debug, Default, Clone, Copy)]
struct Failures {
    query: bool,
    read_at: Option<usize>,
    close: bool,
    /// Reads hang long enough for a caller timeout to fire.
    stall_reads: bool,
}

#[derive(Debug, Default)]
struct Calls {
    queries: AtomicUsize,
    opened: AtomicUsize,
    reads: AtomicUsize,
    closes: AtomicUsize,
}

/// Database returning canned query results and counting cursor calls.
struct MockDatabase {
    results: Vec<Value>,
    failures: Failures,
    calls: Arc<Calls>,
    last_query: Mutex<Option<(String, BindVars)>>,
}

impl MockDatabase {
    fn new(results: Vec<Value>, failures: Failures) -> Arc<Self> {
        Arc::new(Self {
            results,
            failures,
            calls: Arc::new(Calls::default()),
            last_query: Mutex::new(None),
        })
    }

    fn opened(&self) -> usize {
        self.calls.opened.load(Ordering::SeqCst)
    }

    fn closes(&self) -> usize {
        self.calls.closes.load(Ordering::SeqCst)
    }

    fn queries(&self) -> usize {
        self.calls.queries.load(Ordering::SeqCst)
    }

    fn last_query(&self) -> (String, BindVars) {
        self.last_query
            .lock()
            .unwrap()
            .clone()
            .expect("a query was executed")
    }
}

#[async_trait]
impl Database for MockDatabase {
    async fn collection(&self, name: &str) -> StorageResult<Arc<dyn Collection>> {
        Err(StorageError::collection_not_found(name))
    }

    async fn query(&self, query: &str, bind_vars: &BindVars) -> StorageResult<Box<dyn Cursor>> {
        self.calls.queries.fetch_add(1, Ordering::SeqCst);
        *self.last_query.lock().unwrap() = Some((query.to_string(), bind_vars.clone()));

        if self.failures.query {
            return Err(StorageError::connection("connection refused"));
        }

        self.calls.opened.fetch_add(1, Ordering::SeqCst);
        Ok(Box::new(MockCursor {
            documents: self.results.iter().cloned().collect(),
            position: 0,
            failures: self.failures,
            calls: Arc::clone(&self.calls),
        }))
    }

    fn backend_name(&self) -> &'static str {
        "mock"
    }
}

struct MockCursor {
    documents: VecDeque<Value>,
    position: usize,
    failures: Failures,
    calls: Arc<Calls>,
}

#[async_trait]
impl Cursor for MockCursor {
    fn has_more(&self) -> bool {
        !self.documents.is_empty()
    }

    async fn read_document(&mut self) -> StorageResult<Value> {
        self.calls.reads.fetch_add(1, Ordering::SeqCst);
        if self.failures.stall_reads {
            tokio::time::sleep(Duration::from_secs(10)).await;
        }
        if self.failures.read_at == Some(self.position) {
            return Err(StorageError::connection("connection reset"));
        }
        self.position += 1;
        self.documents
            .pop_front()
            .ok_or_else(|| StorageError::cursor("exhausted"))
    }

    async fn close(&mut self) -> StorageResult<()> {
        self.calls.closes.fetch_add(1, Ordering::SeqCst);
        if self.failures.close {
            return Err(StorageError::cursor("close failed"));
        }
        Ok(())
    }
}

// =============================================================================
// Helpers
// =============================================================================

fn storage(db: &Arc<MockDatabase>) -> DocumentTokenStorage {
    DocumentTokenStorage::builder()
        .database(db.clone())
        .build()
        .unwrap()
}

fn stored(token: &Token) -> Value {
    TokenRecord::from_token(token, OffsetDateTime::now_utc())
        .unwrap()
        .to_document()
        .unwrap()
}

fn access(access: &str, scope: &str) -> Token {
    let mut token = Token::new("c1").with_scope(scope);
    token.access = access.to_string();
    token
}

fn assert_closed_once(db: &MockDatabase) {
    assert_eq!(db.opened(), 1);
    assert_eq!(db.closes(), 1);
}

// =============================================================================
// Lookups
// =============================================================================

#[tokio::test]
async fn lookup_closes_cursor_after_success() {
    let db = MockDatabase::new(vec![stored(&access("A1", "only"))], Failures::default());

    let token = storage(&db).get_by_access("A1").await.unwrap();
    assert_eq!(token.scope, "only");
    assert_closed_once(&db);
}

#[tokio::test]
async fn lookup_closes_cursor_when_nothing_matches() {
    let db = MockDatabase::new(Vec::new(), Failures::default());

    let err = storage(&db).get_by_code("X").await.unwrap_err();
    assert!(err.is_not_found());
    assert_closed_once(&db);
}

#[tokio::test]
async fn lookup_keeps_last_document() {
    let db = MockDatabase::new(
        vec![
            stored(&access("A1", "first")),
            stored(&access("A1", "middle")),
            stored(&access("A1", "last")),
        ],
        Failures::default(),
    );

    let token = storage(&db).get_by_access("A1").await.unwrap();
    assert_eq!(token.scope, "last");
    assert_eq!(db.calls.reads.load(Ordering::SeqCst), 3);
    assert_closed_once(&db);
}

#[tokio::test]
async fn lookup_closes_cursor_after_read_failure() {
    let db = MockDatabase::new(
        vec![stored(&access("A1", "a")), stored(&access("A1", "b"))],
        Failures {
            read_at: Some(1),
            ..Failures::default()
        },
    );

    let err = storage(&db).get_by_access("A1").await.unwrap_err();
    assert!(matches!(err, AuthStoreError::Query { .. }));
    assert_eq!(
        err.storage_source().unwrap().to_string(),
        "Connection error: connection reset"
    );
    assert_closed_once(&db);
}

#[tokio::test]
async fn read_failure_wins_over_close_failure() {
    let db = MockDatabase::new(
        vec![stored(&access("A1", "a"))],
        Failures {
            read_at: Some(0),
            close: true,
            ..Failures::default()
        },
    );

    let err = storage(&db).get_by_access("A1").await.unwrap_err();
    let source = err.storage_source().unwrap();
    assert!(matches!(source, StorageError::Connection { .. }));
    assert_closed_once(&db);
}

#[tokio::test]
async fn close_failure_after_drain_is_a_query_error() {
    let db = MockDatabase::new(
        vec![stored(&access("A1", "a"))],
        Failures {
            close: true,
            ..Failures::default()
        },
    );

    let err = storage(&db).get_by_access("A1").await.unwrap_err();
    assert!(matches!(err, AuthStoreError::Query { .. }));
    assert!(matches!(
        err.storage_source().unwrap(),
        StorageError::Cursor { .. }
    ));
    assert_closed_once(&db);
}

#[tokio::test]
async fn malformed_document_closes_cursor() {
    let db = MockDatabase::new(
        vec![json!({"access_token": "A1", "payload": 42})],
        Failures::default(),
    );

    let err = storage(&db).get_by_access("A1").await.unwrap_err();
    assert!(matches!(err, AuthStoreError::Deserialization { .. }));
    assert_closed_once(&db);
}

#[tokio::test]
async fn cancelled_lookup_still_closes_cursor() {
    let db = MockDatabase::new(
        vec![stored(&access("A1", "a"))],
        Failures {
            stall_reads: true,
            ..Failures::default()
        },
    );
    let storage = storage(&db);

    let lookup = storage.get_by_access("A1");
    let result = tokio::time::timeout(Duration::from_millis(50), lookup).await;
    assert!(result.is_err(), "lookup should have timed out");

    // The abandoned cursor is closed on a background task.
    tokio::time::sleep(Duration::from_millis(50)).await;
    assert_closed_once(&db);
}

#[tokio::test]
async fn query_failure_opens_no_cursor() {
    let db = MockDatabase::new(
        Vec::new(),
        Failures {
            query: true,
            ..Failures::default()
        },
    );

    let err = storage(&db).get_by_refresh("R1").await.unwrap_err();
    assert!(matches!(err, AuthStoreError::Query { .. }));
    assert_eq!(db.queries(), 1);
    assert_eq!(db.opened(), 0);
    assert_eq!(db.closes(), 0);
}

#[tokio::test]
async fn lookup_value_is_bound_not_interpolated() {
    let db = MockDatabase::new(Vec::new(), Failures::default());
    let hostile = "x\" || true || \"";

    storage(&db).get_by_refresh(hostile).await.unwrap_err();

    let (query, vars) = db.last_query();
    assert_eq!(
        query,
        "FOR doc IN @@collection FILTER doc.refresh_token == @refresh_token RETURN doc"
    );
    assert!(!query.contains(hostile));
    assert_eq!(vars.collection("collection"), Some("oauth2_tokens"));
    assert_eq!(vars.value("refresh_token"), Some(&json!(hostile)));
}

// =============================================================================
// Deletes
// =============================================================================

#[tokio::test]
async fn remove_closes_cursor() {
    let db = MockDatabase::new(Vec::new(), Failures::default());

    storage(&db).remove_by_code("X").await.unwrap();
    assert_closed_once(&db);

    let (query, vars) = db.last_query();
    assert_eq!(
        query,
        "FOR doc IN @@collection FILTER doc.code == @code REMOVE doc IN @@collection"
    );
    assert_eq!(vars.value("code"), Some(&json!("X")));
}

#[tokio::test]
async fn remove_close_failure_is_a_query_error() {
    let db = MockDatabase::new(
        Vec::new(),
        Failures {
            close: true,
            ..Failures::default()
        },
    );

    let err = storage(&db).remove_by_access("A1").await.unwrap_err();
    assert!(matches!(err, AuthStoreError::Query { .. }));
    assert_closed_once(&db);
}

#[tokio::test]
async fn remove_query_failure_is_a_query_error() {
    let db = MockDatabase::new(
        Vec::new(),
        Failures {
            query: true,
            ..Failures::default()
        },
    );

    let err = storage(&db).remove_by_refresh("R1").await.unwrap_err();
    assert!(matches!(err, AuthStoreError::Query { .. }));
    assert_eq!(db.closes(), 0);
}

#[tokio::test]
async fn create_reports_unavailable_collection() {
    let db = MockDatabase::new(Vec::new(), Failures::default());

    let err = storage(&db).create(&access("A1", "a")).await.unwrap_err();
    assert!(matches!(err, AuthStoreError::CollectionUnavailable { .. }));
    assert_eq!(db.queries(), 0);
}
