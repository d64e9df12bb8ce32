//! Cursor over in-memory query results.

use std::collections::VecDeque;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use async_trait::async_trait;
use serde_json::Value;
use tokenvault_storage::{Cursor, StorageError, StorageResult};

/// Counters for cursors handed out by a database.
#[derive(Debug, Default)]
pub struct CursorStats {
    opened: AtomicU64,
    closed: AtomicU64,
}

impl CursorStats {
    /// Number of cursors opened so far.
    pub fn opened(&self) -> u64 {
        self.opened.load(Ordering::SeqCst)
    }

    /// Number of successful `close` calls so far.
    pub fn closed(&self) -> u64 {
        self.closed.load(Ordering::SeqCst)
    }

    /// Cursors opened but not yet closed.
    pub fn open(&self) -> u64 {
        self.opened().saturating_sub(self.closed())
    }
}

/// Cursor over a snapshot of matching documents.
#[derive(Debug)]
pub struct InMemoryCursor {
    documents: VecDeque<Value>,
    closed: bool,
    stats: Arc<CursorStats>,
}

impl InMemoryCursor {
    pub(crate) fn new(documents: VecDeque<Value>, stats: Arc<CursorStats>) -> Self {
        stats.opened.fetch_add(1, Ordering::SeqCst);
        Self {
            documents,
            closed: false,
            stats,
        }
    }

    /// Number of documents not yet read.
    pub fn remaining(&self) -> usize {
        self.documents.len()
    }
}

#[async_trait]
impl Cursor for InMemoryCursor {
    fn has_more(&self) -> bool {
        !self.closed && !self.documents.is_empty()
    }

    async fn read_document(&mut self) -> StorageResult<Value> {
        if self.closed {
            return Err(StorageError::cursor("cursor is closed"));
        }
        self.documents
            .pop_front()
            .ok_or_else(|| StorageError::cursor("no more documents"))
    }

    async fn close(&mut self) -> StorageResult<()> {
        if self.closed {
            return Err(StorageError::cursor("cursor already closed"));
        }
        self.closed = true;
        self.documents.clear();
        self.stats.closed.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

impl Drop for InMemoryCursor {
    fn drop(&mut self) {
        if !self.closed {
            tracing::warn!(
                remaining = self.documents.len(),
                "cursor dropped without being closed"
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[tokio::test]
    async fn test_cursor_drains_in_order_and_closes_once() {
        let stats = Arc::new(CursorStats::default());
        let mut cursor = InMemoryCursor::new(
            VecDeque::from(vec![json!({"n": 1}), json!({"n": 2})]),
            Arc::clone(&stats),
        );
        assert_eq!(stats.opened(), 1);
        assert_eq!(stats.open(), 1);

        let mut seen = Vec::new();
        while cursor.has_more() {
            seen.push(cursor.read_document().await.unwrap());
        }
        assert_eq!(seen, vec![json!({"n": 1}), json!({"n": 2})]);
        assert!(cursor.read_document().await.is_err());

        cursor.close().await.unwrap();
        assert_eq!(stats.closed(), 1);
        assert_eq!(stats.open(), 0);

        let err = cursor.close().await.unwrap_err();
        assert!(matches!(err, StorageError::Cursor { .. }));
        assert_eq!(stats.closed(), 1);
    }

    #[tokio::test]
    async fn test_closed_cursor_rejects_reads() {
        let stats = Arc::new(CursorStats::default());
        let mut cursor = InMemoryCursor::new(VecDeque::from(vec![json!({})]), stats);
        cursor.close().await.unwrap();
        assert!(!cursor.has_more());
        assert!(cursor.read_document().await.is_err());
    }
}
