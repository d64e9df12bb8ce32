use std::sync::Arc;

use serde::Deserialize;
use tokenvault_storage::DynDatabase;

use crate::InMemoryDatabase;

/// Database-wide options for the in-memory backend.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct InMemoryOptions {
    /// Create collections on first use instead of failing with
    /// `CollectionNotFound`.
    pub auto_create_collections: bool,
}

/// Per-collection options.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct CollectionOptions {
    /// Attributes whose non-null values must be unique within the collection.
    ///
    /// Constraints are sparse: documents without the attribute (or with a
    /// `null` value) never conflict.
    pub unique_fields: Vec<String>,
}

impl CollectionOptions {
    /// Adds a sparse unique constraint on `field`.
    #[must_use]
    pub fn with_unique_field(mut self, field: impl Into<String>) -> Self {
        self.unique_fields.push(field.into());
        self
    }
}

/// Create a shareable in-memory database with the given options.
pub fn create_database(options: InMemoryOptions) -> DynDatabase {
    Arc::new(InMemoryDatabase::with_options(options))
}
