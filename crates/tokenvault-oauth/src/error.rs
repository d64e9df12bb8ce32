//! Storage error types for OAuth client and token persistence.
//!
//! Every failure names the phase that failed, so callers can tell a missing
//! record (issue a new token) from corrupt data or an unavailable database
//! (fail hard). Database errors are kept unchanged as the error source.

use std::fmt;

use tokenvault_storage::StorageError;

/// Errors reported by client and token storage backends.
#[derive(Debug, thiserror::Error)]
pub enum AuthStoreError {
    /// The store was constructed with invalid options.
    #[error("Configuration error: {message}")]
    Configuration {
        /// Description of the invalid option.
        message: String,
    },

    /// The backing collection could not be resolved.
    #[error("Collection '{collection}' unavailable: {source}")]
    CollectionUnavailable {
        /// Name of the collection.
        collection: String,
        /// Database error returned while resolving it.
        #[source]
        source: StorageError,
    },

    /// An entity could not be encoded into its stored payload.
    #[error("Failed to serialize {entity}: {source}")]
    Serialization {
        /// Kind of entity ("client", "token").
        entity: &'static str,
        /// Encoder error.
        #[source]
        source: serde_json::Error,
    },

    /// A stored record or its payload could not be decoded.
    #[error("Failed to deserialize {entity}: {source}")]
    Deserialization {
        /// Kind of entity ("client", "token").
        entity: &'static str,
        /// Decoder error.
        #[source]
        source: serde_json::Error,
    },

    /// Creating a document failed, including duplicate-key conflicts.
    #[error("Write to '{collection}' failed: {source}")]
    Write {
        /// Name of the collection.
        collection: String,
        /// Database error returned by the write.
        #[source]
        source: StorageError,
    },

    /// Executing a query, reading a document, or releasing a cursor failed.
    #[error("Query on '{collection}' failed: {source}")]
    Query {
        /// Name of the collection.
        collection: String,
        /// Database error returned by the query.
        #[source]
        source: StorageError,
    },

    /// No record exists for the given key.
    #[error("{entity} not found: {key}")]
    NotFound {
        /// Kind of entity ("client", "token").
        entity: &'static str,
        /// The key that was looked up.
        key: String,
    },
}

impl AuthStoreError {
    // -------------------------------------------------------------------------
    // Constructor Methods
    // -------------------------------------------------------------------------

    /// Create a `Configuration` error.
    #[must_use]
    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration {
            message: message.into(),
        }
    }

    /// Create a `CollectionUnavailable` error.
    #[must_use]
    pub fn collection_unavailable(collection: impl Into<String>, source: StorageError) -> Self {
        Self::CollectionUnavailable {
            collection: collection.into(),
            source,
        }
    }

    /// Create a `Serialization` error.
    #[must_use]
    pub fn serialization(entity: &'static str, source: serde_json::Error) -> Self {
        Self::Serialization { entity, source }
    }

    /// Create a `Deserialization` error.
    #[must_use]
    pub fn deserialization(entity: &'static str, source: serde_json::Error) -> Self {
        Self::Deserialization { entity, source }
    }

    /// Create a `Write` error.
    #[must_use]
    pub fn write(collection: impl Into<String>, source: StorageError) -> Self {
        Self::Write {
            collection: collection.into(),
            source,
        }
    }

    /// Create a `Query` error.
    #[must_use]
    pub fn query(collection: impl Into<String>, source: StorageError) -> Self {
        Self::Query {
            collection: collection.into(),
            source,
        }
    }

    /// Create a `NotFound` error.
    #[must_use]
    pub fn not_found(entity: &'static str, key: impl Into<String>) -> Self {
        Self::NotFound {
            entity,
            key: key.into(),
        }
    }

    // -------------------------------------------------------------------------
    // Predicate Methods
    // -------------------------------------------------------------------------

    /// Returns `true` if this is a `NotFound` error.
    #[must_use]
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }

    /// Returns `true` if a write was rejected because the key already exists.
    #[must_use]
    pub fn is_conflict(&self) -> bool {
        matches!(self, Self::Write { source, .. } if source.is_unique_violation())
    }

    /// Returns `true` if this is a configuration error.
    #[must_use]
    pub fn is_configuration_error(&self) -> bool {
        matches!(self, Self::Configuration { .. })
    }

    /// Returns `true` if an entity could not be encoded or decoded.
    #[must_use]
    pub fn is_serialization_error(&self) -> bool {
        matches!(
            self,
            Self::Serialization { .. } | Self::Deserialization { .. }
        )
    }

    /// Returns `true` if the underlying database failed.
    #[must_use]
    pub fn is_storage_error(&self) -> bool {
        matches!(
            self,
            Self::CollectionUnavailable { .. } | Self::Write { .. } | Self::Query { .. }
        )
    }

    /// Returns the underlying database error, if any.
    #[must_use]
    pub fn storage_source(&self) -> Option<&StorageError> {
        match self {
            Self::CollectionUnavailable { source, .. }
            | Self::Write { source, .. }
            | Self::Query { source, .. } => Some(source),
            _ => None,
        }
    }

    /// Returns the error category for logging/monitoring purposes.
    #[must_use]
    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::Configuration { .. } => ErrorCategory::Configuration,
            Self::NotFound { .. } => ErrorCategory::NotFound,
            Self::Serialization { .. } | Self::Deserialization { .. } => ErrorCategory::Data,
            Self::Write { .. } if self.is_conflict() => ErrorCategory::Conflict,
            Self::CollectionUnavailable { .. } | Self::Write { .. } | Self::Query { .. } => {
                ErrorCategory::Storage
            }
        }
    }
}

/// Categories of storage errors for logging and monitoring.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCategory {
    /// Invalid store options.
    Configuration,
    /// Record not found.
    NotFound,
    /// Duplicate key.
    Conflict,
    /// Payload encode/decode failure.
    Data,
    /// Database failure.
    Storage,
}

impl fmt::Display for ErrorCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Configuration => write!(f, "configuration"),
            Self::NotFound => write!(f, "not_found"),
            Self::Conflict => write!(f, "conflict"),
            Self::Data => write!(f, "data"),
            Self::Storage => write!(f, "storage"),
        }
    }
}
