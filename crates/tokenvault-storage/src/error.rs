//! Error types for the document database capability.

use std::fmt;

/// Errors that can occur while talking to a document database.
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    /// The named collection does not exist.
    #[error("Collection not found: {name}")]
    CollectionNotFound {
        /// Name of the missing collection.
        name: String,
    },

    /// No document exists for the given key.
    #[error("Document not found: {collection}/{key}")]
    DocumentNotFound {
        /// Collection that was searched.
        collection: String,
        /// Document key that was requested.
        key: String,
    },

    /// A write would violate a unique constraint (document key or unique attribute).
    #[error("Unique constraint violated in {collection}: {field} = {value}")]
    UniqueConstraintViolated {
        /// Collection the write targeted.
        collection: String,
        /// Attribute carrying the constraint (`_key` for the document key).
        field: String,
        /// The conflicting value.
        value: String,
    },

    /// The document is not acceptable to the database (e.g. not a JSON object).
    #[error("Invalid document: {message}")]
    InvalidDocument {
        /// Description of the problem.
        message: String,
    },

    /// The query could not be parsed, bound, or executed.
    #[error("Query error: {message}")]
    Query {
        /// Description of the failure.
        message: String,
    },

    /// A cursor operation failed.
    #[error("Cursor error: {message}")]
    Cursor {
        /// Description of the failure.
        message: String,
    },

    /// Failed to reach the database.
    #[error("Connection error: {message}")]
    Connection {
        /// Description of the connection failure.
        message: String,
    },

    /// An internal database error occurred.
    #[error("Internal error: {message}")]
    Internal {
        /// Description of the internal error.
        message: String,
    },
}

impl StorageError {
    /// Creates a new `CollectionNotFound` error.
    #[must_use]
    pub fn collection_not_found(name: impl Into<String>) -> Self {
        Self::CollectionNotFound { name: name.into() }
    }

    /// Creates a new `DocumentNotFound` error.
    #[must_use]
    pub fn document_not_found(collection: impl Into<String>, key: impl Into<String>) -> Self {
        Self::DocumentNotFound {
            collection: collection.into(),
            key: key.into(),
        }
    }

    /// Creates a new `UniqueConstraintViolated` error.
    #[must_use]
    pub fn unique_violation(
        collection: impl Into<String>,
        field: impl Into<String>,
        value: impl Into<String>,
    ) -> Self {
        Self::UniqueConstraintViolated {
            collection: collection.into(),
            field: field.into(),
            value: value.into(),
        }
    }

    /// Creates a new `InvalidDocument` error.
    #[must_use]
    pub fn invalid_document(message: impl Into<String>) -> Self {
        Self::InvalidDocument {
            message: message.into(),
        }
    }

    /// Creates a new `Query` error.
    #[must_use]
    pub fn query(message: impl Into<String>) -> Self {
        Self::Query {
            message: message.into(),
        }
    }

    /// Creates a new `Cursor` error.
    #[must_use]
    pub fn cursor(message: impl Into<String>) -> Self {
        Self::Cursor {
            message: message.into(),
        }
    }

    /// Creates a new `Connection` error.
    #[must_use]
    pub fn connection(message: impl Into<String>) -> Self {
        Self::Connection {
            message: message.into(),
        }
    }

    /// Creates a new `Internal` error.
    #[must_use]
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal {
            message: message.into(),
        }
    }

    /// Returns `true` if the collection does not exist.
    #[must_use]
    pub fn is_collection_not_found(&self) -> bool {
        matches!(self, Self::CollectionNotFound { .. })
    }

    /// Returns `true` if the requested document does not exist.
    #[must_use]
    pub fn is_document_not_found(&self) -> bool {
        matches!(self, Self::DocumentNotFound { .. })
    }

    /// Returns `true` if a unique constraint was violated.
    #[must_use]
    pub fn is_unique_violation(&self) -> bool {
        matches!(self, Self::UniqueConstraintViolated { .. })
    }

    /// Returns the error category for logging/monitoring purposes.
    #[must_use]
    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::CollectionNotFound { .. } | Self::DocumentNotFound { .. } => {
                ErrorCategory::NotFound
            }
            Self::UniqueConstraintViolated { .. } => ErrorCategory::Conflict,
            Self::InvalidDocument { .. } | Self::Query { .. } => ErrorCategory::Validation,
            Self::Cursor { .. } | Self::Connection { .. } => ErrorCategory::Infrastructure,
            Self::Internal { .. } => ErrorCategory::Internal,
        }
    }
}

/// Categories of storage errors for logging and monitoring.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCategory {
    /// Collection or document not found.
    NotFound,
    /// Unique constraint conflict.
    Conflict,
    /// Rejected document or query.
    Validation,
    /// Cursor or connection failure.
    Infrastructure,
    /// Internal error.
    Internal,
}

impl fmt::Display for ErrorCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NotFound => write!(f, "not_found"),
            Self::Conflict => write!(f, "conflict"),
            Self::Validation => write!(f, "validation"),
            Self::Infrastructure => write!(f, "infrastructure"),
            Self::Internal => write!(f, "internal"),
        }
    }
}
