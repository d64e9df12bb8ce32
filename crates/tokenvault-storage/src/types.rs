//! Data types used by the capability traits.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Attribute holding the document key.
pub const KEY_FIELD: &str = "_key";

/// Attribute holding the document handle (`collection/key`).
pub const ID_FIELD: &str = "_id";

/// Attribute holding the document revision.
pub const REV_FIELD: &str = "_rev";

/// Metadata returned when a document is written.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocumentMeta {
    /// Document key, unique within its collection.
    #[serde(rename = "_key")]
    pub key: String,
    /// Document handle (`collection/key`).
    #[serde(rename = "_id")]
    pub id: String,
    /// Revision assigned by the database.
    #[serde(rename = "_rev")]
    pub rev: String,
}

impl DocumentMeta {
    /// Creates metadata for a document in `collection`.
    #[must_use]
    pub fn new(collection: &str, key: impl Into<String>, rev: impl Into<String>) -> Self {
        let key = key.into();
        Self {
            id: format!("{collection}/{key}"),
            key,
            rev: rev.into(),
        }
    }
}

/// Bind parameters for a query.
///
/// Collection parameters (`@@name` in the query text) are stored under
/// `@name`; value parameters (`@name`) under `name`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BindVars(BTreeMap<String, Value>);

impl BindVars {
    /// Creates an empty parameter set.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Binds a value parameter, referenced as `@name`.
    #[must_use]
    pub fn with(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.0.insert(name.into(), value.into());
        self
    }

    /// Binds a collection parameter, referenced as `@@name`.
    #[must_use]
    pub fn with_collection(mut self, name: &str, collection: impl Into<String>) -> Self {
        self.0
            .insert(format!("@{name}"), Value::String(collection.into()));
        self
    }

    /// Looks up a value parameter.
    #[must_use]
    pub fn value(&self, name: &str) -> Option<&Value> {
        self.0.get(name)
    }

    /// Looks up a collection parameter by its name without the `@@` prefix.
    #[must_use]
    pub fn collection(&self, name: &str) -> Option<&str> {
        self.0.get(&format!("@{name}")).and_then(Value::as_str)
    }

    /// Returns the number of bound parameters.
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Returns `true` if nothing is bound.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Iterates over the raw parameter names and values.
    pub fn iter(&self) -> impl Iterator<Item = (&String, &Value)> {
        self.0.iter()
    }
}
