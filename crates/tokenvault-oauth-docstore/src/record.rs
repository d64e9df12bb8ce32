//! Stored document layout for clients and tokens.
//!
//! Each entity is stored as a record holding its lookup fields next to an
//! opaque `payload`: the full entity serialized to JSON and base64 encoded.
//! Lookups filter on the indexed fields, decoding only reads the payload.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use time::OffsetDateTime;
use tokenvault_oauth::{AuthStoreError, AuthStoreResult, Client, Token};

pub(crate) const CLIENT_ENTITY: &str = "client";
pub(crate) const TOKEN_ENTITY: &str = "token";

// =============================================================================
// Client Record
// =============================================================================

/// Stored form of a [`Client`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClientRecord {
    /// Client id, used as the document key.
    #[serde(rename = "_key")]
    pub id: String,

    /// Client secret.
    #[serde(default)]
    pub secret: String,

    /// Registered redirect domain.
    #[serde(default)]
    pub domain: String,

    /// Serialized client.
    #[serde(with = "payload")]
    pub payload: Vec<u8>,
}

impl ClientRecord {
    /// Builds the record for `client`.
    ///
    /// # Errors
    ///
    /// Returns `AuthStoreError::Serialization` if the client cannot be encoded.
    pub fn from_client(client: &Client) -> AuthStoreResult<Self> {
        let payload = serde_json::to_vec(client)
            .map_err(|e| AuthStoreError::serialization(CLIENT_ENTITY, e))?;
        Ok(Self {
            id: client.id.clone(),
            secret: client.secret.clone(),
            domain: client.domain.clone(),
            payload,
        })
    }

    /// Decodes a record from a stored document.
    ///
    /// # Errors
    ///
    /// Returns `AuthStoreError::Deserialization` if the document does not have
    /// the record layout.
    pub fn from_document(document: Value) -> AuthStoreResult<Self> {
        serde_json::from_value(document)
            .map_err(|e| AuthStoreError::deserialization(CLIENT_ENTITY, e))
    }

    /// Encodes the record as a document.
    ///
    /// # Errors
    ///
    /// Returns `AuthStoreError::Serialization` if encoding fails.
    pub fn to_document(&self) -> AuthStoreResult<Value> {
        serde_json::to_value(self).map_err(|e| AuthStoreError::serialization(CLIENT_ENTITY, e))
    }

    /// Decodes the client from the payload.
    ///
    /// # Errors
    ///
    /// Returns `AuthStoreError::Deserialization` if the payload is malformed.
    pub fn into_client(self) -> AuthStoreResult<Client> {
        serde_json::from_slice(&self.payload)
            .map_err(|e| AuthStoreError::deserialization(CLIENT_ENTITY, e))
    }
}

// =============================================================================
// Token Record
// =============================================================================

/// Stored form of a [`Token`].
///
/// Empty lookup fields are left out of the document, so a filter on a field
/// only ever matches records that actually carry it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenRecord {
    /// Document key assigned by the database. Never written.
    #[serde(rename = "_key", default, skip_serializing)]
    pub key: String,

    /// Authorization code.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub code: String,

    /// Access token.
    #[serde(rename = "access_token", default, skip_serializing_if = "String::is_empty")]
    pub access: String,

    /// Refresh token.
    #[serde(rename = "refresh_token", default, skip_serializing_if = "String::is_empty")]
    pub refresh: String,

    /// Serialized token.
    #[serde(with = "payload")]
    pub payload: Vec<u8>,

    /// When the record was written.
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,

    /// Advisory expiry of the record.
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        with = "time::serde::rfc3339::option"
    )]
    pub expires_at: Option<OffsetDateTime>,
}

impl TokenRecord {
    /// Builds the record for `token`, written at `now`.
    ///
    /// A record has a single `expires_at`. The code branch runs first, the
    /// access branch only when there is no code, and the refresh branch always
    /// runs last and overwrites whatever was set before. A token with both
    /// access and refresh tokens therefore expires with its refresh token.
    ///
    /// # Errors
    ///
    /// Returns `AuthStoreError::Serialization` if the token cannot be encoded.
    pub fn from_token(token: &Token, now: OffsetDateTime) -> AuthStoreResult<Self> {
        let payload = serde_json::to_vec(token)
            .map_err(|e| AuthStoreError::serialization(TOKEN_ENTITY, e))?;

        let mut record = Self {
            key: String::new(),
            code: String::new(),
            access: String::new(),
            refresh: String::new(),
            payload,
            created_at: now,
            expires_at: None,
        };

        if token.has_code() {
            record.code = token.code.clone();
            record.expires_at = token.code_expires_at();
        } else if token.has_access() {
            record.access = token.access.clone();
            record.expires_at = token.access_expires_at();
        }

        if token.has_refresh() {
            record.refresh = token.refresh.clone();
            record.expires_at = token.refresh_expires_at();
        }

        Ok(record)
    }

    /// Decodes a record from a stored document.
    ///
    /// # Errors
    ///
    /// Returns `AuthStoreError::Deserialization` if the document does not have
    /// the record layout.
    pub fn from_document(document: Value) -> AuthStoreResult<Self> {
        serde_json::from_value(document)
            .map_err(|e| AuthStoreError::deserialization(TOKEN_ENTITY, e))
    }

    /// Encodes the record as a document.
    ///
    /// # Errors
    ///
    /// Returns `AuthStoreError::Serialization` if encoding fails.
    pub fn to_document(&self) -> AuthStoreResult<Value> {
        serde_json::to_value(self).map_err(|e| AuthStoreError::serialization(TOKEN_ENTITY, e))
    }

    /// Decodes the token from the payload.
    ///
    /// # Errors
    ///
    /// Returns `AuthStoreError::Deserialization` if the payload is malformed.
    pub fn into_token(self) -> AuthStoreResult<Token> {
        serde_json::from_slice(&self.payload)
            .map_err(|e| AuthStoreError::deserialization(TOKEN_ENTITY, e))
    }
}

// =============================================================================
// Token Lookup Fields
// =============================================================================

/// Indexed token attribute a lookup or delete filters on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenField {
    /// `code`
    Code,
    /// `access_token`
    Access,
    /// `refresh_token`
    Refresh,
}

impl TokenField {
    /// Stored attribute name, also used as the value bind parameter.
    #[must_use]
    pub fn attribute(self) -> &'static str {
        match self {
            Self::Code => "code",
            Self::Access => "access_token",
            Self::Refresh => "refresh_token",
        }
    }

    /// Query returning every record whose attribute equals the bound value.
    #[must_use]
    pub fn lookup_query(self) -> &'static str {
        match self {
            Self::Code => "FOR doc IN @@collection FILTER doc.code == @code RETURN doc",
            Self::Access => {
                "FOR doc IN @@collection FILTER doc.access_token == @access_token RETURN doc"
            }
            Self::Refresh => {
                "FOR doc IN @@collection FILTER doc.refresh_token == @refresh_token RETURN doc"
            }
        }
    }

    /// Query removing every record whose attribute equals the bound value.
    #[must_use]
    pub fn remove_query(self) -> &'static str {
        match self {
            Self::Code => {
                "FOR doc IN @@collection FILTER doc.code == @code REMOVE doc IN @@collection"
            }
            Self::Access => {
                "FOR doc IN @@collection FILTER doc.access_token == @access_token REMOVE doc IN @@collection"
            }
            Self::Refresh => {
                "FOR doc IN @@collection FILTER doc.refresh_token == @refresh_token REMOVE doc IN @@collection"
            }
        }
    }
}

impl std::fmt::Display for TokenField {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.attribute())
    }
}

/// Base64 encoding for payload bytes.
mod payload {
    use base64::Engine as _;
    use base64::engine::general_purpose::STANDARD;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(bytes: &[u8], serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&STANDARD.encode(bytes))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<u8>, D::Error> {
        let encoded = String::deserialize(deserializer)?;
        STANDARD
            .decode(encoded.as_bytes())
            .map_err(serde::de::Error::custom)
    }
}
