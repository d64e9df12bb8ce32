//! Storage configuration.
//!
//! Collection names for the client and token stores, loaded from an optional
//! TOML file and `TOKENVAULT__`-prefixed environment variables.
//!
//! # Example (TOML)
//!
//! ```toml
//! [storage]
//! client_collection = "oauth2_clients"
//! token_collection = "oauth2_tokens"
//! ```
//!
//! Environment variables override the file, e.g.
//! `TOKENVAULT__STORAGE__TOKEN_COLLECTION=tokens_v2`.

use std::path::Path;

use serde::{Deserialize, Serialize};

/// Default collection for client records.
pub const DEFAULT_CLIENT_COLLECTION: &str = "oauth2_clients";

/// Default collection for token records.
pub const DEFAULT_TOKEN_COLLECTION: &str = "oauth2_tokens";

/// Environment variable prefix for overrides.
pub const ENV_PREFIX: &str = "TOKENVAULT";

/// Collection naming for the OAuth stores.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct StorageConfig {
    /// Collection holding client records.
    pub client_collection: String,

    /// Collection holding token records.
    pub token_collection: String,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            client_collection: DEFAULT_CLIENT_COLLECTION.to_string(),
            token_collection: DEFAULT_TOKEN_COLLECTION.to_string(),
        }
    }
}

#[derive(Debug, Default, Deserialize)]
struct ConfigFile {
    #[serde(default)]
    storage: StorageConfig,
}

impl StorageConfig {
    /// Loads the configuration from an optional TOML file plus environment
    /// overrides, then validates it.
    ///
    /// # Errors
    ///
    /// Returns an error if the file is missing or malformed, a value has the
    /// wrong type, or a collection name is empty.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        use config::{Config, Environment, File};

        let mut builder = Config::builder();
        if let Some(path) = path {
            builder = builder.add_source(File::from(path.to_path_buf()).required(true));
        }
        builder = builder.add_source(
            Environment::with_prefix(ENV_PREFIX)
                .try_parsing(true)
                .separator("__"),
        );

        let file: ConfigFile = builder.build()?.try_deserialize()?;
        file.storage.validate()?;

        tracing::debug!(
            client_collection = %file.storage.client_collection,
            token_collection = %file.storage.token_collection,
            "storage configuration loaded"
        );
        Ok(file.storage)
    }

    /// Validates the configuration.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::EmptyCollection` if a collection name is empty.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.client_collection.is_empty() {
            return Err(ConfigError::EmptyCollection {
                field: "client_collection",
            });
        }
        if self.token_collection.is_empty() {
            return Err(ConfigError::EmptyCollection {
                field: "token_collection",
            });
        }
        Ok(())
    }
}

/// Configuration loading errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// The file or environment could not be read or deserialized.
    #[error("config error: {0}")]
    Load(#[from] config::ConfigError),

    /// A collection name is empty.
    #[error("storage.{field} must not be empty")]
    EmptyCollection {
        /// The offending field.
        field: &'static str,
    },
}
