//! OAuth 2.0 client entity.

use serde::{Deserialize, Serialize};

/// A registered OAuth 2.0 client.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Client {
    /// Unique client identifier used in OAuth flows.
    pub id: String,

    /// Client secret (empty for public clients).
    pub secret: String,

    /// Registered redirect domain.
    pub domain: String,

    /// Whether the client is public (cannot keep a secret).
    pub public: bool,

    /// Owning user, if the client belongs to one.
    pub user_id: String,
}

impl Client {
    /// Creates a confidential client.
    #[must_use]
    pub fn new(
        id: impl Into<String>,
        secret: impl Into<String>,
        domain: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            secret: secret.into(),
            domain: domain.into(),
            ..Self::default()
        }
    }

    /// Marks the client as public.
    #[must_use]
    pub fn with_public(mut self, public: bool) -> Self {
        self.public = public;
        self
    }

    /// Sets the owning user.
    #[must_use]
    pub fn with_user_id(mut self, user_id: impl Into<String>) -> Self {
        self.user_id = user_id.into();
        self
    }
}
