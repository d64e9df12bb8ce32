//! OAuth 2.0 token entity.
//!
//! A single `Token` describes the outcome of one grant. It may carry an
//! authorization code, an access token and a refresh token at the same time,
//! each with its own creation time and lifetime. Empty strings mean "not
//! issued".

use std::time::Duration;

use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

/// PKCE code challenge transformation (RFC 7636).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CodeChallengeMethod {
    /// `plain`: the challenge is the verifier.
    #[serde(rename = "plain")]
    Plain,
    /// `S256`: the challenge is the base64url SHA-256 of the verifier.
    #[serde(rename = "S256")]
    S256,
}

impl CodeChallengeMethod {
    /// Returns the `code_challenge_method` parameter value.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Plain => "plain",
            Self::S256 => "S256",
        }
    }
}

impl std::fmt::Display for CodeChallengeMethod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Token information produced by a grant.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Token {
    /// Client the token was issued to.
    pub client_id: String,

    /// User that authorized the grant (empty for client credentials).
    pub user_id: String,

    /// Redirect URI used in the authorization request.
    pub redirect_uri: String,

    /// Granted scope (space-separated).
    pub scope: String,

    /// Authorization code.
    pub code: String,

    /// PKCE code challenge bound to the code.
    pub code_challenge: String,

    /// PKCE challenge method.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub code_challenge_method: Option<CodeChallengeMethod>,

    /// When the code was issued.
    #[serde(
        skip_serializing_if = "Option::is_none",
        with = "time::serde::rfc3339::option"
    )]
    pub code_created_at: Option<OffsetDateTime>,

    /// How long the code stays valid.
    #[serde(with = "humantime_serde")]
    pub code_expires_in: Duration,

    /// Access token.
    pub access: String,

    /// When the access token was issued.
    #[serde(
        skip_serializing_if = "Option::is_none",
        with = "time::serde::rfc3339::option"
    )]
    pub access_created_at: Option<OffsetDateTime>,

    /// How long the access token stays valid.
    #[serde(with = "humantime_serde")]
    pub access_expires_in: Duration,

    /// Refresh token.
    pub refresh: String,

    /// When the refresh token was issued.
    #[serde(
        skip_serializing_if = "Option::is_none",
        with = "time::serde::rfc3339::option"
    )]
    pub refresh_created_at: Option<OffsetDateTime>,

    /// How long the refresh token stays valid.
    #[serde(with = "humantime_serde")]
    pub refresh_expires_in: Duration,
}

impl Token {
    /// Creates an empty token for `client_id`.
    #[must_use]
    pub fn new(client_id: impl Into<String>) -> Self {
        Self {
            client_id: client_id.into(),
            ..Self::default()
        }
    }

    /// Sets the authorizing user.
    #[must_use]
    pub fn with_user_id(mut self, user_id: impl Into<String>) -> Self {
        self.user_id = user_id.into();
        self
    }

    /// Sets the redirect URI.
    #[must_use]
    pub fn with_redirect_uri(mut self, redirect_uri: impl Into<String>) -> Self {
        self.redirect_uri = redirect_uri.into();
        self
    }

    /// Sets the granted scope.
    #[must_use]
    pub fn with_scope(mut self, scope: impl Into<String>) -> Self {
        self.scope = scope.into();
        self
    }

    /// Sets the authorization code with its creation time and lifetime.
    #[must_use]
    pub fn with_code(
        mut self,
        code: impl Into<String>,
        created_at: OffsetDateTime,
        expires_in: Duration,
    ) -> Self {
        self.code = code.into();
        self.code_created_at = Some(created_at);
        self.code_expires_in = expires_in;
        self
    }

    /// Binds a PKCE challenge to the code.
    #[must_use]
    pub fn with_code_challenge(
        mut self,
        challenge: impl Into<String>,
        method: CodeChallengeMethod,
    ) -> Self {
        self.code_challenge = challenge.into();
        self.code_challenge_method = Some(method);
        self
    }

    /// Sets the access token with its creation time and lifetime.
    #[must_use]
    pub fn with_access(
        mut self,
        access: impl Into<String>,
        created_at: OffsetDateTime,
        expires_in: Duration,
    ) -> Self {
        self.access = access.into();
        self.access_created_at = Some(created_at);
        self.access_expires_in = expires_in;
        self
    }

    /// Sets the refresh token with its creation time and lifetime.
    #[must_use]
    pub fn with_refresh(
        mut self,
        refresh: impl Into<String>,
        created_at: OffsetDateTime,
        expires_in: Duration,
    ) -> Self {
        self.refresh = refresh.into();
        self.refresh_created_at = Some(created_at);
        self.refresh_expires_in = expires_in;
        self
    }

    /// Returns `true` if an authorization code is set.
    #[must_use]
    pub fn has_code(&self) -> bool {
        !self.code.is_empty()
    }

    /// Returns `true` if an access token is set.
    #[must_use]
    pub fn has_access(&self) -> bool {
        !self.access.is_empty()
    }

    /// Returns `true` if a refresh token is set.
    #[must_use]
    pub fn has_refresh(&self) -> bool {
        !self.refresh.is_empty()
    }

    /// When the code expires, if its creation time is known.
    #[must_use]
    pub fn code_expires_at(&self) -> Option<OffsetDateTime> {
        expires_at(self.code_created_at, self.code_expires_in)
    }

    /// When the access token expires, if its creation time is known.
    #[must_use]
    pub fn access_expires_at(&self) -> Option<OffsetDateTime> {
        expires_at(self.access_created_at, self.access_expires_in)
    }

    /// When the refresh token expires, if its creation time is known.
    #[must_use]
    pub fn refresh_expires_at(&self) -> Option<OffsetDateTime> {
        expires_at(self.refresh_created_at, self.refresh_expires_in)
    }
}

/// `None` when the creation time is unknown or the sum overflows.
fn expires_at(created_at: Option<OffsetDateTime>, lifetime: Duration) -> Option<OffsetDateTime> {
    let lifetime = time::Duration::try_from(lifetime).ok()?;
    created_at?.checked_add(lifetime)
}
