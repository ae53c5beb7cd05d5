//! Server-side record of an issued authorization code.

use serde::{Deserialize, Serialize};
use time::{Duration, OffsetDateTime};

use crate::types::Client;

/// The server-side record of a previously issued authorization code.
///
/// Loaded read-only during code exchange and removed once the exchange
/// succeeds. A non-empty `code_challenge` means the authorization request
/// carried PKCE and the token request must present a matching
/// `code_verifier`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthorizeData {
    /// The client the code was issued to.
    pub client: Client,

    /// The authorization code itself.
    pub code: String,

    /// Code lifetime in seconds.
    pub expires_in: i64,

    /// Scope granted in the authorization request.
    pub scope: String,

    /// Redirect URI the code was issued against.
    pub redirect_uri: String,

    /// When the code was created.
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,

    /// Opaque payload threaded through to the access grant. Never inspected
    /// by this crate.
    #[serde(default)]
    pub user_data: serde_json::Value,

    /// PKCE code challenge, when the authorization request carried one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub code_challenge: Option<String>,

    /// PKCE challenge method (`"plain"` or `"S256"`; empty means plain).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub code_challenge_method: Option<String>,
}

impl AuthorizeData {
    /// The instant at which the code expires.
    #[must_use]
    pub fn expires_at(&self) -> OffsetDateTime {
        self.created_at + Duration::seconds(self.expires_in)
    }

    /// Returns `true` if the code is expired at instant `t`.
    #[must_use]
    pub fn is_expired_at(&self, t: OffsetDateTime) -> bool {
        self.expires_at() < t
    }

    /// Returns `true` if the authorization request carried a PKCE challenge.
    #[must_use]
    pub fn has_code_challenge(&self) -> bool {
        self.code_challenge.as_deref().is_some_and(|c| !c.is_empty())
    }
}
