//! Server-side record of an issued access grant.

use serde::{Deserialize, Serialize};
use time::{Duration, OffsetDateTime};

use crate::types::Client;

/// The persisted record of an issued access token (plus optional refresh
/// token).
///
/// Back-links to the originating authorization code and to the predecessor
/// in a refresh chain are held by key string, not by owning handle: the
/// finalizer only needs the keys to invalidate the predecessors, and keeping
/// them as strings keeps the chain a DAG without keeping old records alive.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AccessData {
    /// The client the grant belongs to.
    pub client: Client,

    /// Code of the authorization record this grant was exchanged from, if
    /// any. The finalizer removes that record after persisting this one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub authorize_code: Option<String>,

    /// Access token of the previous grant in the refresh chain, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub prior_access_token: Option<String>,

    /// The access token.
    pub access_token: String,

    /// The refresh token. Absent when the grant does not allow refresh.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub refresh_token: Option<String>,

    /// Access token lifetime in seconds.
    pub expires_in: i64,

    /// Refresh token lifetime in seconds.
    pub refresh_expires_in: i64,

    /// Granted scope.
    pub scope: String,

    /// Redirect URI the grant was issued against.
    pub redirect_uri: String,

    /// When the grant was created.
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,

    /// Opaque payload passed through to storage. Never inspected by this
    /// crate.
    #[serde(default)]
    pub user_data: serde_json::Value,
}

impl AccessData {
    /// The instant at which the access token expires.
    #[must_use]
    pub fn expires_at(&self) -> OffsetDateTime {
        self.created_at + Duration::seconds(self.expires_in)
    }

    /// Returns `true` if the access token is expired at instant `t`.
    #[must_use]
    pub fn is_expired_at(&self, t: OffsetDateTime) -> bool {
        self.expires_at() < t
    }
}
