//! OAuth 2.0 client registration.

use serde::{Deserialize, Serialize};

/// A registered OAuth 2.0 client.
///
/// The `redirect_uri` field holds the client's full redirect-URI list as a
/// single separator-delimited string; the separator is configured on the
/// server (`redirect_uri_separator`). An empty separator means the field
/// holds exactly one URI.
///
/// Secret verification is a storage capability
/// ([`crate::storage::ClientStorage::verify_secret`]) so backends can store
/// hashes and compare in constant time; the `secret` field here exists for
/// backends that keep the registration record whole.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Client {
    /// Unique client identifier used in OAuth flows.
    pub client_id: String,

    /// Client secret, for confidential clients.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub secret: Option<String>,

    /// Separator-delimited list of allowed redirect URIs.
    pub redirect_uri: String,
}

impl Client {
    /// Creates a new client registration.
    #[must_use]
    pub fn new(
        client_id: impl Into<String>,
        secret: Option<String>,
        redirect_uri: impl Into<String>,
    ) -> Self {
        Self {
            client_id: client_id.into(),
            secret,
            redirect_uri: redirect_uri.into(),
        }
    }

    /// Returns `true` if the client has at least one registered redirect URI.
    #[must_use]
    pub fn has_redirect_uri(&self) -> bool {
        !self.redirect_uri.is_empty()
    }
}
