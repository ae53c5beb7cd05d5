//! The per-request grant record.
//!
//! A grant handler assembles an [`AccessRequest`] from the validated
//! request and its loaded storage records. The embedding application then
//! makes the authorization decision (verifying resource-owner credentials
//! for the `password` grant, checking the device id for the `device` grant,
//! and so on), sets [`AccessRequest::authorized`], and hands the record to
//! the finalizer.

use serde::{Deserialize, Serialize};

use crate::oauth::request::TokenEndpointRequest;
use crate::types::{AccessData, AuthorizeData, Client};

/// OAuth 2.0 grant types accepted by the token endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GrantType {
    /// Exchange an authorization code for tokens.
    AuthorizationCode,
    /// Exchange a refresh token for a new token pair.
    RefreshToken,
    /// Resource Owner Password Credentials.
    Password,
    /// Machine-to-machine authentication with client credentials only.
    ClientCredentials,
    /// Assertion-based grant (e.g. a SAML or JWT bearer assertion).
    Assertion,
    /// First-party anonymous sign-in keyed by a caller-supplied user id.
    Anonymous,
    /// Device sign-in keyed by a device identifier.
    Device,
    /// Sign-in with a platform-issued token.
    Platform,
}

impl GrantType {
    /// Returns the OAuth 2.0 `grant_type` parameter value.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::AuthorizationCode => "authorization_code",
            Self::RefreshToken => "refresh_token",
            Self::Password => "password",
            Self::ClientCredentials => "client_credentials",
            Self::Assertion => "assertion",
            Self::Anonymous => "anonymous",
            Self::Device => "device",
            Self::Platform => "platform",
        }
    }

    /// Parses a `grant_type` parameter value.
    #[must_use]
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "authorization_code" => Some(Self::AuthorizationCode),
            "refresh_token" => Some(Self::RefreshToken),
            "password" => Some(Self::Password),
            "client_credentials" => Some(Self::ClientCredentials),
            "assertion" => Some(Self::Assertion),
            "anonymous" => Some(Self::Anonymous),
            "device" => Some(Self::Device),
            "platform" => Some(Self::Platform),
            _ => None,
        }
    }
}

impl std::fmt::Display for GrantType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A validated access-token request, created by a grant handler and
/// consumed once by the finalizer.
///
/// Only the embedding application mutates it between the two phases:
/// setting `authorized`, optionally attaching `user_data`, adjusting the
/// TTLs, or supplying `force_access_data` to replay an existing grant.
#[derive(Debug, Clone)]
pub struct AccessRequest {
    /// The grant type that produced this request.
    pub grant_type: GrantType,

    /// The authorization code or refresh token presented by the client.
    pub code: String,

    /// The resolved client.
    pub client: Client,

    /// Authorization record loaded for the `authorization_code` grant.
    pub authorize_data: Option<AuthorizeData>,

    /// Prior access record loaded for the `refresh_token` grant.
    pub access_data: Option<AccessData>,

    /// When set, the finalizer adopts this record verbatim instead of
    /// minting a new one, allowing deterministic replay of a grant.
    pub force_access_data: Option<AccessData>,

    /// Redirect URI resolved by the handler. When non-empty it overrides
    /// whatever the form carries at finalization.
    pub redirect_uri: String,

    /// Requested scope.
    pub scope: String,

    /// Resource-owner username (`password` grant) or the caller-supplied
    /// user id (`anonymous` grant).
    pub username: String,

    /// Resource-owner password for the `password` grant. The `device` and
    /// `platform` grants reuse this field for the device id and platform
    /// token respectively; the authorized-decision callback reads them from
    /// here.
    pub password: String,

    /// Assertion type for the `assertion` grant.
    pub assertion_type: String,

    /// Assertion payload for the `assertion` grant.
    pub assertion: String,

    /// PKCE code verifier submitted with the code exchange.
    pub code_verifier: String,

    /// Set by the embedding application once the request is authorized.
    pub authorized: bool,

    /// Access token lifetime in seconds. Seeded from configuration; change
    /// if a different lifetime is needed.
    pub expiration: i64,

    /// Refresh token lifetime in seconds. Seeded from configuration.
    pub refresh_expiration: i64,

    /// Whether a refresh token should be generated.
    pub generate_refresh: bool,

    /// Opaque payload passed through to storage. Never inspected by this
    /// crate.
    pub user_data: serde_json::Value,

    /// Suppress the `access_token`/`refresh_token` cookies for this
    /// request.
    pub skip_set_cookie: bool,

    /// The decoded endpoint request, attached for the caller's use.
    pub request: TokenEndpointRequest,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_grant_type_roundtrip() {
        let all = [
            GrantType::AuthorizationCode,
            GrantType::RefreshToken,
            GrantType::Password,
            GrantType::ClientCredentials,
            GrantType::Assertion,
            GrantType::Anonymous,
            GrantType::Device,
            GrantType::Platform,
        ];
        for grant in all {
            assert_eq!(GrantType::parse(grant.as_str()), Some(grant));
        }
    }

    #[test]
    fn test_grant_type_parse_rejects_unknown() {
        assert_eq!(GrantType::parse("foo"), None);
        assert_eq!(GrantType::parse(""), None);
        assert_eq!(GrantType::parse("AUTHORIZATION_CODE"), None);
    }

    #[test]
    fn test_grant_type_serde_matches_wire_names() {
        let json = serde_json::to_string(&GrantType::AuthorizationCode)
            .expect("grant type should serialize");
        assert_eq!(json, r#""authorization_code""#);

        let parsed: GrantType =
            serde_json::from_str(r#""client_credentials""#).expect("grant type should parse");
        assert_eq!(parsed, GrantType::ClientCredentials);
    }
}
