//! Token-generator trait.

use async_trait::async_trait;

use crate::AuthResult;
use crate::types::AccessData;

/// An access/refresh token pair produced by a generator.
#[derive(Debug, Clone)]
pub struct TokenPair {
    /// The access token string.
    pub access_token: String,

    /// The refresh token string, when one was requested.
    pub refresh_token: Option<String>,
}

/// Mints token strings for a new access grant.
///
/// The generator receives the grant record with its token fields still
/// empty; everything else (client, scope, TTLs, `user_data`) is already
/// populated, so claim-bearing implementations can derive token contents
/// from it.
#[async_trait]
pub trait AccessTokenGenerator: Send + Sync {
    /// Generates an access token, and a refresh token when
    /// `generate_refresh` is set.
    ///
    /// # Errors
    ///
    /// Returns an error if token material cannot be produced; the server
    /// reports this to the client as `server_error`.
    async fn generate(&self, data: &AccessData, generate_refresh: bool) -> AuthResult<TokenPair>;
}
