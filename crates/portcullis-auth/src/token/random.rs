//! Default opaque-token generator.

use async_trait::async_trait;
use base64::{Engine, engine::general_purpose::URL_SAFE_NO_PAD};

use crate::AuthResult;
use crate::token::generator::{AccessTokenGenerator, TokenPair};
use crate::types::AccessData;

/// Generates opaque tokens: 32 random bytes, base64url without padding
/// (43 characters).
#[derive(Debug, Clone, Copy, Default)]
pub struct RandomTokenGenerator;

fn random_token() -> String {
    use rand::Rng;
    let mut rng = rand::thread_rng();
    // `gen` is a reserved keyword in Rust 2024, so we use r#gen
    let bytes: [u8; 32] = rng.r#gen();
    URL_SAFE_NO_PAD.encode(bytes)
}

#[async_trait]
impl AccessTokenGenerator for RandomTokenGenerator {
    async fn generate(&self, _data: &AccessData, generate_refresh: bool) -> AuthResult<TokenPair> {
        Ok(TokenPair {
            access_token: random_token(),
            refresh_token: generate_refresh.then(random_token),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Client;
    use time::OffsetDateTime;

    fn access_data() -> AccessData {
        AccessData {
            client: Client::new("c1", None, "https://x/cb"),
            authorize_code: None,
            prior_access_token: None,
            access_token: String::new(),
            refresh_token: None,
            expires_in: 3600,
            refresh_expires_in: 86400,
            scope: String::new(),
            redirect_uri: "https://x/cb".to_string(),
            created_at: OffsetDateTime::now_utc(),
            user_data: serde_json::Value::Null,
        }
    }

    #[tokio::test]
    async fn test_generates_43_char_tokens() {
        let pair = RandomTokenGenerator
            .generate(&access_data(), true)
            .await
            .expect("generation should succeed");

        assert_eq!(pair.access_token.len(), 43);
        let refresh = pair.refresh_token.expect("refresh token requested");
        assert_eq!(refresh.len(), 43);
        assert_ne!(pair.access_token, refresh);
    }

    #[tokio::test]
    async fn test_skips_refresh_when_not_requested() {
        let pair = RandomTokenGenerator
            .generate(&access_data(), false)
            .await
            .expect("generation should succeed");
        assert!(pair.refresh_token.is_none());
    }

    #[tokio::test]
    async fn test_tokens_are_unique() {
        let a = RandomTokenGenerator
            .generate(&access_data(), false)
            .await
            .expect("generation should succeed");
        let b = RandomTokenGenerator
            .generate(&access_data(), false)
            .await
            .expect("generation should succeed");
        assert_ne!(a.access_token, b.access_token);
    }
}
