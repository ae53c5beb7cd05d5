//! Client resolution for the token endpoint.
//!
//! Two paths exist. Grants where the client presents its secret go through
//! [`authenticate_client`]; the dual-auth grants (`authorization_code`,
//! `platform`) fall back to [`resolve_client_without_secret`] when no
//! `Authorization` header was sent, and the two paths report failures under
//! different OAuth codes (`invalid_client` vs `unauthorized_client`).

use tracing::warn;

use crate::AuthResult;
use crate::error::AuthError;
use crate::oauth::request::BasicCredentials;
use crate::storage::ClientStorage;
use crate::types::Client;

/// Resolves and authenticates a client from presented credentials.
///
/// # Errors
///
/// - `server_error` when the lookup or secret verification fails
/// - `invalid_client` when the client is unknown, the secret does not
///   match, or the client has no registered redirect URI
pub async fn authenticate_client(
    storage: &dyn ClientStorage,
    credentials: &BasicCredentials,
) -> AuthResult<Client> {
    let client = storage
        .find_by_client_id(&credentials.username)
        .await
        .map_err(|error| {
            warn!(client_id = %credentials.username, %error, "client lookup failed");
            AuthError::storage("failed to load client")
        })?
        .ok_or_else(|| AuthError::invalid_client("client not found"))?;

    let valid = storage
        .verify_secret(&credentials.username, &credentials.password)
        .await
        .map_err(|error| {
            warn!(client_id = %credentials.username, %error, "secret verification failed");
            AuthError::storage("failed to verify client secret")
        })?;
    if !valid {
        return Err(AuthError::invalid_client("client secret does not match"));
    }

    if !client.has_redirect_uri() {
        return Err(AuthError::invalid_client(
            "client has no registered redirect uri",
        ));
    }

    Ok(client)
}

/// Resolves a client that is not expected to present its secret.
///
/// # Errors
///
/// - `server_error` when the lookup fails
/// - `unauthorized_client` when the client is unknown or has no registered
///   redirect URI
pub async fn resolve_client_without_secret(
    storage: &dyn ClientStorage,
    client_id: &str,
) -> AuthResult<Client> {
    let client = storage
        .find_by_client_id(client_id)
        .await
        .map_err(|error| {
            warn!(client_id = %client_id, %error, "client lookup failed");
            AuthError::storage("failed to load client")
        })?
        .ok_or_else(|| AuthError::unauthorized_client("client not found"))?;

    if !client.has_redirect_uri() {
        return Err(AuthError::unauthorized_client(
            "client has no registered redirect uri",
        ));
    }

    Ok(client)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::sync::RwLock;

    /// Mock client storage for testing.
    struct MockClientStorage {
        clients: RwLock<HashMap<String, Client>>,
        fail: bool,
    }

    impl MockClientStorage {
        fn new() -> Self {
            Self {
                clients: RwLock::new(HashMap::new()),
                fail: false,
            }
        }

        fn failing() -> Self {
            Self {
                clients: RwLock::new(HashMap::new()),
                fail: true,
            }
        }

        fn add_client(&self, client: Client) {
            self.clients
                .write()
                .unwrap()
                .insert(client.client_id.clone(), client);
        }
    }

    #[async_trait::async_trait]
    impl ClientStorage for MockClientStorage {
        async fn find_by_client_id(&self, client_id: &str) -> AuthResult<Option<Client>> {
            if self.fail {
                return Err(AuthError::storage("backend down"));
            }
            Ok(self.clients.read().unwrap().get(client_id).cloned())
        }

        async fn verify_secret(&self, client_id: &str, secret: &str) -> AuthResult<bool> {
            if self.fail {
                return Err(AuthError::storage("backend down"));
            }
            Ok(self
                .clients
                .read()
                .unwrap()
                .get(client_id)
                .is_some_and(|client| client.secret.as_deref() == Some(secret)))
        }
    }

    fn credentials(username: &str, password: &str) -> BasicCredentials {
        BasicCredentials {
            username: username.to_string(),
            password: password.to_string(),
        }
    }

    #[tokio::test]
    async fn test_authenticate_success() {
        let storage = MockClientStorage::new();
        storage.add_client(Client::new("c1", Some("s1".to_string()), "https://x/cb"));

        let client = authenticate_client(&storage, &credentials("c1", "s1"))
            .await
            .expect("authentication should succeed");
        assert_eq!(client.client_id, "c1");
    }

    #[tokio::test]
    async fn test_authenticate_unknown_client() {
        let storage = MockClientStorage::new();
        let result = authenticate_client(&storage, &credentials("nope", "s1")).await;
        assert!(matches!(result, Err(AuthError::InvalidClient { .. })));
    }

    #[tokio::test]
    async fn test_authenticate_wrong_secret() {
        let storage = MockClientStorage::new();
        storage.add_client(Client::new("c1", Some("s1".to_string()), "https://x/cb"));

        let result = authenticate_client(&storage, &credentials("c1", "wrong")).await;
        assert!(matches!(result, Err(AuthError::InvalidClient { .. })));
    }

    #[tokio::test]
    async fn test_authenticate_empty_redirect_uri() {
        let storage = MockClientStorage::new();
        storage.add_client(Client::new("c1", Some("s1".to_string()), ""));

        let result = authenticate_client(&storage, &credentials("c1", "s1")).await;
        assert!(matches!(result, Err(AuthError::InvalidClient { .. })));
    }

    #[tokio::test]
    async fn test_authenticate_storage_failure_is_server_error() {
        let storage = MockClientStorage::failing();
        let result = authenticate_client(&storage, &credentials("c1", "s1")).await;
        assert!(matches!(result, Err(AuthError::Storage { .. })));
    }

    #[tokio::test]
    async fn test_without_secret_success() {
        let storage = MockClientStorage::new();
        storage.add_client(Client::new("c1", None, "https://x/cb"));

        let client = resolve_client_without_secret(&storage, "c1")
            .await
            .expect("resolution should succeed");
        assert_eq!(client.client_id, "c1");
    }

    #[tokio::test]
    async fn test_without_secret_unknown_client() {
        let storage = MockClientStorage::new();
        let result = resolve_client_without_secret(&storage, "nope").await;
        assert!(matches!(result, Err(AuthError::UnauthorizedClient { .. })));
    }

    #[tokio::test]
    async fn test_without_secret_empty_redirect_uri() {
        let storage = MockClientStorage::new();
        storage.add_client(Client::new("c1", None, ""));

        let result = resolve_client_without_secret(&storage, "c1").await;
        assert!(matches!(result, Err(AuthError::UnauthorizedClient { .. })));
    }
}
