//! The in-memory store.

use std::collections::HashMap;

use async_trait::async_trait;
use subtle::ConstantTimeEq;
use tokio::sync::RwLock;

use portcullis_auth::storage::{AccessStorage, AuthorizationStorage, ClientStorage};
use portcullis_auth::types::{AccessData, AuthorizeData, Client};
use portcullis_auth::AuthResult;

/// In-memory implementation of the three storage traits.
///
/// Access grants are keyed by access token; a secondary map indexes them by
/// refresh token. Client secrets are compared in constant time.
#[derive(Debug, Default)]
pub struct MemoryStore {
    clients: RwLock<HashMap<String, Client>>,
    authorizations: RwLock<HashMap<String, AuthorizeData>>,
    access_grants: RwLock<HashMap<String, AccessData>>,
    refresh_index: RwLock<HashMap<String, String>>,
}

impl MemoryStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a client.
    pub async fn add_client(&self, client: Client) {
        self.clients
            .write()
            .await
            .insert(client.client_id.clone(), client);
    }

    /// Stores an authorization-code record.
    pub async fn add_authorization(&self, data: AuthorizeData) {
        self.authorizations
            .write()
            .await
            .insert(data.code.clone(), data);
    }

    /// Returns an authorization record, if present. Test introspection.
    pub async fn authorization(&self, code: &str) -> Option<AuthorizeData> {
        self.authorizations.read().await.get(code).cloned()
    }

    /// Returns an access grant by its access token. Test introspection.
    pub async fn access_grant(&self, access_token: &str) -> Option<AccessData> {
        self.access_grants.read().await.get(access_token).cloned()
    }

    /// Number of stored access grants. Test introspection.
    pub async fn access_grant_count(&self) -> usize {
        self.access_grants.read().await.len()
    }
}

#[async_trait]
impl ClientStorage for MemoryStore {
    async fn find_by_client_id(&self, client_id: &str) -> AuthResult<Option<Client>> {
        Ok(self.clients.read().await.get(client_id).cloned())
    }

    async fn verify_secret(&self, client_id: &str, secret: &str) -> AuthResult<bool> {
        let clients = self.clients.read().await;
        let Some(client) = clients.get(client_id) else {
            return Ok(false);
        };
        let expected = client.secret.as_deref().unwrap_or_default();
        Ok(expected.as_bytes().ct_eq(secret.as_bytes()).into())
    }
}

#[async_trait]
impl AuthorizationStorage for MemoryStore {
    async fn find_by_code(&self, code: &str) -> AuthResult<Option<AuthorizeData>> {
        Ok(self.authorizations.read().await.get(code).cloned())
    }

    async fn remove_by_code(&self, code: &str) -> AuthResult<()> {
        self.authorizations.write().await.remove(code);
        Ok(())
    }
}

#[async_trait]
impl AccessStorage for MemoryStore {
    async fn save(&self, data: &AccessData) -> AuthResult<()> {
        if let Some(refresh_token) = data.refresh_token.as_deref()
            && !refresh_token.is_empty()
        {
            self.refresh_index
                .write()
                .await
                .insert(refresh_token.to_string(), data.access_token.clone());
        }
        self.access_grants
            .write()
            .await
            .insert(data.access_token.clone(), data.clone());
        Ok(())
    }

    async fn find_by_refresh_token(&self, refresh_token: &str) -> AuthResult<Option<AccessData>> {
        let access_token = {
            let index = self.refresh_index.read().await;
            index.get(refresh_token).cloned()
        };
        let Some(access_token) = access_token else {
            return Ok(None);
        };
        Ok(self.access_grants.read().await.get(&access_token).cloned())
    }

    async fn remove_by_access_token(&self, access_token: &str) -> AuthResult<()> {
        let removed = self.access_grants.write().await.remove(access_token);
        if let Some(data) = removed
            && let Some(refresh_token) = data.refresh_token.as_deref()
        {
            self.refresh_index.write().await.remove(refresh_token);
        }
        Ok(())
    }
}
