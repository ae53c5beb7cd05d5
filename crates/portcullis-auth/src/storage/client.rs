//! Client registration storage trait.

use async_trait::async_trait;

use crate::AuthResult;
use crate::types::Client;

/// Storage trait for OAuth client registrations.
#[async_trait]
pub trait ClientStorage: Send + Sync {
    /// Looks up a client by its client id.
    ///
    /// Returns `Ok(None)` when no client is registered under `client_id`.
    ///
    /// # Errors
    ///
    /// Returns an error if the lookup itself fails.
    async fn find_by_client_id(&self, client_id: &str) -> AuthResult<Option<Client>>;

    /// Verifies a client secret.
    ///
    /// The comparison must not leak timing information about the stored
    /// secret; backends storing hashes verify against the hash here.
    ///
    /// Returns `Ok(false)` for an unknown client or a mismatched secret.
    ///
    /// # Errors
    ///
    /// Returns an error if the verification cannot be performed.
    async fn verify_secret(&self, client_id: &str, secret: &str) -> AuthResult<bool>;
}
