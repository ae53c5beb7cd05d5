//! Authorization-code storage trait.

use async_trait::async_trait;

use crate::AuthResult;
use crate::types::AuthorizeData;

/// Storage trait for authorization-code records.
///
/// Codes are single-use: the token server removes a record with
/// [`remove_by_code`](AuthorizationStorage::remove_by_code) immediately
/// after the new access grant is persisted.
#[async_trait]
pub trait AuthorizationStorage: Send + Sync {
    /// Looks up an authorization record by its code.
    ///
    /// Returns `Ok(None)` when the code is unknown.
    ///
    /// # Errors
    ///
    /// Returns an error if the lookup itself fails.
    async fn find_by_code(&self, code: &str) -> AuthResult<Option<AuthorizeData>>;

    /// Removes an authorization record by its code.
    ///
    /// Removing an unknown code is not an error.
    ///
    /// # Errors
    ///
    /// Returns an error if the removal fails.
    async fn remove_by_code(&self, code: &str) -> AuthResult<()>;
}
