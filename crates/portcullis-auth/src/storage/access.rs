//! Access-grant storage trait.

use async_trait::async_trait;

use crate::AuthResult;
use crate::types::AccessData;

/// Storage trait for access-grant records.
///
/// Records are keyed by access token; refresh-token lookup is a secondary
/// index. The token server always persists the new record **before**
/// removing its predecessors, so a crash between the two steps can leave a
/// stale record behind but never destroys both grants.
#[async_trait]
pub trait AccessStorage: Send + Sync {
    /// Persists an access-grant record.
    ///
    /// # Errors
    ///
    /// Returns an error if the record cannot be stored.
    async fn save(&self, data: &AccessData) -> AuthResult<()>;

    /// Looks up an access-grant record by its refresh token.
    ///
    /// Returns `Ok(None)` when the refresh token is unknown.
    ///
    /// # Errors
    ///
    /// Returns an error if the lookup itself fails.
    async fn find_by_refresh_token(&self, refresh_token: &str) -> AuthResult<Option<AccessData>>;

    /// Removes an access-grant record by its access token.
    ///
    /// Removing an unknown token is not an error.
    ///
    /// # Errors
    ///
    /// Returns an error if the removal fails.
    async fn remove_by_access_token(&self, access_token: &str) -> AuthResult<()>;
}
