//! Registered redirect-URI list helpers.
//!
//! A client registers its redirect URIs as one separator-delimited string;
//! the separator comes from server configuration. An empty separator means
//! the registration holds a single URI.

use crate::AuthResult;
use crate::error::AuthError;

/// Returns the first URI of a registered list.
#[must_use]
pub fn first_uri(registered: &str, separator: &str) -> String {
    if separator.is_empty() {
        registered.to_string()
    } else {
        registered
            .split(separator)
            .next()
            .unwrap_or_default()
            .to_string()
    }
}

/// Validates that `uri` is one of the registered URIs.
///
/// # Errors
///
/// Returns `invalid_request` when the URI is not in the list.
pub fn validate_uri_list(registered: &str, uri: &str, separator: &str) -> AuthResult<()> {
    let allowed = if separator.is_empty() {
        registered == uri
    } else {
        registered.split(separator).any(|candidate| candidate == uri)
    };

    if allowed {
        Ok(())
    } else {
        Err(AuthError::invalid_request(format!(
            "redirect_uri '{uri}' is not registered for the client"
        )))
    }
}
