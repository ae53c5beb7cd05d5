//! Server and cookie configuration.
//!
//! # Example (TOML)
//!
//! ```toml
//! allowed_access_types = ["authorization_code", "refresh_token"]
//! allow_get_access_request = false
//! access_expiration = "1h"
//! refresh_expiration = "90d"
//! redirect_uri_separator = "|"
//! token_type = "Bearer"
//!
//! [cookie]
//! domain = "example.com"
//! same_site = "lax"
//! ```

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::oauth::access_request::GrantType;

/// Configuration for the token server.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Grant types the token endpoint will accept.
    pub allowed_access_types: Vec<GrantType>,

    /// Accept `GET` requests at the token endpoint.
    /// Off by default; the token endpoint should only see `POST`.
    pub allow_get_access_request: bool,

    /// Accept `client_id`/`client_secret` in the form body when no
    /// `Authorization: Basic` header is present.
    pub allow_client_secret_in_params: bool,

    /// Access token lifetime.
    #[serde(with = "humantime_serde")]
    pub access_expiration: Duration,

    /// Refresh token lifetime.
    #[serde(with = "humantime_serde")]
    pub refresh_expiration: Duration,

    /// Separator for the client's registered redirect-URI list.
    /// An empty separator means the list holds a single URI.
    pub redirect_uri_separator: String,

    /// Keep the previous access record alive after a refresh instead of
    /// removing it.
    pub retain_token_after_refresh: bool,

    /// Value of the `token_type` response field.
    pub token_type: String,

    /// Token cookie settings.
    pub cookie: CookieConfig,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            allowed_access_types: vec![
                GrantType::AuthorizationCode,
                GrantType::RefreshToken,
                GrantType::ClientCredentials,
            ],
            allow_get_access_request: false,
            allow_client_secret_in_params: false,
            access_expiration: Duration::from_secs(3600),
            refresh_expiration: Duration::from_secs(90 * 24 * 3600),
            redirect_uri_separator: String::new(),
            retain_token_after_refresh: false,
            token_type: "Bearer".to_string(),
            cookie: CookieConfig::default(),
        }
    }
}

impl ServerConfig {
    /// Access token lifetime in whole seconds.
    #[must_use]
    pub fn access_expiration_secs(&self) -> i64 {
        self.access_expiration.as_secs() as i64
    }

    /// Refresh token lifetime in whole seconds.
    #[must_use]
    pub fn refresh_expiration_secs(&self) -> i64 {
        self.refresh_expiration.as_secs() as i64
    }
}

/// Settings for the `access_token` and `refresh_token` cookies written by
/// the finalizer.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct CookieConfig {
    /// Write token cookies at all. Individual requests can still suppress
    /// them (`skip_set_cookie`).
    pub enabled: bool,

    /// Cookie `Domain` attribute. Omitted when `None`.
    pub domain: Option<String>,

    /// Cookie `Path` attribute.
    pub path: String,

    /// Set the `Secure` attribute.
    pub secure: bool,

    /// Set the `HttpOnly` attribute.
    pub http_only: bool,

    /// `SameSite` attribute: `"strict"`, `"lax"`, or `"none"`.
    pub same_site: String,
}

impl Default for CookieConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            domain: None,
            path: "/".to_string(),
            secure: true,
            http_only: true,
            same_site: "lax".to_string(),
        }
    }
}

impl CookieConfig {
    /// Builds a `Set-Cookie` header value, or `None` when cookies are
    /// disabled.
    #[must_use]
    pub fn build_cookie(&self, name: &str, value: &str, max_age: i64) -> Option<String> {
        if !self.enabled {
            return None;
        }

        let mut cookie = format!("{}={}; Max-Age={}; Path={}", name, value, max_age, self.path);

        if let Some(domain) = &self.domain {
            cookie.push_str("; Domain=");
            cookie.push_str(domain);
        }
        if self.http_only {
            cookie.push_str("; HttpOnly");
        }
        if self.secure {
            cookie.push_str("; Secure");
        }
        let same_site = match self.same_site.as_str() {
            "strict" => "Strict",
            "none" => "None",
            _ => "Lax",
        };
        cookie.push_str("; SameSite=");
        cookie.push_str(same_site);

        Some(cookie)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_defaults() {
        let config = ServerConfig::default();
        assert_eq!(config.access_expiration_secs(), 3600);
        assert_eq!(config.refresh_expiration_secs(), 90 * 24 * 3600);
        assert_eq!(config.token_type, "Bearer");
        assert!(!config.allow_get_access_request);
        assert!(!config.allow_client_secret_in_params);
        assert!(!config.retain_token_after_refresh);
        assert!(config.redirect_uri_separator.is_empty());
        assert!(
            config
                .allowed_access_types
                .contains(&GrantType::AuthorizationCode)
        );
    }

    #[test]
    fn test_config_deserializes_humantime_durations() {
        let config: ServerConfig = serde_json::from_str(
            r#"{
                "allowed_access_types": ["authorization_code", "device"],
                "access_expiration": "30m",
                "refresh_expiration": "7d",
                "redirect_uri_separator": "|"
            }"#,
        )
        .expect("config should deserialize");

        assert_eq!(config.access_expiration_secs(), 1800);
        assert_eq!(config.refresh_expiration_secs(), 7 * 24 * 3600);
        assert_eq!(config.redirect_uri_separator, "|");
        assert_eq!(
            config.allowed_access_types,
            vec![GrantType::AuthorizationCode, GrantType::Device]
        );
    }

    #[test]
    fn test_build_cookie() {
        let config = CookieConfig {
            enabled: true,
            domain: Some("example.com".to_string()),
            path: "/".to_string(),
            secure: true,
            http_only: true,
            same_site: "strict".to_string(),
        };

        let cookie = config
            .build_cookie("access_token", "tok123", 3600)
            .expect("cookie should be built");
        assert!(cookie.contains("access_token=tok123"));
        assert!(cookie.contains("Max-Age=3600"));
        assert!(cookie.contains("Domain=example.com"));
        assert!(cookie.contains("HttpOnly"));
        assert!(cookie.contains("Secure"));
        assert!(cookie.contains("SameSite=Strict"));
    }

    #[test]
    fn test_build_cookie_disabled() {
        let config = CookieConfig {
            enabled: false,
            ..CookieConfig::default()
        };
        assert!(config.build_cookie("access_token", "tok", 60).is_none());
    }

    #[test]
    fn test_build_cookie_without_domain() {
        let config = CookieConfig::default();
        let cookie = config
            .build_cookie("refresh_token", "r1", 60)
            .expect("cookie should be built");
        assert!(!cookie.contains("Domain="));
        assert!(cookie.contains("SameSite=Lax"));
    }
}
