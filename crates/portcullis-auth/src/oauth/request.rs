//! Decoded token-endpoint request.
//!
//! [`TokenEndpointRequest`] is the transport-neutral view the grant core
//! works on: the HTTP method, a flat form map merged from the query string
//! and the urlencoded body, the raw `Authorization` header, and the parsed
//! `Cookie` header. How those parts are obtained from the HTTP framework is
//! up to the embedding application.

use std::collections::HashMap;

use base64::{Engine, engine::general_purpose::STANDARD};
use http::{HeaderMap, Method, header};
use url::form_urlencoded;

use crate::AuthResult;
use crate::error::AuthError;

/// Client credentials as presented by the request, either from the
/// `Authorization: Basic` header or from the form body.
#[derive(Debug, Clone)]
pub struct BasicCredentials {
    /// The client id.
    pub username: String,

    /// The client secret. May be empty.
    pub password: String,
}

/// A decoded token-endpoint request.
#[derive(Debug, Clone)]
pub struct TokenEndpointRequest {
    /// The HTTP method of the request.
    pub method: Method,
    form: HashMap<String, String>,
    authorization: Option<String>,
    cookies: HashMap<String, String>,
}

impl TokenEndpointRequest {
    /// Decodes a request from its HTTP parts.
    ///
    /// Form parameters from the body take precedence over duplicates in the
    /// query string.
    ///
    /// # Errors
    ///
    /// Returns `invalid_request` when the body is not decodable as an
    /// urlencoded form.
    pub fn from_http(
        method: Method,
        headers: &HeaderMap,
        query: Option<&str>,
        body: &[u8],
    ) -> AuthResult<Self> {
        let body = std::str::from_utf8(body)
            .map_err(|_| AuthError::invalid_request("request body is not valid UTF-8"))?;

        let mut form = HashMap::new();
        for (name, value) in form_urlencoded::parse(body.as_bytes()) {
            form.entry(name.into_owned()).or_insert(value.into_owned());
        }
        if let Some(query) = query {
            for (name, value) in form_urlencoded::parse(query.as_bytes()) {
                form.entry(name.into_owned()).or_insert(value.into_owned());
            }
        }

        let authorization = headers
            .get(header::AUTHORIZATION)
            .and_then(|value| value.to_str().ok())
            .map(str::to_owned);

        Ok(Self {
            method,
            form,
            authorization,
            cookies: parse_cookies(headers),
        })
    }

    /// Creates an empty `POST` request. Intended for tests and embedders
    /// that decode the form themselves.
    #[must_use]
    pub fn post() -> Self {
        Self {
            method: Method::POST,
            form: HashMap::new(),
            authorization: None,
            cookies: HashMap::new(),
        }
    }

    /// Creates an empty `GET` request.
    #[must_use]
    pub fn get() -> Self {
        Self {
            method: Method::GET,
            ..Self::post()
        }
    }

    /// Sets a form parameter.
    #[must_use]
    pub fn with_param(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.form.insert(name.into(), value.into());
        self
    }

    /// Sets an `Authorization: Basic` header from raw credentials.
    #[must_use]
    pub fn with_basic_auth(mut self, username: &str, password: &str) -> Self {
        let encoded = STANDARD.encode(format!("{username}:{password}"));
        self.authorization = Some(format!("Basic {encoded}"));
        self
    }

    /// Sets a cookie.
    #[must_use]
    pub fn with_cookie(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.cookies.insert(name.into(), value.into());
        self
    }

    /// Returns a form parameter, or `""` when absent.
    #[must_use]
    pub fn form(&self, name: &str) -> &str {
        self.form.get(name).map(String::as_str).unwrap_or("")
    }

    /// Returns a cookie value.
    #[must_use]
    pub fn cookie(&self, name: &str) -> Option<&str> {
        self.cookies.get(name).map(String::as_str)
    }

    /// Parses the `Authorization: Basic` header, if present.
    ///
    /// # Errors
    ///
    /// Returns `invalid_request` when the header is present but malformed:
    /// wrong scheme, undecodable base64, or credentials without a colon.
    pub fn basic_auth(&self) -> AuthResult<Option<BasicCredentials>> {
        let Some(header_value) = self.authorization.as_deref() else {
            return Ok(None);
        };

        let encoded = header_value
            .trim()
            .strip_prefix("Basic ")
            .ok_or_else(|| AuthError::invalid_request("unsupported Authorization scheme"))?;
        let decoded = STANDARD
            .decode(encoded.trim())
            .map_err(|_| AuthError::invalid_request("invalid base64 in Authorization header"))?;
        let credentials = String::from_utf8(decoded)
            .map_err(|_| AuthError::invalid_request("invalid UTF-8 in Authorization header"))?;

        // Split on the first colon; the secret may contain colons.
        let (username, password) = credentials
            .split_once(':')
            .ok_or_else(|| AuthError::invalid_request("credentials must be in id:secret form"))?;

        Ok(Some(BasicCredentials {
            username: username.to_string(),
            password: password.to_string(),
        }))
    }

    /// Extracts client credentials: the `Authorization: Basic` header first,
    /// then the `client_id`/`client_secret` form fields when
    /// `allow_secret_in_params` permits it.
    ///
    /// # Errors
    ///
    /// Returns `invalid_request` when the header is malformed or no
    /// credentials were sent at all.
    pub fn client_credentials(&self, allow_secret_in_params: bool) -> AuthResult<BasicCredentials> {
        if let Some(credentials) = self.basic_auth()? {
            return Ok(credentials);
        }

        if allow_secret_in_params {
            let client_id = self.form("client_id");
            if !client_id.is_empty() {
                return Ok(BasicCredentials {
                    username: client_id.to_string(),
                    password: self.form("client_secret").to_string(),
                });
            }
        }

        Err(AuthError::invalid_request("client authentication not sent"))
    }
}

/// Parses the `Cookie` header into a name/value map.
fn parse_cookies(headers: &HeaderMap) -> HashMap<String, String> {
    let mut cookies = HashMap::new();
    let Some(value) = headers
        .get(header::COOKIE)
        .and_then(|value| value.to_str().ok())
    else {
        return cookies;
    };

    for cookie in value.split(';') {
        if let Some((name, value)) = cookie.trim().split_once('=') {
            let value = value.trim();
            if !value.is_empty() {
                cookies.insert(name.trim().to_string(), value.to_string());
            }
        }
    }
    cookies
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_http_merges_query_and_body() {
        let headers = HeaderMap::new();
        let request = TokenEndpointRequest::from_http(
            Method::POST,
            &headers,
            Some("grant_type=password&scope=from_query"),
            b"scope=from_body&username=u1",
        )
        .expect("request should decode");

        assert_eq!(request.form("grant_type"), "password");
        assert_eq!(request.form("username"), "u1");
        // Body wins over query for duplicates.
        assert_eq!(request.form("scope"), "from_body");
        assert_eq!(request.form("missing"), "");
    }

    #[test]
    fn test_from_http_decodes_percent_escapes() {
        let headers = HeaderMap::new();
        let request = TokenEndpointRequest::from_http(
            Method::POST,
            &headers,
            None,
            b"redirect_uri=https%3A%2F%2Fx%2Fcb&scope=read%2Cwrite",
        )
        .expect("request should decode");

        assert_eq!(request.form("redirect_uri"), "https://x/cb");
        assert_eq!(request.form("scope"), "read,write");
    }

    #[test]
    fn test_from_http_rejects_non_utf8_body() {
        let headers = HeaderMap::new();
        let result =
            TokenEndpointRequest::from_http(Method::POST, &headers, None, &[0x80, 0xff, 0x00]);
        assert!(matches!(result, Err(AuthError::InvalidRequest { .. })));
    }

    #[test]
    fn test_from_http_reads_cookies() {
        let mut headers = HeaderMap::new();
        headers.insert(
            header::COOKIE,
            "refresh_token=r123; other=x".parse().expect("header value"),
        );
        let request = TokenEndpointRequest::from_http(Method::POST, &headers, None, b"")
            .expect("request should decode");

        assert_eq!(request.cookie("refresh_token"), Some("r123"));
        assert_eq!(request.cookie("other"), Some("x"));
        assert_eq!(request.cookie("absent"), None);
    }

    #[test]
    fn test_basic_auth_roundtrip() {
        let request = TokenEndpointRequest::post().with_basic_auth("c1", "s1");
        let credentials = request
            .basic_auth()
            .expect("header should parse")
            .expect("credentials present");
        assert_eq!(credentials.username, "c1");
        assert_eq!(credentials.password, "s1");
    }

    #[test]
    fn test_basic_auth_password_may_contain_colons() {
        let request = TokenEndpointRequest::post().with_basic_auth("c1", "pa:ss:word");
        let credentials = request
            .basic_auth()
            .expect("header should parse")
            .expect("credentials present");
        assert_eq!(credentials.username, "c1");
        assert_eq!(credentials.password, "pa:ss:word");
    }

    #[test]
    fn test_basic_auth_absent() {
        let request = TokenEndpointRequest::post();
        assert!(request.basic_auth().expect("no header is fine").is_none());
    }

    #[test]
    fn test_basic_auth_rejects_other_schemes() {
        let mut request = TokenEndpointRequest::post();
        request.authorization = Some("Bearer tok".to_string());
        assert!(matches!(
            request.basic_auth(),
            Err(AuthError::InvalidRequest { .. })
        ));
    }

    #[test]
    fn test_basic_auth_rejects_bad_base64() {
        let mut request = TokenEndpointRequest::post();
        request.authorization = Some("Basic !!!not-base64!!!".to_string());
        assert!(matches!(
            request.basic_auth(),
            Err(AuthError::InvalidRequest { .. })
        ));
    }

    #[test]
    fn test_basic_auth_rejects_missing_colon() {
        let mut request = TokenEndpointRequest::post();
        request.authorization = Some(format!("Basic {}", STANDARD.encode("no-colon")));
        assert!(matches!(
            request.basic_auth(),
            Err(AuthError::InvalidRequest { .. })
        ));
    }

    #[test]
    fn test_client_credentials_header_wins_over_params() {
        let request = TokenEndpointRequest::post()
            .with_basic_auth("header-client", "header-secret")
            .with_param("client_id", "param-client")
            .with_param("client_secret", "param-secret");

        let credentials = request
            .client_credentials(true)
            .expect("credentials present");
        assert_eq!(credentials.username, "header-client");
        assert_eq!(credentials.password, "header-secret");
    }

    #[test]
    fn test_client_credentials_params_fallback() {
        let request = TokenEndpointRequest::post()
            .with_param("client_id", "c1")
            .with_param("client_secret", "s1");

        let credentials = request
            .client_credentials(true)
            .expect("credentials present");
        assert_eq!(credentials.username, "c1");
        assert_eq!(credentials.password, "s1");
    }

    #[test]
    fn test_client_credentials_params_disallowed() {
        let request = TokenEndpointRequest::post()
            .with_param("client_id", "c1")
            .with_param("client_secret", "s1");

        assert!(matches!(
            request.client_credentials(false),
            Err(AuthError::InvalidRequest { .. })
        ));
    }

    #[test]
    fn test_client_credentials_not_sent() {
        let request = TokenEndpointRequest::post();
        assert!(matches!(
            request.client_credentials(true),
            Err(AuthError::InvalidRequest { .. })
        ));
    }
}
