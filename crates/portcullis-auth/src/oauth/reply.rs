//! The token-endpoint reply sink.
//!
//! A [`TokenReply`] collects everything the token endpoint wants to say:
//! either a typed OAuth error, or an output map plus `Set-Cookie` header
//! values. The grant dispatcher and the finalizer write into it; the
//! embedding HTTP layer renders it.
//!
//! Infrastructure failures are masked: the client sees `server_error` with
//! a generic description while the original [`AuthError`] stays on the
//! reply for logging.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::AuthError;

/// OAuth 2.0 token-endpoint error codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorCode {
    /// The request is missing a required parameter or is otherwise
    /// malformed.
    InvalidRequest,

    /// Client authentication failed.
    InvalidClient,

    /// The client is not authorized to use this grant.
    UnauthorizedClient,

    /// The grant or refresh token is invalid, expired, or was issued to
    /// another client.
    InvalidGrant,

    /// The grant type is not supported by this server.
    UnsupportedGrantType,

    /// The resource owner or server denied the request.
    AccessDenied,

    /// The server encountered an unexpected condition.
    ServerError,
}

impl ErrorCode {
    /// Returns the wire representation of the error code.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::InvalidRequest => "invalid_request",
            Self::InvalidClient => "invalid_client",
            Self::UnauthorizedClient => "unauthorized_client",
            Self::InvalidGrant => "invalid_grant",
            Self::UnsupportedGrantType => "unsupported_grant_type",
            Self::AccessDenied => "access_denied",
            Self::ServerError => "server_error",
        }
    }

    /// Returns the HTTP status code for this error.
    #[must_use]
    pub fn http_status(&self) -> u16 {
        match self {
            Self::InvalidClient => 401,
            Self::ServerError => 500,
            Self::InvalidRequest
            | Self::UnauthorizedClient
            | Self::InvalidGrant
            | Self::UnsupportedGrantType
            | Self::AccessDenied => 400,
        }
    }
}

impl std::fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// The error half of a reply: code plus human-readable description.
#[derive(Debug, Clone, Serialize)]
pub struct ReplyError {
    /// OAuth 2.0 error code.
    pub error: ErrorCode,

    /// Human-readable description, surfaced as `error_description`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_description: Option<String>,
}

/// Response sink for one token-endpoint request.
#[derive(Debug, Default)]
pub struct TokenReply {
    output: Map<String, Value>,
    error: Option<ReplyError>,
    internal_error: Option<AuthError>,
    set_cookies: Vec<String>,
}

impl TokenReply {
    /// Creates an empty reply.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns `true` once an error has been recorded.
    #[must_use]
    pub fn is_error(&self) -> bool {
        self.error.is_some()
    }

    /// Records an error with an explicit code and description.
    pub fn set_error(&mut self, code: ErrorCode, description: impl Into<String>) {
        self.error = Some(ReplyError {
            error: code,
            error_description: Some(description.into()),
        });
    }

    /// Records an [`AuthError`], mapping it onto its OAuth code.
    ///
    /// Server-side failures surface a generic description; the full error
    /// is retained and available via [`internal_error`](Self::internal_error)
    /// for logging.
    pub fn fail(&mut self, error: AuthError) {
        let (code, description) = match &error {
            AuthError::InvalidRequest { message } => (ErrorCode::InvalidRequest, message.clone()),
            AuthError::InvalidClient { message } => (ErrorCode::InvalidClient, message.clone()),
            AuthError::UnauthorizedClient { message } => {
                (ErrorCode::UnauthorizedClient, message.clone())
            }
            AuthError::InvalidGrant { message } => (ErrorCode::InvalidGrant, message.clone()),
            AuthError::UnsupportedGrantType { grant_type } => (
                ErrorCode::UnsupportedGrantType,
                format!("grant type '{grant_type}' is not supported"),
            ),
            AuthError::AccessDenied { message } => (ErrorCode::AccessDenied, message.clone()),
            AuthError::Storage { .. }
            | AuthError::TokenGeneration { .. }
            | AuthError::Internal { .. } => {
                (ErrorCode::ServerError, "internal server error".to_string())
            }
        };

        self.error = Some(ReplyError {
            error: code,
            error_description: Some(description),
        });
        self.internal_error = Some(error);
    }

    /// Returns the recorded error, if any.
    #[must_use]
    pub fn error(&self) -> Option<&ReplyError> {
        self.error.as_ref()
    }

    /// Returns the retained cause of the recorded error, for logging. Not
    /// surfaced to the client.
    #[must_use]
    pub fn internal_error(&self) -> Option<&AuthError> {
        self.internal_error.as_ref()
    }

    /// Sets a field of the success output map.
    pub fn set_output(&mut self, name: &str, value: impl Into<Value>) {
        self.output.insert(name.to_string(), value.into());
    }

    /// Returns the success output map.
    #[must_use]
    pub fn output(&self) -> &Map<String, Value> {
        &self.output
    }

    /// Appends a `Set-Cookie` header value.
    pub fn add_set_cookie(&mut self, header_value: String) {
        self.set_cookies.push(header_value);
    }

    /// Returns the collected `Set-Cookie` header values.
    #[must_use]
    pub fn set_cookies(&self) -> &[String] {
        &self.set_cookies
    }

    /// Returns the HTTP status the reply should be rendered with.
    #[must_use]
    pub fn http_status(&self) -> u16 {
        self.error
            .as_ref()
            .map_or(200, |error| error.error.http_status())
    }

    /// Renders the response body: the error object when in error, the
    /// output map otherwise.
    #[must_use]
    pub fn body(&self) -> Value {
        match &self.error {
            Some(error) => {
                let mut body = Map::new();
                body.insert(
                    "error".to_string(),
                    Value::String(error.error.as_str().to_string()),
                );
                if let Some(description) = &error.error_description {
                    body.insert(
                        "error_description".to_string(),
                        Value::String(description.clone()),
                    );
                }
                Value::Object(body)
            }
            None => Value::Object(self.output.clone()),
        }
    }
}
