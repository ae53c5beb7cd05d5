//! # portcullis-auth
//!
//! The access-token grant core of an OAuth 2.0 authorization server.
//!
//! This crate validates incoming `grant_type` requests, resolves and
//! authenticates the client, applies per-grant verification rules (including
//! PKCE for the authorization-code grant), and, once the embedding
//! application marks the request authorized, mints and persists an
//! access/refresh-token pair.
//!
//! ## Two-phase handshake
//!
//! Handling a token request is split in two so the application can make the
//! authorization decision between the phases:
//!
//! 1. [`TokenServer::handle_access_request`] parses and validates the request
//!    and returns an [`AccessRequest`], or records a typed OAuth error on the
//!    [`TokenReply`].
//! 2. The caller inspects the request (verifies resource-owner credentials
//!    for the `password` grant, checks the device id for the `device` grant,
//!    and so on), sets `authorized`, and calls
//!    [`TokenServer::finish_access_request`] to mint tokens, persist the
//!    grant, invalidate its predecessors, and populate the response.
//!
//! ## Collaborators
//!
//! HTTP framing, the front-channel authorize endpoint, and production
//! storage backends live outside this crate. Storage is consumed through the
//! [`storage`] traits and token minting through
//! [`token::AccessTokenGenerator`]; `portcullis-db-memory` provides an
//! in-memory backend for tests and demos.
//!
//! ## Modules
//!
//! - [`clock`] - Injectable time source used for expiry checks and stamps
//! - [`config`] - Server and cookie configuration
//! - [`error`] - Error taxonomy with OAuth 2.0 error-code mapping
//! - [`oauth`] - Request decoding, grant handlers, PKCE, and the reply sink
//! - [`storage`] - Storage traits for clients, codes, and access grants
//! - [`token`] - Token-generator trait and the default random generator
//! - [`types`] - Client, authorization, and access-grant domain types

pub mod clock;
pub mod config;
pub mod error;
pub mod oauth;
pub mod storage;
pub mod token;
pub mod types;

pub use clock::{Clock, FixedClock, SystemClock};
pub use config::{CookieConfig, ServerConfig};
pub use error::AuthError;
pub use oauth::access_request::{AccessRequest, GrantType};
pub use oauth::reply::{ErrorCode, TokenReply};
pub use oauth::request::{BasicCredentials, TokenEndpointRequest};
pub use oauth::server::TokenServer;
pub use storage::{AccessStorage, AuthorizationStorage, ClientStorage};
pub use token::{AccessTokenGenerator, RandomTokenGenerator, TokenPair};
pub use types::{AccessData, AuthorizeData, Client};

/// Type alias for results produced by this crate.
pub type AuthResult<T> = Result<T, AuthError>;
