//! The OAuth 2.0 token-endpoint machinery.
//!
//! - [`request`] - decoding of the incoming form, Basic-Auth header, and
//!   cookies
//! - [`client_auth`] - client resolution with and without a secret
//! - [`pkce`] - PKCE challenge verification (RFC 7636)
//! - [`scope`] - scope-subset check used by the refresh grant
//! - [`redirect`] - registered redirect-URI list helpers
//! - [`access_request`] - the per-request grant record handed to the caller
//! - [`reply`] - the response sink: typed errors, output map, cookies
//! - [`server`] - the grant dispatcher and finalizer

pub mod access_request;
pub mod client_auth;
pub mod pkce;
pub mod redirect;
pub mod reply;
pub mod request;
pub mod scope;
pub mod server;
