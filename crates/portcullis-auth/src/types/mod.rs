//! Domain types for clients, authorization codes, and access grants.

pub mod access;
pub mod authorize;
pub mod client;

pub use access::AccessData;
pub use authorize::AuthorizeData;
pub use client::Client;
