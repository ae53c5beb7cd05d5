//! Storage traits for the grant core.
//!
//! This module defines the storage interfaces the token server consumes:
//!
//! - [`ClientStorage`] - client registrations and secret verification
//! - [`AuthorizationStorage`] - authorization-code records
//! - [`AccessStorage`] - access-grant records and refresh-token lookup
//!
//! Absence is reported as `Ok(None)`, distinguishing a missing record from a
//! backend failure. Single-use enforcement for codes and refresh tokens is
//! delegated to the backend; the server loads the record and invalidates it
//! after a successful exchange, and a backend may additionally serialize
//! concurrent redemptions of the same key.
//!
//! # Implementations
//!
//! `portcullis-db-memory` provides an in-memory backend for tests and demos.

pub mod access;
pub mod authorization;
pub mod client;

pub use access::AccessStorage;
pub use authorization::AuthorizationStorage;
pub use client::ClientStorage;
