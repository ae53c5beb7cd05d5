//! In-memory storage backend for the portcullis authorization server.
//!
//! This crate provides [`MemoryStore`], an implementation of the
//! `portcullis-auth` storage traits backed by `tokio`-guarded hash maps.
//! It is intended for tests, demos, and single-process deployments; it
//! makes no attempt to persist anything.
//!
//! # Example
//!
//! ```ignore
//! use portcullis_db_memory::MemoryStore;
//! use std::sync::Arc;
//!
//! let store = Arc::new(MemoryStore::new());
//! store.add_client(client).await;
//! let server = TokenServer::new(config, store.clone(), store.clone(), store.clone(), generator);
//! ```

mod store;

pub use store::MemoryStore;
