//! # Remote Store Contract
//!
//! Defines the narrow interface the reconciliation core uses to talk to a
//! hierarchical cloud file store.
//!
//! ## Overview
//!
//! This crate contains:
//! - `RemoteStore` - the trait every storage backend implements
//! - `RemoteEntry` - the remote-side mirror object (id, title, checksum)
//! - `StoreError` - the error surface shared by all backends
//!
//! The sync engine depends only on this crate, never on a concrete backend,
//! so tests can run against in-memory doubles.

pub mod error;
pub mod store;

pub use error::{Result, StoreError};
pub use store::{EntryKind, RemoteEntry, RemoteStore};
