//! # Reconciliation Module
//!
//! Converges the remote store to the locally discovered library state.
//!
//! ## Overview
//!
//! This crate takes a [`core_playlist::LibrarySnapshot`] and live remote
//! listings and computes/applies the minimal set of create, update, and
//! delete operations:
//!
//! - **Manifest generation** (`manifest`): deterministic playlist bodies
//!   and their MD5 checksums
//! - **Reconciliation engine** (`engine`): the diff-and-apply pass over
//!   songs and playlist manifests
//! - **Run report** (`report`): mutation counts and per-entity failures
//!   returned to the caller
//!
//! One entity's remote failure never aborts the batch; failures are
//! collected on the report and unrelated entities proceed. A second run
//! against an unchanged library performs zero mutating calls.

pub mod engine;
pub mod error;
pub mod manifest;
pub mod report;

pub use engine::{ReconcileConfig, ReconciliationEngine};
pub use error::{Result, SyncError};
pub use report::{OperationFailure, RemoteOperation, SyncReport};
