//! # Core Runtime Module
//!
//! Provides foundational runtime infrastructure for the playlist sync tool:
//! - Logging and tracing infrastructure
//! - Run configuration with fail-fast validation
//!
//! ## Overview
//!
//! This crate contains the runtime utilities the other crates and the CLI
//! depend on. It establishes the logging conventions and the explicit
//! configuration object that replaces ambient global state: every component
//! receives the paths and names it operates on, and returns its results to
//! the caller.

pub mod config;
pub mod error;
pub mod logging;

pub use config::SyncSettings;
pub use error::{Error, Result};
