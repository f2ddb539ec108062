//! # Playlist Parsing & Library Index
//!
//! Decodes on-disk playlists and assembles the local side of a sync run.
//!
//! ## Overview
//!
//! This crate handles everything that happens before the network:
//! - **Binary decoder** (`binary`): the proprietary length-prefixed `.mbp`
//!   record format with base-128 varint lengths
//! - **Text decoder** (`text`): newline-delimited `.m3u` files
//! - **Path repairer** (`repair`): best-effort recovery of song references
//!   whose names were corrupted by encoding mismatches
//! - **Library index** (`library`): playlist discovery, decoding, repair,
//!   and assembly into a [`library::LibrarySnapshot`]
//!
//! Parse failures are scoped to a single playlist and missing references to
//! a single song; both are reported as warnings on the snapshot rather than
//! aborting the run.

pub mod binary;
pub mod error;
pub mod library;
pub mod repair;
pub mod text;

pub use error::{PlaylistError, Result};
pub use library::{LibraryIndex, LibrarySnapshot, PlaylistRecord, ScanWarning};
pub use repair::PathRepairer;
