//! Library index
//!
//! Discovers playlists under the two configured roots, decodes each with
//! the matching decoder, verifies and repairs song references, and
//! assembles the [`LibrarySnapshot`] the sync engine consumes.

use crate::error::Result;
use crate::repair::PathRepairer;
use crate::{binary, text};
use std::collections::BTreeMap;
use std::fmt;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};
use walkdir::WalkDir;

/// Extension of binary playlists
pub const BINARY_PLAYLIST_EXT: &str = "mbp";

/// Extension of exported text playlists
pub const TEXT_PLAYLIST_EXT: &str = "m3u";

/// One discovered playlist with its resolved songs.
#[derive(Debug, Clone)]
pub struct PlaylistRecord {
    /// Playlist file on disk; the record's identity
    pub source: PathBuf,

    /// Stable manifest filename on the remote side (see
    /// [`manifest_name_from_relative`] for the rule)
    pub remote_name: String,

    /// Ordered song paths, existing on disk (post-repair)
    pub songs: Vec<PathBuf>,
}

/// Non-fatal findings from a scan, returned to the caller alongside the
/// snapshot rather than written to a shared logger.
#[derive(Debug, Clone)]
pub enum ScanWarning {
    /// A playlist file could not be decoded and was skipped entirely
    PlaylistSkipped { playlist: PathBuf, reason: String },

    /// A song reference does not exist and could not be repaired
    MissingSong { playlist: PathBuf, path: PathBuf },

    /// A song reference was repaired, but several directory entries shared
    /// its signature and the substitution is an arbitrary pick
    AmbiguousRepair {
        playlist: PathBuf,
        path: PathBuf,
        chosen: PathBuf,
    },
}

impl fmt::Display for ScanWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ScanWarning::PlaylistSkipped { playlist, reason } => {
                write!(f, "Skipped playlist {}: {}", playlist.display(), reason)
            }
            ScanWarning::MissingSong { playlist, path } => write!(
                f,
                "{} was not found (referenced by {})",
                path.display(),
                playlist.display()
            ),
            ScanWarning::AmbiguousRepair {
                playlist,
                path,
                chosen,
            } => write!(
                f,
                "{} matched several files, substituted {} (referenced by {})",
                path.display(),
                chosen.display(),
                playlist.display()
            ),
        }
    }
}

/// The locally discovered state for one run.
#[derive(Debug, Default, Clone)]
pub struct LibrarySnapshot {
    /// All discovered playlists, including those with zero resolvable songs
    pub playlists: Vec<PlaylistRecord>,

    /// Global deduplicated song set, keyed by filename (the remote
    /// identity). Duplicate filenames across distinct paths collapse to the
    /// last one scanned.
    pub songs: BTreeMap<String, PathBuf>,

    /// Non-fatal findings collected during the scan
    pub warnings: Vec<ScanWarning>,
}

/// Aggregates playlists into a [`LibrarySnapshot`].
pub struct LibraryIndex {
    binary_root: PathBuf,
    text_root: PathBuf,
    repairer: PathRepairer,
}

impl LibraryIndex {
    /// Create an index over the two playlist roots.
    pub fn new<P: Into<PathBuf>, Q: Into<PathBuf>>(binary_root: P, text_root: Q) -> Self {
        Self {
            binary_root: binary_root.into(),
            text_root: text_root.into(),
            repairer: PathRepairer::new(),
        }
    }

    /// Discover playlists under both roots and build the snapshot.
    pub fn scan(&mut self) -> LibrarySnapshot {
        let mut playlist_paths = discover(&self.binary_root, BINARY_PLAYLIST_EXT);
        playlist_paths.extend(discover(&self.text_root, TEXT_PLAYLIST_EXT));

        self.build(playlist_paths)
    }

    /// Build the snapshot from a caller-supplied playlist list.
    pub fn build(&mut self, playlist_paths: Vec<PathBuf>) -> LibrarySnapshot {
        let mut snapshot = LibrarySnapshot::default();

        for source in playlist_paths {
            let raw_paths = match self.decode_playlist(&source) {
                Ok(paths) => paths,
                Err(e) => {
                    warn!(playlist = %source.display(), error = %e, "Skipping unreadable playlist");
                    snapshot.warnings.push(ScanWarning::PlaylistSkipped {
                        playlist: source,
                        reason: e.to_string(),
                    });
                    continue;
                }
            };

            let remote_name = self.remote_manifest_name(&source);
            let mut songs = Vec::with_capacity(raw_paths.len());

            for raw in raw_paths {
                let candidate = PathBuf::from(raw);
                if candidate.exists() {
                    songs.push(candidate);
                    continue;
                }

                match self.repairer.repair(&candidate) {
                    Some(outcome) => {
                        if outcome.ambiguous {
                            warn!(
                                reference = %candidate.display(),
                                chosen = %outcome.path.display(),
                                "Ambiguous repair"
                            );
                            snapshot.warnings.push(ScanWarning::AmbiguousRepair {
                                playlist: source.clone(),
                                path: candidate,
                                chosen: outcome.path.clone(),
                            });
                        } else {
                            debug!(
                                reference = %candidate.display(),
                                chosen = %outcome.path.display(),
                                "Repaired reference"
                            );
                        }
                        songs.push(outcome.path);
                    }
                    None => {
                        warn!(
                            reference = %candidate.display(),
                            playlist = %source.display(),
                            "Song was not found"
                        );
                        snapshot.warnings.push(ScanWarning::MissingSong {
                            playlist: source.clone(),
                            path: candidate,
                        });
                    }
                }
            }

            for song in &songs {
                if let Some(name) = song.file_name() {
                    snapshot
                        .songs
                        .insert(name.to_string_lossy().into_owned(), song.clone());
                }
            }

            snapshot.playlists.push(PlaylistRecord {
                source,
                remote_name,
                songs,
            });
        }

        info!(
            playlists = snapshot.playlists.len(),
            songs = snapshot.songs.len(),
            warnings = snapshot.warnings.len(),
            "Library scan complete"
        );

        snapshot
    }

    fn decode_playlist(&self, source: &Path) -> Result<Vec<String>> {
        match source.extension().and_then(|e| e.to_str()) {
            Some(ext) if ext.eq_ignore_ascii_case(BINARY_PLAYLIST_EXT) => {
                let data = std::fs::read(source)?;
                binary::decode(&data)
            }
            _ => {
                let contents = std::fs::read_to_string(source)?;
                Ok(text::decode(&contents))
            }
        }
    }

    fn remote_manifest_name(&self, source: &Path) -> String {
        let relative = source
            .strip_prefix(&self.binary_root)
            .or_else(|_| source.strip_prefix(&self.text_root))
            .unwrap_or(source);

        manifest_name_from_relative(relative)
    }
}

/// Manifest filename for a playlist at `relative` (relative to its root).
///
/// Playlists at the top level or one folder deep keep their stem; deeper
/// nesting prefixes the parent folder name so playlists in subfolders
/// sharing a stem stay distinguishable.
pub fn manifest_name_from_relative(relative: &Path) -> String {
    let stem = relative
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();

    if relative.components().count() <= 2 {
        format!("{}.m3u", stem)
    } else {
        let parent = relative
            .parent()
            .and_then(Path::file_name)
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_default();
        format!("{} - {}.m3u", parent, stem)
    }
}

/// Recursively collect files with the given extension, in a deterministic
/// order.
fn discover(root: &Path, extension: &str) -> Vec<PathBuf> {
    WalkDir::new(root)
        .sort_by_file_name()
        .into_iter()
        .filter_map(|entry| entry.ok())
        .filter(|entry| entry.file_type().is_file())
        .map(|entry| entry.into_path())
        .filter(|path| {
            path.extension()
                .and_then(|e| e.to_str())
                .map_or(false, |e| e.eq_ignore_ascii_case(extension))
        })
        .collect()
}
