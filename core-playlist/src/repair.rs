//! Path repair for corrupted song references
//!
//! Playlists written under one codepage and read under another end up with
//! references whose names no longer match any file on disk. Repair works by
//! folding both the broken reference and the real directory entries down to
//! an alphanumeric-only signature and matching on that: every character that
//! survives a typical encoding mangle (ASCII letters and digits) is kept,
//! everything else is dropped, and case is folded so FAT/NTFS case drift
//! does not defeat the match.
//!
//! Directory listings are indexed once per parent directory and cached for
//! the lifetime of the repairer, so repeated broken references in the same
//! folder never re-scan the filesystem.

use std::collections::hash_map::Entry;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Alphanumeric-only folding of a path's full string form.
///
/// Punctuation, separators, and non-ASCII characters are removed and the
/// rest lowercased, collapsing mis-decoded variants of the same name to a
/// comparable key.
pub fn signature(path: &Path) -> String {
    path.to_string_lossy()
        .chars()
        .filter(char::is_ascii_alphanumeric)
        .map(|c| c.to_ascii_lowercase())
        .collect()
}

/// A successful repair.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RepairOutcome {
    /// The real directory entry substituted for the broken reference
    pub path: PathBuf,

    /// True when several directory entries folded to the matched signature;
    /// the substitution is then an arbitrary pick among them
    pub ambiguous: bool,
}

struct Candidate {
    path: PathBuf,
    collided: bool,
}

/// Repairs broken song references by signature-matching against their
/// parent directory.
#[derive(Default)]
pub struct PathRepairer {
    cache: HashMap<PathBuf, HashMap<String, Candidate>>,
}

impl PathRepairer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Attempt to locate the real file a broken reference points at.
    ///
    /// Returns `None` when the reference has no parent directory, the
    /// parent cannot be listed, or no entry shares the reference's
    /// signature.
    pub fn repair(&mut self, broken: &Path) -> Option<RepairOutcome> {
        let parent = broken.parent()?;

        if !self.cache.contains_key(parent) {
            let index = index_directory(parent);
            self.cache.insert(parent.to_path_buf(), index);
        }

        let index = self.cache.get(parent)?;
        index.get(&signature(broken)).map(|candidate| RepairOutcome {
            path: candidate.path.clone(),
            ambiguous: candidate.collided,
        })
    }
}

/// Build the signature index for one directory (non-recursive, files only,
/// any extension). On collision the first entry scanned wins and the slot
/// is marked so callers can surface the ambiguity.
fn index_directory(dir: &Path) -> HashMap<String, Candidate> {
    let mut index = HashMap::new();

    let entries = match std::fs::read_dir(dir) {
        Ok(entries) => entries,
        Err(e) => {
            debug!(directory = %dir.display(), error = %e, "Cannot list directory for repair");
            return index;
        }
    };

    for entry in entries.flatten() {
        let path = entry.path();
        if !path.is_file() {
            continue;
        }

        match index.entry(signature(&path)) {
            Entry::Occupied(mut slot) => {
                slot.get_mut().collided = true;
            }
            Entry::Vacant(slot) => {
                slot.insert(Candidate {
                    path,
                    collided: false,
                });
            }
        }
    }

    index
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs::File;
    use tempfile::tempdir;

    #[test]
    fn test_signature_folds_case_and_punctuation() {
        assert_eq!(
            signature(Path::new("/music/s3.mp3")),
            signature(Path::new("/music/S3!.mp3"))
        );
    }

    #[test]
    fn test_signature_drops_non_ascii() {
        // A mis-decoded accented character and its replacement-character
        // rendition fold to the same key.
        assert_eq!(
            signature(Path::new("/music/Söng (1).mp3")),
            signature(Path::new("/music/S�ng (1).mp3"))
        );
    }

    #[test]
    fn test_signature_distinguishes_different_names() {
        assert_ne!(
            signature(Path::new("Song_2.mp3")),
            signature(Path::new("Song1.mp3"))
        );
    }

    #[test]
    fn test_repair_finds_corrupted_reference() {
        let dir = tempdir().unwrap();
        File::create(dir.path().join("S3!.mp3")).unwrap();

        let mut repairer = PathRepairer::new();
        let outcome = repairer.repair(&dir.path().join("s3.mp3")).unwrap();

        assert_eq!(outcome.path, dir.path().join("S3!.mp3"));
        assert!(!outcome.ambiguous);
    }

    #[test]
    fn test_repair_returns_none_without_match() {
        let dir = tempdir().unwrap();
        File::create(dir.path().join("other.mp3")).unwrap();

        let mut repairer = PathRepairer::new();
        assert!(repairer.repair(&dir.path().join("missing.mp3")).is_none());
    }

    #[test]
    fn test_repair_returns_none_for_unlistable_parent() {
        let mut repairer = PathRepairer::new();
        assert!(repairer
            .repair(Path::new("/nonexistent-root/track.mp3"))
            .is_none());
    }

    #[test]
    fn test_repair_flags_signature_collision() {
        let dir = tempdir().unwrap();
        File::create(dir.path().join("s3.mp3")).unwrap();
        File::create(dir.path().join("S3!.mp3")).unwrap();

        let mut repairer = PathRepairer::new();
        let outcome = repairer.repair(&dir.path().join("s-3.mp3")).unwrap();

        assert!(outcome.ambiguous);
    }

    #[test]
    fn test_repair_caches_directory_listing() {
        let dir = tempdir().unwrap();
        File::create(dir.path().join("first.mp3")).unwrap();

        let mut repairer = PathRepairer::new();
        assert!(repairer.repair(&dir.path().join("First!.mp3")).is_some());
        assert_eq!(repairer.cache.len(), 1);

        // A file created after the first scan is invisible: the cached
        // index is authoritative for the rest of the run.
        File::create(dir.path().join("second.mp3")).unwrap();
        assert!(repairer.repair(&dir.path().join("Second!.mp3")).is_none());
        assert_eq!(repairer.cache.len(), 1);
    }
}
