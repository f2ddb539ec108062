//! Run report
//!
//! The engine returns its outcome to the caller instead of writing it to a
//! shared logger: mutation counts per category, per-entity failures, and
//! the run timestamps.

use chrono::{DateTime, Utc};
use std::fmt;

/// The remote mutation a failure occurred in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RemoteOperation {
    TrashSong,
    UploadSong,
    TrashPlaylist,
    UpdatePlaylist,
    CreatePlaylist,
}

impl fmt::Display for RemoteOperation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            RemoteOperation::TrashSong => "trash song",
            RemoteOperation::UploadSong => "upload song",
            RemoteOperation::TrashPlaylist => "trash playlist",
            RemoteOperation::UpdatePlaylist => "update playlist",
            RemoteOperation::CreatePlaylist => "create playlist",
        };
        f.write_str(name)
    }
}

/// One entity whose remote operation failed. The batch continues past it.
#[derive(Debug, Clone)]
pub struct OperationFailure {
    /// Remote title of the affected entity
    pub title: String,

    /// The operation that failed
    pub operation: RemoteOperation,

    /// Rendered error
    pub error: String,
}

impl fmt::Display for OperationFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} '{}': {}", self.operation, self.title, self.error)
    }
}

/// Outcome of one reconciliation pass.
#[derive(Debug, Clone)]
pub struct SyncReport {
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,

    pub songs_deleted: u64,
    pub songs_uploaded: u64,
    pub playlists_deleted: u64,
    pub playlists_updated: u64,
    pub playlists_created: u64,

    /// Failures collected along the way; empty on a clean pass
    pub failures: Vec<OperationFailure>,
}

impl SyncReport {
    pub(crate) fn new(started_at: DateTime<Utc>) -> Self {
        Self {
            started_at,
            finished_at: started_at,
            songs_deleted: 0,
            songs_uploaded: 0,
            playlists_deleted: 0,
            playlists_updated: 0,
            playlists_created: 0,
            failures: Vec::new(),
        }
    }

    /// Total mutating calls performed.
    pub fn total_mutations(&self) -> u64 {
        self.songs_deleted
            + self.songs_uploaded
            + self.playlists_deleted
            + self.playlists_updated
            + self.playlists_created
    }

    /// True when the pass changed nothing and nothing failed.
    pub fn is_noop(&self) -> bool {
        self.total_mutations() == 0 && self.failures.is_empty()
    }

    pub(crate) fn record_failure(
        &mut self,
        title: impl Into<String>,
        operation: RemoteOperation,
        error: impl fmt::Display,
    ) {
        self.failures.push(OperationFailure {
            title: title.into(),
            operation,
            error: error.to_string(),
        });
    }
}

impl fmt::Display for SyncReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} songs uploaded, {} deleted; {} playlists created, {} updated, {} deleted; {} failures",
            self.songs_uploaded,
            self.songs_deleted,
            self.playlists_created,
            self.playlists_updated,
            self.playlists_deleted,
            self.failures.len()
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fresh_report_is_noop() {
        let report = SyncReport::new(Utc::now());

        assert!(report.is_noop());
        assert_eq!(report.total_mutations(), 0);
    }

    #[test]
    fn test_mutations_and_failures_break_noop() {
        let mut report = SyncReport::new(Utc::now());
        report.songs_uploaded = 2;
        assert!(!report.is_noop());

        let mut report = SyncReport::new(Utc::now());
        report.record_failure("s1.mp3", RemoteOperation::UploadSong, "boom");
        assert!(!report.is_noop());
        assert_eq!(report.failures[0].operation, RemoteOperation::UploadSong);
    }

    #[test]
    fn test_display_summarizes_counts() {
        let mut report = SyncReport::new(Utc::now());
        report.songs_uploaded = 3;
        report.playlists_created = 1;

        let rendered = report.to_string();
        assert!(rendered.contains("3 songs uploaded"));
        assert!(rendered.contains("1 playlists created"));
    }
}
