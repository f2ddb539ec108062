//! # Reconciliation Engine
//!
//! Diffs the local library snapshot against the remote store and applies
//! the create/update/delete operations needed to converge.
//!
//! ## Workflow
//!
//! 1. Ensure the remote music folder and its songs subfolder exist,
//!    caching folder ids per path for the run
//! 2. Trash remote songs no current playlist references
//! 3. Upload songs missing remotely (full binary content from disk)
//! 4. Trash remote playlist manifests with no current record
//! 5. Regenerate each surviving manifest and upload only on checksum
//!    mismatch
//! 6. Create manifests for playlists new to the remote
//!
//! Song operations complete before any manifest is written, since
//! manifests reference song files by name. A failure on one entity is
//! recorded on the report and the batch moves on; running the engine
//! twice over an unchanged library performs zero mutating calls on the
//! second pass.

use crate::error::{Result, SyncError};
use crate::manifest;
use crate::report::{RemoteOperation, SyncReport};
use bytes::Bytes;
use chrono::Utc;
use core_playlist::{LibrarySnapshot, PlaylistRecord};
use std::collections::{BTreeMap, HashMap, HashSet};
use std::path::Path;
use std::sync::Arc;
use store_traits::{EntryKind, RemoteEntry, RemoteStore};
use tracing::{debug, info, instrument, warn};

/// Engine configuration: where songs and manifests live remotely.
#[derive(Debug, Clone)]
pub struct ReconcileConfig {
    /// Title of the remote folder holding playlist manifests
    pub music_folder: String,

    /// Title of the songs subfolder under the music folder; also the
    /// manifest line prefix
    pub songs_folder: String,
}

impl Default for ReconcileConfig {
    fn default() -> Self {
        Self {
            music_folder: "Music".to_string(),
            songs_folder: "songs".to_string(),
        }
    }
}

/// Drives one reconciliation pass against a [`RemoteStore`].
///
/// The engine is per-run state: the folder-id cache it maintains is only
/// valid as long as nobody else rearranges the remote folders, so a new
/// engine should be constructed for each pass.
pub struct ReconciliationEngine {
    store: Arc<dyn RemoteStore>,
    config: ReconcileConfig,

    /// Remote folder ids by joined path ("Music", "Music/songs"), so
    /// repeated segment lookups are served from memory
    folder_ids: HashMap<String, String>,
}

impl ReconciliationEngine {
    pub fn new(store: Arc<dyn RemoteStore>, config: ReconcileConfig) -> Self {
        Self {
            store,
            config,
            folder_ids: HashMap::new(),
        }
    }

    /// Run one full pass and return the report.
    ///
    /// # Errors
    ///
    /// Only listing failures and folder-bootstrap failures abort the pass;
    /// per-entity mutation failures are collected on the report instead.
    #[instrument(skip(self, snapshot))]
    pub async fn run(&mut self, snapshot: &LibrarySnapshot) -> Result<SyncReport> {
        let mut report = SyncReport::new(Utc::now());

        let music_folder = self.config.music_folder.clone();
        let songs_folder = self.config.songs_folder.clone();
        let music_id = self.ensure_folder_path(&[&music_folder]).await?;
        let songs_id = self
            .ensure_folder_path(&[&music_folder, &songs_folder])
            .await?;

        self.reconcile_songs(snapshot, &songs_id, &mut report)
            .await?;
        self.reconcile_playlists(snapshot, &music_id, &mut report)
            .await?;

        report.finished_at = Utc::now();
        info!(%report, "Reconciliation pass complete");

        Ok(report)
    }

    /// Walk a folder path from the store root, creating missing segments,
    /// and return the final folder id. Resolved ids are cached by joined
    /// path for the rest of the run.
    async fn ensure_folder_path(&mut self, segments: &[&str]) -> Result<String> {
        let mut parent: Option<String> = None;
        let mut key = String::new();

        for segment in segments {
            if !key.is_empty() {
                key.push('/');
            }
            key.push_str(segment);

            if let Some(id) = self.folder_ids.get(&key) {
                parent = Some(id.clone());
                continue;
            }

            let existing = self
                .store
                .list(parent.as_deref(), Some(segment), Some(EntryKind::Folder))
                .await?;

            let id = match existing.into_iter().next() {
                Some(entry) => entry.id,
                None => {
                    info!(folder = %key, "Creating remote folder");
                    self.store
                        .create_folder(parent.as_deref(), segment)
                        .await?
                        .id
                }
            };

            self.folder_ids.insert(key.clone(), id.clone());
            parent = Some(id);
        }

        parent.ok_or_else(|| SyncError::InvalidInput("folder path cannot be empty".to_string()))
    }

    async fn reconcile_songs(
        &self,
        snapshot: &LibrarySnapshot,
        songs_id: &str,
        report: &mut SyncReport,
    ) -> Result<()> {
        let existing = self
            .store
            .list(Some(songs_id), None, Some(EntryKind::File))
            .await?;
        let existing_titles: HashSet<&str> = existing.iter().map(|e| e.title.as_str()).collect();

        let stale: Vec<&RemoteEntry> = existing
            .iter()
            .filter(|entry| !snapshot.songs.contains_key(&entry.title))
            .collect();
        let total = stale.len();
        for (index, entry) in stale.into_iter().enumerate() {
            match self.store.trash(&entry.id).await {
                Ok(()) => {
                    report.songs_deleted += 1;
                    debug!(
                        song = %entry.title,
                        "Song {} of {} to delete done",
                        index + 1,
                        total
                    );
                }
                Err(e) => {
                    warn!(song = %entry.title, error = %e, "Failed to trash song");
                    report.record_failure(&entry.title, RemoteOperation::TrashSong, e);
                }
            }
        }

        let pending: Vec<(&String, &std::path::PathBuf)> = snapshot
            .songs
            .iter()
            .filter(|(name, _)| !existing_titles.contains(name.as_str()))
            .collect();
        let total = pending.len();
        for (index, (name, path)) in pending.into_iter().enumerate() {
            match self.upload_song(songs_id, name, path).await {
                Ok(()) => {
                    report.songs_uploaded += 1;
                    debug!(
                        song = %name,
                        "Song {} of {} to upload done",
                        index + 1,
                        total
                    );
                }
                Err(e) => {
                    warn!(song = %name, error = %e, "Failed to upload song");
                    report.record_failure(name, RemoteOperation::UploadSong, e);
                }
            }
        }

        Ok(())
    }

    async fn upload_song(&self, songs_id: &str, title: &str, path: &Path) -> Result<()> {
        let data = tokio::fs::read(path).await?;
        let entry = self.store.create_file(songs_id, title).await?;
        self.store.upload_bytes(&entry.id, Bytes::from(data)).await?;
        Ok(())
    }

    async fn reconcile_playlists(
        &self,
        snapshot: &LibrarySnapshot,
        music_id: &str,
        report: &mut SyncReport,
    ) -> Result<()> {
        let records: BTreeMap<&str, &PlaylistRecord> = snapshot
            .playlists
            .iter()
            .map(|record| (record.remote_name.as_str(), record))
            .collect();

        let existing = self
            .store
            .list(Some(music_id), None, Some(EntryKind::File))
            .await?;
        let existing_titles: HashSet<&str> = existing.iter().map(|e| e.title.as_str()).collect();

        for entry in &existing {
            match records.get(entry.title.as_str()) {
                None => match self.store.trash(&entry.id).await {
                    Ok(()) => {
                        report.playlists_deleted += 1;
                        debug!(playlist = %entry.title, "Stale playlist deleted");
                    }
                    Err(e) => {
                        warn!(playlist = %entry.title, error = %e, "Failed to trash playlist");
                        report.record_failure(&entry.title, RemoteOperation::TrashPlaylist, e);
                    }
                },
                Some(record) => {
                    let body = manifest::generate(&self.config.songs_folder, &record.songs);
                    let digest = manifest::checksum_hex(&body);

                    if entry.checksum.as_deref() == Some(digest.as_str()) {
                        debug!(playlist = %entry.title, "Manifest unchanged");
                        continue;
                    }

                    match self.store.upload_text(&entry.id, &body).await {
                        Ok(()) => {
                            report.playlists_updated += 1;
                            debug!(playlist = %entry.title, "Playlist updated");
                        }
                        Err(e) => {
                            warn!(playlist = %entry.title, error = %e, "Failed to update playlist");
                            report.record_failure(
                                &entry.title,
                                RemoteOperation::UpdatePlaylist,
                                e,
                            );
                        }
                    }
                }
            }
        }

        for (name, record) in records
            .iter()
            .filter(|(name, _)| !existing_titles.contains(*name))
        {
            let body = manifest::generate(&self.config.songs_folder, &record.songs);
            match self.create_playlist(music_id, name, &body).await {
                Ok(()) => {
                    report.playlists_created += 1;
                    debug!(playlist = %name, "Playlist created");
                }
                Err(e) => {
                    warn!(playlist = %name, error = %e, "Failed to create playlist");
                    report.record_failure(*name, RemoteOperation::CreatePlaylist, e);
                }
            }
        }

        Ok(())
    }

    async fn create_playlist(&self, music_id: &str, title: &str, body: &str) -> Result<()> {
        let entry = self.store.create_file(music_id, title).await?;
        self.store.upload_text(&entry.id, body).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::path::PathBuf;
    use std::sync::Mutex;

    fn folder(id: &str, title: &str) -> RemoteEntry {
        RemoteEntry {
            id: id.to_string(),
            title: title.to_string(),
            checksum: None,
            is_folder: true,
        }
    }

    fn file(id: &str, title: &str, checksum: &str) -> RemoteEntry {
        RemoteEntry {
            id: id.to_string(),
            title: title.to_string(),
            checksum: Some(checksum.to_string()),
            is_folder: false,
        }
    }

    /// Scripted store double: serves listings from fixed data, counts list
    /// calls, and panics on any mutating call.
    #[derive(Default)]
    struct ScriptedStore {
        /// Folder entries with their parent ids
        folders: Vec<(Option<String>, RemoteEntry)>,

        /// File listings by parent folder id
        files: Vec<(String, RemoteEntry)>,

        list_calls: Mutex<u32>,
        created_folders: Mutex<Vec<String>>,
    }

    impl ScriptedStore {
        fn with_default_folders() -> Self {
            Self {
                folders: vec![
                    (None, folder("music-id", "Music")),
                    (Some("music-id".to_string()), folder("songs-id", "songs")),
                ],
                ..Self::default()
            }
        }

        fn with_file(mut self, parent_id: &str, entry: RemoteEntry) -> Self {
            self.files.push((parent_id.to_string(), entry));
            self
        }

        fn list_calls(&self) -> u32 {
            *self.list_calls.lock().unwrap()
        }
    }

    #[async_trait]
    impl RemoteStore for ScriptedStore {
        async fn list(
            &self,
            parent_id: Option<&str>,
            title: Option<&str>,
            kind: Option<EntryKind>,
        ) -> store_traits::Result<Vec<RemoteEntry>> {
            *self.list_calls.lock().unwrap() += 1;

            match kind {
                Some(EntryKind::Folder) => Ok(self
                    .folders
                    .iter()
                    .filter(|(parent, entry)| {
                        parent.as_deref() == parent_id
                            && title.map_or(true, |t| entry.title == t)
                    })
                    .map(|(_, entry)| entry.clone())
                    .collect()),
                _ => Ok(self
                    .files
                    .iter()
                    .filter(|(parent, entry)| {
                        Some(parent.as_str()) == parent_id
                            && title.map_or(true, |t| entry.title == t)
                    })
                    .map(|(_, entry)| entry.clone())
                    .collect()),
            }
        }

        async fn create_folder(
            &self,
            _parent_id: Option<&str>,
            title: &str,
        ) -> store_traits::Result<RemoteEntry> {
            self.created_folders.lock().unwrap().push(title.to_string());
            Ok(folder(&format!("created-{}", title), title))
        }

        async fn create_file(&self, _parent_id: &str, title: &str) -> store_traits::Result<RemoteEntry> {
            panic!("unexpected create_file for '{}'", title);
        }

        async fn upload_bytes(&self, file_id: &str, _data: Bytes) -> store_traits::Result<()> {
            panic!("unexpected upload_bytes for '{}'", file_id);
        }

        async fn upload_text(&self, file_id: &str, _text: &str) -> store_traits::Result<()> {
            panic!("unexpected upload_text for '{}'", file_id);
        }

        async fn trash(&self, entry_id: &str) -> store_traits::Result<()> {
            panic!("unexpected trash for '{}'", entry_id);
        }
    }

    fn converged_snapshot() -> LibrarySnapshot {
        let song = PathBuf::from("/music/s1.mp3");
        let mut songs = std::collections::BTreeMap::new();
        songs.insert("s1.mp3".to_string(), song.clone());

        LibrarySnapshot {
            playlists: vec![PlaylistRecord {
                source: PathBuf::from("/lists/A.m3u"),
                remote_name: "A.m3u".to_string(),
                songs: vec![song],
            }],
            songs,
            warnings: Vec::new(),
        }
    }

    /// The double panics on any create/upload/trash, so this passing means
    /// a converged store sees zero mutating calls.
    #[tokio::test]
    async fn test_converged_state_issues_no_mutations() {
        let snapshot = converged_snapshot();
        let body = manifest::generate("songs", &snapshot.playlists[0].songs);
        let digest = manifest::checksum_hex(&body);

        let store = ScriptedStore::with_default_folders()
            .with_file("songs-id", file("song-1", "s1.mp3", "checksum-irrelevant"))
            .with_file("music-id", file("pl-1", "A.m3u", &digest));

        let mut engine = ReconciliationEngine::new(Arc::new(store), ReconcileConfig::default());
        let report = engine.run(&snapshot).await.unwrap();

        assert!(report.is_noop());
    }

    #[tokio::test]
    async fn test_folder_lookups_are_cached_per_run() {
        let store = Arc::new(ScriptedStore::with_default_folders());
        let mut engine = ReconciliationEngine::new(store.clone(), ReconcileConfig::default());

        for _ in 0..2 {
            let id = engine.ensure_folder_path(&["Music"]).await.unwrap();
            assert_eq!(id, "music-id");
            let id = engine.ensure_folder_path(&["Music", "songs"]).await.unwrap();
            assert_eq!(id, "songs-id");
        }

        // One remote lookup per segment; the repeats were cache hits.
        assert_eq!(store.list_calls(), 2);
    }

    #[tokio::test]
    async fn test_missing_folder_is_created() {
        let store = Arc::new(ScriptedStore::default());
        let mut engine = ReconciliationEngine::new(store.clone(), ReconcileConfig::default());

        let id = engine.ensure_folder_path(&["Music"]).await.unwrap();

        assert_eq!(id, "created-Music");
        assert_eq!(*store.created_folders.lock().unwrap(), vec!["Music"]);
    }

    #[tokio::test]
    async fn test_empty_folder_path_is_rejected() {
        let store = ScriptedStore::default();
        let mut engine = ReconciliationEngine::new(Arc::new(store), ReconcileConfig::default());

        assert!(matches!(
            engine.ensure_folder_path(&[]).await,
            Err(SyncError::InvalidInput(_))
        ));
    }
}
