//! Remote store trait and entry types
//!
//! The contract mirrors what a hierarchical drive API actually offers:
//! filtered listings, folder/file creation, content uploads, and trashing.
//! Entry identity on the remote side is the title within a container.

use async_trait::async_trait;
use bytes::Bytes;

use crate::error::Result;

/// Narrows a listing to files or folders.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryKind {
    File,
    Folder,
}

/// A file or folder as reported by the remote store.
///
/// `checksum` is the store-computed MD5 of the entry's current content,
/// present for regular files on backends that report one. It is compared
/// against locally computed digests to skip redundant uploads.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemoteEntry {
    /// Backend-assigned opaque identifier
    pub id: String,

    /// Entry title (filename); the remote identity within its container
    pub title: String,

    /// MD5 content checksum in lowercase hex, when the backend reports one
    pub checksum: Option<String>,

    /// Whether the entry is a folder
    pub is_folder: bool,
}

/// Hierarchical remote file store.
///
/// Implementations own transport, authentication, and retry policy. All
/// operations exclude trashed entries; trashing an entry removes it from
/// subsequent listings but the backend may keep it recoverable.
///
/// # Example
///
/// ```ignore
/// use store_traits::{EntryKind, RemoteStore};
///
/// async fn find_songs_folder(store: &dyn RemoteStore, music_id: &str) {
///     let folders = store
///         .list(Some(music_id), Some("songs"), Some(EntryKind::Folder))
///         .await
///         .unwrap();
///     println!("{} matching folders", folders.len());
/// }
/// ```
#[async_trait]
pub trait RemoteStore: Send + Sync {
    /// List non-trashed entries, optionally filtered by parent folder,
    /// exact title, and kind.
    async fn list(
        &self,
        parent_id: Option<&str>,
        title: Option<&str>,
        kind: Option<EntryKind>,
    ) -> Result<Vec<RemoteEntry>>;

    /// Create a folder under `parent_id` (the store root when `None`).
    async fn create_folder(&self, parent_id: Option<&str>, title: &str) -> Result<RemoteEntry>;

    /// Create an empty file entry under `parent_id`. Content is attached
    /// with a subsequent upload call against the returned entry's id.
    async fn create_file(&self, parent_id: &str, title: &str) -> Result<RemoteEntry>;

    /// Replace a file's content with raw bytes.
    async fn upload_bytes(&self, file_id: &str, data: Bytes) -> Result<()>;

    /// Replace a file's content with UTF-8 text.
    async fn upload_text(&self, file_id: &str, text: &str) -> Result<()>;

    /// Move an entry to the trash. The title is not freed for reuse
    /// detection purposes; listings simply stop returning the entry.
    async fn trash(&self, entry_id: &str) -> Result<()>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_remote_entry_equality() {
        let a = RemoteEntry {
            id: "id1".to_string(),
            title: "song.mp3".to_string(),
            checksum: Some("d41d8cd98f00b204e9800998ecf8427e".to_string()),
            is_folder: false,
        };
        let b = a.clone();

        assert_eq!(a, b);
        assert!(!a.is_folder);
    }

    #[test]
    fn test_entry_kind_copy() {
        let kind = EntryKind::Folder;
        let copied = kind;
        assert_eq!(kind, copied);
    }
}
