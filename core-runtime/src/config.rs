//! # Run Configuration
//!
//! Provides the configuration object for a sync run.
//!
//! ## Overview
//!
//! `SyncSettings` is built through a validating builder and holds everything
//! a run needs to know about its environment: where the two playlist trees
//! live locally and what the remote container folders are called. It
//! enforces fail-fast validation so a misconfigured run stops before any
//! filesystem or network work starts.
//!
//! ## Usage
//!
//! ```
//! use core_runtime::config::SyncSettings;
//!
//! let settings = SyncSettings::builder()
//!     .binary_playlist_root("/home/me/Music/MusicBee/Playlists")
//!     .text_playlist_root("/home/me/Music/MusicBee/Exported Playlists")
//!     .build()
//!     .expect("valid settings");
//!
//! assert_eq!(settings.remote_music_folder, "Music");
//! ```

use crate::error::{Error, Result};
use std::path::PathBuf;

/// Default title of the remote folder holding playlist manifests.
const DEFAULT_MUSIC_FOLDER: &str = "Music";

/// Default title of the remote subfolder holding song files. Also the path
/// prefix written into generated manifests.
const DEFAULT_SONGS_FOLDER: &str = "songs";

/// Settings for one sync run.
///
/// Use [`SyncSettings::builder`] to construct instances.
#[derive(Debug, Clone)]
pub struct SyncSettings {
    /// Root directory scanned recursively for binary (`.mbp`) playlists
    pub binary_playlist_root: PathBuf,

    /// Root directory scanned recursively for text (`.m3u`) playlists
    pub text_playlist_root: PathBuf,

    /// Title of the remote folder that holds playlist manifests
    pub remote_music_folder: String,

    /// Title of the remote subfolder (under the music folder) that holds
    /// song files; also the manifest line prefix
    pub remote_songs_folder: String,
}

impl SyncSettings {
    /// Creates a new builder for constructing `SyncSettings`.
    pub fn builder() -> SyncSettingsBuilder {
        SyncSettingsBuilder::default()
    }

    /// Validates the settings and returns an error if invalid.
    pub fn validate(&self) -> Result<()> {
        if self.binary_playlist_root.as_os_str().is_empty() {
            return Err(Error::Config(
                "Binary playlist root cannot be empty".to_string(),
            ));
        }

        if self.text_playlist_root.as_os_str().is_empty() {
            return Err(Error::Config(
                "Text playlist root cannot be empty".to_string(),
            ));
        }

        if self.remote_music_folder.is_empty() {
            return Err(Error::Config(
                "Remote music folder name cannot be empty".to_string(),
            ));
        }

        if self.remote_songs_folder.is_empty() {
            return Err(Error::Config(
                "Remote songs folder name cannot be empty".to_string(),
            ));
        }

        // The songs folder title ends up inside manifest lines as
        // "<songs>/<filename>"; a separator in the title would corrupt them.
        if self.remote_songs_folder.contains('/') {
            return Err(Error::Config(
                "Remote songs folder name cannot contain '/'".to_string(),
            ));
        }

        Ok(())
    }
}

/// Builder for [`SyncSettings`].
#[derive(Default)]
pub struct SyncSettingsBuilder {
    binary_playlist_root: Option<PathBuf>,
    text_playlist_root: Option<PathBuf>,
    remote_music_folder: Option<String>,
    remote_songs_folder: Option<String>,
}

impl SyncSettingsBuilder {
    /// Sets the root scanned for binary playlists.
    pub fn binary_playlist_root<P: Into<PathBuf>>(mut self, path: P) -> Self {
        self.binary_playlist_root = Some(path.into());
        self
    }

    /// Sets the root scanned for text playlists.
    pub fn text_playlist_root<P: Into<PathBuf>>(mut self, path: P) -> Self {
        self.text_playlist_root = Some(path.into());
        self
    }

    /// Sets the remote music folder title.
    ///
    /// Default: `"Music"`
    pub fn remote_music_folder<S: Into<String>>(mut self, title: S) -> Self {
        self.remote_music_folder = Some(title.into());
        self
    }

    /// Sets the remote songs folder title.
    ///
    /// Default: `"songs"`
    pub fn remote_songs_folder<S: Into<String>>(mut self, title: S) -> Self {
        self.remote_songs_folder = Some(title.into());
        self
    }

    /// Builds the final `SyncSettings` instance.
    ///
    /// # Errors
    ///
    /// Returns an error if a required path is missing or a value fails
    /// validation.
    pub fn build(self) -> Result<SyncSettings> {
        let binary_playlist_root = self.binary_playlist_root.ok_or_else(|| {
            Error::Config(
                "Binary playlist root is required. Use .binary_playlist_root() to set it."
                    .to_string(),
            )
        })?;

        let text_playlist_root = self.text_playlist_root.ok_or_else(|| {
            Error::Config(
                "Text playlist root is required. Use .text_playlist_root() to set it.".to_string(),
            )
        })?;

        let settings = SyncSettings {
            binary_playlist_root,
            text_playlist_root,
            remote_music_folder: self
                .remote_music_folder
                .unwrap_or_else(|| DEFAULT_MUSIC_FOLDER.to_string()),
            remote_songs_folder: self
                .remote_songs_folder
                .unwrap_or_else(|| DEFAULT_SONGS_FOLDER.to_string()),
        };

        settings.validate()?;

        Ok(settings)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder_requires_binary_root() {
        let result = SyncSettings::builder().text_playlist_root("/lists").build();

        assert!(result.is_err());
        assert!(result
            .unwrap_err()
            .to_string()
            .contains("Binary playlist root is required"));
    }

    #[test]
    fn test_builder_requires_text_root() {
        let result = SyncSettings::builder()
            .binary_playlist_root("/lists")
            .build();

        assert!(result.is_err());
        assert!(result
            .unwrap_err()
            .to_string()
            .contains("Text playlist root is required"));
    }

    #[test]
    fn test_builder_applies_defaults() {
        let settings = SyncSettings::builder()
            .binary_playlist_root("/playlists")
            .text_playlist_root("/exported")
            .build()
            .unwrap();

        assert_eq!(settings.remote_music_folder, "Music");
        assert_eq!(settings.remote_songs_folder, "songs");
    }

    #[test]
    fn test_builder_with_custom_folders() {
        let settings = SyncSettings::builder()
            .binary_playlist_root("/playlists")
            .text_playlist_root("/exported")
            .remote_music_folder("Tunes")
            .remote_songs_folder("tracks")
            .build()
            .unwrap();

        assert_eq!(settings.remote_music_folder, "Tunes");
        assert_eq!(settings.remote_songs_folder, "tracks");
    }

    #[test]
    fn test_validate_rejects_empty_folder_name() {
        let result = SyncSettings::builder()
            .binary_playlist_root("/playlists")
            .text_playlist_root("/exported")
            .remote_music_folder("")
            .build();

        assert!(result.is_err());
        assert!(result.unwrap_err().to_string().contains("cannot be empty"));
    }

    #[test]
    fn test_validate_rejects_separator_in_songs_folder() {
        let result = SyncSettings::builder()
            .binary_playlist_root("/playlists")
            .text_playlist_root("/exported")
            .remote_songs_folder("a/b")
            .build();

        assert!(result.is_err());
        assert!(result
            .unwrap_err()
            .to_string()
            .contains("cannot contain '/'"));
    }

    #[test]
    fn test_settings_are_cloneable() {
        let settings = SyncSettings::builder()
            .binary_playlist_root("/playlists")
            .text_playlist_root("/exported")
            .build()
            .unwrap();

        let cloned = settings.clone();
        assert_eq!(cloned.binary_playlist_root, settings.binary_playlist_root);
        assert_eq!(cloned.remote_songs_folder, settings.remote_songs_folder);
    }
}
