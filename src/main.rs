//! Command-line entry point
//!
//! Wires configuration, logging, the library scan, and the reconciliation
//! engine together for one batch pass against Google Drive. Token
//! acquisition is not handled here: the access token comes pre-issued via
//! `PLAYSYNC_ACCESS_TOKEN`.

use anyhow::{bail, Context, Result};
use core_playlist::LibraryIndex;
use core_runtime::logging::{init_logging, LoggingConfig};
use core_runtime::SyncSettings;
use core_sync::{ReconcileConfig, ReconciliationEngine};
use provider_google_drive::GoogleDriveStore;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{info, warn};

/// Environment variable carrying the OAuth access token
const TOKEN_VAR: &str = "PLAYSYNC_ACCESS_TOKEN";

fn default_root(segment: &str) -> Result<PathBuf> {
    let home = dirs::home_dir().context("Cannot determine home directory")?;
    Ok(home.join("Music/MusicBee").join(segment))
}

fn settings_from_env() -> Result<SyncSettings> {
    let binary_root = match std::env::var_os("PLAYSYNC_BINARY_PLAYLIST_DIR") {
        Some(dir) => PathBuf::from(dir),
        None => default_root("Playlists")?,
    };
    let text_root = match std::env::var_os("PLAYSYNC_TEXT_PLAYLIST_DIR") {
        Some(dir) => PathBuf::from(dir),
        None => default_root("Exported Playlists")?,
    };

    let mut builder = SyncSettings::builder()
        .binary_playlist_root(binary_root)
        .text_playlist_root(text_root);

    if let Ok(folder) = std::env::var("PLAYSYNC_REMOTE_MUSIC_FOLDER") {
        builder = builder.remote_music_folder(folder);
    }
    if let Ok(folder) = std::env::var("PLAYSYNC_REMOTE_SONGS_FOLDER") {
        builder = builder.remote_songs_folder(folder);
    }

    builder.build().context("Invalid sync settings")
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    init_logging(LoggingConfig::default()).context("Failed to initialize logging")?;

    let settings = settings_from_env()?;
    let token = std::env::var(TOKEN_VAR)
        .with_context(|| format!("{} must hold a Google Drive access token", TOKEN_VAR))?;

    if !settings.binary_playlist_root.is_dir() {
        bail!(
            "Binary playlist root {} is not a readable directory",
            settings.binary_playlist_root.display()
        );
    }
    if !settings.text_playlist_root.is_dir() {
        bail!(
            "Text playlist root {} is not a readable directory",
            settings.text_playlist_root.display()
        );
    }

    info!("Started");

    let mut index = LibraryIndex::new(
        settings.binary_playlist_root.clone(),
        settings.text_playlist_root.clone(),
    );
    let snapshot = index.scan();

    for warning in &snapshot.warnings {
        warn!("{}", warning);
    }

    let store = Arc::new(GoogleDriveStore::new(token));
    let config = ReconcileConfig {
        music_folder: settings.remote_music_folder.clone(),
        songs_folder: settings.remote_songs_folder.clone(),
    };

    let mut engine = ReconciliationEngine::new(store, config);
    let report = engine.run(&snapshot).await.context("Reconciliation failed")?;

    for failure in &report.failures {
        warn!("{}", failure);
    }
    info!("Done: {}", report);

    if !report.failures.is_empty() {
        std::process::exit(1);
    }

    Ok(())
}
