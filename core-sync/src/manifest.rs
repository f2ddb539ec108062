//! Manifest generation
//!
//! A playlist's remote body is one line per song, `<songs-folder>/<name>`,
//! joined by `\n` in playlist order. Generation is deterministic, so the
//! MD5 of the generated body can be compared against the checksum the
//! remote store computed for its current content: equal digests mean the
//! upload would be a no-op and is skipped.

use std::path::PathBuf;

/// Generate the manifest body for an ordered song list.
pub fn generate(songs_folder: &str, songs: &[PathBuf]) -> String {
    songs
        .iter()
        .filter_map(|song| song.file_name())
        .map(|name| format!("{}/{}", songs_folder, name.to_string_lossy()))
        .collect::<Vec<_>>()
        .join("\n")
}

/// MD5 of a manifest body as lowercase hex, matching the remote store's
/// checksum representation.
pub fn checksum_hex(content: &str) -> String {
    format!("{:x}", md5::compute(content.as_bytes()))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn songs() -> Vec<PathBuf> {
        vec![
            PathBuf::from("/music/s1.mp3"),
            PathBuf::from("/music/nested/s2.mp3"),
        ]
    }

    #[test]
    fn test_generate_uses_filenames_only() {
        assert_eq!(generate("songs", &songs()), "songs/s1.mp3\nsongs/s2.mp3");
    }

    #[test]
    fn test_generate_empty_playlist() {
        assert_eq!(generate("songs", &[]), "");
    }

    #[test]
    fn test_generate_is_deterministic() {
        let first = generate("songs", &songs());
        let second = generate("songs", &songs());

        assert_eq!(first, second);
        assert_eq!(checksum_hex(&first), checksum_hex(&second));
    }

    #[test]
    fn test_checksum_is_lowercase_hex_digest() {
        let digest = checksum_hex("songs/s1.mp3");

        assert_eq!(digest.len(), 32);
        assert!(digest.chars().all(|c| c.is_ascii_hexdigit() && !c.is_ascii_uppercase()));
    }

    #[test]
    fn test_checksum_differs_for_different_content() {
        assert_ne!(checksum_hex("songs/a.mp3"), checksum_hex("songs/b.mp3"));
    }
}
