//! Audio file format constants used by the tag containers.

use std::path::Path;

/// ID3-tagged MPEG audio
pub const ID3_EXTENSIONS: &[&str] = &["mp3"];

/// Ogg Vorbis audio
pub const VORBIS_EXTENSIONS: &[&str] = &["ogg"];

/// Lowercased extension of `path`, without the dot.
pub fn extension_of<P: AsRef<Path>>(path: P) -> Option<String> {
    path.as_ref()
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_lowercase())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extension_of() {
        assert_eq!(extension_of("a/b/song.MP3"), Some("mp3".to_string()));
        assert_eq!(extension_of("song.ogg"), Some("ogg".to_string()));
        assert_eq!(extension_of("README"), None);
    }
}
