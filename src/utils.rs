use anyhow::{bail, Context, Result};
use std::path::{Path, PathBuf};

pub fn get_default_music_dir() -> String {
    std::env::var("XDG_MUSIC_DIR").unwrap_or_else(|_| shellexpand::tilde("~/Music").into_owned())
}

/// Expand a leading `~` in a user-supplied path.
pub fn expand(dir: &str) -> PathBuf {
    PathBuf::from(shellexpand::tilde(dir).as_ref())
}

/// Canonical form of an existing directory.
pub fn resolve_dir(dir: &Path) -> Result<PathBuf> {
    let canonical = dir
        .canonicalize()
        .with_context(|| format!("Directory '{}' not found", dir.display()))?;
    if !canonical.is_dir() {
        bail!("'{}' is not a directory", dir.display());
    }
    Ok(canonical)
}

/// Resolve an artist directory given on the command line.
///
/// Relative paths are taken relative to the music directory. The result must
/// lie strictly inside it.
pub fn resolve_artist_dir(music_dir: &Path, artist: &str) -> Result<PathBuf> {
    let artist_dir = resolve_dir(&music_dir.join(expand(artist)))?;
    if artist_dir == music_dir || !artist_dir.starts_with(music_dir) {
        bail!(
            "Artist directory '{}' is not inside the music directory '{}'",
            artist_dir.display(),
            music_dir.display()
        );
    }
    Ok(artist_dir)
}
