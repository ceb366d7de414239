use anyhow::{Context, Result};
use musorg::{ContainerRegistry, OrganizeConfig, Walker};
use tracing::info;

use crate::tui::TerminalConfirm;
use crate::utils;

/// Organize the whole music library, or only `artist` when given.
pub fn organize_music_library(
    music_dir: &str,
    artist: Option<&str>,
    config: &OrganizeConfig,
) -> Result<()> {
    let root = utils::resolve_dir(&utils::expand(music_dir))?;
    let registry = ContainerRegistry::with_defaults();
    let walker = Walker::new(&root, config, &registry);

    match artist {
        Some(artist) => {
            let artist_dir = utils::resolve_artist_dir(&root, artist)?;
            info!("🔍 Organizing artist directory: {}", artist_dir.display());
            walker
                .organize_artist(&artist_dir, &mut TerminalConfirm)
                .with_context(|| format!("Failed to organize '{}'", artist_dir.display()))?;
        }
        None => {
            info!("🔍 Scanning music directory: {}", root.display());
            walker
                .organize_collection()
                .with_context(|| format!("Failed to organize '{}'", root.display()))?;
        }
    }

    Ok(())
}
