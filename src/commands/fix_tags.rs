use anyhow::{Context, Result};
use musorg::metadata;
use musorg::{ContainerRegistry, TagFixConfig};
use tracing::info;

use crate::utils;

/// Strip unwanted tags from every supported file in `dir`.
pub fn fix_tags(dir: &str, config: &TagFixConfig) -> Result<()> {
    let dir = utils::resolve_dir(&utils::expand(dir))?;
    let registry = ContainerRegistry::with_defaults();

    let fixed = metadata::fix_directory_tags(&dir, &registry, config)
        .with_context(|| format!("Failed to fix tags in '{}'", dir.display()))?;

    info!("Fixed tags of {} files in {}", fixed, dir.display());
    Ok(())
}
