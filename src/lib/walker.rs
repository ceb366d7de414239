//! Artist and collection traversal.
//!
//! Artist mode relocates every file below one artist directory and then
//! removes the subdirectories it found there. Collection mode runs artist
//! mode on each top-level directory of the collection root and relocates
//! loose top-level files directly.

use crate::config::OrganizeConfig;
use crate::directory::{Outcome, Relocator};
use crate::error::{OrganizeError, Result};
use crate::progress::ProgressMessage;
use crate::tagging::ContainerRegistry;
use crate::utils;
use rustc_hash::FxHashSet;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// More distinct artists than this in one artist directory asks for confirmation.
pub const MAX_ARTISTS_WITHOUT_CONFIRMATION: usize = 2;

/// Asks the user a yes/no question.
pub trait Confirm {
    fn confirm(&mut self, question: &str) -> io::Result<bool>;
}

/// Counts of what a walk did.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct WalkSummary {
    pub moved: usize,
    pub in_place: usize,
    pub conflicts: usize,
    pub deleted: usize,
    pub unrecognized_deleted: usize,
    pub dirs_removed: usize,
}

impl WalkSummary {
    fn record(&mut self, source: &Path, outcome: &Outcome) {
        match outcome {
            Outcome::Moved { destination } if destination == source => self.in_place += 1,
            Outcome::Moved { .. } => self.moved += 1,
            Outcome::Conflict { .. } => self.conflicts += 1,
            Outcome::Deleted { .. } => self.deleted += 1,
            Outcome::UnrecognizedExtension => self.unrecognized_deleted += 1,
        }
    }

    fn merge(&mut self, other: &WalkSummary) {
        self.moved += other.moved;
        self.in_place += other.in_place;
        self.conflicts += other.conflicts;
        self.deleted += other.deleted;
        self.unrecognized_deleted += other.unrecognized_deleted;
        self.dirs_removed += other.dirs_removed;
    }

    pub fn report(&self) {
        ProgressMessage::Complete {
            moved: self.moved,
            in_place: self.in_place,
            conflicts: self.conflicts,
            deleted: self.deleted + self.unrecognized_deleted,
        }
        .report();
    }
}

pub struct Walker<'a> {
    relocator: Relocator<'a>,
}

impl<'a> Walker<'a> {
    pub fn new(root: &'a Path, config: &'a OrganizeConfig, registry: &'a ContainerRegistry) -> Self {
        Walker {
            relocator: Relocator::new(root, config, registry),
        }
    }

    /// Distinct `artist` values below `dir`, case-folded.
    ///
    /// Files without readable tags are ignored.
    pub fn distinct_artists(&self, dir: &Path) -> Result<FxHashSet<String>> {
        let registry = self.relocator.registry();
        let mut artists = FxHashSet::default();
        for path in utils::list_files(dir, true)? {
            if !registry.recognizes(&path) {
                continue;
            }
            let Ok(handle) = registry.open(&path) else {
                continue;
            };
            if let Some(artist) = handle.first("artist") {
                artists.insert(artist.trim().to_lowercase());
            }
        }
        Ok(artists)
    }

    /// Organize a single artist directory.
    ///
    /// Asks `confirm` first when the directory holds more than
    /// [`MAX_ARTISTS_WITHOUT_CONFIRMATION`] artists, unless `assume_yes` is set.
    pub fn organize_artist(&self, dir: &Path, confirm: &mut dyn Confirm) -> Result<WalkSummary> {
        if !self.relocator.config().assume_yes {
            let artists = self.distinct_artists(dir)?;
            if artists.len() > MAX_ARTISTS_WITHOUT_CONFIRMATION {
                let mut names: Vec<&str> = artists.iter().map(String::as_str).collect();
                names.sort_unstable();
                let question = format!(
                    "'{}' contains {} different artists ({}). Organize it anyway?",
                    dir.display(),
                    names.len(),
                    names.join(", ")
                );
                let accepted = confirm
                    .confirm(&question)
                    .map_err(|e| OrganizeError::io(dir, e))?;
                if !accepted {
                    return Err(OrganizeError::Declined {
                        path: dir.to_path_buf(),
                    });
                }
            }
        }

        let summary = self.walk_artist(dir)?;
        summary.report();
        Ok(summary)
    }

    fn walk_artist(&self, dir: &Path) -> Result<WalkSummary> {
        debug!("Organizing artist directory {}", dir.display());
        let snapshot = utils::snapshot_tree(dir)?;
        let mut summary = WalkSummary::default();

        let mut pending: FxHashSet<PathBuf> = snapshot.dirs.into_iter().collect();
        // Paths whose parent directories must survive the clean-up.
        let mut anchors: Vec<PathBuf> = snapshot.others;

        for file in &snapshot.files {
            let outcome = self.relocator.relocate(file)?;
            match &outcome {
                Outcome::Moved { destination } => {
                    anchors.push(destination.clone());
                    // Same-file matches leave the source behind.
                    if file.symlink_metadata().is_ok() {
                        anchors.push(file.clone());
                    }
                }
                Outcome::Conflict { existing } => {
                    anchors.push(file.clone());
                    anchors.push(existing.clone());
                }
                Outcome::Deleted { existing } => anchors.push(existing.clone()),
                Outcome::UnrecognizedExtension => remove_unrecognized(file)?,
            }
            summary.record(file, &outcome);
        }

        for anchor in &anchors {
            for ancestor in anchor.ancestors().skip(1) {
                pending.remove(ancestor);
            }
        }

        // Children before parents, so a parent is empty by the time it is reached.
        let mut doomed: Vec<PathBuf> = pending.into_iter().collect();
        doomed.sort_by(|a, b| b.cmp(a));
        for stale in doomed {
            match fs::remove_dir(&stale) {
                Ok(()) => {
                    summary.dirs_removed += 1;
                    ProgressMessage::RemovedDirectory { path: stale }.report();
                }
                Err(e) if e.kind() == io::ErrorKind::NotFound => {}
                Err(e) => warn!("Keeping directory '{}': {}", stale.display(), e),
            }
        }

        Ok(summary)
    }

    /// Organize every artist directory and loose file of the collection root.
    pub fn organize_collection(&self) -> Result<WalkSummary> {
        let root = self.relocator.root();
        let config = self.relocator.config();
        let mut summary = WalkSummary::default();

        let mut entries = Vec::new();
        for entry in fs::read_dir(root).map_err(|e| OrganizeError::io(root, e))? {
            let entry = entry.map_err(|e| OrganizeError::io(root, e))?;
            let file_type = entry.file_type().map_err(|e| OrganizeError::io(root, e))?;
            entries.push((entry.path(), file_type));
        }

        for (path, file_type) in entries {
            if file_type.is_dir() {
                let name = path.file_name().and_then(|n| n.to_str()).unwrap_or_default();
                if config.is_reserved(name) {
                    debug!("Skipping reserved directory {}", path.display());
                    continue;
                }
                // Relocation may already have removed it.
                if !path.is_dir() {
                    continue;
                }
                summary.merge(&self.walk_artist(&path)?);
                if utils::is_empty_dir(&path)? {
                    fs::remove_dir(&path).map_err(|e| OrganizeError::io(&path, e))?;
                    summary.dirs_removed += 1;
                    ProgressMessage::RemovedDirectory { path }.report();
                }
            } else if file_type.is_file() || (file_type.is_symlink() && path.is_file()) {
                let outcome = self.relocator.relocate(&path)?;
                if outcome == Outcome::UnrecognizedExtension {
                    remove_unrecognized(&path)?;
                }
                summary.record(&path, &outcome);
            }
        }

        summary.report();
        Ok(summary)
    }
}

fn remove_unrecognized(path: &Path) -> Result<()> {
    fs::remove_file(path).map_err(|e| OrganizeError::io(path, e))?;
    ProgressMessage::DeletedUnrecognized {
        path: path.to_path_buf(),
    }
    .report();
    Ok(())
}
