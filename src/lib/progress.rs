use crate::metadata::TrackNumberRepair;
use std::path::PathBuf;
use tracing::{info, warn};

/// Progress messages emitted while organizing or fixing files.
/// One message is reported per processed file, plus one per removed
/// directory and a summary at the end of a walk.
#[derive(Debug, Clone)]
pub enum ProgressMessage {
    /// A file is about to be relocated
    Organizing { path: PathBuf },
    /// Canonical names computed for a file
    Resolved {
        artist: String,
        album: Option<String>,
        title: String,
    },
    Moved { from: PathBuf, to: PathBuf },
    /// The file already sits at its canonical path
    InPlace { path: PathBuf },
    /// Destination taken, source left where it is
    Conflict { source: PathBuf, existing: PathBuf },
    /// Destination taken, source deleted
    DeletedDuplicate { source: PathBuf, existing: PathBuf },
    DeletedUnrecognized { path: PathBuf },
    RemovedDirectory { path: PathBuf },
    FixingTags { path: PathBuf },
    TrackNumber {
        path: PathBuf,
        repair: TrackNumberRepair,
    },
    /// Walk finished
    Complete {
        moved: usize,
        in_place: usize,
        conflicts: usize,
        deleted: usize,
    },
}

impl ProgressMessage {
    /// Format the message for display
    pub fn format(&self) -> String {
        match self {
            ProgressMessage::Organizing { path } => {
                format!("Organizing song '{}'", path.display())
            }
            ProgressMessage::Resolved {
                artist,
                album,
                title,
            } => match album {
                Some(album) => format!("    {} / {} / {}", artist, album, title),
                None => format!("    {} / {}", artist, title),
            },
            ProgressMessage::Moved { from, to } => {
                format!("Moved: {} -> {}", from.display(), to.display())
            }
            ProgressMessage::InPlace { path } => {
                format!("Already organized: {}", path.display())
            }
            ProgressMessage::Conflict { source, existing } => format!(
                "File exists: '{}', leaving '{}' in place",
                existing.display(),
                source.display()
            ),
            ProgressMessage::DeletedDuplicate { source, existing } => format!(
                "File exists: '{}', deleted '{}'",
                existing.display(),
                source.display()
            ),
            ProgressMessage::DeletedUnrecognized { path } => {
                format!("Deleted unrecognized file '{}'", path.display())
            }
            ProgressMessage::RemovedDirectory { path } => {
                format!("Removed directory '{}'", path.display())
            }
            ProgressMessage::FixingTags { path } => {
                format!("Fixing tags for {}", path.display())
            }
            ProgressMessage::TrackNumber { path, repair } => match repair {
                TrackNumberRepair::Truncated(n) => {
                    format!("    tracknumber of {} shortened to {}", path.display(), n)
                }
                TrackNumberRepair::Inferred(n) => {
                    format!("    tracknumber of {} set to {} from file name", path.display(), n)
                }
                TrackNumberRepair::AlreadyClean => {
                    format!("    tracknumber of {} already clean", path.display())
                }
                TrackNumberRepair::NotFound => {
                    format!("    no tracknumber found for {}", path.display())
                }
            },
            ProgressMessage::Complete {
                moved,
                in_place,
                conflicts,
                deleted,
            } => format!(
                "Complete! {} moved, {} already in place, {} conflicts, {} deleted",
                moved, in_place, conflicts, deleted
            ),
        }
    }

    /// Log the message; conflicts are logged as warnings.
    pub fn report(&self) {
        match self {
            ProgressMessage::Conflict { .. } => warn!("{}", self.format()),
            _ => info!("{}", self.format()),
        }
    }
}
