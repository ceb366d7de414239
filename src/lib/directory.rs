use crate::config::OrganizeConfig;
use crate::error::{OrganizeError, Result};
use crate::metadata::{self, Field};
use crate::progress::ProgressMessage;
use crate::slug;
use crate::tagging::{ContainerRegistry, TagHandle};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::warn;

/// Stand-in for tags that are missing or cannot be read.
pub const UNKNOWN_PLACEHOLDER: &str = "unknown";

/// Track number prefix used when no number can be found.
pub const TRACK_NUMBER_SENTINEL: &str = "error";

/// Result of relocating one file
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// The file now lives at `destination` (possibly because it already did).
    Moved { destination: PathBuf },
    /// `existing` is occupied by another file; nothing was changed.
    Conflict { existing: PathBuf },
    /// `existing` is occupied by another file; the source was deleted.
    Deleted { existing: PathBuf },
    /// Not a supported audio file; the caller decides what to delete.
    UnrecognizedExtension,
}

/// Canonical path components of a track.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrackNames {
    pub artist: String,
    pub album: Option<String>,
    /// File name without extension, including any `NN.` prefix.
    pub title: String,
}

/// Raw tag text feeding [`TrackNames`].
struct RawFields {
    artist: String,
    title: String,
    album: Option<String>,
    track_number: Option<String>,
}

/// Moves files of a collection to `<root>/<artist>/[<album>/]<title>.<ext>`.
pub struct Relocator<'a> {
    root: &'a Path,
    config: &'a OrganizeConfig,
    registry: &'a ContainerRegistry,
}

impl<'a> Relocator<'a> {
    pub fn new(root: &'a Path, config: &'a OrganizeConfig, registry: &'a ContainerRegistry) -> Self {
        Relocator {
            root,
            config,
            registry,
        }
    }

    pub fn root(&self) -> &Path {
        self.root
    }

    pub fn config(&self) -> &OrganizeConfig {
        self.config
    }

    pub fn registry(&self) -> &ContainerRegistry {
        self.registry
    }

    fn read_fields(&self, path: &Path) -> Result<RawFields> {
        let handle = match self.registry.open(path) {
            Ok(handle) => handle,
            Err(e @ OrganizeError::UnreadableTags { .. }) => {
                warn!("{}; using '{}' for every field", e, UNKNOWN_PLACEHOLDER);
                return Ok(RawFields {
                    artist: UNKNOWN_PLACEHOLDER.to_string(),
                    title: UNKNOWN_PLACEHOLDER.to_string(),
                    album: self.config.album.then(|| UNKNOWN_PLACEHOLDER.to_string()),
                    track_number: self.config.numbering.then(|| track_number_fallback(path)),
                });
            }
            Err(e) => return Err(e),
        };

        let handle = handle.as_ref();
        Ok(RawFields {
            artist: text_or_placeholder(handle, "artist", path),
            title: text_or_placeholder(handle, "title", path),
            album: self
                .config
                .album
                .then(|| text_or_placeholder(handle, "album", path)),
            track_number: self.config.numbering.then(|| {
                metadata::track_number_field(handle)
                    .present()
                    .unwrap_or_else(|| track_number_fallback(path))
            }),
        })
    }

    /// Canonical names for `path`. Fails when a field cannot be normalized.
    pub fn resolve(&self, path: &Path) -> Result<TrackNames> {
        let raw = self.read_fields(path)?;
        let capitalize = self.config.capitalize;

        let artist = slug::normalize(&raw.artist, capitalize)?;
        let album = match raw.album {
            Some(album) => Some(slug::normalize(&album, capitalize)?),
            None => None,
        };
        let mut title = slug::normalize(&raw.title, capitalize)?;
        if let Some(number) = raw.track_number {
            title = format!("{}.{}", number, title);
        }

        Ok(TrackNames {
            artist,
            album,
            title,
        })
    }

    /// Directory the track belongs in, created if absent.
    fn ensure_track_dir(&self, names: &TrackNames) -> Result<PathBuf> {
        let mut dir = self.root.join(&names.artist);
        if let Some(album) = &names.album {
            dir.push(album);
        }
        fs::create_dir_all(&dir).map_err(|e| OrganizeError::io(&dir, e))?;
        Ok(dir)
    }

    /// Move `path` to its canonical location.
    pub fn relocate(&self, path: &Path) -> Result<Outcome> {
        if !self.registry.recognizes(path) {
            if self.config.delete_unrecognized {
                return Ok(Outcome::UnrecognizedExtension);
            }
            return Err(OrganizeError::UnrecognizedExtension {
                path: path.to_path_buf(),
            });
        }

        ProgressMessage::Organizing {
            path: path.to_path_buf(),
        }
        .report();

        let names = self.resolve(path)?;
        ProgressMessage::Resolved {
            artist: names.artist.clone(),
            album: names.album.clone(),
            title: names.title.clone(),
        }
        .report();

        let extension = path
            .extension()
            .and_then(|e| e.to_str())
            .unwrap_or_default();
        let dir = self.ensure_track_dir(&names)?;
        let destination = dir.join(format!("{}.{}", names.title, extension));

        if destination == path || is_same_file(path, &destination) {
            ProgressMessage::InPlace {
                path: path.to_path_buf(),
            }
            .report();
            return Ok(Outcome::Moved { destination });
        }

        if destination.exists() {
            if self.config.delete_conflicts {
                fs::remove_file(path).map_err(|e| OrganizeError::io(path, e))?;
                ProgressMessage::DeletedDuplicate {
                    source: path.to_path_buf(),
                    existing: destination.clone(),
                }
                .report();
                return Ok(Outcome::Deleted {
                    existing: destination,
                });
            }
            ProgressMessage::Conflict {
                source: path.to_path_buf(),
                existing: destination.clone(),
            }
            .report();
            return Ok(Outcome::Conflict {
                existing: destination,
            });
        }

        fs::rename(path, &destination).map_err(|e| OrganizeError::io(path, e))?;
        ProgressMessage::Moved {
            from: path.to_path_buf(),
            to: destination.clone(),
        }
        .report();
        Ok(Outcome::Moved { destination })
    }
}

fn text_or_placeholder(handle: &dyn TagHandle, key: &str, path: &Path) -> String {
    match metadata::text_field(handle, key) {
        Field::Present(value) => value,
        Field::Missing => {
            warn!("No '{}' tag in {}", key, path.display());
            UNKNOWN_PLACEHOLDER.to_string()
        }
        Field::Malformed(raw) => {
            warn!("Unusable '{}' tag {:?} in {}", key, raw, path.display());
            UNKNOWN_PLACEHOLDER.to_string()
        }
    }
}

fn track_number_fallback(path: &Path) -> String {
    metadata::track_number_from_filename(path)
        .unwrap_or_else(|| TRACK_NUMBER_SENTINEL.to_string())
}

/// Both paths resolve to the same file on disk.
fn is_same_file(a: &Path, b: &Path) -> bool {
    match (fs::canonicalize(a), fs::canonicalize(b)) {
        (Ok(a), Ok(b)) => a == b,
        _ => false,
    }
}
