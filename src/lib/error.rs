use std::path::{Path, PathBuf};
use thiserror::Error;

/// Exit status used when a run stops on a validation failure.
pub const VALIDATION_EXIT_CODE: u8 = 42;

#[derive(Debug, Error)]
pub enum OrganizeError {
    /// Normalization left characters outside the slug alphabet.
    #[error("Unrecognized character in '{slug}'")]
    InvalidCharacter { slug: String },

    /// The tag container is missing or corrupt.
    #[error("Could not read tags from '{}': {reason}", path.display())]
    UnreadableTags { path: PathBuf, reason: String },

    #[error("Unrecognized file extension in '{}'", path.display())]
    UnrecognizedExtension { path: PathBuf },

    #[error("I/O error on '{}'", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The multi-artist confirmation prompt was answered with "no".
    #[error("Declined to organize '{}'", path.display())]
    Declined { path: PathBuf },
}

impl OrganizeError {
    pub(crate) fn io(path: &Path, source: std::io::Error) -> Self {
        OrganizeError::Io {
            path: path.to_path_buf(),
            source,
        }
    }

    pub(crate) fn unreadable(path: &Path, reason: impl ToString) -> Self {
        OrganizeError::UnreadableTags {
            path: path.to_path_buf(),
            reason: reason.to_string(),
        }
    }

    /// Errors that must stop the process with [`VALIDATION_EXIT_CODE`].
    pub fn is_validation_failure(&self) -> bool {
        matches!(
            self,
            OrganizeError::InvalidCharacter { .. } | OrganizeError::UnrecognizedExtension { .. }
        )
    }
}

pub type Result<T, E = OrganizeError> = std::result::Result<T, E>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validation_failures() {
        let invalid = OrganizeError::InvalidCharacter {
            slug: "caf\u{e9}".to_string(),
        };
        let unrecognized = OrganizeError::UnrecognizedExtension {
            path: PathBuf::from("cover.jpg"),
        };
        let unreadable = OrganizeError::unreadable(Path::new("a.mp3"), "no frames");

        assert!(invalid.is_validation_failure());
        assert!(unrecognized.is_validation_failure());
        assert!(!unreadable.is_validation_failure());
    }

    #[test]
    fn test_error_messages() {
        let invalid = OrganizeError::InvalidCharacter {
            slug: "a~b".to_string(),
        };
        assert_eq!(invalid.to_string(), "Unrecognized character in 'a~b'");

        let unrecognized = OrganizeError::UnrecognizedExtension {
            path: PathBuf::from("dir/cover.jpg"),
        };
        assert_eq!(
            unrecognized.to_string(),
            "Unrecognized file extension in 'dir/cover.jpg'"
        );
    }
}
