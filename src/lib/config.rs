use rustc_hash::FxHashSet;

/// Tags kept by `fix-tags` when no `--keep` list is given.
pub const DEFAULT_KEEP_TAGS: &[&str] = &["title", "artist", "album", "genre"];

/// Top-level directories of a collection that are never reorganized.
pub const DEFAULT_RESERVED_DIRS: &[&str] = &["iTunes", "playlists"];

/// Options for relocating files and walking a collection.
#[derive(Debug, Clone)]
pub struct OrganizeConfig {
    /// Delete the source file when its destination is already taken.
    pub delete_conflicts: bool,
    /// Delete files whose extension has no tag container instead of aborting.
    pub delete_unrecognized: bool,
    /// Add an album directory below the artist directory.
    pub album: bool,
    /// Prefix titles with a zero-padded track number (`03.title`).
    pub numbering: bool,
    /// Title-case slugs instead of lowercasing them.
    pub capitalize: bool,
    /// Skip the confirmation asked when one artist directory holds many artists.
    pub assume_yes: bool,
    pub reserved_dirs: Vec<String>,
}

impl Default for OrganizeConfig {
    fn default() -> Self {
        OrganizeConfig {
            delete_conflicts: false,
            delete_unrecognized: false,
            album: false,
            numbering: false,
            capitalize: false,
            assume_yes: false,
            reserved_dirs: DEFAULT_RESERVED_DIRS.iter().map(|s| s.to_string()).collect(),
        }
    }
}

impl OrganizeConfig {
    pub fn is_reserved(&self, dir_name: &str) -> bool {
        self.reserved_dirs.iter().any(|r| r == dir_name)
    }
}

/// Options for the tag clean-up pass.
#[derive(Debug, Clone)]
pub struct TagFixConfig {
    pub keep: FxHashSet<String>,
    /// Also normalize or infer the `tracknumber` tag.
    pub fix_number: bool,
    /// Descend into subdirectories instead of only the top level.
    pub recursive: bool,
}

impl TagFixConfig {
    pub fn new<I, S>(keep: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        TagFixConfig {
            keep: keep
                .into_iter()
                .map(|tag| tag.as_ref().to_lowercase())
                .collect(),
            fix_number: false,
            recursive: false,
        }
    }
}

impl Default for TagFixConfig {
    fn default() -> Self {
        TagFixConfig::new(DEFAULT_KEEP_TAGS)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_reserved_dirs() {
        let config = OrganizeConfig::default();
        assert!(config.is_reserved("iTunes"));
        assert!(config.is_reserved("playlists"));
        assert!(!config.is_reserved("the-beatles"));
    }

    #[test]
    fn test_keep_set_is_lowercased() {
        let config = TagFixConfig::new(["Title", "ARTIST"]);
        assert!(config.keep.contains("title"));
        assert!(config.keep.contains("artist"));
        assert_eq!(config.keep.len(), 2);
    }

    #[test]
    fn test_default_keep_set() {
        let config = TagFixConfig::default();
        for tag in DEFAULT_KEEP_TAGS {
            assert!(config.keep.contains(*tag));
        }
        assert!(!config.fix_number);
    }
}
