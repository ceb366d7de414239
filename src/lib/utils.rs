use crate::error::{OrganizeError, Result};
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// Files and directories found below a root, captured before any changes.
#[derive(Debug, Default)]
pub struct TreeSnapshot {
    /// Regular files and symlinks to regular files.
    pub files: Vec<PathBuf>,
    /// Subdirectories of the root, parents before children.
    pub dirs: Vec<PathBuf>,
    /// Everything else: symlinks to directories, dangling symlinks, sockets, ...
    pub others: Vec<PathBuf>,
}

/// Regular file, or a symlink whose target is one.
fn is_file_entry(entry: &walkdir::DirEntry) -> bool {
    let file_type = entry.file_type();
    file_type.is_file() || (file_type.is_symlink() && entry.path().is_file())
}

fn walk_error(root: &Path, e: walkdir::Error) -> OrganizeError {
    let path = e.path().unwrap_or(root).to_path_buf();
    OrganizeError::io(&path, e.into())
}

/// Record every file and subdirectory below `root`.
///
/// Symlinked directories are not descended into.
pub fn snapshot_tree(root: &Path) -> Result<TreeSnapshot> {
    let mut snapshot = TreeSnapshot::default();

    for entry in WalkDir::new(root).min_depth(1) {
        let entry = entry.map_err(|e| walk_error(root, e))?;
        if entry.file_type().is_dir() {
            snapshot.dirs.push(entry.into_path());
        } else if is_file_entry(&entry) {
            snapshot.files.push(entry.into_path());
        } else {
            snapshot.others.push(entry.into_path());
        }
    }

    Ok(snapshot)
}

/// Files (including symlinked ones) in `dir`, descending into subdirectories when `recursive`.
pub fn list_files(dir: &Path, recursive: bool) -> Result<Vec<PathBuf>> {
    let mut walker = WalkDir::new(dir).min_depth(1);
    if !recursive {
        walker = walker.max_depth(1);
    }

    let mut files = Vec::new();
    for entry in walker {
        let entry = entry.map_err(|e| walk_error(dir, e))?;
        if is_file_entry(&entry) {
            files.push(entry.into_path());
        }
    }
    Ok(files)
}

/// Whether `dir` exists and has no entries.
pub fn is_empty_dir(dir: &Path) -> Result<bool> {
    let mut entries = std::fs::read_dir(dir).map_err(|e| OrganizeError::io(dir, e))?;
    Ok(entries.next().is_none())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn test_snapshot_tree() -> anyhow::Result<()> {
        let dir = tempdir()?;
        let root = dir.path();
        fs::create_dir_all(root.join("a").join("b"))?;
        fs::write(root.join("top.mp3"), b"")?;
        fs::write(root.join("a").join("b").join("deep.ogg"), b"")?;

        let snapshot = snapshot_tree(root)?;

        let mut files = snapshot.files.clone();
        files.sort();
        assert_eq!(
            files,
            vec![root.join("a").join("b").join("deep.ogg"), root.join("top.mp3")]
        );
        assert_eq!(snapshot.dirs.len(), 2);
        let a = snapshot.dirs.iter().position(|d| d == &root.join("a")).unwrap();
        let b = snapshot
            .dirs
            .iter()
            .position(|d| d == &root.join("a").join("b"))
            .unwrap();
        assert!(a < b);
        Ok(())
    }

    #[cfg(unix)]
    #[test]
    fn test_snapshot_tree_symlinks() -> anyhow::Result<()> {
        use std::os::unix::fs::symlink;

        let dir = tempdir()?;
        let root = dir.path().join("artist");
        let outside = dir.path().join("outside");
        fs::create_dir_all(root.join("album"))?;
        fs::create_dir(&outside)?;
        fs::write(outside.join("target.mp3"), b"")?;
        symlink(outside.join("target.mp3"), root.join("album").join("linked.mp3"))?;
        symlink(&outside, root.join("album").join("linked-dir"))?;
        symlink(outside.join("missing.mp3"), root.join("dangling.mp3"))?;

        let snapshot = snapshot_tree(&root)?;

        assert_eq!(snapshot.files, vec![root.join("album").join("linked.mp3")]);
        assert_eq!(snapshot.dirs, vec![root.join("album")]);
        let mut others = snapshot.others.clone();
        others.sort();
        assert_eq!(
            others,
            vec![root.join("album").join("linked-dir"), root.join("dangling.mp3")]
        );
        assert_eq!(list_files(&root, true)?, snapshot.files);
        Ok(())
    }

    #[test]
    fn test_list_files_depth() -> anyhow::Result<()> {
        let dir = tempdir()?;
        let root = dir.path();
        fs::create_dir(root.join("sub"))?;
        fs::write(root.join("one.mp3"), b"")?;
        fs::write(root.join("sub").join("two.mp3"), b"")?;

        assert_eq!(list_files(root, false)?, vec![root.join("one.mp3")]);
        assert_eq!(list_files(root, true)?.len(), 2);
        Ok(())
    }

    #[test]
    fn test_is_empty_dir() -> anyhow::Result<()> {
        let dir = tempdir()?;
        assert!(is_empty_dir(dir.path())?);
        fs::write(dir.path().join("file"), b"")?;
        assert!(!is_empty_dir(dir.path())?);
        Ok(())
    }
}
