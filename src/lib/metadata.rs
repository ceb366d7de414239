use crate::config::TagFixConfig;
use crate::error::Result;
use crate::progress::ProgressMessage;
use crate::tagging::{ContainerRegistry, TagHandle};
use crate::utils;
use regex::Regex;
use rustc_hash::FxHashSet;
use std::path::Path;
use std::sync::LazyLock;
use tracing::debug;

static RE_DIGITS: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\d+").unwrap());

/// A single tag value after validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Field {
    Present(String),
    Missing,
    /// The tag exists but its value is unusable; holds the raw text.
    Malformed(String),
}

impl Field {
    pub fn present(self) -> Option<String> {
        match self {
            Field::Present(value) => Some(value),
            _ => None,
        }
    }
}

/// First value of a text tag with non-ASCII characters dropped.
///
/// A value left empty by that is reported as malformed.
pub fn text_field(handle: &dyn TagHandle, key: &str) -> Field {
    let Some(raw) = handle.first(key) else {
        return Field::Missing;
    };
    let ascii: String = raw.chars().filter(char::is_ascii).collect();
    let ascii = ascii.trim();
    if ascii.is_empty() {
        Field::Malformed(raw)
    } else {
        Field::Present(ascii.to_string())
    }
}

/// The `tracknumber` tag as zero-padded digits, ignoring any `/Total` part.
pub fn track_number_field(handle: &dyn TagHandle) -> Field {
    let Some(raw) = handle.first("tracknumber") else {
        return Field::Missing;
    };
    let number = raw.split('/').next().unwrap_or_default().trim();
    if !number.is_empty() && number.chars().all(|c| c.is_ascii_digit()) {
        Field::Present(pad_track_number(number))
    } else {
        Field::Malformed(raw)
    }
}

/// Zero-pad a track number to at least two characters.
pub fn pad_track_number(number: &str) -> String {
    format!("{:0>2}", number)
}

/// Track number taken from the first word of the file name, e.g. `03` for
/// `03 - Song.mp3` or `Track7.ogg`. The extension is never considered.
pub fn track_number_from_filename(path: &Path) -> Option<String> {
    let stem = path.file_stem()?.to_str()?;
    let first_word = stem.split(' ').next()?;
    RE_DIGITS
        .find(first_word)
        .map(|m| pad_track_number(m.as_str()))
}

/// Delete every tag whose name is not in `keep`, without saving.
///
/// Returns the removed names.
pub fn remove_unwanted_tags(handle: &mut dyn TagHandle, keep: &FxHashSet<String>) -> Vec<String> {
    let unwanted: Vec<String> = handle
        .keys()
        .into_iter()
        .filter(|key| !keep.contains(key))
        .collect();

    for key in &unwanted {
        debug!("Removing tag '{}'", key);
        handle.delete(key);
    }
    unwanted
}

/// Delete every tag whose name is not in `keep`, then save.
///
/// The file is rewritten even when nothing was removed.
pub fn prune_tags(handle: &mut dyn TagHandle, keep: &FxHashSet<String>) -> Result<()> {
    remove_unwanted_tags(handle, keep);
    handle.save()
}

/// What [`repair_track_number`] did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TrackNumberRepair {
    /// `N/Total` was cut down to `N`.
    Truncated(String),
    /// The number was taken from the file name.
    Inferred(String),
    AlreadyClean,
    /// No tag and no digits in the file name; nothing was written.
    NotFound,
}

/// Normalize `tracknumber` or fill it in from the file name, in memory only.
pub fn update_track_number(handle: &mut dyn TagHandle, path: &Path) -> TrackNumberRepair {
    if let Some(current) = handle.first("tracknumber") {
        let Some((number, _total)) = current.split_once('/') else {
            return TrackNumberRepair::AlreadyClean;
        };
        let number = pad_track_number(number.trim());
        handle.set("tracknumber", &number);
        return TrackNumberRepair::Truncated(number);
    }

    match track_number_from_filename(path) {
        Some(number) => {
            handle.set("tracknumber", &number);
            TrackNumberRepair::Inferred(number)
        }
        None => TrackNumberRepair::NotFound,
    }
}

/// Normalize `tracknumber` or fill it in from the file name.
///
/// Saves only when something changed. A missing number that cannot be
/// inferred is not an error.
pub fn repair_track_number(handle: &mut dyn TagHandle, path: &Path) -> Result<TrackNumberRepair> {
    let repair = update_track_number(handle, path);
    if matches!(
        repair,
        TrackNumberRepair::Truncated(_) | TrackNumberRepair::Inferred(_)
    ) {
        handle.save()?;
    }
    Ok(repair)
}

/// Prune one file and optionally repair its track number.
///
/// Unreadable tags are an error here: there is nothing to prune safely.
pub fn fix_file_tags(
    path: &Path,
    registry: &ContainerRegistry,
    config: &TagFixConfig,
) -> Result<()> {
    ProgressMessage::FixingTags {
        path: path.to_path_buf(),
    }
    .report();

    let mut handle = registry.open(path)?;
    prune_tags(handle.as_mut(), &config.keep)?;

    if config.fix_number {
        let repair = repair_track_number(handle.as_mut(), path)?;
        ProgressMessage::TrackNumber {
            path: path.to_path_buf(),
            repair,
        }
        .report();
    }

    Ok(())
}

/// Run [`fix_file_tags`] on every supported file in `dir`.
///
/// Other files are ignored. Returns the number of files fixed.
pub fn fix_directory_tags(
    dir: &Path,
    registry: &ContainerRegistry,
    config: &TagFixConfig,
) -> Result<usize> {
    let files = utils::list_files(dir, config.recursive)?;
    let mut fixed = 0;
    for path in files.iter().filter(|p| registry.recognizes(p)) {
        fix_file_tags(path, registry, config)?;
        fixed += 1;
    }
    Ok(fixed)
}
