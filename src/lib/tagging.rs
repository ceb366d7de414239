//! Uniform tag access for the supported container formats.
//!
//! Tags are addressed by lowercase names (`title`, `artist`, `tracknumber`,
//! ...) whatever the container stores internally. A [`ContainerRegistry`]
//! picks the [`TagContainer`] for a file from its extension; relocation and
//! pruning only ever talk to the returned [`TagHandle`].

use crate::audio::{self, ID3_EXTENSIONS, VORBIS_EXTENSIONS};
use crate::error::{OrganizeError, Result};
use lofty::config::WriteOptions;
use lofty::file::{FileType, TaggedFileExt};
use lofty::tag::{ItemKey, ItemValue, Tag, TagExt, TagItem, TagType};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Tag name to values, as seen through a [`TagHandle`].
pub type TagMap = BTreeMap<String, Vec<String>>;

/// An opened tag block. Changes stay in memory until [`TagHandle::save`].
pub trait TagHandle {
    /// Names of all tags present, without duplicates.
    fn keys(&self) -> Vec<String>;
    /// Text values stored under `key`, or `None` when the tag is absent.
    fn get(&self, key: &str) -> Option<Vec<String>>;
    /// Replace every value of `key` with `value`.
    fn set(&mut self, key: &str, value: &str);
    fn delete(&mut self, key: &str);
    fn save(&mut self) -> Result<()>;

    /// First value of `key`, if any.
    fn first(&self, key: &str) -> Option<String> {
        self.get(key).and_then(|values| values.into_iter().next())
    }

    fn to_map(&self) -> TagMap {
        self.keys()
            .into_iter()
            .filter_map(|key| self.get(&key).map(|values| (key, values)))
            .collect()
    }
}

/// A tag container format, e.g. ID3v2 inside MP3.
pub trait TagContainer {
    fn name(&self) -> &'static str;
    /// Lowercase file extensions handled by this container.
    fn extensions(&self) -> &'static [&'static str];
    fn open(&self, path: &Path) -> Result<Box<dyn TagHandle>>;
}

/// Extension based dispatch to the registered containers.
pub struct ContainerRegistry {
    containers: Vec<Box<dyn TagContainer>>,
}

impl ContainerRegistry {
    pub fn empty() -> Self {
        ContainerRegistry {
            containers: Vec::new(),
        }
    }

    /// MP3 (ID3v2) and Ogg Vorbis.
    pub fn with_defaults() -> Self {
        let mut registry = ContainerRegistry::empty();
        registry.register(Box::new(Id3Container));
        registry.register(Box::new(VorbisContainer));
        registry
    }

    pub fn register(&mut self, container: Box<dyn TagContainer>) {
        self.containers.push(container);
    }

    pub fn container_for(&self, path: &Path) -> Option<&dyn TagContainer> {
        let ext = audio::extension_of(path)?;
        self.containers
            .iter()
            .find(|c| c.extensions().contains(&ext.as_str()))
            .map(|c| c.as_ref())
    }

    pub fn recognizes(&self, path: &Path) -> bool {
        self.container_for(path).is_some()
    }

    pub fn open(&self, path: &Path) -> Result<Box<dyn TagHandle>> {
        let container =
            self.container_for(path)
                .ok_or_else(|| OrganizeError::UnrecognizedExtension {
                    path: path.to_path_buf(),
                })?;
        debug!("Opening {} with the {} container", path.display(), container.name());
        container.open(path)
    }
}

impl Default for ContainerRegistry {
    fn default() -> Self {
        ContainerRegistry::with_defaults()
    }
}

/// ID3v2 tags of MP3 files.
///
/// ID3v2 keeps the track total in the same frame as the track number
/// (`TRCK = 3/12`), so `tracknumber` and `discnumber` are presented in the
/// combined `N/Total` form.
pub struct Id3Container;

impl TagContainer for Id3Container {
    fn name(&self) -> &'static str {
        "ID3v2"
    }

    fn extensions(&self) -> &'static [&'static str] {
        ID3_EXTENSIONS
    }

    fn open(&self, path: &Path) -> Result<Box<dyn TagHandle>> {
        let handle = LoftyHandle::open(path, FileType::Mpeg, TagType::Id3v2, true)?;
        Ok(Box::new(handle))
    }
}

/// Vorbis comments of Ogg Vorbis files.
pub struct VorbisContainer;

impl TagContainer for VorbisContainer {
    fn name(&self) -> &'static str {
        "Vorbis comments"
    }

    fn extensions(&self) -> &'static [&'static str] {
        VORBIS_EXTENSIONS
    }

    fn open(&self, path: &Path) -> Result<Box<dyn TagHandle>> {
        let handle = LoftyHandle::open(path, FileType::Vorbis, TagType::VorbisComments, false)?;
        Ok(Box::new(handle))
    }
}

/// Tag name used for a lofty item key.
fn name_for(key: &ItemKey, tag_type: TagType) -> String {
    let known = match key {
        ItemKey::TrackTitle => "title",
        ItemKey::TrackArtist => "artist",
        ItemKey::AlbumTitle => "album",
        ItemKey::AlbumArtist => "albumartist",
        ItemKey::Genre => "genre",
        ItemKey::TrackNumber => "tracknumber",
        ItemKey::TrackTotal => "tracktotal",
        ItemKey::DiscNumber => "discnumber",
        ItemKey::DiscTotal => "disctotal",
        ItemKey::RecordingDate => "date",
        ItemKey::Composer => "composer",
        ItemKey::Comment => "comment",
        ItemKey::Lyrics => "lyrics",
        ItemKey::Bpm => "bpm",
        ItemKey::EncodedBy => "encodedby",
        ItemKey::CopyrightMessage => "copyright",
        ItemKey::Label => "organization",
        ItemKey::Unknown(raw) => return raw.to_lowercase(),
        other => {
            return other
                .map_key(tag_type, true)
                .map(str::to_lowercase)
                .unwrap_or_else(|| format!("{:?}", other).to_lowercase())
        }
    };
    known.to_string()
}

/// Lofty item key used when writing tag `name`.
fn item_key_for(name: &str) -> ItemKey {
    match name {
        "title" => ItemKey::TrackTitle,
        "artist" => ItemKey::TrackArtist,
        "album" => ItemKey::AlbumTitle,
        "albumartist" => ItemKey::AlbumArtist,
        "genre" => ItemKey::Genre,
        "tracknumber" => ItemKey::TrackNumber,
        "tracktotal" => ItemKey::TrackTotal,
        "discnumber" => ItemKey::DiscNumber,
        "disctotal" => ItemKey::DiscTotal,
        "date" => ItemKey::RecordingDate,
        "composer" => ItemKey::Composer,
        "comment" => ItemKey::Comment,
        "lyrics" => ItemKey::Lyrics,
        "bpm" => ItemKey::Bpm,
        "encodedby" => ItemKey::EncodedBy,
        "copyright" => ItemKey::CopyrightMessage,
        "organization" => ItemKey::Label,
        other => ItemKey::Unknown(other.to_uppercase()),
    }
}

/// Total tag folded into a number tag when totals are combined.
fn total_for(name: &str) -> Option<&'static str> {
    match name {
        "tracknumber" => Some("tracktotal"),
        "discnumber" => Some("disctotal"),
        _ => None,
    }
}

/// A lofty [`Tag`] read from `path` and written back there on save.
struct LoftyHandle {
    path: PathBuf,
    tag: Tag,
    combine_totals: bool,
}

impl LoftyHandle {
    fn open(
        path: &Path,
        expected: FileType,
        tag_type: TagType,
        combine_totals: bool,
    ) -> Result<Self> {
        let mut file =
            lofty::read_from_path(path).map_err(|e| OrganizeError::unreadable(path, e))?;

        if file.file_type() != expected {
            return Err(OrganizeError::unreadable(
                path,
                format!("expected {:?} data, found {:?}", expected, file.file_type()),
            ));
        }

        // Files without a tag block get an empty one so `set` has somewhere to write.
        let tag = file.remove(tag_type).unwrap_or_else(|| Tag::new(tag_type));
        Ok(LoftyHandle::from_tag(path, tag, combine_totals))
    }

    fn from_tag(path: &Path, tag: Tag, combine_totals: bool) -> Self {
        LoftyHandle {
            path: path.to_path_buf(),
            tag,
            combine_totals,
        }
    }

    fn values(&self, name: &str) -> Vec<String> {
        let tag_type = self.tag.tag_type();
        self.tag
            .items()
            .filter(|item| name_for(item.key(), tag_type) == name)
            .filter_map(|item| item.value().text())
            .map(str::to_string)
            .collect()
    }

    fn remove(&mut self, name: &str) {
        let tag_type = self.tag.tag_type();
        self.tag.retain(|item| name_for(item.key(), tag_type) != name);
    }

    fn insert(&mut self, name: &str, value: &str) {
        // Unchecked: the key is mapped to the container's own vocabulary on save.
        self.tag.insert_unchecked(TagItem::new(
            item_key_for(name),
            ItemValue::Text(value.to_string()),
        ));
    }
}

impl TagHandle for LoftyHandle {
    fn keys(&self) -> Vec<String> {
        let tag_type = self.tag.tag_type();
        let mut keys: Vec<String> = Vec::new();
        for item in self.tag.items() {
            let mut name = name_for(item.key(), tag_type);
            if self.combine_totals {
                name = match name.as_str() {
                    "tracktotal" => "tracknumber".to_string(),
                    "disctotal" => "discnumber".to_string(),
                    _ => name,
                };
            }
            if !keys.contains(&name) {
                keys.push(name);
            }
        }
        keys
    }

    fn get(&self, key: &str) -> Option<Vec<String>> {
        let values = self.values(key);
        if self.combine_totals {
            if let Some(total_key) = total_for(key) {
                let total = self.values(total_key).into_iter().next();
                return match (values.into_iter().next(), total) {
                    (Some(number), Some(total)) => Some(vec![format!("{}/{}", number, total)]),
                    (Some(number), None) => Some(vec![number]),
                    (None, _) => None,
                };
            }
        }
        if values.is_empty() {
            None
        } else {
            Some(values)
        }
    }

    fn set(&mut self, key: &str, value: &str) {
        self.delete(key);
        if self.combine_totals {
            if let Some(total_key) = total_for(key) {
                match value.split_once('/') {
                    Some((number, total)) => {
                        self.insert(key, number);
                        self.insert(total_key, total);
                    }
                    None => self.insert(key, value),
                }
                return;
            }
        }
        self.insert(key, value);
    }

    fn delete(&mut self, key: &str) {
        self.remove(key);
        if self.combine_totals {
            if let Some(total_key) = total_for(key) {
                self.remove(total_key);
            }
        }
    }

    fn save(&mut self) -> Result<()> {
        self.tag
            .save_to_path(&self.path, WriteOptions::default())
            .map_err(|e| OrganizeError::io(&self.path, std::io::Error::other(e.to_string())))
    }
}

/// In-memory containers for exercising tag logic without audio fixtures.
#[cfg(test)]
pub(crate) mod memory {
    use super::*;
    use std::cell::RefCell;
    use std::collections::HashMap;
    use std::rc::Rc;

    /// Shared tag storage keyed by file path. Paths without an entry behave
    /// like files whose tags cannot be read.
    #[derive(Clone, Default)]
    pub struct MemoryStore(Rc<RefCell<HashMap<PathBuf, TagMap>>>);

    impl MemoryStore {
        pub fn new() -> Self {
            MemoryStore::default()
        }

        pub fn insert(&self, path: &Path, tags: &[(&str, &str)]) {
            let mut map = TagMap::new();
            for (key, value) in tags {
                map.entry(key.to_string())
                    .or_default()
                    .push(value.to_string());
            }
            self.0.borrow_mut().insert(path.to_path_buf(), map);
        }

        pub fn tags(&self, path: &Path) -> Option<TagMap> {
            self.0.borrow().get(path).cloned()
        }

        /// Registry serving `mp3` and `ogg` files from this store.
        pub fn registry(&self) -> ContainerRegistry {
            let mut registry = ContainerRegistry::empty();
            registry.register(Box::new(MemoryContainer {
                store: self.clone(),
                extensions: ID3_EXTENSIONS,
            }));
            registry.register(Box::new(MemoryContainer {
                store: self.clone(),
                extensions: VORBIS_EXTENSIONS,
            }));
            registry
        }
    }

    struct MemoryContainer {
        store: MemoryStore,
        extensions: &'static [&'static str],
    }

    impl TagContainer for MemoryContainer {
        fn name(&self) -> &'static str {
            "memory"
        }

        fn extensions(&self) -> &'static [&'static str] {
            self.extensions
        }

        fn open(&self, path: &Path) -> Result<Box<dyn TagHandle>> {
            let tags = self
                .store
                .tags(path)
                .ok_or_else(|| OrganizeError::unreadable(path, "no tag block"))?;
            Ok(Box::new(MemoryHandle {
                store: self.store.clone(),
                path: path.to_path_buf(),
                tags,
            }))
        }
    }

    struct MemoryHandle {
        store: MemoryStore,
        path: PathBuf,
        tags: TagMap,
    }

    impl TagHandle for MemoryHandle {
        fn keys(&self) -> Vec<String> {
            self.tags.keys().cloned().collect()
        }

        fn get(&self, key: &str) -> Option<Vec<String>> {
            self.tags.get(key).cloned()
        }

        fn set(&mut self, key: &str, value: &str) {
            self.tags.insert(key.to_string(), vec![value.to_string()]);
        }

        fn delete(&mut self, key: &str) {
            self.tags.remove(key);
        }

        fn save(&mut self) -> Result<()> {
            self.store
                .0
                .borrow_mut()
                .insert(self.path.clone(), self.tags.clone());
            Ok(())
        }
    }
}
