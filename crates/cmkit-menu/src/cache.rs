//! Memoization of decoded menus.
//!
//! [`DescriptorCache`] is the decode context for sequential use: it owns the
//! name-to-descriptor map and the read buffer every miss decodes into.
//! Results are only valid for one [`CACHE_VERSION`]; bumping it is the sole
//! invalidation mechanism for saved caches.
//!
//! # Cache file layout
//!
//! - i32: [`CACHE_VERSION`]
//! - i32: entry count
//! - per entry, sorted by key: string key, then the descriptor
//!   (see [`MenuDescriptor::write_to`])

use std::io::Write;
use std::sync::Arc;

use cmkit_common::{BinaryReader, BinaryWriter};
use hashbrown::HashMap as FastHashMap;
use rustc_hash::FxHasher;

use crate::{MenuDecoder, MenuDescriptor, Result};

pub(crate) type FxHashMap<K, V> = FastHashMap<K, V, std::hash::BuildHasherDefault<FxHasher>>;

/// Version of the descriptor shape. Saved caches with another version are
/// discarded on load.
pub const CACHE_VERSION: i32 = 15;

/// Memoizes decoded menus by the name they were requested with.
///
/// Failed decodes are remembered too, so a missing or broken container is
/// only read once until [`clear`](Self::clear).
#[derive(Debug, Default)]
pub struct DescriptorCache {
    entries: FxHashMap<String, Option<Arc<MenuDescriptor>>>,
    buffer: Vec<u8>,
}

impl DescriptorCache {
    /// Create an empty cache.
    pub fn new() -> Self {
        Self::default()
    }

    /// Get the menu called `name`, decoding it on first use.
    pub fn get(&mut self, name: &str, decoder: &MenuDecoder<'_>) -> Option<Arc<MenuDescriptor>> {
        if let Some(entry) = self.entries.get(name) {
            return entry.clone();
        }

        let menu = decoder.load(name, "", &mut self.buffer).map(Arc::new);
        self.entries.insert(name.to_string(), menu.clone());
        menu
    }

    /// Store a result decoded elsewhere.
    pub fn insert(&mut self, name: impl Into<String>, menu: Option<MenuDescriptor>) {
        self.entries.insert(name.into(), menu.map(Arc::new));
    }

    /// Whether `name` has been looked up, successfully or not.
    pub fn contains(&self, name: &str) -> bool {
        self.entries.contains_key(name)
    }

    /// Number of remembered lookups, failures included.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether nothing is cached.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Drop every entry and release the read buffer.
    pub fn clear(&mut self) {
        self.entries.clear();
        self.buffer = Vec::new();
    }

    /// Iterate over successfully decoded menus.
    pub fn descriptors(&self) -> impl Iterator<Item = (&str, &Arc<MenuDescriptor>)> {
        self.entries
            .iter()
            .filter_map(|(name, menu)| Some((name.as_str(), menu.as_ref()?)))
    }

    /// Save successfully decoded menus, ordered by key. Failures are not
    /// persisted.
    pub fn write_to<W: Write>(&self, writer: W) -> Result<()> {
        let mut writer = BinaryWriter::new(writer);
        let mut entries: Vec<_> = self.descriptors().collect();
        entries.sort_unstable_by_key(|(name, _)| *name);
        entries.truncate(i32::MAX as usize);

        writer.write_i32(CACHE_VERSION)?;
        writer.write_i32(entries.len() as i32)?;
        for (name, menu) in entries {
            writer.write_string(name)?;
            menu.write_to(&mut writer)?;
        }
        Ok(())
    }

    /// Load a saved cache.
    ///
    /// A cache written with a different [`CACHE_VERSION`] yields an empty
    /// cache rather than an error.
    pub fn read_from(data: &[u8]) -> Result<Self> {
        let mut reader = BinaryReader::new(data);
        let version = reader.read_i32()?;
        if version != CACHE_VERSION {
            log::info!(
                "discarding menu cache with version {version} (current is {CACHE_VERSION})"
            );
            return Ok(Self::new());
        }

        let count = reader.read_length()?;
        let mut cache = Self::new();
        cache.entries.reserve(count.min(reader.remaining()));
        for _ in 0..count {
            let name = reader.read_string()?.into_owned();
            let menu = MenuDescriptor::read_from(&mut reader)?;
            cache.entries.insert(name, Some(Arc::new(menu)));
        }
        Ok(cache)
    }
}
