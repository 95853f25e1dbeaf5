//! Multi-threaded decoding using rayon.
//!
//! Decoders are pure over their input bytes, so the only shared state is the
//! read buffer and the cache. Every worker thread reads into its own buffer,
//! and [`SharedDescriptorCache`] only holds its lock for map access.

use std::cell::RefCell;
use std::sync::Arc;

use parking_lot::Mutex;
use rayon::prelude::*;

use crate::cache::FxHashMap;
use crate::{DescriptorCache, MenuDecoder, MenuDescriptor};

thread_local! {
    static READ_BUFFER: RefCell<Vec<u8>> = const { RefCell::new(Vec::new()) };
}

/// Decode every name in parallel, preserving input order.
///
/// A failure only affects its own slot, which is `None`.
pub fn decode_parallel<S>(decoder: &MenuDecoder<'_>, names: &[S]) -> Vec<Option<MenuDescriptor>>
where
    S: AsRef<str> + Sync,
{
    decode_parallel_with_progress(decoder, names, || {})
}

/// Like [`decode_parallel`], calling `progress` once per finished item.
pub fn decode_parallel_with_progress<S, F>(
    decoder: &MenuDecoder<'_>,
    names: &[S],
    progress: F,
) -> Vec<Option<MenuDescriptor>>
where
    S: AsRef<str> + Sync,
    F: Fn() + Sync,
{
    names
        .par_iter()
        .map_init(Vec::new, |buffer, name| {
            let menu = decoder.load(name.as_ref(), "", buffer);
            progress();
            menu
        })
        .collect()
}

/// A descriptor cache that can be shared between threads.
///
/// Decoding happens outside the lock. Two threads missing on the same name
/// at once both decode it and the last insert wins; the results are equal.
#[derive(Debug, Default)]
pub struct SharedDescriptorCache {
    entries: Mutex<FxHashMap<String, Option<Arc<MenuDescriptor>>>>,
}

impl SharedDescriptorCache {
    /// Create an empty cache.
    pub fn new() -> Self {
        Self::default()
    }

    /// Get the menu called `name`, decoding it on first use.
    pub fn get(&self, name: &str, decoder: &MenuDecoder<'_>) -> Option<Arc<MenuDescriptor>> {
        if let Some(entry) = self.entries.lock().get(name) {
            return entry.clone();
        }

        let menu = READ_BUFFER
            .with(|buffer| decoder.load(name, "", &mut buffer.borrow_mut()))
            .map(Arc::new);
        self.entries.lock().insert(name.to_string(), menu.clone());
        menu
    }

    /// Number of remembered lookups, failures included.
    pub fn len(&self) -> usize {
        self.entries.lock().len()
    }

    /// Whether nothing is cached.
    pub fn is_empty(&self) -> bool {
        self.entries.lock().is_empty()
    }

    /// Drop every entry and release the calling thread's read buffer.
    ///
    /// Unlike [`DescriptorCache::clear`], buffers owned by other threads
    /// (such as rayon workers) stay allocated until those threads exit.
    pub fn clear(&self) {
        self.entries.lock().clear();
        READ_BUFFER.with(|buffer| buffer.replace(Vec::new()));
    }

    /// Copy the entries into a single-threaded cache, e.g. to save it.
    pub fn snapshot(&self) -> DescriptorCache {
        let mut cache = DescriptorCache::new();
        for (name, menu) in self.entries.lock().iter() {
            cache.insert(name.clone(), menu.as_deref().cloned());
        }
        cache
    }
}

impl From<DescriptorCache> for SharedDescriptorCache {
    fn from(cache: DescriptorCache) -> Self {
        let entries = cache
            .descriptors()
            .map(|(name, menu)| (name.to_string(), Some(Arc::clone(menu))))
            .collect();
        Self {
            entries: Mutex::new(entries),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::decoder::tests::menu_bytes;
    use cmkit_common::source::MemoryFileSystem;

    fn file_system() -> MemoryFileSystem {
        let mut fs = MemoryFileSystem::new();
        for i in 0..32 {
            fs.insert(
                &format!("item{i}.menu"),
                menu_bytes("", &format!("Item {i}"), &[&["category", "acckami"]]),
            );
        }
        fs.insert("broken.menu", vec![1, 2, 3]);
        fs
    }

    #[test]
    fn test_decode_parallel_isolates_failures() {
        let fs = file_system();
        let decoder = MenuDecoder::new(&fs);
        let mut names: Vec<String> = (0..32).map(|i| format!("item{i}")).collect();
        names.insert(5, "broken".to_string());
        names.push("missing".to_string());

        let results = decode_parallel(&decoder, &names);
        assert_eq!(results.len(), names.len());
        assert!(results[5].is_none());
        assert!(results[names.len() - 1].is_none());
        assert_eq!(results.iter().filter(|m| m.is_some()).count(), 32);
        assert_eq!(results[0].as_ref().unwrap().name, "Item 0");
    }

    #[test]
    fn test_shared_cache() {
        let fs = file_system();
        let decoder = MenuDecoder::new(&fs);
        let cache = SharedDescriptorCache::new();

        (0..32).into_par_iter().for_each(|i| {
            let menu = cache.get(&format!("item{}", i % 8), &decoder);
            assert!(menu.is_some());
        });
        assert_eq!(cache.len(), 8);

        cache.clear();
        assert!(cache.is_empty());
    }

    #[test]
    fn test_clear_releases_calling_thread_buffer() {
        let fs = file_system();
        let decoder = MenuDecoder::new(&fs);
        let cache = SharedDescriptorCache::new();

        assert!(cache.get("item0", &decoder).is_some());
        assert!(READ_BUFFER.with(|buffer| buffer.borrow().capacity()) > 0);

        cache.clear();
        assert!(cache.is_empty());
        assert_eq!(READ_BUFFER.with(|buffer| buffer.borrow().capacity()), 0);
        assert!(cache.get("item0", &decoder).is_some());
    }

    #[test]
    fn test_snapshot_round_trip() {
        let fs = file_system();
        let decoder = MenuDecoder::new(&fs);
        let cache = SharedDescriptorCache::new();
        cache.get("item1", &decoder);

        let shared = SharedDescriptorCache::from(cache.snapshot());
        assert_eq!(shared.len(), 1);
    }
}
