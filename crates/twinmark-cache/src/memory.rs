//! In-process cache implementation.

use std::collections::HashMap;
use std::sync::{Arc, PoisonError, RwLock};

use crate::{Cache, CacheBucket};

#[derive(Debug)]
struct Entry {
    fingerprint: String,
    value: Vec<u8>,
}

type Store = Arc<RwLock<HashMap<String, HashMap<String, Entry>>>>;

/// Thread-safe in-memory [`Cache`].
///
/// Clones share the same storage, so a cache can be handed to several
/// collaborators while the caller keeps its own handle.
#[derive(Clone, Debug, Default)]
pub struct MemoryCache {
    store: Store,
}

impl MemoryCache {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Drop every bucket.
    pub fn clear(&self) {
        self.store
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .clear();
    }
}

impl Cache for MemoryCache {
    fn bucket(&self, name: &str) -> Box<dyn CacheBucket> {
        Box::new(MemoryCacheBucket {
            store: Arc::clone(&self.store),
            name: name.to_owned(),
        })
    }
}

struct MemoryCacheBucket {
    store: Store,
    name: String,
}

impl CacheBucket for MemoryCacheBucket {
    fn get(&self, key: &str, fingerprint: &str) -> Option<Vec<u8>> {
        let store = self.store.read().unwrap_or_else(PoisonError::into_inner);
        let entry = store.get(&self.name)?.get(key)?;
        if !fingerprint.is_empty() && entry.fingerprint != fingerprint {
            tracing::trace!(bucket = %self.name, key, "Cache fingerprint mismatch");
            return None;
        }
        Some(entry.value.clone())
    }

    fn set(&self, key: &str, fingerprint: &str, value: &[u8]) {
        let mut store = self.store.write().unwrap_or_else(PoisonError::into_inner);
        store.entry(self.name.clone()).or_default().insert(
            key.to_owned(),
            Entry {
                fingerprint: fingerprint.to_owned(),
                value: value.to_vec(),
            },
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hit_and_fingerprint_mismatch() {
        let cache = MemoryCache::new();
        let bucket = cache.bucket("uploads");

        bucket.set("a.png", "v1", b"url-1");
        assert_eq!(bucket.get("a.png", "v1"), Some(b"url-1".to_vec()));
        assert_eq!(bucket.get("a.png", "v2"), None);
    }

    #[test]
    fn test_empty_fingerprint_skips_validation() {
        let cache = MemoryCache::new();
        let bucket = cache.bucket("uploads");

        bucket.set("a.png", "v1", b"url-1");
        assert_eq!(bucket.get("a.png", ""), Some(b"url-1".to_vec()));
    }

    #[test]
    fn test_set_overwrites() {
        let cache = MemoryCache::new();
        let bucket = cache.bucket("uploads");

        bucket.set("a.png", "v1", b"old");
        bucket.set("a.png", "v2", b"new");
        assert_eq!(bucket.get("a.png", "v1"), None);
        assert_eq!(bucket.get("a.png", "v2"), Some(b"new".to_vec()));
    }

    #[test]
    fn test_buckets_isolated_and_shared_across_handles() {
        let cache = MemoryCache::new();
        cache.bucket("uploads").set("k", "", b"v");

        assert_eq!(cache.bucket("formulas").get("k", ""), None);
        assert_eq!(cache.clone().bucket("uploads").get("k", ""), Some(b"v".to_vec()));

        cache.clear();
        assert_eq!(cache.bucket("uploads").get("k", ""), None);
    }
}
