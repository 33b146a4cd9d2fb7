//! Cache abstraction for twinmark.
//!
//! Caches are owned by the caller and injected into the collaborators that
//! need them; nothing in the workspace keeps a process-global cache. Two
//! traits form the core API:
//!
//! - [`Cache`]: Factory for named cache buckets
//! - [`CacheBucket`]: Key-value store with fingerprint-based invalidation
//!
//! # Implementations
//!
//! - [`NullCache`] / [`NullCacheBucket`]: No-op implementations (always miss)
//! - [`MemoryCache`]: In-process store shared by every handle
//! - [`NamespacedCache`]: Prefixes bucket names, e.g. with an account key
//!
//! # Example
//!
//! ```
//! use twinmark_cache::{Cache, CacheBucketExt, MemoryCache, NamespacedCache};
//!
//! let cache = NamespacedCache::new(MemoryCache::new(), "alice");
//! let uploads = cache.bucket("uploads");
//! uploads.set_string("img/a.png", "", "https://cdn.test/a.png");
//! assert_eq!(
//!     uploads.get_string("img/a.png", "").as_deref(),
//!     Some("https://cdn.test/a.png")
//! );
//! ```

mod ext;
mod memory;

pub use ext::CacheBucketExt;
pub use memory::MemoryCache;

/// A named partition within a [`Cache`].
///
/// Each bucket stores key-value pairs guarded by a fingerprint. The
/// fingerprint is an opaque string chosen by the caller (a content hash, a
/// file mtime, a version). A hit requires both the key and the fingerprint
/// to match.
pub trait CacheBucket: Send + Sync {
    /// Retrieve a cached value.
    ///
    /// If `fingerprint` is empty, validation is skipped and the stored value
    /// is returned regardless of its fingerprint.
    fn get(&self, key: &str, fingerprint: &str) -> Option<Vec<u8>>;

    /// Store a value, replacing any existing entry for `key`.
    fn set(&self, key: &str, fingerprint: &str, value: &[u8]);
}

/// Factory for named cache [`CacheBucket`]s.
///
/// Buckets with different names are isolated from each other. Handles
/// returned for the same name share storage.
pub trait Cache: Send + Sync {
    /// Open or create a named bucket.
    fn bucket(&self, name: &str) -> Box<dyn CacheBucket>;
}

/// No-op [`CacheBucket`].
pub struct NullCacheBucket;

impl CacheBucket for NullCacheBucket {
    fn get(&self, _key: &str, _fingerprint: &str) -> Option<Vec<u8>> {
        None
    }

    fn set(&self, _key: &str, _fingerprint: &str, _value: &[u8]) {}
}

/// No-op [`Cache`] used when caching is disabled.
pub struct NullCache;

impl Cache for NullCache {
    fn bucket(&self, _name: &str) -> Box<dyn CacheBucket> {
        Box::new(NullCacheBucket)
    }
}

/// [`Cache`] wrapper that scopes every bucket under a namespace.
///
/// Two wrappers with different namespaces over the same inner cache never
/// see each other's entries.
pub struct NamespacedCache<C> {
    inner: C,
    namespace: String,
}

impl<C: Cache> NamespacedCache<C> {
    pub fn new(inner: C, namespace: impl Into<String>) -> Self {
        Self {
            inner,
            namespace: namespace.into(),
        }
    }

    #[must_use]
    pub fn namespace(&self) -> &str {
        &self.namespace
    }
}

impl<C: Cache> Cache for NamespacedCache<C> {
    fn bucket(&self, name: &str) -> Box<dyn CacheBucket> {
        if self.namespace.is_empty() {
            return self.inner.bucket(name);
        }
        self.inner.bucket(&format!("{}/{name}", self.namespace))
    }
}
