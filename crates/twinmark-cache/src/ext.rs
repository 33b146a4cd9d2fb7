//! Extension trait for [`CacheBucket`] with typed convenience methods.

use serde::Serialize;
use serde::de::DeserializeOwned;

use crate::CacheBucket;

/// Typed access on top of the byte-oriented [`CacheBucket`].
///
/// Implemented for every bucket through a blanket impl, so bucket
/// implementations only deal with raw bytes and stay object-safe.
pub trait CacheBucketExt: CacheBucket {
    /// Retrieve a JSON-deserialized value.
    ///
    /// Returns `None` on miss, fingerprint mismatch, or deserialization failure.
    fn get_json<T: DeserializeOwned>(&self, key: &str, fingerprint: &str) -> Option<T> {
        let bytes = self.get(key, fingerprint)?;
        serde_json::from_slice(&bytes).ok()
    }

    /// Store a value as JSON. Does nothing if serialization fails.
    fn set_json<T: Serialize>(&self, key: &str, fingerprint: &str, value: &T) {
        match serde_json::to_vec(value) {
            Ok(bytes) => self.set(key, fingerprint, &bytes),
            Err(e) => tracing::debug!(key, error = %e, "Skipping cache write"),
        }
    }

    /// Retrieve a cached UTF-8 string.
    fn get_string(&self, key: &str, fingerprint: &str) -> Option<String> {
        let bytes = self.get(key, fingerprint)?;
        String::from_utf8(bytes).ok()
    }

    /// Store a string value.
    fn set_string(&self, key: &str, fingerprint: &str, value: &str) {
        self.set(key, fingerprint, value.as_bytes());
    }
}

impl<B: CacheBucket + ?Sized> CacheBucketExt for B {}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use serde::Deserialize;

    use super::*;
    use crate::{Cache, MemoryCache};

    #[derive(Debug, PartialEq, Serialize, Deserialize)]
    struct Upload {
        url: String,
        width: u32,
    }

    #[test]
    fn test_json_round_trip_through_boxed_bucket() {
        let cache = MemoryCache::new();
        let bucket = cache.bucket("uploads");
        let upload = Upload {
            url: "https://cdn.test/a.png".to_owned(),
            width: 640,
        };
        bucket.set_json("a.png", "hash1", &upload);
        assert_eq!(bucket.get_json::<Upload>("a.png", "hash1"), Some(upload));
        assert_eq!(bucket.get_json::<Upload>("a.png", "hash2"), None);
    }

    #[test]
    fn test_get_string_rejects_invalid_utf8() {
        let cache = MemoryCache::new();
        let bucket = cache.bucket("raw");
        bucket.set("k", "", &[0xff, 0xfe]);
        assert_eq!(bucket.get_string("k", ""), None);
    }
}
