//! Builder for configured [`LruCache`] instances.
//!
//! Capacity, the put policy and the removal hook are all fixed once the
//! cache is built.
//!
//! ## Example
//!
//! ```rust
//! use std::sync::Arc;
//!
//! use lrukit::builder::LruCacheBuilder;
//! use lrukit::policy::lru::{Entry, PutPolicy};
//! use parking_lot::Mutex;
//!
//! let evicted = Arc::new(Mutex::new(Vec::new()));
//! let sink = Arc::clone(&evicted);
//!
//! let mut cache = LruCacheBuilder::new(1)
//!     .put_policy(PutPolicy::Overwrite)
//!     .on_evict(move |entry: &Entry<String, u32>| sink.lock().push(entry.key.clone()))
//!     .build();
//!
//! cache.put("a".to_string(), 1);
//! cache.put("b".to_string(), 2);
//! assert_eq!(*evicted.lock(), vec!["a".to_string()]);
//! ```

use std::fmt;
use std::hash::Hash;

use crate::error::ConfigError;
use crate::policy::lru::{CacheKey, Entry, EvictCallback, LruCache, PutPolicy};

/// Builder for creating cache instances.
pub struct LruCacheBuilder<K, V> {
    capacity: usize,
    put_policy: PutPolicy,
    on_evict: Option<EvictCallback<K, V>>,
}

impl<K, V> LruCacheBuilder<K, V>
where
    K: CacheKey + Hash + Eq + Clone,
{
    /// Create a new cache builder with the specified capacity.
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity,
            put_policy: PutPolicy::default(),
            on_evict: None,
        }
    }

    /// Choose what `put` does with the value of an existing key.
    pub fn put_policy(mut self, policy: PutPolicy) -> Self {
        self.put_policy = policy;
        self
    }

    /// Install the hook fired for every removed entry.
    pub fn on_evict<F>(mut self, hook: F) -> Self
    where
        F: FnMut(&Entry<K, V>) + Send + 'static,
    {
        self.on_evict = Some(Box::new(hook));
        self
    }

    /// Build the cache.
    ///
    /// # Panics
    ///
    /// Panics if the configuration is invalid. See [`try_build`](Self::try_build).
    pub fn build(self) -> LruCache<K, V> {
        match self.try_build() {
            Ok(cache) => cache,
            Err(err) => panic!("{err}"),
        }
    }

    /// Build the cache, returning [`ConfigError`] for a zero capacity.
    pub fn try_build(self) -> Result<LruCache<K, V>, ConfigError> {
        LruCache::with_config(self.capacity, self.put_policy, self.on_evict)
    }
}

impl<K, V> fmt::Debug for LruCacheBuilder<K, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LruCacheBuilder")
            .field("capacity", &self.capacity)
            .field("put_policy", &self.put_policy)
            .field("on_evict", &self.on_evict.is_some())
            .finish()
    }
}
