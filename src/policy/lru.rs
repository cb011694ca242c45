//! # Least Recently Used (LRU) Cache
//!
//! Fixed-capacity key-value cache that evicts the entry which has gone
//! longest without being touched, with a single hook fired on every removal.
//!
//! ## Architecture
//!
//! ```text
//!   ┌──────────────────────────────────────────────────────────────────────┐
//!   │                           LruCache<K, V>                             │
//!   │                                                                      │
//!   │   ┌──────────────────────────────────────────────────────────────┐   │
//!   │   │  FxHashMap<K, SlotId>  (key index, non-owning handles)       │   │
//!   │   │                                                              │   │
//!   │   │   "a" ──────────────────────────────┐                        │   │
//!   │   │   "b" ────────────────────┐         │                        │   │
//!   │   │   "c" ──────────┐         │         │                        │   │
//!   │   └─────────────────┼─────────┼─────────┼────────────────────────┘   │
//!   │                     ▼         ▼         ▼                            │
//!   │   ┌──────────────────────────────────────────────────────────────┐   │
//!   │   │  RecencyList<Entry<K, V>>  (owns every entry)                │   │
//!   │   │                                                              │   │
//!   │   │  front ──► [c] ◄──► [b] ◄──► [a] ◄── back                    │   │
//!   │   │  (MRU)                            (LRU)                      │   │
//!   │   └──────────────────────────────────────────────────────────────┘   │
//!   │                                                                      │
//!   │   on_evict: Option<Box<dyn FnMut(&Entry<K, V>) + Send>>              │
//!   └──────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! The index holds `SlotId` handles only. Every promotion re-issues the
//! node's handle and the index slot is overwritten in the same call, so the
//! index never holds a handle the list would reject.
//!
//! ## Operations Flow
//!
//! ```text
//!   put(d) with a full cache (capacity = 3)
//!   ═══════════════════════════════════════════════════════════════════════
//!     before:  [c] ◄──► [b] ◄──► [a]
//!     1. back() = a; unlink a; drop "a" from the index
//!     2. on_evict(&Entry { "a", .. })
//!     3. push_front(d); index["d"] = handle
//!     after:   [d] ◄──► [c] ◄──► [b]
//!
//!   get(b)
//!   ═══════════════════════════════════════════════════════════════════════
//!     1. index["b"] ──► handle
//!     2. move_to_front(handle) ──► fresh handle; index["b"] = fresh
//!     after:   [b] ◄──► [d] ◄──► [c]
//! ```
//!
//! ## Methods
//!
//! | Method            | Complexity | Recency | Description                         |
//! |-------------------|------------|---------|-------------------------------------|
//! | `put(k, v)`       | O(1)       | yes     | Insert new key, may evict LRU       |
//! | `get(&k)`         | O(1)       | yes     | Value lookup                        |
//! | `get_mut(&k)`     | O(1)       | yes     | Mutable value lookup                |
//! | `delete(&k)`      | O(1)       | -       | Explicit removal                    |
//! | `touch(&k)`       | O(1)       | yes     | Refresh without reading             |
//! | `peek(&k)`        | O(1)       | no      | Value lookup without refresh        |
//! | `contains(&k)`    | O(1)       | no      | Membership                          |
//! | `peek_lru()`      | O(1)       | no      | Next eviction candidate             |
//! | `recency_rank(&k)`| O(n)       | no      | Position from the MRU end           |
//! | `iter()`          | O(n)       | no      | Entries MRU → LRU                   |
//! | `clear()`         | O(n)       | -       | Remove all, firing the hook         |
//!
//! ## Existing keys
//!
//! `put` on a key that is already present refreshes its recency and returns
//! `false`. Whether the value is replaced is governed by [`PutPolicy`]; the
//! default, [`PutPolicy::RefreshOnly`], keeps the stored value.
//!
//! ## Removal hook
//!
//! The hook fires once per removed entry, for capacity evictions, `delete`
//! and `clear`. It runs after the entry has left both the index and the
//! list, so a panicking hook leaves the cache consistent; a `clear`
//! interrupted that way keeps the entries it had not reached. It never fires for
//! a refresh or an overwrite, and dropping the cache does not fire it.
//!
//! ## Thread Safety
//!
//! `LruCache` is single-threaded. Share it behind an external lock
//! (for example a `Mutex<LruCache<K, V>>`) when several threads need it.
//!
//! ## Example Usage
//!
//! ```
//! use lrukit::policy::lru::LruCache;
//!
//! let mut cache: LruCache<String, i32> = LruCache::new(2);
//! assert!(cache.put("a".to_string(), 1));
//! assert!(cache.put("b".to_string(), 2));
//!
//! assert_eq!(cache.get("a"), Some(&1));
//!
//! // "b" is now least recently used
//! assert!(cache.put("c".to_string(), 3));
//! assert!(!cache.contains("b"));
//! assert!(cache.delete("c"));
//! ```

use std::borrow::Borrow;
use std::fmt;
use std::hash::Hash;
use std::rc::Rc;
use std::sync::Arc;

use rustc_hash::FxHashMap;
use tracing::{debug, trace, warn};

use crate::ds::recency_list::RecencyList;
use crate::ds::slot_arena::SlotId;
use crate::error::{ConfigError, InvariantError};
#[cfg(feature = "metrics")]
use crate::metrics::metrics_impl::LruMetrics;
#[cfg(feature = "metrics")]
use crate::metrics::snapshot::LruMetricsSnapshot;
#[cfg(feature = "metrics")]
use crate::metrics::traits::{
    CoreMetricsRecorder, LruMetricsReadRecorder, LruMetricsRecorder, MetricsSnapshotProvider,
};

// ---------------------------------------------------------------------------
// Keys
// ---------------------------------------------------------------------------

/// Key types accepted by [`LruCache`].
///
/// A degenerate key is rejected by every cache operation without touching
/// state. Text and byte keys are degenerate when empty; integer keys never are.
pub trait CacheKey {
    fn is_degenerate(&self) -> bool {
        false
    }
}

impl CacheKey for str {
    fn is_degenerate(&self) -> bool {
        self.is_empty()
    }
}

impl CacheKey for String {
    fn is_degenerate(&self) -> bool {
        self.is_empty()
    }
}

impl CacheKey for Box<str> {
    fn is_degenerate(&self) -> bool {
        self.is_empty()
    }
}

impl CacheKey for Rc<str> {
    fn is_degenerate(&self) -> bool {
        self.is_empty()
    }
}

impl CacheKey for Arc<str> {
    fn is_degenerate(&self) -> bool {
        self.is_empty()
    }
}

impl CacheKey for [u8] {
    fn is_degenerate(&self) -> bool {
        self.is_empty()
    }
}

impl CacheKey for Vec<u8> {
    fn is_degenerate(&self) -> bool {
        self.is_empty()
    }
}

impl<T: CacheKey + ?Sized> CacheKey for &T {
    fn is_degenerate(&self) -> bool {
        (**self).is_degenerate()
    }
}

macro_rules! never_degenerate {
    ($($ty:ty),* $(,)?) => {
        $(impl CacheKey for $ty {})*
    };
}

never_degenerate!(
    u8, u16, u32, u64, u128, usize, i8, i16, i32, i64, i128, isize, char
);

// ---------------------------------------------------------------------------
// Entry / configuration types
// ---------------------------------------------------------------------------

/// One cached item. Owned by the recency list; handed to the removal hook.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Entry<K, V> {
    pub key: K,
    pub value: V,
}

/// What `put` does with the value when the key is already cached.
///
/// Both variants refresh recency and make `put` return `false`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PutPolicy {
    /// Keep the stored value; the new value is dropped.
    #[default]
    RefreshOnly,
    /// Replace the stored value in place.
    Overwrite,
}

/// Upper bound on slots reserved up front; larger caches grow on demand.
const MAX_PREALLOC: usize = 4096;

/// Hook invoked with every entry removed from the cache.
///
/// `Send` so a cache can be moved behind an external lock.
pub type EvictCallback<K, V> = Box<dyn FnMut(&Entry<K, V>) + Send>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum RemovalCause {
    Capacity,
    Delete,
    Clear,
}

impl RemovalCause {
    fn as_str(self) -> &'static str {
        match self {
            RemovalCause::Capacity => "capacity",
            RemovalCause::Delete => "delete",
            RemovalCause::Clear => "clear",
        }
    }
}

// ---------------------------------------------------------------------------
// LruCache
// ---------------------------------------------------------------------------

/// Fixed-capacity LRU cache.
///
/// `len() <= capacity()` holds after every call, and a key is in the index
/// exactly when the recency list holds an entry for it.
pub struct LruCache<K, V> {
    index: FxHashMap<K, SlotId>,
    list: RecencyList<Entry<K, V>>,
    capacity: usize,
    put_policy: PutPolicy,
    on_evict: Option<EvictCallback<K, V>>,
    #[cfg(feature = "metrics")]
    metrics: LruMetrics,
}

impl<K, V> LruCache<K, V>
where
    K: CacheKey + Hash + Eq + Clone,
{
    /// Creates a cache holding at most `capacity` entries.
    ///
    /// # Panics
    ///
    /// Panics if `capacity` is zero. See [`try_new`](Self::try_new).
    pub fn new(capacity: usize) -> Self {
        match Self::try_new(capacity) {
            Ok(cache) => cache,
            Err(err) => panic!("{err}"),
        }
    }

    /// Creates a cache holding at most `capacity` entries.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if `capacity` is zero.
    pub fn try_new(capacity: usize) -> Result<Self, ConfigError> {
        Self::with_config(capacity, PutPolicy::default(), None)
    }

    pub(crate) fn with_config(
        capacity: usize,
        put_policy: PutPolicy,
        on_evict: Option<EvictCallback<K, V>>,
    ) -> Result<Self, ConfigError> {
        if capacity == 0 {
            return Err(ConfigError::new("cache capacity must be greater than zero"));
        }
        let prealloc = capacity.min(MAX_PREALLOC);
        Ok(Self {
            index: FxHashMap::with_capacity_and_hasher(prealloc, Default::default()),
            list: RecencyList::with_capacity(prealloc),
            capacity,
            put_policy,
            on_evict,
            #[cfg(feature = "metrics")]
            metrics: LruMetrics::default(),
        })
    }

    /// Inserts `value` under `key` if the key is new.
    ///
    /// Returns `true` only when a new entry was created. A full cache evicts
    /// its least recently used entry first. An existing key is refreshed to
    /// most recently used and `false` is returned; its value is kept or
    /// replaced according to [`PutPolicy`].
    pub fn put(&mut self, key: K, value: V) -> bool {
        #[cfg(feature = "metrics")]
        self.metrics.record_insert_call();

        if key.is_degenerate() {
            #[cfg(feature = "metrics")]
            self.metrics.record_insert_rejected();
            trace!("put rejected: degenerate key");
            return false;
        }

        if let Some(id) = self.promote(&key) {
            if self.put_policy == PutPolicy::Overwrite {
                if let Some(entry) = self.list.get_mut(id) {
                    entry.value = value;
                }
            }
            #[cfg(feature = "metrics")]
            self.metrics.record_insert_update();
            trace!(policy = ?self.put_policy, "put refreshed existing key");
            return false;
        }

        if self.list.len() >= self.capacity {
            #[cfg(feature = "metrics")]
            self.metrics.record_evict_call();

            let Some(tail) = self.list.back() else {
                #[cfg(feature = "metrics")]
                self.metrics.record_insert_rejected();
                warn!(
                    len = self.list.len(),
                    capacity = self.capacity,
                    "cache full but no evictable tail"
                );
                return false;
            };
            if !self.remove_node(tail, RemovalCause::Capacity) {
                #[cfg(feature = "metrics")]
                self.metrics.record_insert_rejected();
                warn!(capacity = self.capacity, "tail handle rejected during eviction");
                return false;
            }
        }

        let id = self.list.push_front(Entry {
            key: key.clone(),
            value,
        });
        self.index.insert(key, id);

        #[cfg(feature = "metrics")]
        self.metrics.record_insert_new();
        trace!(len = self.list.len(), "put inserted new entry");
        true
    }

    /// Returns the value for `key`, marking it most recently used.
    ///
    /// The reference borrows the cache, so it cannot outlive the next call.
    pub fn get<Q>(&mut self, key: &Q) -> Option<&V>
    where
        K: Borrow<Q>,
        Q: CacheKey + Hash + Eq + ?Sized,
    {
        let Some(id) = self.lookup_and_promote(key) else {
            #[cfg(feature = "metrics")]
            self.metrics.record_get_miss();
            return None;
        };
        #[cfg(feature = "metrics")]
        self.metrics.record_get_hit();
        self.list.get(id).map(|entry| &entry.value)
    }

    /// Mutable counterpart of [`get`](Self::get).
    pub fn get_mut<Q>(&mut self, key: &Q) -> Option<&mut V>
    where
        K: Borrow<Q>,
        Q: CacheKey + Hash + Eq + ?Sized,
    {
        let Some(id) = self.lookup_and_promote(key) else {
            #[cfg(feature = "metrics")]
            self.metrics.record_get_miss();
            return None;
        };
        #[cfg(feature = "metrics")]
        self.metrics.record_get_hit();
        self.list.get_mut(id).map(|entry| &mut entry.value)
    }

    /// Removes `key`, firing the removal hook. Returns `true` if it was cached.
    pub fn delete<Q>(&mut self, key: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: CacheKey + Hash + Eq + ?Sized,
    {
        #[cfg(feature = "metrics")]
        self.metrics.record_delete_call();

        if key.is_degenerate() || self.list.is_empty() {
            return false;
        }
        let Some(&id) = self.index.get(key) else {
            return false;
        };
        let removed = self.remove_node(id, RemovalCause::Delete);

        #[cfg(feature = "metrics")]
        if removed {
            self.metrics.record_delete_found();
        }
        removed
    }

    /// Marks `key` most recently used without reading it.
    pub fn touch<Q>(&mut self, key: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: CacheKey + Hash + Eq + ?Sized,
    {
        #[cfg(feature = "metrics")]
        self.metrics.record_touch_call();

        let found = self.lookup_and_promote(key).is_some();

        #[cfg(feature = "metrics")]
        if found {
            self.metrics.record_touch_found();
        }
        found
    }

    /// Returns the value for `key` without changing recency.
    pub fn peek<Q>(&self, key: &Q) -> Option<&V>
    where
        K: Borrow<Q>,
        Q: CacheKey + Hash + Eq + ?Sized,
    {
        #[cfg(feature = "metrics")]
        (&self.metrics).record_peek_call();

        if key.is_degenerate() {
            return None;
        }
        let id = *self.index.get(key)?;
        let value = self.list.get(id).map(|entry| &entry.value);

        #[cfg(feature = "metrics")]
        if value.is_some() {
            (&self.metrics).record_peek_found();
        }
        value
    }

    /// Returns `true` if `key` is cached. Does not change recency.
    pub fn contains<Q>(&self, key: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: CacheKey + Hash + Eq + ?Sized,
    {
        !key.is_degenerate() && self.index.contains_key(key)
    }

    /// Returns the entry that the next capacity eviction would remove.
    pub fn peek_lru(&self) -> Option<(&K, &V)> {
        let tail = self.list.back()?;
        self.list.get(tail).map(|entry| (&entry.key, &entry.value))
    }

    /// Returns how many entries were used more recently than `key`
    /// (0 = most recently used).
    pub fn recency_rank<Q>(&self, key: &Q) -> Option<usize>
    where
        K: Borrow<Q>,
        Q: CacheKey + Hash + Eq + ?Sized,
    {
        #[cfg(feature = "metrics")]
        (&self.metrics).record_recency_rank_call();

        if key.is_degenerate() {
            return None;
        }
        let target = *self.index.get(key)?;
        for (rank, id) in self.list.iter_ids().enumerate() {
            #[cfg(feature = "metrics")]
            (&self.metrics).record_recency_rank_scan_step();
            if id == target {
                #[cfg(feature = "metrics")]
                (&self.metrics).record_recency_rank_found();
                return Some(rank);
            }
        }
        None
    }

    /// Removes every entry, firing the removal hook from LRU to MRU.
    ///
    /// Each entry leaves the cache and is reported before the next one is
    /// touched. If the hook panics, the entries not yet reached stay cached.
    pub fn clear(&mut self) {
        #[cfg(feature = "metrics")]
        self.metrics.record_clear();

        let mut removed = 0usize;
        while let Some(tail) = self.list.back() {
            if !self.remove_node(tail, RemovalCause::Clear) {
                warn!(len = self.list.len(), "tail handle rejected during clear");
                break;
            }
            removed += 1;
        }
        debug!(
            reason = RemovalCause::Clear.as_str(),
            removed,
            "cache cleared"
        );
    }

    /// Checks that the index and the recency list describe the same entries.
    pub fn check_invariants(&self) -> Result<(), InvariantError> {
        if self.index.len() != self.list.len() {
            return Err(InvariantError::new(format!(
                "index holds {} keys but recency list holds {} entries",
                self.index.len(),
                self.list.len()
            )));
        }
        if self.list.len() > self.capacity {
            return Err(InvariantError::new(format!(
                "{} entries exceed capacity {}",
                self.list.len(),
                self.capacity
            )));
        }
        for (key, &id) in &self.index {
            let entry = self.list.get(id).ok_or_else(|| {
                InvariantError::new(format!("index handle {:?} is not live", id))
            })?;
            if entry.key != *key {
                return Err(InvariantError::new(format!(
                    "index handle {:?} resolves to a different key",
                    id
                )));
            }
        }
        let walked = self.list.iter().count();
        if walked != self.list.len() {
            return Err(InvariantError::new(format!(
                "recency walk visited {} entries, expected {}",
                walked,
                self.list.len()
            )));
        }
        Ok(())
    }

    fn lookup_and_promote<Q>(&mut self, key: &Q) -> Option<SlotId>
    where
        K: Borrow<Q>,
        Q: CacheKey + Hash + Eq + ?Sized,
    {
        if key.is_degenerate() {
            return None;
        }
        self.promote(key)
    }

    /// Moves the entry for `key` to the front and stores its fresh handle.
    fn promote<Q>(&mut self, key: &Q) -> Option<SlotId>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        let slot = self.index.get_mut(key)?;
        let stale = *slot;
        let Some(fresh) = self.list.move_to_front(stale) else {
            warn!(handle = ?stale, "index holds a stale recency handle");
            return None;
        };
        *slot = fresh;
        Some(fresh)
    }

    /// Unlinks `id` from both structures, then hands the entry to the hook.
    fn remove_node(&mut self, id: SlotId, cause: RemovalCause) -> bool {
        let Some(entry) = self.list.remove(id) else {
            return false;
        };
        self.index.remove(&entry.key);

        #[cfg(feature = "metrics")]
        if cause == RemovalCause::Capacity {
            self.metrics.record_evicted_entry();
        }
        debug!(
            reason = cause.as_str(),
            len = self.list.len(),
            capacity = self.capacity,
            "entry removed"
        );

        if let Some(on_evict) = self.on_evict.as_mut() {
            on_evict(&entry);
        }
        true
    }
}

impl<K, V> LruCache<K, V> {
    /// Number of cached entries.
    pub fn len(&self) -> usize {
        self.list.len()
    }

    pub fn is_empty(&self) -> bool {
        self.list.is_empty()
    }

    /// Maximum number of entries, fixed at construction.
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn put_policy(&self) -> PutPolicy {
        self.put_policy
    }

    /// Iterates entries from most to least recently used.
    pub fn iter(&self) -> impl Iterator<Item = (&K, &V)> {
        self.list.iter().map(|entry| (&entry.key, &entry.value))
    }
}

#[cfg(feature = "metrics")]
impl<K, V> LruCache<K, V> {
    pub fn metrics_snapshot(&self) -> LruMetricsSnapshot {
        self.metrics.snapshot(self.list.len(), self.capacity)
    }

    pub fn reset_metrics(&mut self) {
        self.metrics.reset();
    }
}

#[cfg(feature = "metrics")]
impl<K, V> MetricsSnapshotProvider<LruMetricsSnapshot> for LruCache<K, V> {
    fn snapshot(&self) -> LruMetricsSnapshot {
        self.metrics_snapshot()
    }
}

impl<K, V> fmt::Debug for LruCache<K, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LruCache")
            .field("len", &self.list.len())
            .field("capacity", &self.capacity)
            .field("put_policy", &self.put_policy)
            .field("on_evict", &self.on_evict.is_some())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use parking_lot::Mutex;

    type Log = Arc<Mutex<Vec<(String, i32)>>>;

    fn logging_cache(capacity: usize, policy: PutPolicy) -> (LruCache<String, i32>, Log) {
        let log: Log = Arc::default();
        let sink = Arc::clone(&log);
        let cache = LruCache::with_config(
            capacity,
            policy,
            Some(Box::new(move |entry: &Entry<String, i32>| {
                sink.lock().push((entry.key.clone(), entry.value));
            })),
        )
        .unwrap();
        (cache, log)
    }

    fn keys(cache: &LruCache<String, i32>) -> Vec<&str> {
        cache.iter().map(|(k, _)| k.as_str()).collect()
    }

    // ==============================================
    // Construction
    // ==============================================

    #[test]
    fn try_new_rejects_zero_capacity() {
        let err = LruCache::<String, i32>::try_new(0).unwrap_err();
        assert!(err.message().contains("capacity"));
    }

    #[test]
    #[should_panic(expected = "capacity")]
    fn new_panics_on_zero_capacity() {
        let _ = LruCache::<u64, u64>::new(0);
    }

    #[test]
    fn new_cache_is_empty() {
        let cache: LruCache<String, i32> = LruCache::new(3);
        assert!(cache.is_empty());
        assert_eq!(cache.len(), 0);
        assert_eq!(cache.capacity(), 3);
        assert_eq!(cache.put_policy(), PutPolicy::RefreshOnly);
        assert_eq!(cache.peek_lru(), None);
        cache.check_invariants().unwrap();
    }

    // ==============================================
    // Put / Get / Delete
    // ==============================================

    #[test]
    fn put_evicts_least_recently_used() {
        let (mut cache, log) = logging_cache(2, PutPolicy::RefreshOnly);
        assert!(cache.put("a".into(), 1));
        assert!(cache.put("b".into(), 2));
        assert!(cache.put("c".into(), 3));

        assert_eq!(*log.lock(), vec![("a".to_string(), 1)]);
        assert_eq!(cache.get("a"), None);
        assert_eq!(cache.get("b"), Some(&2));
        assert_eq!(cache.get("c"), Some(&3));
        assert_eq!(cache.len(), 2);
        cache.check_invariants().unwrap();
    }

    #[test]
    fn get_refresh_changes_eviction_victim() {
        let (mut cache, log) = logging_cache(2, PutPolicy::RefreshOnly);
        cache.put("a".into(), 1);
        cache.put("b".into(), 2);
        assert_eq!(cache.get("a"), Some(&1));
        assert!(cache.put("c".into(), 3));

        assert_eq!(*log.lock(), vec![("b".to_string(), 2)]);
        assert!(cache.contains("a"));
        assert!(!cache.contains("b"));
        assert_eq!(keys(&cache), vec!["c", "a"]);
    }

    #[test]
    fn put_existing_key_refreshes_without_overwrite() {
        let (mut cache, log) = logging_cache(2, PutPolicy::RefreshOnly);
        assert!(cache.put("a".into(), 1));
        assert!(cache.put("b".into(), 2));
        assert!(!cache.put("a".into(), 99));

        assert_eq!(cache.peek("a"), Some(&1));
        assert_eq!(keys(&cache), vec!["a", "b"]);
        assert!(log.lock().is_empty());
        assert_eq!(cache.len(), 2);
    }

    #[test]
    fn overwrite_policy_replaces_value_and_refreshes() {
        let (mut cache, log) = logging_cache(2, PutPolicy::Overwrite);
        cache.put("a".into(), 1);
        cache.put("b".into(), 2);
        assert!(!cache.put("a".into(), 10));

        assert_eq!(cache.peek("a"), Some(&10));
        assert_eq!(keys(&cache), vec!["a", "b"]);
        assert!(log.lock().is_empty());

        cache.put("c".into(), 3);
        assert_eq!(*log.lock(), vec![("b".to_string(), 2)]);
    }

    #[test]
    fn degenerate_key_is_rejected_everywhere() {
        let (mut cache, log) = logging_cache(2, PutPolicy::RefreshOnly);
        assert!(!cache.put(String::new(), 5));
        assert!(cache.is_empty());
        assert_eq!(cache.get(""), None);
        assert_eq!(cache.get_mut(""), None);
        assert!(!cache.delete(""));
        assert!(!cache.touch(""));
        assert!(!cache.contains(""));
        assert_eq!(cache.peek(""), None);
        assert_eq!(cache.recency_rank(""), None);
        assert!(log.lock().is_empty());
    }

    #[test]
    fn delete_on_empty_cache_is_false() {
        let (mut cache, log) = logging_cache(2, PutPolicy::RefreshOnly);
        assert!(!cache.delete("x"));
        assert!(log.lock().is_empty());
    }

    #[test]
    fn delete_missing_key_leaves_state() {
        let (mut cache, log) = logging_cache(3, PutPolicy::RefreshOnly);
        cache.put("a".into(), 1);
        cache.put("b".into(), 2);
        assert!(!cache.delete("zzz"));
        assert_eq!(keys(&cache), vec!["b", "a"]);
        assert!(log.lock().is_empty());
    }

    #[test]
    fn delete_fires_hook_with_pre_removal_value() {
        let (mut cache, log) = logging_cache(3, PutPolicy::RefreshOnly);
        cache.put("a".into(), 1);
        cache.put("b".into(), 2);
        *cache.get_mut("a").unwrap() = 11;

        assert!(cache.delete("a"));
        assert!(!cache.delete("a"));
        assert_eq!(*log.lock(), vec![("a".to_string(), 11)]);
        assert_eq!(cache.len(), 1);
        cache.check_invariants().unwrap();
    }

    #[test]
    fn reinsert_after_delete_creates_new_entry() {
        let mut cache: LruCache<String, i32> = LruCache::new(2);
        cache.put("a".into(), 1);
        cache.delete("a");
        assert!(cache.put("a".into(), 2));
        assert_eq!(cache.get("a"), Some(&2));
    }

    #[test]
    fn capacity_one_always_holds_latest() {
        let (mut cache, log) = logging_cache(1, PutPolicy::RefreshOnly);
        for (i, key) in ["a", "b", "c"].into_iter().enumerate() {
            assert!(cache.put(key.into(), i as i32));
            assert_eq!(cache.len(), 1);
        }
        assert_eq!(keys(&cache), vec!["c"]);
        assert_eq!(
            *log.lock(),
            vec![("a".to_string(), 0), ("b".to_string(), 1)]
        );
    }

    #[test]
    fn integer_keys_are_never_degenerate() {
        let mut cache: LruCache<u64, &str> = LruCache::new(2);
        assert!(cache.put(0, "zero"));
        assert_eq!(cache.get(&0), Some(&"zero"));
        assert!(cache.delete(&0));
    }

    #[test]
    fn byte_keys_reject_empty() {
        let mut cache: LruCache<Vec<u8>, u8> = LruCache::new(2);
        assert!(!cache.put(Vec::new(), 1));
        assert!(cache.put(b"k".to_vec(), 1));
        assert_eq!(cache.get(b"k".as_slice()), Some(&1));
    }

    // ==============================================
    // Read-side helpers
    // ==============================================

    #[test]
    fn peek_and_contains_do_not_refresh() {
        let (mut cache, log) = logging_cache(2, PutPolicy::RefreshOnly);
        cache.put("a".into(), 1);
        cache.put("b".into(), 2);
        assert_eq!(cache.peek("a"), Some(&1));
        assert!(cache.contains("a"));

        cache.put("c".into(), 3);
        assert_eq!(*log.lock(), vec![("a".to_string(), 1)]);
    }

    #[test]
    fn touch_refreshes_without_value() {
        let mut cache: LruCache<String, i32> = LruCache::new(2);
        cache.put("a".into(), 1);
        cache.put("b".into(), 2);
        assert!(cache.touch("a"));
        assert!(!cache.touch("missing"));
        assert_eq!(cache.peek_lru(), Some((&"b".to_string(), &2)));
    }

    #[test]
    fn recency_rank_tracks_promotions() {
        let mut cache: LruCache<String, i32> = LruCache::new(3);
        cache.put("a".into(), 1);
        cache.put("b".into(), 2);
        cache.put("c".into(), 3);
        assert_eq!(cache.recency_rank("c"), Some(0));
        assert_eq!(cache.recency_rank("a"), Some(2));

        cache.get("a");
        assert_eq!(cache.recency_rank("a"), Some(0));
        assert_eq!(cache.recency_rank("b"), Some(2));
        assert_eq!(cache.recency_rank("nope"), None);
    }

    #[test]
    fn index_handles_follow_repeated_promotions() {
        let mut cache: LruCache<String, i32> = LruCache::new(3);
        cache.put("a".into(), 1);
        cache.put("b".into(), 2);
        for _ in 0..10 {
            assert_eq!(cache.get("a"), Some(&1));
            assert_eq!(cache.get("b"), Some(&2));
            cache.check_invariants().unwrap();
        }
        assert!(cache.delete("a"));
        assert!(cache.delete("b"));
        cache.check_invariants().unwrap();
    }

    // ==============================================
    // Clear / drop
    // ==============================================

    #[test]
    fn clear_fires_hook_lru_first() {
        let (mut cache, log) = logging_cache(3, PutPolicy::RefreshOnly);
        cache.put("a".into(), 1);
        cache.put("b".into(), 2);
        cache.put("c".into(), 3);
        cache.clear();

        assert!(cache.is_empty());
        assert_eq!(
            *log.lock(),
            vec![
                ("a".to_string(), 1),
                ("b".to_string(), 2),
                ("c".to_string(), 3)
            ]
        );
        cache.check_invariants().unwrap();
        assert!(cache.put("d".into(), 4));
    }

    #[test]
    fn clear_without_hook_empties_cache() {
        let mut cache: LruCache<String, i32> = LruCache::new(2);
        cache.put("a".into(), 1);
        cache.clear();
        assert!(cache.is_empty());
        assert!(!cache.contains("a"));
        cache.check_invariants().unwrap();
    }

    #[test]
    fn drop_does_not_fire_hook() {
        let (mut cache, log) = logging_cache(2, PutPolicy::RefreshOnly);
        cache.put("a".into(), 1);
        drop(cache);
        assert!(log.lock().is_empty());
    }

    // ==============================================
    // Hook failure
    // ==============================================

    #[test]
    fn panicking_hook_leaves_cache_consistent() {
        use std::panic::{AssertUnwindSafe, catch_unwind};

        let mut cache: LruCache<String, i32> = LruCache::with_config(
            2,
            PutPolicy::RefreshOnly,
            Some(Box::new(|entry: &Entry<String, i32>| {
                if entry.key == "boom" {
                    panic!("hook failure");
                }
            })),
        )
        .unwrap();
        cache.put("boom".into(), 1);
        cache.put("b".into(), 2);

        let result = catch_unwind(AssertUnwindSafe(|| cache.put("c".into(), 3)));
        assert!(result.is_err());
        assert!(!cache.contains("boom"));
        assert_eq!(cache.len(), 1);
        cache.check_invariants().unwrap();

        assert!(cache.put("c".into(), 3));
        assert_eq!(keys(&cache), vec!["c", "b"]);
    }

    #[test]
    fn panicking_hook_during_clear_keeps_unreached_entries() {
        use std::panic::{AssertUnwindSafe, catch_unwind};

        let seen: Arc<Mutex<Vec<String>>> = Arc::default();
        let sink = Arc::clone(&seen);
        let mut cache: LruCache<String, i32> = LruCache::with_config(
            3,
            PutPolicy::RefreshOnly,
            Some(Box::new(move |entry: &Entry<String, i32>| {
                sink.lock().push(entry.key.clone());
                if entry.key == "a" {
                    panic!("hook failure");
                }
            })),
        )
        .unwrap();
        cache.put("a".into(), 1);
        cache.put("b".into(), 2);
        cache.put("c".into(), 3);

        let result = catch_unwind(AssertUnwindSafe(|| cache.clear()));
        assert!(result.is_err());
        assert_eq!(*seen.lock(), vec!["a".to_string()]);
        assert_eq!(keys(&cache), vec!["c", "b"]);
        cache.check_invariants().unwrap();

        cache.clear();
        assert!(cache.is_empty());
        assert_eq!(
            *seen.lock(),
            vec!["a".to_string(), "b".to_string(), "c".to_string()]
        );
        cache.check_invariants().unwrap();
    }

    #[test]
    fn check_invariants_reports_index_list_mismatch() {
        let mut cache: LruCache<String, i32> = LruCache::new(3);
        cache.put("a".into(), 1);
        cache.put("b".into(), 2);
        cache.index.remove("a");

        let err = cache.check_invariants().unwrap_err();
        assert_eq!(
            err.message(),
            "index holds 1 keys but recency list holds 2 entries"
        );
    }

    #[test]
    fn check_invariants_reports_stale_index_handle() {
        let mut cache: LruCache<String, i32> = LruCache::new(3);
        cache.put("a".into(), 1);
        let stale = cache.index["a"];
        cache.get("a");
        cache.index.insert("a".into(), stale);

        let err = cache.check_invariants().unwrap_err();
        assert!(err.to_string().contains("is not live"));
    }

    #[test]
    fn debug_output_omits_hook_body() {
        let (cache, _log) = logging_cache(2, PutPolicy::Overwrite);
        let dbg = format!("{:?}", cache);
        assert!(dbg.contains("capacity: 2"));
        assert!(dbg.contains("on_evict: true"));
    }

    // ==============================================
    // Property Tests
    // ==============================================

    mod property_tests {
        use super::*;
        use proptest::prelude::*;
        use std::collections::VecDeque;

        #[derive(Debug, Clone)]
        enum Op {
            Put(String, i32),
            Get(String),
            Delete(String),
            Touch(String),
        }

        fn key_strategy() -> impl Strategy<Value = String> {
            prop::sample::select(vec!["", "a", "b", "c", "d", "e", "f", "g"])
                .prop_map(str::to_string)
        }

        fn op_strategy() -> impl Strategy<Value = Op> {
            prop_oneof![
                3 => (key_strategy(), any::<i32>()).prop_map(|(k, v)| Op::Put(k, v)),
                2 => key_strategy().prop_map(Op::Get),
                1 => key_strategy().prop_map(Op::Delete),
                1 => key_strategy().prop_map(Op::Touch),
            ]
        }

        /// Reference model: front = most recently used.
        #[derive(Default)]
        struct Model {
            order: VecDeque<(String, i32)>,
            capacity: usize,
        }

        impl Model {
            fn position(&self, key: &str) -> Option<usize> {
                self.order.iter().position(|(k, _)| k == key)
            }

            fn refresh(&mut self, key: &str) -> Option<i32> {
                let pos = self.position(key)?;
                let item = self.order.remove(pos)?;
                let value = item.1;
                self.order.push_front(item);
                Some(value)
            }
        }

        proptest! {
            #[cfg_attr(miri, ignore)]
            #[test]
            fn prop_matches_reference_model(
                capacity in 1usize..6,
                ops in prop::collection::vec(op_strategy(), 0..150)
            ) {
                let (mut cache, log) = logging_cache(capacity, PutPolicy::RefreshOnly);
                let mut model = Model { capacity, ..Default::default() };
                let mut expected_removals: Vec<(String, i32)> = Vec::new();

                for op in ops {
                    match op {
                        Op::Put(k, v) => {
                            let expected = if k.is_empty() {
                                false
                            } else if model.refresh(&k).is_some() {
                                false
                            } else {
                                if model.order.len() == model.capacity {
                                    expected_removals.push(model.order.pop_back().unwrap());
                                }
                                model.order.push_front((k.clone(), v));
                                true
                            };
                            prop_assert_eq!(cache.put(k, v), expected);
                        },
                        Op::Get(k) => {
                            let expected = if k.is_empty() { None } else { model.refresh(&k) };
                            prop_assert_eq!(cache.get(k.as_str()).copied(), expected);
                        },
                        Op::Delete(k) => {
                            let expected = match model.position(&k) {
                                Some(pos) if !k.is_empty() => {
                                    expected_removals.push(model.order.remove(pos).unwrap());
                                    true
                                },
                                _ => false,
                            };
                            prop_assert_eq!(cache.delete(k.as_str()), expected);
                        },
                        Op::Touch(k) => {
                            let expected = !k.is_empty() && model.refresh(&k).is_some();
                            prop_assert_eq!(cache.touch(k.as_str()), expected);
                        },
                    }

                    let actual: Vec<(String, i32)> =
                        cache.iter().map(|(k, v)| (k.clone(), *v)).collect();
                    let wanted: Vec<(String, i32)> = model.order.iter().cloned().collect();
                    prop_assert_eq!(actual, wanted);
                    prop_assert_eq!(&*log.lock(), &expected_removals);
                    prop_assert!(cache.check_invariants().is_ok());
                }
            }

            #[cfg_attr(miri, ignore)]
            #[test]
            fn prop_len_never_exceeds_capacity(
                capacity in 1usize..20,
                keys in prop::collection::vec(0u32..100, 0..300)
            ) {
                let mut cache: LruCache<u32, u32> = LruCache::new(capacity);
                for k in keys {
                    cache.put(k, k);
                    prop_assert!(cache.len() <= capacity);
                }
            }

            #[cfg_attr(miri, ignore)]
            #[test]
            fn prop_present_iff_put_and_not_removed(
                ops in prop::collection::vec((any::<bool>(), 0u8..16), 0..200)
            ) {
                let removed: Arc<Mutex<Vec<u8>>> = Arc::default();
                let sink = Arc::clone(&removed);
                let mut cache: LruCache<u8, u8> = LruCache::with_config(
                    4,
                    PutPolicy::RefreshOnly,
                    Some(Box::new(move |entry: &Entry<u8, u8>| sink.lock().push(entry.key))),
                )
                .unwrap();
                let mut live = std::collections::HashSet::new();

                for (is_put, key) in ops {
                    if is_put {
                        cache.put(key, key);
                        live.insert(key);
                    } else if cache.delete(&key) {
                        prop_assert!(live.contains(&key));
                    }
                    for gone in removed.lock().drain(..) {
                        live.remove(&gone);
                    }
                    for key in 0u8..16 {
                        prop_assert_eq!(cache.contains(&key), live.contains(&key));
                    }
                }
            }
        }
    }
}
