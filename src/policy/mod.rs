pub mod lru;

pub use lru::{CacheKey, Entry, EvictCallback, LruCache, PutPolicy};
