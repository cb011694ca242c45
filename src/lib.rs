//! lrukit: a fixed-capacity LRU cache with arena-backed recency handles.
//!
//! See `DESIGN.md` for internal architecture and invariants.

pub mod builder;
pub mod ds;
pub mod error;
pub mod policy;

#[cfg(feature = "metrics")]
pub mod metrics;

pub mod prelude;

pub use crate::builder::LruCacheBuilder;
pub use crate::ds::{RecencyList, SlotArena, SlotId};
#[cfg(feature = "metrics")]
pub use crate::metrics::snapshot::LruMetricsSnapshot;
pub use crate::policy::lru::{CacheKey, Entry, LruCache, PutPolicy};
