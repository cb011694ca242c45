pub use crate::builder::LruCacheBuilder;
pub use crate::error::{ConfigError, InvariantError};
pub use crate::policy::lru::{CacheKey, Entry, EvictCallback, LruCache, PutPolicy};

#[cfg(feature = "metrics")]
pub use crate::metrics::snapshot::LruMetricsSnapshot;
#[cfg(feature = "metrics")]
pub use crate::metrics::traits::MetricsSnapshotProvider;
