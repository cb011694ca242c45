//! # Metrics Traits
//!
//! Recording and snapshotting are kept apart so the cache core only ever
//! writes counters and callers only ever read copies.
//!
//! ```text
//!   ┌─────────────────────────────┐
//!   │     CoreMetricsRecorder     │  get hit/miss, put, evict, clear
//!   └──────────────┬──────────────┘
//!                  │
//!                  ▼
//!   ┌─────────────────────────────┐   ┌─────────────────────────────┐
//!   │     LruMetricsRecorder      │   │   LruMetricsReadRecorder    │
//!   │  rejected puts, delete,     │   │  peek, recency_rank         │
//!   │  touch                      │   │  (&self, interior cells)    │
//!   └─────────────────────────────┘   └─────────────────────────────┘
//!
//!   Consumption:
//!   ┌─────────────────────────────┐
//!   │ MetricsSnapshotProvider<S>  │
//!   └─────────────────────────────┘
//! ```

/// Counters shared by every operation that mutates the cache.
pub trait CoreMetricsRecorder {
    fn record_get_hit(&mut self);
    fn record_get_miss(&mut self);
    fn record_insert_call(&mut self);
    fn record_insert_new(&mut self);
    fn record_insert_update(&mut self);
    fn record_evict_call(&mut self);
    fn record_evicted_entry(&mut self);
    fn record_clear(&mut self);
}

/// LRU-specific counters for `&mut self` paths.
pub trait LruMetricsRecorder: CoreMetricsRecorder {
    /// A put that created nothing: degenerate key or no evictable tail.
    fn record_insert_rejected(&mut self);
    fn record_delete_call(&mut self);
    fn record_delete_found(&mut self);
    fn record_touch_call(&mut self);
    fn record_touch_found(&mut self);
}

/// LRU counters for `&self` paths.
pub trait LruMetricsReadRecorder {
    fn record_peek_call(&self);
    fn record_peek_found(&self);
    fn record_recency_rank_call(&self);
    fn record_recency_rank_found(&self);
    fn record_recency_rank_scan_step(&self);
}

/// Produces a point-in-time copy of a cache's counters.
pub trait MetricsSnapshotProvider<S> {
    fn snapshot(&self) -> S;
}
