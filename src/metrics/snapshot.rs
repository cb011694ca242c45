/// Point-in-time copy of [`LruMetrics`](super::LruMetrics) plus gauges.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct LruMetricsSnapshot {
    pub get_calls: u64,
    pub get_hits: u64,
    pub get_misses: u64,

    pub insert_calls: u64,
    pub insert_new: u64,
    pub insert_updates: u64,
    pub insert_rejected: u64,

    pub evict_calls: u64,
    pub evicted_entries: u64,

    pub delete_calls: u64,
    pub delete_found: u64,
    pub clear_calls: u64,

    pub touch_calls: u64,
    pub touch_found: u64,
    pub peek_calls: u64,
    pub peek_found: u64,
    pub recency_rank_calls: u64,
    pub recency_rank_found: u64,
    pub recency_rank_scan_steps: u64,

    // gauges captured at snapshot time
    pub cache_len: usize,
    pub capacity: usize,
}

impl LruMetricsSnapshot {
    /// Fraction of `get` calls that hit; `0.0` before any call.
    pub fn hit_ratio(&self) -> f64 {
        if self.get_calls == 0 {
            0.0
        } else {
            self.get_hits as f64 / self.get_calls as f64
        }
    }
}
