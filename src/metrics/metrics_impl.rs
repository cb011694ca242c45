use crate::metrics::cell::MetricsCell;
use crate::metrics::snapshot::LruMetricsSnapshot;
use crate::metrics::traits::{CoreMetricsRecorder, LruMetricsReadRecorder, LruMetricsRecorder};

#[derive(Debug, Default)]
pub struct LruMetrics {
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
    pub peek_calls: MetricsCell,
    pub peek_found: MetricsCell,
    pub recency_rank_calls: MetricsCell,
    pub recency_rank_found: MetricsCell,
    pub recency_rank_scan_steps: MetricsCell,
}

impl LruMetrics {
    pub fn new() -> Self {
        Self::default()
    }

    /// Copies the counters; gauges are supplied by the owning cache.
    pub fn snapshot(&self, cache_len: usize, capacity: usize) -> LruMetricsSnapshot {
        LruMetricsSnapshot {
            get_calls: self.get_calls,
            get_hits: self.get_hits,
            get_misses: self.get_misses,
            insert_calls: self.insert_calls,
            insert_new: self.insert_new,
            insert_updates: self.insert_updates,
            insert_rejected: self.insert_rejected,
            evict_calls: self.evict_calls,
            evicted_entries: self.evicted_entries,
            delete_calls: self.delete_calls,
            delete_found: self.delete_found,
            clear_calls: self.clear_calls,
            touch_calls: self.touch_calls,
            touch_found: self.touch_found,
            peek_calls: self.peek_calls.get(),
            peek_found: self.peek_found.get(),
            recency_rank_calls: self.recency_rank_calls.get(),
            recency_rank_found: self.recency_rank_found.get(),
            recency_rank_scan_steps: self.recency_rank_scan_steps.get(),
            cache_len,
            capacity,
        }
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }
}

impl CoreMetricsRecorder for LruMetrics {
    fn record_get_hit(&mut self) {
        self.get_calls += 1;
        self.get_hits += 1;
    }

    fn record_get_miss(&mut self) {
        self.get_calls += 1;
        self.get_misses += 1;
    }

    fn record_insert_call(&mut self) {
        self.insert_calls += 1;
    }

    fn record_insert_new(&mut self) {
        self.insert_new += 1;
    }

    fn record_insert_update(&mut self) {
        self.insert_updates += 1;
    }

    fn record_evict_call(&mut self) {
        self.evict_calls += 1;
    }

    fn record_evicted_entry(&mut self) {
        self.evicted_entries += 1;
    }

    fn record_clear(&mut self) {
        self.clear_calls += 1;
    }
}

impl LruMetricsRecorder for LruMetrics {
    fn record_insert_rejected(&mut self) {
        self.insert_rejected += 1;
    }

    fn record_delete_call(&mut self) {
        self.delete_calls += 1;
    }

    fn record_delete_found(&mut self) {
        self.delete_found += 1;
    }

    fn record_touch_call(&mut self) {
        self.touch_calls += 1;
    }

    fn record_touch_found(&mut self) {
        self.touch_found += 1;
    }
}

impl LruMetricsReadRecorder for LruMetrics {
    fn record_peek_call(&self) {
        self.peek_calls.incr();
    }

    fn record_peek_found(&self) {
        self.peek_found.incr();
    }

    fn record_recency_rank_call(&self) {
        self.recency_rank_calls.incr();
    }

    fn record_recency_rank_found(&self) {
        self.recency_rank_found.incr();
    }

    fn record_recency_rank_scan_step(&self) {
        self.recency_rank_scan_steps.incr();
    }
}
