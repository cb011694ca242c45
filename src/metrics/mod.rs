//! Optional operation counters (feature `metrics`).
//!
//! Recorder traits live in [`traits`]; [`metrics_impl`] stores the counters
//! and [`snapshot`] holds the plain-data copy handed to callers.

pub mod cell;
pub mod metrics_impl;
pub mod snapshot;
pub mod traits;

pub use metrics_impl::LruMetrics;
pub use snapshot::LruMetricsSnapshot;
pub use traits::{
    CoreMetricsRecorder, LruMetricsReadRecorder, LruMetricsRecorder, MetricsSnapshotProvider,
};
