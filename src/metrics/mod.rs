//! # Metrics for the reconciliation loop and its pollers.
//!
//! - [`MetricsSink`] - the removal hook the loop calls on DELETED
//! - [`NoopMetrics`] - default sink
//! - [`SyncMetrics`] - prometheus sync-call counters, removable per resource

mod sink;
mod sync;

pub use sink::{MetricsSink, NoopMetrics};
pub use sync::{DEPRECATED_SYNC_CALLS_METRIC, SYNC_CALLS_METRIC, SyncMetrics, SyncStatus};
