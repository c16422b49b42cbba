//! # Metrics sink contract.
//!
//! The reconciliation loop reports exactly one thing to metrics: that a tracked
//! resource was deleted and its series should go. The sink is fire-and-forget and
//! is called synchronously from the loop, before the poller handle is destroyed.

use crate::resources::PollerIdentity;

/// Metrics side effects driven by the reconciliation loop.
pub trait MetricsSink: Send + Sync + 'static {
    /// Drops every series labelled with `identity`.
    ///
    /// Called once per DELETED event of a tracked resource; never for bulk resyncs
    /// or for resources without a poller.
    fn record_removal(&self, identity: &PollerIdentity);
}

/// Sink that ignores everything.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopMetrics;

impl MetricsSink for NoopMetrics {
    fn record_removal(&self, _identity: &PollerIdentity) {}
}
