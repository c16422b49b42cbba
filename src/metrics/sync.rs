//! # Prometheus sync-call metrics.
//!
//! [`SyncMetrics`] counts secret sync attempts per resource and outcome in a
//! [`prometheus::Registry`] and drops a resource's series when it is deleted.
//! Pollers call [`SyncMetrics::observe_sync`]; the reconciliation loop calls
//! [`MetricsSink::record_removal`].
//!
//! Every observation lands in two counters with the same labels:
//! ```text
//! kubernetes_external_secrets_sync_calls_count{backend,name,namespace,status}
//! sync_calls{backend,name,namespace,status}        (deprecated name, kept for dashboards)
//! ```
//! Removal clears both.

use prometheus::core::Collector;
use prometheus::{Encoder, IntCounterVec, Opts, Registry, TextEncoder};

use super::sink::MetricsSink;
use crate::error::MetricsError;
use crate::resources::PollerIdentity;

/// Name of the sync-call counter.
pub const SYNC_CALLS_METRIC: &str = "kubernetes_external_secrets_sync_calls_count";

/// Deprecated name of the sync-call counter, still emitted alongside it.
pub const DEPRECATED_SYNC_CALLS_METRIC: &str = "sync_calls";

const LABELS: [&str; 4] = ["name", "namespace", "backend", "status"];

/// Outcome of one sync attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum SyncStatus {
    /// Secret fetched and upserted.
    Success,
    /// Fetch or upsert failed.
    Error,
}

impl SyncStatus {
    const ALL: [SyncStatus; 2] = [SyncStatus::Success, SyncStatus::Error];

    /// Label value.
    pub fn as_label(&self) -> &'static str {
        match self {
            SyncStatus::Success => "success",
            SyncStatus::Error => "error",
        }
    }
}

impl std::fmt::Display for SyncStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_label())
    }
}

/// Sync-call counters labelled by resource identity and outcome.
pub struct SyncMetrics {
    registry: Registry,
    sync_calls: IntCounterVec,
    deprecated_sync_calls: IntCounterVec,
}

impl SyncMetrics {
    /// Creates the counters in a fresh registry.
    pub fn new() -> Result<Self, MetricsError> {
        Self::with_registry(Registry::new())
    }

    /// Registers the counters in `registry`.
    ///
    /// Fails if `registry` already holds collectors with the same names.
    pub fn with_registry(registry: Registry) -> Result<Self, MetricsError> {
        let sync_calls = IntCounterVec::new(
            Opts::new(SYNC_CALLS_METRIC, "Number of sync operations"),
            &LABELS,
        )?;
        let deprecated_sync_calls = IntCounterVec::new(
            Opts::new(
                DEPRECATED_SYNC_CALLS_METRIC,
                "Number of sync operations (deprecated, use kubernetes_external_secrets_sync_calls_count)",
            ),
            &LABELS,
        )?;
        registry.register(Box::new(sync_calls.clone()))?;
        registry.register(Box::new(deprecated_sync_calls.clone()))?;

        Ok(Self {
            registry,
            sync_calls,
            deprecated_sync_calls,
        })
    }

    /// Registry the counters live in.
    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    /// Counts one sync attempt.
    pub fn observe_sync(&self, identity: &PollerIdentity, status: SyncStatus) {
        let values = label_values(identity, status);
        self.sync_calls.with_label_values(&values).inc();
        self.deprecated_sync_calls.with_label_values(&values).inc();
    }

    /// Current count for one series (0 if absent). Never creates the series.
    pub fn sync_calls(&self, identity: &PollerIdentity, status: SyncStatus) -> u64 {
        let values = label_values(identity, status);
        self.sync_calls
            .collect()
            .iter()
            .flat_map(|family| family.get_metric())
            .find(|metric| {
                LABELS.iter().zip(values).all(|(name, value)| {
                    metric
                        .get_label()
                        .iter()
                        .any(|pair| pair.get_name() == *name && pair.get_value() == value)
                })
            })
            .map_or(0, |metric| metric.get_counter().get_value() as u64)
    }

    /// Drops all series of `identity` from both counters. Returns how many were dropped.
    pub fn remove_for(&self, identity: &PollerIdentity) -> usize {
        let mut removed = 0;
        for status in SyncStatus::ALL {
            let values = label_values(identity, status);
            for counter in [&self.sync_calls, &self.deprecated_sync_calls] {
                if counter.remove_label_values(&values).is_ok() {
                    removed += 1;
                }
            }
        }
        removed
    }

    /// Number of live `kubernetes_external_secrets_sync_calls_count` series.
    pub fn len(&self) -> usize {
        self.sync_calls
            .collect()
            .iter()
            .map(|family| family.get_metric().len())
            .sum()
    }

    /// True if no series is recorded.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Encodes the whole registry in the Prometheus text exposition format.
    pub fn render(&self) -> Result<String, MetricsError> {
        let mut buf = Vec::new();
        TextEncoder::new().encode(&self.registry.gather(), &mut buf)?;
        Ok(String::from_utf8_lossy(&buf).into_owned())
    }
}

impl MetricsSink for SyncMetrics {
    fn record_removal(&self, identity: &PollerIdentity) {
        self.remove_for(identity);
    }
}

fn label_values(identity: &PollerIdentity, status: SyncStatus) -> [&str; 4] {
    [
        identity.name.as_str(),
        identity.namespace.as_str(),
        identity.backend_kind.as_str(),
        status.as_label(),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    fn foo() -> PollerIdentity {
        PollerIdentity::new("foo", "example", "foo")
    }

    /// Finds the sample line of `metric` carrying every `pairs` label.
    fn sample<'a>(text: &'a str, metric: &str, pairs: &[(&str, &str)]) -> Option<&'a str> {
        let prefix = format!("{metric}{{");
        text.lines().find(|line| {
            line.starts_with(&prefix)
                && pairs
                    .iter()
                    .all(|(k, v)| line.contains(&format!("{k}=\"{v}\"")))
        })
    }

    #[test]
    fn stores_and_removes_series() {
        let metrics = SyncMetrics::new().unwrap();
        metrics.observe_sync(&foo(), SyncStatus::Success);

        let text = metrics.render().unwrap();
        let labels = [
            ("name", "foo"),
            ("namespace", "example"),
            ("backend", "foo"),
            ("status", "success"),
        ];
        for metric in [SYNC_CALLS_METRIC, DEPRECATED_SYNC_CALLS_METRIC] {
            let line = sample(&text, metric, &labels);
            assert!(line.is_some_and(|l| l.ends_with(" 1")), "{metric} missing in:\n{text}");
        }

        metrics.record_removal(&foo());
        assert!(!metrics.render().unwrap().contains("foo"));
        assert!(metrics.is_empty());
    }

    #[test]
    fn counts_per_status() {
        let metrics = SyncMetrics::new().unwrap();
        metrics.observe_sync(&foo(), SyncStatus::Success);
        metrics.observe_sync(&foo(), SyncStatus::Success);
        metrics.observe_sync(&foo(), SyncStatus::Error);

        assert_eq!(metrics.sync_calls(&foo(), SyncStatus::Success), 2);
        assert_eq!(metrics.sync_calls(&foo(), SyncStatus::Error), 1);
        assert_eq!(metrics.len(), 2);
    }

    #[test]
    fn reading_absent_series_does_not_create_it() {
        let metrics = SyncMetrics::new().unwrap();
        assert_eq!(metrics.sync_calls(&foo(), SyncStatus::Error), 0);
        assert!(metrics.is_empty());
    }

    #[test]
    fn removal_leaves_other_resources() {
        let metrics = SyncMetrics::new().unwrap();
        let bar = PollerIdentity::new("bar", "example", "vault");
        metrics.observe_sync(&foo(), SyncStatus::Success);
        metrics.observe_sync(&bar, SyncStatus::Error);

        assert_eq!(metrics.remove_for(&foo()), 2);
        assert_eq!(metrics.sync_calls(&bar, SyncStatus::Error), 1);
        assert_eq!(metrics.remove_for(&foo()), 0);
    }

    #[test]
    fn label_values_are_escaped() {
        let metrics = SyncMetrics::new().unwrap();
        let odd = PollerIdentity::new("db", "prod", "va\"ult\\x\ny");
        metrics.observe_sync(&odd, SyncStatus::Success);

        let text = metrics.render().unwrap();
        assert!(text.contains(r#"backend="va\"ult\\x\ny""#), "{text}");
        assert!(!text.lines().any(|l| l.starts_with("y\"")));
    }

    #[test]
    fn shared_registry_rejects_duplicate_counters() {
        let registry = Registry::new();
        let first = SyncMetrics::with_registry(registry.clone()).unwrap();
        first.observe_sync(&foo(), SyncStatus::Success);

        let err = SyncMetrics::with_registry(registry).err().unwrap();
        assert_eq!(err.as_label(), "metrics_registry_failed");
    }
}
