//! # Daemon configuration.
//!
//! Provides [`DaemonConfig`] centralized settings for the reconciliation loop.
//!
//! Config is used in three ways:
//! 1. **Daemon creation**: `Daemon::builder(config)`
//! 2. **Factory defaults**: `SpawningFactory::new(task, &config)` (stop bound)
//! 3. **Event source**: `config.event_channel()` (channel capacity)
//!
//! ## Sentinel values
//! - `instance_id = ""` → unset (single unlabelled controller)
//! - `stop_timeout = 0s` → do not wait for pollers (clamped to 1ms)

use std::time::Duration;

use crate::resources::{EventSender, EventStream, event_channel};

/// Global configuration for the reconciliation loop.
///
/// ## Field semantics
/// - `instance_id`: Label value this instance owns (`""` = unset)
/// - `stop_timeout`: Maximum wait for one poller to stop
/// - `source_capacity`: Buffer size of [`event_channel`] (min 1)
///
/// ## Notes
/// All fields are public for flexibility. Prefer the helper accessors to avoid
/// sprinkling sentinel checks across the codebase.
#[derive(Clone, Debug)]
pub struct DaemonConfig {
    /// Controller instance id matched against each resource's owner label.
    ///
    /// Several daemons with distinct ids partition resources between them; a daemon
    /// with an empty id only manages unlabelled resources.
    pub instance_id: String,

    /// Maximum time to wait for a single poller to confirm it stopped.
    ///
    /// A poller that exceeds it is aborted, logged and treated as stopped.
    pub stop_timeout: Duration,

    /// Capacity of the event channel created by [`DaemonConfig::event_channel`].
    pub source_capacity: usize,
}

impl DaemonConfig {
    /// Returns a config owning resources labelled `instance_id`.
    pub fn with_instance_id(instance_id: impl Into<String>) -> Self {
        Self {
            instance_id: instance_id.into(),
            ..Self::default()
        }
    }

    /// Returns the instance id as an `Option`.
    ///
    /// - `None` → unset
    /// - `Some(id)` → only resources labelled `id` are managed
    #[inline]
    pub fn instance_id(&self) -> Option<&str> {
        Some(self.instance_id.as_str()).filter(|id| !id.is_empty())
    }

    /// Returns the stop bound clamped to a minimum of 1ms.
    #[inline]
    pub fn stop_timeout_clamped(&self) -> Duration {
        self.stop_timeout.max(Duration::from_millis(1))
    }

    /// Returns the source capacity clamped to a minimum of 1.
    #[inline]
    pub fn source_capacity_clamped(&self) -> usize {
        self.source_capacity.max(1)
    }

    /// Creates an event source sized by `source_capacity`.
    pub fn event_channel(&self) -> (EventSender, EventStream) {
        event_channel(self.source_capacity_clamped())
    }
}

impl Default for DaemonConfig {
    /// Default configuration:
    ///
    /// - `instance_id = ""` (unset)
    /// - `stop_timeout = 5s`
    /// - `source_capacity = 256`
    fn default() -> Self {
        Self {
            instance_id: String::new(),
            stop_timeout: Duration::from_secs(5),
            source_capacity: 256,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_instance_id_is_unset() {
        assert_eq!(DaemonConfig::default().instance_id(), None);
        assert_eq!(DaemonConfig::with_instance_id("blue").instance_id(), Some("blue"));
    }

    #[test]
    fn sentinels_are_clamped() {
        let cfg = DaemonConfig {
            stop_timeout: Duration::ZERO,
            source_capacity: 0,
            ..DaemonConfig::default()
        };
        assert_eq!(cfg.stop_timeout_clamped(), Duration::from_millis(1));
        assert_eq!(cfg.source_capacity_clamped(), 1);
    }
}
