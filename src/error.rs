//! Error types used by the reconciliation loop and its pollers.
//!
//! This module defines the error enums of the crate:
//!
//! - [`DaemonError`] - errors that end the reconciliation loop.
//! - [`PollerError`] - errors raised while creating or stopping a single poller.
//! - [`SourceError`] - a fault reported by the event source itself.
//! - [`SourceClosed`] - a push into an event source the loop already ended.
//! - [`ManifestError`] - a watch event or manifest that could not be decoded.
//! - [`MetricsError`] - a metrics registry refused a collector or failed to encode.
//!
//! All types provide `as_label` for logging/metrics. Only [`DaemonError`] is ever
//! returned by [`Daemon::run`](crate::Daemon::run); poller errors are logged and
//! isolated to the event that caused them.

use std::time::Duration;
use thiserror::Error;

use crate::resources::ResourceId;

/// # Errors produced by the reconciliation loop.
///
/// Any of these terminates [`Daemon::run`](crate::Daemon::run). Before the error
/// is returned every tracked poller has already been stopped, so the caller can
/// restart the whole controller from a fresh resync.
#[non_exhaustive]
#[derive(Error, Debug)]
pub enum DaemonError {
    /// The event stream raised an error instead of ending cleanly.
    #[error("event source fault: {0}")]
    EventSource(#[from] SourceError),

    /// The daemon was built without a poller factory.
    #[error("no poller factory configured")]
    MissingFactory,
}

impl DaemonError {
    /// Returns a short stable label (snake_case) for use in logs/metrics.
    ///
    /// # Example
    /// ```
    /// use pollvisor::{DaemonError, SourceError};
    ///
    /// let err = DaemonError::from(SourceError::new("watch expired"));
    /// assert_eq!(err.as_label(), "daemon_event_source_fault");
    /// ```
    pub fn as_label(&self) -> &'static str {
        match self {
            DaemonError::EventSource(_) => "daemon_event_source_fault",
            DaemonError::MissingFactory => "daemon_missing_factory",
        }
    }
}

/// # Errors produced by poller creation and teardown.
///
/// These never stop the loop. A creation failure leaves the resource without a
/// poller; a stop failure is logged and the entry is dropped from the table anyway.
#[non_exhaustive]
#[derive(Error, Debug)]
pub enum PollerError {
    /// The factory refused or failed to build a poller for this resource.
    #[error("failed to create poller for {id}: {reason}")]
    Creation {
        /// Resource the poller was requested for.
        id: ResourceId,
        /// Why creation failed.
        reason: String,
    },

    /// The poller did not confirm termination within the stop bound.
    #[error("poller {id} did not stop within {timeout:?}")]
    StopTimeout {
        /// Resource whose poller hung.
        id: ResourceId,
        /// The bound that was exceeded.
        timeout: Duration,
    },

    /// The poller task panicked before or while being stopped.
    #[error("poller {id} panicked")]
    Panicked {
        /// Resource whose poller panicked.
        id: ResourceId,
    },
}

impl PollerError {
    /// Returns a short stable label (snake_case) for use in logs/metrics.
    ///
    /// # Example
    /// ```
    /// use pollvisor::PollerError;
    ///
    /// let err = PollerError::Panicked { id: "uid-1".into() };
    /// assert_eq!(err.as_label(), "poller_panicked");
    /// ```
    pub fn as_label(&self) -> &'static str {
        match self {
            PollerError::Creation { .. } => "poller_creation_failed",
            PollerError::StopTimeout { .. } => "poller_stop_timeout",
            PollerError::Panicked { .. } => "poller_panicked",
        }
    }

    /// Resource the error relates to.
    pub fn id(&self) -> &ResourceId {
        match self {
            PollerError::Creation { id, .. }
            | PollerError::StopTimeout { id, .. }
            | PollerError::Panicked { id } => id,
        }
    }
}

/// Fault reported by an event source in place of the next event.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{reason}")]
pub struct SourceError {
    reason: String,
}

impl SourceError {
    /// Creates a fault with a human-readable reason.
    pub fn new(reason: impl Into<String>) -> Self {
        Self {
            reason: reason.into(),
        }
    }

    /// The reason given by the source.
    pub fn reason(&self) -> &str {
        &self.reason
    }
}

impl From<ManifestError> for SourceError {
    fn from(err: ManifestError) -> Self {
        Self::new(err.to_string())
    }
}

/// The loop has ended the event source; no more events are accepted.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
#[error("event source closed")]
pub struct SourceClosed;

/// # Errors produced while decoding watch events.
#[non_exhaustive]
#[derive(Error, Debug)]
pub enum ManifestError {
    /// An event kind that requires a resource arrived without one.
    #[error("{kind} event has no object")]
    MissingObject {
        /// The watch event type.
        kind: String,
    },

    /// A required manifest field is absent or empty.
    #[error("manifest is missing {field}")]
    MissingField {
        /// Dotted path of the field.
        field: &'static str,
    },

    /// The payload is not valid JSON or does not have the expected shape.
    #[error("invalid watch event: {0}")]
    Invalid(#[from] serde_json::Error),
}

impl ManifestError {
    /// Returns a short stable label (snake_case) for use in logs/metrics.
    pub fn as_label(&self) -> &'static str {
        match self {
            ManifestError::MissingObject { .. } => "manifest_missing_object",
            ManifestError::MissingField { .. } => "manifest_missing_field",
            ManifestError::Invalid(_) => "manifest_invalid",
        }
    }
}

/// # Errors produced by the metrics registry.
#[non_exhaustive]
#[derive(Error, Debug)]
pub enum MetricsError {
    /// Registration or text encoding failed inside the registry.
    #[error("metrics registry error: {0}")]
    Registry(#[from] prometheus::Error),
}

impl MetricsError {
    /// Returns a short stable label (snake_case) for use in logs/metrics.
    pub fn as_label(&self) -> &'static str {
        match self {
            MetricsError::Registry(_) => "metrics_registry_failed",
        }
    }
}
