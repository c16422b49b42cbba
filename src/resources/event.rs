//! # Resource-change events consumed by the reconciliation loop.
//!
//! [`ResourceEvent`] classifies one watch notification:
//! - **Per-resource events**: `Added`, `Modified`, `Deleted` (carry a snapshot)
//! - **Bulk resync**: `DeletedAll` (all prior state is void, no resource)
//! - **Unrecognised**: `Other` (kept with its raw kind for logging)
//!
//! ## Example
//! ```rust
//! use pollvisor::{ResourceEvent, ResourceSnapshot};
//!
//! let ev = ResourceEvent::Added(ResourceSnapshot::new("uid-1", "token", "default"));
//! assert_eq!(ev.kind(), "ADDED");
//! assert!(ev.resource().is_some());
//!
//! assert!(ResourceEvent::DeletedAll.resource().is_none());
//! ```

use super::snapshot::ResourceSnapshot;

/// One lifecycle notification from the event source.
#[derive(Debug, Clone, PartialEq)]
pub enum ResourceEvent {
    /// A resource appeared.
    Added(ResourceSnapshot),
    /// A resource changed; handled exactly like `Added`.
    Modified(ResourceSnapshot),
    /// A resource was removed.
    Deleted(ResourceSnapshot),
    /// Every previously seen resource must be considered gone.
    DeletedAll,
    /// An event kind the loop does not understand.
    Other {
        /// Raw kind as reported by the source.
        kind: String,
    },
}

impl ResourceEvent {
    /// Stable kind label (`ADDED`, `MODIFIED`, `DELETED`, `DELETED_ALL` or the raw
    /// kind of an unrecognised event).
    pub fn kind(&self) -> &str {
        match self {
            ResourceEvent::Added(_) => "ADDED",
            ResourceEvent::Modified(_) => "MODIFIED",
            ResourceEvent::Deleted(_) => "DELETED",
            ResourceEvent::DeletedAll => "DELETED_ALL",
            ResourceEvent::Other { kind } => kind,
        }
    }

    /// The resource carried by the event, if any.
    pub fn resource(&self) -> Option<&ResourceSnapshot> {
        match self {
            ResourceEvent::Added(r) | ResourceEvent::Modified(r) | ResourceEvent::Deleted(r) => {
                Some(r)
            }
            ResourceEvent::DeletedAll | ResourceEvent::Other { .. } => None,
        }
    }

    /// Builds an unrecognised event.
    pub fn other(kind: impl Into<String>) -> Self {
        ResourceEvent::Other { kind: kind.into() }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_per_resource_events_carry_a_resource() {
        let snap = ResourceSnapshot::new("a", "n", "ns");
        assert!(ResourceEvent::Added(snap.clone()).resource().is_some());
        assert!(ResourceEvent::Modified(snap.clone()).resource().is_some());
        assert!(ResourceEvent::Deleted(snap).resource().is_some());
        assert!(ResourceEvent::DeletedAll.resource().is_none());
        assert!(ResourceEvent::other("BOOKMARK").resource().is_none());
    }

    #[test]
    fn other_reports_raw_kind() {
        assert_eq!(ResourceEvent::other("BOOKMARK").kind(), "BOOKMARK");
        assert_eq!(ResourceEvent::DeletedAll.kind(), "DELETED_ALL");
    }
}
