//! # Poller descriptors and identities.
//!
//! [`PollerDescriptor`] is built fresh from every event that carries a resource and
//! is the only input a [`PollerFactory`](crate::PollerFactory) receives.
//! [`PollerIdentity`] is the subset of it that labels metrics for one resource.

use super::snapshot::{ResourceId, ResourceSnapshot};

/// Input for creating one poller.
#[derive(Debug, Clone, PartialEq)]
pub struct PollerDescriptor {
    /// Resource identity (table key).
    pub id: ResourceId,
    /// Resource name.
    pub name: String,
    /// Resource namespace.
    pub namespace: String,
    /// Full snapshot the poller is created from.
    pub snapshot: ResourceSnapshot,
}

impl PollerDescriptor {
    /// Builds a descriptor that owns `snapshot`.
    pub fn new(snapshot: ResourceSnapshot) -> Self {
        Self {
            id: snapshot.id().clone(),
            name: snapshot.name().to_string(),
            namespace: snapshot.namespace().to_string(),
            snapshot,
        }
    }

    /// Derives a descriptor from a snapshot.
    pub fn from_snapshot(snapshot: &ResourceSnapshot) -> Self {
        Self::new(snapshot.clone())
    }

    /// Metrics identity a poller built from this descriptor must retain.
    pub fn identity(&self) -> PollerIdentity {
        PollerIdentity {
            name: self.name.clone(),
            namespace: self.namespace.clone(),
            backend_kind: self.snapshot.backend_kind().to_string(),
        }
    }
}

/// Last-known `{name, namespace, backend_kind}` of a running poller.
///
/// Read back from the handle when the resource is deleted; the DELETED payload
/// itself may be stale or minimal.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PollerIdentity {
    /// Resource name.
    pub name: String,
    /// Resource namespace.
    pub namespace: String,
    /// Backend kind the poller fetches from.
    pub backend_kind: String,
}

impl PollerIdentity {
    /// Creates an identity from its parts.
    pub fn new(
        name: impl Into<String>,
        namespace: impl Into<String>,
        backend_kind: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            namespace: namespace.into(),
            backend_kind: backend_kind.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn descriptor_copies_snapshot_fields() {
        let snap = ResourceSnapshot::new("uid-7", "api-key", "payments").with_backend("vault");
        let d = PollerDescriptor::from_snapshot(&snap);

        assert_eq!(d.id, ResourceId::from("uid-7"));
        assert_eq!(d.name, "api-key");
        assert_eq!(d.namespace, "payments");
        assert_eq!(d.snapshot, snap);
        assert_eq!(d.identity(), PollerIdentity::new("api-key", "payments", "vault"));
    }
}
