//! # Resource identity and point-in-time snapshots.
//!
//! A [`ResourceSnapshot`] is what one watch event says about one external-secret
//! resource. It is immutable once built; a later event for the same resource
//! produces a new snapshot with the same [`ResourceId`].

use std::fmt;

use serde_json::Value;

/// Stable, globally unique identity of a watched resource (its cluster uid).
///
/// The id never changes across modifications of the same logical resource,
/// which makes it the key of the poller table.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ResourceId(String);

impl ResourceId {
    /// Wraps a raw uid.
    pub fn new(uid: impl Into<String>) -> Self {
        Self(uid.into())
    }

    /// Borrow the raw uid.
    #[inline]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ResourceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ResourceId {
    fn from(uid: &str) -> Self {
        Self::new(uid)
    }
}

impl From<String> for ResourceId {
    fn from(uid: String) -> Self {
        Self(uid)
    }
}

/// Immutable snapshot of a declarative resource at event time.
///
/// ## Example
/// ```rust
/// use pollvisor::ResourceSnapshot;
///
/// let snap = ResourceSnapshot::new("uid-1", "db-password", "default")
///     .with_owner("blue")
///     .with_backend("vault");
///
/// assert_eq!(snap.id().as_str(), "uid-1");
/// assert_eq!(snap.owner_instance_id(), Some("blue"));
/// assert_eq!(snap.backend_kind(), "vault");
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct ResourceSnapshot {
    id: ResourceId,
    name: String,
    namespace: String,
    owner_instance_id: Option<String>,
    backend_kind: String,
    raw_spec: Value,
}

impl ResourceSnapshot {
    /// Creates a snapshot with no owner label, no backend and a null spec.
    pub fn new(
        id: impl Into<ResourceId>,
        name: impl Into<String>,
        namespace: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            namespace: namespace.into(),
            owner_instance_id: None,
            backend_kind: String::new(),
            raw_spec: Value::Null,
        }
    }

    /// Sets the owning controller instance. An empty string means "unlabelled".
    pub fn with_owner(mut self, owner: impl Into<String>) -> Self {
        let owner = owner.into();
        self.owner_instance_id = (!owner.is_empty()).then_some(owner);
        self
    }

    /// Sets the backend kind the poller should fetch from.
    pub fn with_backend(mut self, backend_kind: impl Into<String>) -> Self {
        self.backend_kind = backend_kind.into();
        self
    }

    /// Attaches the raw resource spec.
    pub fn with_spec(mut self, raw_spec: Value) -> Self {
        self.raw_spec = raw_spec;
        self
    }

    /// Resource identity.
    #[inline]
    pub fn id(&self) -> &ResourceId {
        &self.id
    }

    /// Resource name.
    #[inline]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Resource namespace.
    #[inline]
    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    /// Controller instance the resource is labelled for, if any.
    #[inline]
    pub fn owner_instance_id(&self) -> Option<&str> {
        self.owner_instance_id.as_deref()
    }

    /// Backend kind (e.g. `vault`, `secretsManager`).
    #[inline]
    pub fn backend_kind(&self) -> &str {
        &self.backend_kind
    }

    /// Raw spec as received; opaque to the reconciliation core.
    #[inline]
    pub fn raw_spec(&self) -> &Value {
        &self.raw_spec
    }
}
