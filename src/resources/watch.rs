//! # Decoding of cluster watch events.
//!
//! A watch producer yields JSON envelopes of the form
//! `{ "type": "ADDED", "object": <ExternalSecret manifest> }`. This module turns them
//! into [`ResourceEvent`]s:
//!
//! ```text
//! metadata.uid       → ResourceSnapshot::id
//! metadata.name      → ResourceSnapshot::name
//! metadata.namespace → ResourceSnapshot::namespace
//! spec.controllerId  → ResourceSnapshot::owner_instance_id
//! spec.backendType   → ResourceSnapshot::backend_kind
//! spec               → ResourceSnapshot::raw_spec
//! ```
//!
//! `DELETED_ALL` and unknown types are decoded without looking at `object`.

use serde::Deserialize;
use serde_json::Value;

use super::event::ResourceEvent;
use super::snapshot::ResourceSnapshot;
use crate::error::ManifestError;

#[derive(Deserialize)]
struct WatchEnvelope {
    #[serde(rename = "type")]
    kind: String,
    #[serde(default)]
    object: Option<Manifest>,
}

#[derive(Deserialize)]
struct Manifest {
    #[serde(default)]
    metadata: Metadata,
    #[serde(default)]
    spec: Value,
}

#[derive(Deserialize, Default)]
struct Metadata {
    #[serde(default)]
    uid: String,
    #[serde(default)]
    name: String,
    #[serde(default)]
    namespace: String,
}

impl ResourceEvent {
    /// Decodes a watch envelope.
    ///
    /// # Example
    /// ```rust
    /// use pollvisor::ResourceEvent;
    ///
    /// let ev = ResourceEvent::from_watch_str(r#"{
    ///     "type": "MODIFIED",
    ///     "object": {
    ///         "metadata": { "uid": "u-1", "name": "db", "namespace": "prod" },
    ///         "spec": { "backendType": "vault", "controllerId": "blue" }
    ///     }
    /// }"#).unwrap();
    ///
    /// let res = ev.resource().unwrap();
    /// assert_eq!(ev.kind(), "MODIFIED");
    /// assert_eq!(res.backend_kind(), "vault");
    /// assert_eq!(res.owner_instance_id(), Some("blue"));
    /// ```
    pub fn from_watch(value: &Value) -> Result<Self, ManifestError> {
        let envelope = WatchEnvelope::deserialize(value)?;
        let kind = envelope.kind;

        let wrap: fn(ResourceSnapshot) -> ResourceEvent = match kind.as_str() {
            "ADDED" => ResourceEvent::Added,
            "MODIFIED" => ResourceEvent::Modified,
            "DELETED" => ResourceEvent::Deleted,
            "DELETED_ALL" => return Ok(ResourceEvent::DeletedAll),
            _ => return Ok(ResourceEvent::other(kind.clone())),
        };

        let manifest = envelope
            .object
            .ok_or(ManifestError::MissingObject { kind })?;
        Ok(wrap(snapshot_from(manifest)?))
    }

    /// Parses and decodes a watch envelope from its JSON text.
    pub fn from_watch_str(raw: &str) -> Result<Self, ManifestError> {
        let value: Value = serde_json::from_str(raw)?;
        Self::from_watch(&value)
    }
}

fn snapshot_from(manifest: Manifest) -> Result<ResourceSnapshot, ManifestError> {
    let Manifest { metadata, spec } = manifest;
    if metadata.uid.is_empty() {
        return Err(ManifestError::MissingField {
            field: "metadata.uid",
        });
    }

    let owner = spec_str(&spec, "controllerId");
    let backend = spec_str(&spec, "backendType");

    Ok(
        ResourceSnapshot::new(metadata.uid, metadata.name, metadata.namespace)
            .with_owner(owner)
            .with_backend(backend)
            .with_spec(spec),
    )
}

fn spec_str(spec: &Value, key: &str) -> String {
    spec.get(key)
        .and_then(Value::as_str)
        .unwrap_or_default()
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn decodes_added_manifest() {
        let ev = ResourceEvent::from_watch(&json!({
            "type": "ADDED",
            "object": {
                "metadata": { "uid": "u-1", "name": "db", "namespace": "prod" },
                "spec": { "backendType": "secretsManager", "data": [] }
            }
        }))
        .unwrap();

        let ResourceEvent::Added(snap) = ev else {
            panic!("expected ADDED");
        };
        assert_eq!(snap.id().as_str(), "u-1");
        assert_eq!(snap.name(), "db");
        assert_eq!(snap.namespace(), "prod");
        assert_eq!(snap.owner_instance_id(), None);
        assert_eq!(snap.backend_kind(), "secretsManager");
        assert_eq!(snap.raw_spec()["data"], json!([]));
    }

    #[test]
    fn deleted_all_ignores_object() {
        let ev = ResourceEvent::from_watch(&json!({ "type": "DELETED_ALL" })).unwrap();
        assert_eq!(ev, ResourceEvent::DeletedAll);
    }

    #[test]
    fn unknown_type_is_other() {
        let ev = ResourceEvent::from_watch(&json!({ "type": "BOOKMARK", "object": {} })).unwrap();
        assert_eq!(ev, ResourceEvent::other("BOOKMARK"));
    }

    #[test]
    fn per_resource_event_without_object_fails() {
        let err = ResourceEvent::from_watch(&json!({ "type": "DELETED" })).unwrap_err();
        assert_eq!(err.as_label(), "manifest_missing_object");
    }

    #[test]
    fn missing_uid_fails() {
        let err = ResourceEvent::from_watch(&json!({
            "type": "ADDED",
            "object": { "metadata": { "name": "db" } }
        }))
        .unwrap_err();
        assert!(matches!(
            err,
            ManifestError::MissingField {
                field: "metadata.uid"
            }
        ));
    }

    #[test]
    fn garbage_is_invalid() {
        let err = ResourceEvent::from_watch_str("{ not json").unwrap_err();
        assert_eq!(err.as_label(), "manifest_invalid");
    }
}
