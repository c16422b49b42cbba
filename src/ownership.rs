//! # Ownership filter.
//!
//! Partitions resources among cooperating controller instances by label match.
//! Each instance is configured with a distinct instance id; a resource is handled
//! only by the instance whose id equals the resource's owner label.
//!
//! ## Truth table
//! ```text
//! instance   owner    owns?
//! (unset)    (unset)  yes    single unlabelled controller claims unlabelled resources
//! "A"        "A"      yes
//! "A"        "B"      no
//! "A"        (unset)  no
//! (unset)    "B"      no
//! ```
//!
//! Empty strings count as unset on both sides.

/// Returns `true` when an event for a resource labelled `resource_owner` belongs to
/// the controller instance `instance_id`.
///
/// # Example
/// ```
/// use pollvisor::owns;
///
/// assert!(owns(None, None));
/// assert!(owns(Some("A"), Some("A")));
/// assert!(!owns(Some("A"), Some("B")));
/// assert!(!owns(Some("A"), None));
/// assert!(!owns(None, Some("B")));
/// ```
pub fn owns(instance_id: Option<&str>, resource_owner: Option<&str>) -> bool {
    let instance = instance_id.filter(|s| !s.is_empty());
    let owner = resource_owner.filter(|s| !s.is_empty());

    match (instance, owner) {
        (None, None) => true,
        (instance, owner) => instance == owner,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unset_both_sides_is_owned() {
        assert!(owns(None, None));
        assert!(owns(Some(""), None));
        assert!(owns(None, Some("")));
        assert!(owns(Some(""), Some("")));
    }

    #[test]
    fn labelled_instance_only_takes_its_own() {
        assert!(owns(Some("A"), Some("A")));
        assert!(!owns(Some("A"), Some("B")));
        assert!(!owns(Some("A"), None));
        assert!(!owns(Some("A"), Some("")));
    }

    #[test]
    fn unlabelled_instance_skips_labelled_resources() {
        assert!(!owns(None, Some("B")));
        assert!(!owns(Some(""), Some("B")));
    }
}
