//! # Poller table - the authoritative registry of running pollers.
//!
//! Maps each [`ResourceId`] to the single [`Poller`] running for it.
//!
//! ## Architecture
//! ```text
//! Daemon::run() (sole owner, &mut)
//!   ├─► remove(id)      → take entry → stop() (bounded) → drop
//!   ├─► remove_all()    → drain → stop() all concurrently (bounded) → drop
//!   ├─► insert(id, p)   → record handle (stops a stray previous one)
//!   └─► get(id)         → read identity before a delete
//! ```
//!
//! ## Rules
//! - At most one entry per id; its handle is the only live worker for that id.
//! - Only the reconciliation loop holds the table, so no locking is needed.
//! - Stop failures are logged and never keep an entry alive.
//! - Every stop is bounded by the table's guard, whatever the `Poller` impl does.

use std::collections::HashMap;
use std::time::Duration;

use futures::future::join_all;
use tokio::time;
use tracing::{debug, warn};

use crate::error::PollerError;
use crate::resources::ResourceId;

use super::handle::Poller;

/// Registry of active pollers keyed by resource id.
pub struct PollerTable {
    entries: HashMap<ResourceId, Box<dyn Poller>>,
    stop_guard: Duration,
}

impl PollerTable {
    /// Creates an empty table whose stops never wait longer than `stop_guard`.
    pub fn new(stop_guard: Duration) -> Self {
        Self {
            entries: HashMap::new(),
            stop_guard,
        }
    }

    /// Stops and removes the poller for `id`.
    ///
    /// Returns `false` (and does nothing) when no entry exists.
    pub async fn remove(&mut self, id: &ResourceId) -> bool {
        let Some(mut poller) = self.entries.remove(id) else {
            return false;
        };

        debug!(id = %id, "stopping and removing poller");
        report_stop(id, stop_bounded(poller.as_mut(), self.stop_guard).await);
        true
    }

    /// Stops and removes every poller. Returns how many were removed.
    pub async fn remove_all(&mut self) -> usize {
        let mut drained: Vec<(ResourceId, Box<dyn Poller>)> = self.entries.drain().collect();
        if drained.is_empty() {
            return 0;
        }

        debug!(count = drained.len(), "stopping and removing all pollers");
        let guard = self.stop_guard;
        let results = join_all(
            drained
                .iter_mut()
                .map(|(_, poller)| stop_bounded(poller.as_mut(), guard)),
        )
        .await;

        for ((id, _), res) in drained.iter().zip(results) {
            report_stop(id, res);
        }
        drained.len()
    }

    /// Records `poller` for `id`.
    ///
    /// Callers remove before inserting; a poller found in the slot anyway is stopped
    /// rather than left running next to the new one.
    pub async fn insert(&mut self, id: ResourceId, poller: Box<dyn Poller>) {
        if let Some(mut stray) = self.entries.insert(id.clone(), poller) {
            warn!(id = %id, "poller slot was occupied on insert; stopping previous poller");
            report_stop(&id, stop_bounded(stray.as_mut(), self.stop_guard).await);
        }
    }

    /// Returns the poller for `id`, if tracked.
    pub fn get(&self, id: &ResourceId) -> Option<&dyn Poller> {
        self.entries.get(id).map(|p| p.as_ref())
    }

    /// True if `id` is tracked.
    #[cfg_attr(not(test), allow(dead_code))]
    pub fn contains(&self, id: &ResourceId) -> bool {
        self.entries.contains_key(id)
    }

    /// Number of tracked pollers.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// True if no poller is tracked.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Sorted list of tracked ids.
    pub fn ids(&self) -> Vec<ResourceId> {
        let mut ids: Vec<ResourceId> = self.entries.keys().cloned().collect();
        ids.sort_unstable();
        ids
    }
}

async fn stop_bounded(poller: &mut dyn Poller, guard: Duration) -> Result<(), PollerError> {
    let id = poller.id().clone();
    match time::timeout(guard, poller.stop()).await {
        Ok(res) => res,
        Err(_elapsed) => Err(PollerError::StopTimeout { id, timeout: guard }),
    }
}

fn report_stop(id: &ResourceId, res: Result<(), PollerError>) {
    if let Err(err) = res {
        warn!(
            id = %id,
            label = err.as_label(),
            error = %err,
            "poller did not stop cleanly; treating as stopped"
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Arc, Mutex};

    use async_trait::async_trait;

    use crate::resources::PollerIdentity;

    type Log = Arc<Mutex<Vec<String>>>;

    struct FakePoller {
        id: ResourceId,
        identity: PollerIdentity,
        log: Log,
        hang: bool,
    }

    impl FakePoller {
        fn boxed(id: &str, log: &Log) -> Box<dyn Poller> {
            Box::new(Self {
                id: id.into(),
                identity: PollerIdentity::new(id, "default", "vault"),
                log: Arc::clone(log),
                hang: false,
            })
        }

        fn hanging(id: &str, log: &Log) -> Box<dyn Poller> {
            Box::new(Self {
                id: id.into(),
                identity: PollerIdentity::new(id, "default", "vault"),
                log: Arc::clone(log),
                hang: true,
            })
        }
    }

    #[async_trait]
    impl Poller for FakePoller {
        fn id(&self) -> &ResourceId {
            &self.id
        }

        fn identity(&self) -> &PollerIdentity {
            &self.identity
        }

        async fn stop(&mut self) -> Result<(), PollerError> {
            self.log.lock().unwrap().push(format!("stop {}", self.id));
            if self.hang {
                std::future::pending::<()>().await;
            }
            Ok(())
        }
    }

    fn log() -> Log {
        Arc::new(Mutex::new(Vec::new()))
    }

    #[tokio::test]
    async fn remove_stops_then_forgets() {
        let log = log();
        let mut table = PollerTable::new(Duration::from_secs(1));
        table.insert("a".into(), FakePoller::boxed("a", &log)).await;

        assert!(table.contains(&"a".into()));
        assert!(table.remove(&"a".into()).await);
        assert!(table.is_empty());
        assert_eq!(*log.lock().unwrap(), vec!["stop a"]);
    }

    #[tokio::test]
    async fn remove_absent_is_noop() {
        let log = log();
        let mut table = PollerTable::new(Duration::from_secs(1));

        assert!(!table.remove(&"ghost".into()).await);
        assert!(log.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn remove_all_empties_table() {
        let log = log();
        let mut table = PollerTable::new(Duration::from_secs(1));
        for id in ["a", "b", "c"] {
            table.insert(id.into(), FakePoller::boxed(id, &log)).await;
        }
        assert_eq!(table.ids(), vec!["a".into(), "b".into(), "c".into()]);

        assert_eq!(table.remove_all().await, 3);
        assert!(table.is_empty());
        let mut stops = log.lock().unwrap().clone();
        stops.sort();
        assert_eq!(stops, vec!["stop a", "stop b", "stop c"]);

        assert_eq!(table.remove_all().await, 0);
    }

    #[tokio::test]
    async fn insert_over_occupied_slot_stops_stray() {
        let log = log();
        let mut table = PollerTable::new(Duration::from_secs(1));
        table.insert("a".into(), FakePoller::boxed("a", &log)).await;
        table.insert("a".into(), FakePoller::boxed("a", &log)).await;

        assert_eq!(table.len(), 1);
        assert_eq!(*log.lock().unwrap(), vec!["stop a"]);
    }

    #[tokio::test]
    async fn get_exposes_identity() {
        let log = log();
        let mut table = PollerTable::new(Duration::from_secs(1));
        table.insert("a".into(), FakePoller::boxed("a", &log)).await;

        let identity = table.get(&"a".into()).map(|p| p.identity().clone());
        assert_eq!(identity, Some(PollerIdentity::new("a", "default", "vault")));
        assert!(table.get(&"b".into()).is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn hanging_poller_is_removed_after_guard() {
        let log = log();
        let mut table = PollerTable::new(Duration::from_millis(100));
        table.insert("stuck".into(), FakePoller::hanging("stuck", &log)).await;
        table.insert("fine".into(), FakePoller::boxed("fine", &log)).await;

        assert_eq!(table.remove_all().await, 2);
        assert!(table.is_empty());
        assert_eq!(log.lock().unwrap().len(), 2);
    }
}
