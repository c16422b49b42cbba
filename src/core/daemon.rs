//! # Daemon: the reconciliation loop.
//!
//! The [`Daemon`] consumes a stream of [`ResourceEvent`]s and keeps exactly one
//! poller running per managed resource. It is the only owner of the
//! [`PollerTable`], so every mutation is serialized by construction.
//!
//! ## Key responsibilities
//! - apply the ownership filter to every event that carries a resource
//! - replace pollers on ADDED/MODIFIED (old one stopped before the new one is created)
//! - report metrics removal on DELETED from the handle, *before* it is destroyed
//! - tear everything down on DELETED_ALL, source end, source fault or `stop()`
//!
//! ## State machine
//! ```text
//! Running:
//!   loop {
//!     select (biased) {
//!       stop requested      → break Ok
//!       events.next():
//!         None              → break Ok            (source exhausted)
//!         Some(Err(fault))  → break Err(fault)    (fatal)
//!         Some(Ok(event))   → reconcile(event)
//!     }
//!   }
//! Stopping:
//!   table.remove_all(); drop(events)
//! Stopped:
//!   return outcome
//! ```
//!
//! ## Reconcile
//! ```text
//! event carries resource && !owns(instance_id, owner) → ignore
//!
//! ADDED | MODIFIED(r) → table.remove(r.id)
//!                       factory.create(descriptor(r)) ─ Ok  → table.insert
//!                                                     └ Err → log, id stays absent
//! DELETED(r)          → if let Some(p) = table.get(r.id): metrics.record_removal(p.identity())
//!                       table.remove(r.id)
//! DELETED_ALL         → table.remove_all()   (no per-resource metrics)
//! other               → warn, ignore
//! ```
//!
//! ## Example
//! ```rust
//! use std::sync::Arc;
//! use tokio_util::sync::CancellationToken;
//! use pollvisor::{
//!     Daemon, DaemonConfig, PollerDescriptor, PollerFn, ResourceEvent, ResourceSnapshot,
//!     SpawningFactory,
//! };
//!
//! #[tokio::main(flavor = "current_thread")]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let cfg = DaemonConfig::default();
//!     let task = PollerFn::arc(|_d: PollerDescriptor, ctx: CancellationToken| async move {
//!         ctx.cancelled().await;
//!     });
//!
//!     let daemon = Daemon::builder(cfg.clone())
//!         .with_factory(Arc::new(SpawningFactory::new(task, &cfg)))
//!         .build()?;
//!
//!     let (tx, events) = cfg.event_channel();
//!     let shutdown = daemon.shutdown_handle();
//!     let run = tokio::spawn(daemon.run(events));
//!
//!     let secret = ResourceSnapshot::new("uid-1", "db", "default").with_backend("vault");
//!     tx.send(ResourceEvent::Added(secret)).await?;
//!
//!     shutdown.stop();
//!     run.await??;
//!     Ok(())
//! }
//! ```

use std::sync::Arc;

use futures::{Stream, StreamExt};
use tokio::sync::watch;
use tracing::{debug, error, info, warn};

use super::{
    builder::DaemonBuilder, config::DaemonConfig, shutdown::ShutdownHandle, state::DaemonState,
};
use crate::{
    error::{DaemonError, SourceError},
    metrics::MetricsSink,
    ownership::owns,
    pollers::{PollerFactory, PollerTable},
    resources::{PollerDescriptor, ResourceEvent, ResourceId},
};

/// Reconciles a resource event stream into one running poller per resource.
pub struct Daemon {
    cfg: DaemonConfig,
    factory: Arc<dyn PollerFactory>,
    metrics: Arc<dyn MetricsSink>,
    shutdown: ShutdownHandle,
    state: Arc<watch::Sender<DaemonState>>,
}

impl Daemon {
    /// Creates a [`DaemonBuilder`] with the given configuration.
    pub fn builder(cfg: DaemonConfig) -> DaemonBuilder {
        DaemonBuilder::new(cfg)
    }

    pub(crate) fn new_internal(
        cfg: DaemonConfig,
        factory: Arc<dyn PollerFactory>,
        metrics: Arc<dyn MetricsSink>,
        shutdown: ShutdownHandle,
        state: Arc<watch::Sender<DaemonState>>,
    ) -> Self {
        Self {
            cfg,
            factory,
            metrics,
            shutdown,
            state,
        }
    }

    /// Returns a handle that stops this daemon and observes its state.
    pub fn shutdown_handle(&self) -> ShutdownHandle {
        self.shutdown.clone()
    }

    /// Daemon configuration.
    pub fn config(&self) -> &DaemonConfig {
        &self.cfg
    }

    /// Consumes `events` until the stream ends, faults, or stop is requested.
    ///
    /// Whatever the exit path, every poller is stopped and the stream is dropped
    /// (ending the source) before this returns.
    ///
    /// # Errors
    /// [`DaemonError::EventSource`] if the stream yielded a fault. The caller should
    /// restart from a fresh resync.
    pub async fn run<S>(self, events: S) -> Result<(), DaemonError>
    where
        S: Stream<Item = Result<ResourceEvent, SourceError>> + Send,
    {
        let mut events = Box::pin(events);
        let mut table = PollerTable::new(self.cfg.stop_timeout_clamped());
        let token = self.shutdown.token().clone();

        info!(
            instance = self.cfg.instance_id().unwrap_or("<unset>"),
            "reconciliation loop started"
        );

        let outcome = loop {
            let next = tokio::select! {
                biased;
                _ = token.cancelled() => break Ok(()),
                next = events.next() => next,
            };

            match next {
                Some(Ok(event)) => self.reconcile(&mut table, event).await,
                Some(Err(fault)) => {
                    error!(error = %fault, "event source fault; stopping reconciliation");
                    break Err(DaemonError::EventSource(fault));
                }
                None => {
                    info!("event source exhausted");
                    break Ok(());
                }
            }
        };

        self.transition(DaemonState::Stopping);
        if !table.is_empty() {
            debug!(count = table.len(), ids = ?table.ids(), "removing pollers on shutdown");
        }
        let removed = table.remove_all().await;
        drop(events);
        token.cancel();
        self.transition(DaemonState::Stopped);
        info!(removed, "reconciliation loop stopped");

        outcome
    }

    /// Applies one event to the table.
    pub(crate) async fn reconcile(&self, table: &mut PollerTable, event: ResourceEvent) {
        if let Some(res) = event.resource() {
            if !owns(self.cfg.instance_id(), res.owner_instance_id()) {
                debug!(
                    namespace = res.namespace(),
                    name = res.name(),
                    owner = res.owner_instance_id().unwrap_or("<unset>"),
                    "resource is not managed by this instance"
                );
                return;
            }
        }

        match event {
            ResourceEvent::Added(res) | ResourceEvent::Modified(res) => {
                self.replace(table, PollerDescriptor::new(res)).await;
            }
            ResourceEvent::Deleted(res) => self.delete(table, res.id()).await,
            ResourceEvent::DeletedAll => {
                let removed = table.remove_all().await;
                info!(removed, "bulk resync; all pollers removed");
            }
            ResourceEvent::Other { kind } => warn!(kind = %kind, "unhandled event type"),
        }
    }

    async fn replace(&self, table: &mut PollerTable, descriptor: PollerDescriptor) {
        let id = descriptor.id.clone();
        let replaced = table.remove(&id).await;

        debug!(
            id = %id,
            namespace = %descriptor.namespace,
            name = %descriptor.name,
            replaced,
            "spinning up poller"
        );
        match self.factory.create(descriptor) {
            Ok(poller) => table.insert(id, poller).await,
            Err(err) => error!(
                id = %id,
                label = err.as_label(),
                error = %err,
                "failed to create poller; resource left without one"
            ),
        }
    }

    async fn delete(&self, table: &mut PollerTable, id: &ResourceId) {
        if let Some(poller) = table.get(id) {
            self.metrics.record_removal(poller.identity());
        }
        table.remove(id).await;
    }

    fn transition(&self, next: DaemonState) {
        debug!(state = next.as_label(), "daemon state changed");
        self.state.send_replace(next);
    }
}
