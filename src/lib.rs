//! # pollvisor
//!
//! **Pollvisor** is the reconciliation core of an external-secrets poller daemon.
//!
//! It consumes a stream of lifecycle events for watched secret resources and keeps
//! exactly one running poller per resource this instance manages. Pollers are
//! replaced on every update, stopped on deletion, and all torn down when the
//! watch resyncs, ends, or faults.
//!
//! ## Architecture
//! ### Overview
//! ```text
//!   watch producer (ADDED / MODIFIED / DELETED / DELETED_ALL)
//!            │  EventSender::send / ResourceEvent::from_watch
//!            ▼
//!     ┌──────────────┐
//!     │ EventStream  │  (bounded, ordered, closable)
//!     └──────┬───────┘
//!            ▼
//! ┌───────────────────────────────────────────────────────────────────┐
//! │  Daemon::run (single writer)                                      │
//! │  - owns(instance_id, owner)    ownership filter                   │
//! │  - PollerFactory               creates one poller per resource    │
//! │  - PollerTable                 ResourceId → Box<dyn Poller>       │
//! │  - MetricsSink                 removal hook on DELETED            │
//! └──────┬──────────────────┬──────────────────┬───────────────┬──────┘
//!        ▼                  ▼                  ▼               │
//!     ┌──────────────┐   ┌──────────────┐   ┌──────────────┐   │
//!     │ PollerHandle │   │ PollerHandle │   │ PollerHandle │   │ ShutdownHandle
//!     │ (tokio task) │   │ (tokio task) │   │ (tokio task) │   │  stop() / stopped()
//!     └──────────────┘   └──────────────┘   └──────────────┘   ▼
//!                                                        cancel token
//! ```
//!
//! ### Lifecycle
//! ```text
//! Running ──► for each event:
//!   ├─ carries resource && not owned          ─► ignore
//!   ├─ ADDED | MODIFIED  ─► stop old, create new (failure: id left absent)
//!   ├─ DELETED           ─► record_removal(handle identity), stop, forget
//!   ├─ DELETED_ALL       ─► stop and forget all
//!   └─ other             ─► warn
//!
//! exit (stream end | source fault | stop()):
//!   Stopping ─► remove_all ─► end source ─► Stopped
//! ```
//!
//! ## Features
//! | Area              | Description                                                  | Key types / traits                          |
//! |-------------------|--------------------------------------------------------------|---------------------------------------------|
//! | **Reconciliation**| Event-driven poller lifecycle with ownership partitioning.   | [`Daemon`], [`owns`]                        |
//! | **Pollers**       | Stop contract, tokio-backed handles, closure workers.        | [`Poller`], [`PollerHandle`], [`PollerFn`]  |
//! | **Factories**     | Descriptor to running poller, with backend allow-list.       | [`PollerFactory`], [`SpawningFactory`]      |
//! | **Events**        | Typed events decodable from watch JSON, channel source.      | [`ResourceEvent`], [`event_channel`]        |
//! | **Metrics**       | Per-resource sync counters removed on deletion.              | [`MetricsSink`], [`SyncMetrics`]            |
//! | **Shutdown**      | Idempotent stop, observable state, OS signal wiring.         | [`ShutdownHandle`], [`DaemonState`]         |
//! | **Errors**        | Typed errors for the loop, pollers and event sources.        | [`DaemonError`], [`PollerError`]            |
//!
//! ## Example
//! ```rust
//! use std::sync::Arc;
//! use std::time::Duration;
//! use tokio_util::sync::CancellationToken;
//! use pollvisor::{
//!     Daemon, DaemonConfig, PollerDescriptor, PollerFn, ResourceEvent, SpawningFactory,
//! };
//!
//! #[tokio::main(flavor = "current_thread")]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let cfg = DaemonConfig::with_instance_id("blue");
//!
//!     // One worker body shared by every poller.
//!     let task = PollerFn::arc(|d: PollerDescriptor, ctx: CancellationToken| async move {
//!         let mut tick = tokio::time::interval(Duration::from_secs(10));
//!         loop {
//!             tokio::select! {
//!                 _ = ctx.cancelled() => return,
//!                 _ = tick.tick() => println!("syncing {}/{}", d.namespace, d.name),
//!             }
//!         }
//!     });
//!
//!     let daemon = Daemon::builder(cfg.clone())
//!         .with_factory(Arc::new(SpawningFactory::new(task, &cfg).with_backends(["vault"])))
//!         .build()?;
//!
//!     let (tx, events) = cfg.event_channel();
//!     let raw = r#"{"type":"ADDED","object":{
//!         "metadata":{"uid":"u-1","name":"db","namespace":"default"},
//!         "spec":{"controllerId":"blue","backendType":"vault"}}}"#;
//!     tx.send(ResourceEvent::from_watch_str(raw)?).await?;
//!     drop(tx); // end of stream: the daemon tears everything down and returns
//!
//!     daemon.run(events).await?;
//!     Ok(())
//! }
//! ```
mod core;
mod error;
mod metrics;
mod ownership;
mod pollers;
mod resources;

// ---- Public re-exports ----

pub use core::{
    Daemon, DaemonBuilder, DaemonConfig, DaemonState, ShutdownHandle, wait_for_shutdown_signal,
};
pub use error::{
    DaemonError, ManifestError, MetricsError, PollerError, SourceClosed, SourceError,
};
pub use metrics::{
    DEPRECATED_SYNC_CALLS_METRIC, MetricsSink, NoopMetrics, SYNC_CALLS_METRIC, SyncMetrics,
    SyncStatus,
};
pub use ownership::owns;
pub use pollers::{
    BoxPollerFuture, Poller, PollerFactory, PollerFn, PollerHandle, PollerTask, PollerTaskRef,
    SpawningFactory,
};
pub use resources::{
    EventSender, EventStream, PollerDescriptor, PollerIdentity, ResourceEvent, ResourceId,
    ResourceSnapshot, event_channel,
};
