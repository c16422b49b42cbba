//! # Example: daemon
//!
//! Runs the reconciliation loop against a scripted watch stream.
//!
//! Demonstrates how to:
//! - Build a [`Daemon`] with a [`SpawningFactory`] and [`SyncMetrics`].
//! - Feed it decoded watch envelopes through an [`event_channel`](pollvisor::event_channel).
//! - Stop it on `Ctrl-C` or once the script is done.
//!
//! ## Flow
//! ```text
//! producer ──► ADDED db ──► MODIFIED db ──► ADDED cache ──► DELETED db ──► DELETED_ALL
//!                 │              │               │               │              │
//!                 ▼              ▼               ▼               ▼              ▼
//!            start db      stop db,         start cache    metrics removed   stop all
//!                          start db(v2)                    stop db(v2)
//! ```
//!
//! ## Run
//! ```bash
//! RUST_LOG=pollvisor=debug cargo run --example daemon
//! ```

use std::sync::Arc;
use std::time::Duration;

use pollvisor::{
    Daemon, DaemonConfig, PollerDescriptor, PollerFn, ResourceEvent, SpawningFactory,
    SyncMetrics, SyncStatus,
};
use tokio_util::sync::CancellationToken;
use tracing_subscriber::EnvFilter;

const SCRIPT: &[&str] = &[
    r#"{"type":"ADDED","object":{"metadata":{"uid":"u-1","name":"db","namespace":"default"},
        "spec":{"backendType":"vault","data":[{"key":"db/password","name":"password"}]}}}"#,
    r#"{"type":"MODIFIED","object":{"metadata":{"uid":"u-1","name":"db","namespace":"default"},
        "spec":{"backendType":"vault","data":[{"key":"db/v2/password","name":"password"}]}}}"#,
    r#"{"type":"ADDED","object":{"metadata":{"uid":"u-2","name":"cache","namespace":"default"},
        "spec":{"backendType":"secretsManager"}}}"#,
    r#"{"type":"DELETED","object":{"metadata":{"uid":"u-1","name":"db","namespace":"default"}}}"#,
    r#"{"type":"DELETED_ALL"}"#,
];

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("pollvisor=info")),
        )
        .with_target(false)
        .init();

    // 1. Configuration: unlabelled instance, short stop bound
    let cfg = DaemonConfig {
        stop_timeout: Duration::from_secs(2),
        ..DaemonConfig::default()
    };

    // 2. Metrics shared by every poller and the daemon
    let metrics = Arc::new(SyncMetrics::new()?);

    // 3. Worker body: "sync" every 200ms until cancelled
    let task = {
        let metrics = Arc::clone(&metrics);
        PollerFn::arc(move |d: PollerDescriptor, ctx: CancellationToken| {
            let metrics = Arc::clone(&metrics);
            async move {
                let identity = d.identity();
                let mut tick = tokio::time::interval(Duration::from_millis(200));
                loop {
                    tokio::select! {
                        _ = ctx.cancelled() => {
                            println!("[{}] poller stopped", d.name);
                            return;
                        }
                        _ = tick.tick() => {
                            println!("[{}] synced from {}", d.name, identity.backend_kind);
                            metrics.observe_sync(&identity, SyncStatus::Success);
                        }
                    }
                }
            }
        })
    };

    // 4. Daemon
    let factory = SpawningFactory::new(task, &cfg).with_backends(["vault", "secretsManager"]);
    let daemon = Daemon::builder(cfg.clone())
        .with_factory(Arc::new(factory))
        .with_metrics(metrics.clone())
        .build()?;
    let shutdown = daemon.shutdown_handle();
    let _signals = shutdown.stop_on_signal();

    // 5. Scripted producer
    let (tx, events) = cfg.event_channel();
    let producer = tokio::spawn(async move {
        for (i, raw) in SCRIPT.iter().enumerate() {
            tokio::time::sleep(Duration::from_millis(500)).await;
            let event = match ResourceEvent::from_watch_str(raw) {
                Ok(event) => event,
                Err(err) => {
                    eprintln!("skipping malformed watch event: {err}");
                    continue;
                }
            };
            println!("--> {}", event.kind());
            if tx.send(event).await.is_err() {
                return;
            }
            if i + 1 == SCRIPT.len() {
                match metrics.render() {
                    Ok(text) => println!("{text}"),
                    Err(err) => eprintln!("failed to render metrics: {err}"),
                }
            }
        }
        // Dropping `tx` ends the stream; the daemon tears down and returns.
    });

    daemon.run(events).await?;
    producer.await?;
    Ok(())
}
