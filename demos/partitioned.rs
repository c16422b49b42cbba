//! # Example: partitioned
//!
//! Two daemons with distinct instance ids share one watch feed.
//!
//! Each resource is labelled with the instance that owns it (`spec.controllerId`).
//! Every daemon sees every event, but only spins up pollers for its own resources.
//!
//! ```text
//!                         ┌─► daemon "blue"  → pollers for blue-labelled resources
//! watch feed ──(fan out)──┤
//!                         └─► daemon "green" → pollers for green-labelled resources
//! ```
//!
//! ## Run
//! ```bash
//! RUST_LOG=pollvisor=debug cargo run --example partitioned
//! ```

use std::sync::Arc;
use std::time::Duration;

use pollvisor::{
    Daemon, DaemonConfig, EventSender, PollerDescriptor, PollerFn, ResourceEvent,
    ResourceSnapshot, SpawningFactory,
};
use tokio_util::sync::CancellationToken;
use tracing_subscriber::EnvFilter;

fn daemon(instance: &str) -> Result<Daemon, pollvisor::DaemonError> {
    let cfg = DaemonConfig::with_instance_id(instance);
    let label = instance.to_string();
    let task = PollerFn::arc(move |d: PollerDescriptor, ctx: CancellationToken| {
        let label = label.clone();
        async move {
            println!("[{label}] polling {}/{}", d.namespace, d.name);
            ctx.cancelled().await;
            println!("[{label}] released {}/{}", d.namespace, d.name);
        }
    });

    Daemon::builder(cfg.clone())
        .with_factory(Arc::new(SpawningFactory::new(task, &cfg)))
        .build()
}

async fn broadcast(feeds: &[EventSender], event: ResourceEvent) {
    for feed in feeds {
        let _ = feed.send(event.clone()).await;
    }
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("pollvisor=info")),
        )
        .with_target(false)
        .init();

    let mut runs = Vec::new();
    let mut feeds = Vec::new();
    for instance in ["blue", "green"] {
        let d = daemon(instance)?;
        let (tx, events) = d.config().event_channel();
        feeds.push(tx);
        runs.push(tokio::spawn(d.run(events)));
    }

    let resources = [
        ("u-1", "db", "blue"),
        ("u-2", "queue", "green"),
        ("u-3", "cache", "blue"),
        ("u-4", "legacy", ""),
    ];
    for (uid, name, owner) in resources {
        let res = ResourceSnapshot::new(uid, name, "default")
            .with_owner(owner)
            .with_backend("vault");
        broadcast(&feeds, ResourceEvent::Added(res)).await;
    }

    tokio::time::sleep(Duration::from_millis(200)).await;
    println!("--> resync");
    broadcast(&feeds, ResourceEvent::DeletedAll).await;
    tokio::time::sleep(Duration::from_millis(200)).await;

    drop(feeds);
    for run in runs {
        run.await??;
    }
    Ok(())
}
