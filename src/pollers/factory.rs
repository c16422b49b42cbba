//! # Worker lifecycle adapter.
//!
//! [`PollerFactory`] isolates the reconciliation loop from worker internals: it turns
//! a [`PollerDescriptor`] into a started [`Poller`] in one synchronous call.
//!
//! [`SpawningFactory`] is the built-in factory. It validates the backend kind, derives
//! a fresh cancellation token, and spawns the configured [`PollerTask`] on tokio:
//!
//! ```text
//! create(descriptor)
//!   ├─► backend_kind empty / not allowed  → PollerError::Creation
//!   ├─► no tokio runtime                  → PollerError::Creation
//!   └─► token = CancellationToken::new()
//!       task.spawn(descriptor, token)     → PollerHandle (worker scheduled, not awaited)
//! ```

use std::collections::BTreeSet;
use std::time::Duration;

use tokio_util::sync::CancellationToken;

use crate::core::DaemonConfig;
use crate::error::PollerError;
use crate::resources::PollerDescriptor;

use super::handle::{Poller, PollerHandle};
use super::task::PollerTaskRef;

/// Creates and starts pollers.
pub trait PollerFactory: Send + Sync + 'static {
    /// Constructs and schedules a worker for `descriptor`.
    ///
    /// Returns once the worker is scheduled; never waits for its first fetch.
    fn create(&self, descriptor: PollerDescriptor) -> Result<Box<dyn Poller>, PollerError>;
}

/// Factory spawning a [`PollerTask`](super::PollerTask) per resource on tokio.
pub struct SpawningFactory {
    task: PollerTaskRef,
    backends: BTreeSet<String>,
    stop_timeout: Duration,
}

impl SpawningFactory {
    /// Creates a factory that accepts any non-empty backend kind.
    ///
    /// Handles inherit `cfg.stop_timeout` as their stop bound.
    pub fn new(task: PollerTaskRef, cfg: &DaemonConfig) -> Self {
        Self {
            task,
            backends: BTreeSet::new(),
            stop_timeout: cfg.stop_timeout_clamped(),
        }
    }

    /// Restricts the backend kinds this factory builds pollers for.
    pub fn with_backends<I, S>(mut self, backends: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.backends = backends.into_iter().map(Into::into).collect();
        self
    }

    /// Overrides the stop bound handed to new handles.
    pub fn with_stop_timeout(mut self, stop_timeout: Duration) -> Self {
        self.stop_timeout = stop_timeout;
        self
    }

    fn check_backend(&self, descriptor: &PollerDescriptor) -> Result<(), PollerError> {
        let backend = descriptor.snapshot.backend_kind();
        let reason = if backend.is_empty() {
            "no backend type".to_string()
        } else if !self.backends.is_empty() && !self.backends.contains(backend) {
            format!("unknown backend type {backend:?}")
        } else {
            return Ok(());
        };

        Err(PollerError::Creation {
            id: descriptor.id.clone(),
            reason,
        })
    }
}

impl PollerFactory for SpawningFactory {
    fn create(&self, descriptor: PollerDescriptor) -> Result<Box<dyn Poller>, PollerError> {
        self.check_backend(&descriptor)?;
        if tokio::runtime::Handle::try_current().is_err() {
            return Err(PollerError::Creation {
                id: descriptor.id.clone(),
                reason: "no tokio runtime".to_string(),
            });
        }

        let token = CancellationToken::new();
        let worker = self.task.spawn(descriptor.clone(), token.clone());
        let handle = PollerHandle::spawn(&descriptor, token, self.stop_timeout, worker);
        Ok(Box::new(handle))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Arc, Mutex};

    use crate::pollers::PollerFn;
    use crate::resources::{PollerIdentity, ResourceSnapshot};

    fn descriptor(backend: &str) -> PollerDescriptor {
        PollerDescriptor::from_snapshot(
            &ResourceSnapshot::new("uid-1", "db", "prod").with_backend(backend),
        )
    }

    fn idle_task() -> PollerTaskRef {
        PollerFn::arc(|_d: PollerDescriptor, ctx: CancellationToken| async move {
            ctx.cancelled().await;
        })
    }

    #[tokio::test]
    async fn spawns_worker_with_descriptor() {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&seen);
        let task = PollerFn::arc(move |d: PollerDescriptor, ctx: CancellationToken| {
            let sink = Arc::clone(&sink);
            async move {
                sink.lock().unwrap().push(d.name.clone());
                ctx.cancelled().await;
            }
        });
        let factory = SpawningFactory::new(task, &DaemonConfig::default());

        let mut poller = factory.create(descriptor("vault")).unwrap();
        assert_eq!(poller.identity(), &PollerIdentity::new("db", "prod", "vault"));

        tokio::task::yield_now().await;
        assert_eq!(*seen.lock().unwrap(), vec!["db".to_string()]);
        poller.stop().await.unwrap();
    }

    #[tokio::test]
    async fn rejects_missing_backend() {
        let factory = SpawningFactory::new(idle_task(), &DaemonConfig::default());
        let err = factory.create(descriptor("")).err().unwrap();
        assert_eq!(err.as_label(), "poller_creation_failed");
    }

    #[tokio::test]
    async fn rejects_backend_outside_allow_list() {
        let factory = SpawningFactory::new(idle_task(), &DaemonConfig::default())
            .with_backends(["vault", "secretsManager"]);

        assert!(factory.create(descriptor("gcpSecretsManager")).is_err());
        let mut ok = factory.create(descriptor("vault")).unwrap();
        ok.stop().await.unwrap();
    }

    #[test]
    fn fails_outside_runtime() {
        let factory = SpawningFactory::new(idle_task(), &DaemonConfig::default());
        let err = factory.create(descriptor("vault")).err().unwrap();
        assert!(err.to_string().contains("no tokio runtime"));
    }
}
