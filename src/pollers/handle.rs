//! # Poller handles.
//!
//! A [`Poller`] is the only thing the reconciliation loop keeps of a running worker:
//! a way to stop it and the identity it was started with.
//!
//! [`PollerHandle`] is the tokio-backed implementation handed out by
//! [`SpawningFactory`](crate::SpawningFactory):
//!
//! ```text
//! PollerHandle
//!   ├─ cancel: CancellationToken   (observed by the worker future)
//!   ├─ join:   JoinHandle<()>      (the spawned worker)
//!   └─ identity: {name, namespace, backend_kind}
//!
//! stop():
//!   cancel.cancel()
//!   timeout(stop_timeout, join)
//!     ├─ Ok(())        → Ok
//!     ├─ JoinError     → Panicked (panic) / Ok (aborted elsewhere)
//!     └─ elapsed       → join.abort(), StopTimeout
//! ```
//!
//! ## Rules
//! - `stop()` is idempotent: the second call returns `Ok(())` immediately.
//! - `stop()` never waits longer than the configured bound.
//! - Dropping a handle cancels the worker and aborts it if it was never joined.

use std::future::Future;
use std::time::Duration;

use async_trait::async_trait;
use tokio::{task::JoinHandle, time};
use tokio_util::sync::CancellationToken;

use crate::error::PollerError;
use crate::resources::{PollerDescriptor, PollerIdentity, ResourceId};

/// Handle to one running poller, owned by its table entry.
#[async_trait]
pub trait Poller: Send + Sync + 'static {
    /// Resource the poller mirrors.
    fn id(&self) -> &ResourceId;

    /// `{name, namespace, backend_kind}` the poller was started with.
    fn identity(&self) -> &PollerIdentity;

    /// Stops the poller. Idempotent and bounded.
    async fn stop(&mut self) -> Result<(), PollerError>;
}

/// Poller running as a tokio task with its own cancellation token.
#[derive(Debug)]
pub struct PollerHandle {
    id: ResourceId,
    identity: PollerIdentity,
    cancel: CancellationToken,
    join: Option<JoinHandle<()>>,
    stop_timeout: Duration,
}

impl PollerHandle {
    /// Spawns `worker` on the current tokio runtime.
    ///
    /// `cancel` must be the token `worker` observes; `stop()` cancels it and waits
    /// for the task at most `stop_timeout`.
    pub fn spawn<F>(
        descriptor: &PollerDescriptor,
        cancel: CancellationToken,
        stop_timeout: Duration,
        worker: F,
    ) -> Self
    where
        F: Future<Output = ()> + Send + 'static,
    {
        Self {
            id: descriptor.id.clone(),
            identity: descriptor.identity(),
            cancel,
            join: Some(tokio::spawn(worker)),
            stop_timeout,
        }
    }

    /// True once the worker task has exited (or was already stopped).
    pub fn is_finished(&self) -> bool {
        self.join.as_ref().is_none_or(JoinHandle::is_finished)
    }
}

#[async_trait]
impl Poller for PollerHandle {
    fn id(&self) -> &ResourceId {
        &self.id
    }

    fn identity(&self) -> &PollerIdentity {
        &self.identity
    }

    async fn stop(&mut self) -> Result<(), PollerError> {
        self.cancel.cancel();

        let outcome = match self.join.as_mut() {
            Some(join) => time::timeout(self.stop_timeout, join).await,
            None => return Ok(()),
        };
        let join = self.join.take();

        match outcome {
            Ok(Ok(())) => Ok(()),
            Ok(Err(e)) if e.is_panic() => Err(PollerError::Panicked {
                id: self.id.clone(),
            }),
            Ok(Err(_aborted)) => Ok(()),
            Err(_elapsed) => {
                if let Some(join) = join {
                    join.abort();
                }
                Err(PollerError::StopTimeout {
                    id: self.id.clone(),
                    timeout: self.stop_timeout,
                })
            }
        }
    }
}

impl Drop for PollerHandle {
    fn drop(&mut self) {
        self.cancel.cancel();
        if let Some(join) = self.join.take() {
            join.abort();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resources::ResourceSnapshot;

    fn descriptor() -> PollerDescriptor {
        PollerDescriptor::from_snapshot(
            &ResourceSnapshot::new("uid-1", "db", "prod").with_backend("vault"),
        )
    }

    #[tokio::test]
    async fn stop_cancels_cooperative_worker() {
        let token = CancellationToken::new();
        let ctx = token.clone();
        let mut h = PollerHandle::spawn(&descriptor(), token, Duration::from_secs(1), async move {
            ctx.cancelled().await;
        });

        assert_eq!(h.identity(), &PollerIdentity::new("db", "prod", "vault"));
        assert_eq!(h.id().as_str(), "uid-1");
        h.stop().await.unwrap();
        assert!(h.is_finished());
    }

    #[tokio::test]
    async fn second_stop_is_noop() {
        let token = CancellationToken::new();
        let ctx = token.clone();
        let mut h = PollerHandle::spawn(&descriptor(), token, Duration::from_secs(1), async move {
            ctx.cancelled().await;
        });

        h.stop().await.unwrap();
        h.stop().await.unwrap();
    }

    #[tokio::test(start_paused = true)]
    async fn unresponsive_worker_times_out() {
        let mut h = PollerHandle::spawn(
            &descriptor(),
            CancellationToken::new(),
            Duration::from_millis(50),
            std::future::pending::<()>(),
        );

        let err = h.stop().await.unwrap_err();
        assert_eq!(err.as_label(), "poller_stop_timeout");
        assert!(h.stop().await.is_ok());
    }

    #[tokio::test]
    async fn panicked_worker_is_reported() {
        let mut h = PollerHandle::spawn(
            &descriptor(),
            CancellationToken::new(),
            Duration::from_secs(1),
            async {
                panic!("backend exploded");
            },
        );

        let err = h.stop().await.unwrap_err();
        assert_eq!(err.as_label(), "poller_panicked");
    }

    #[tokio::test]
    async fn self_terminated_worker_stops_cleanly() {
        let mut h = PollerHandle::spawn(
            &descriptor(),
            CancellationToken::new(),
            Duration::from_secs(1),
            async {},
        );
        tokio::task::yield_now().await;

        assert!(h.stop().await.is_ok());
    }
}
