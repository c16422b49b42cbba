//! # Poller tasks (`PollerTask`, `PollerFn`)
//!
//! A [`PollerTask`] is the worker body: given a descriptor and a cancellation token
//! it produces the future that polls the backend until cancelled. Its cadence and
//! fetch logic are its own business.
//!
//! [`PollerFn`] wraps a closure `F: Fn(PollerDescriptor, CancellationToken) -> Fut`,
//! producing a fresh future per poller. Shared state must be captured explicitly
//! (`Arc<...>`) inside the closure.
//!
//! ## Example
//! ```rust
//! use std::time::Duration;
//! use tokio_util::sync::CancellationToken;
//! use pollvisor::{PollerDescriptor, PollerFn, PollerTaskRef};
//!
//! let task: PollerTaskRef = PollerFn::arc(|d: PollerDescriptor, ctx: CancellationToken| async move {
//!     while !ctx.is_cancelled() {
//!         // fetch d.snapshot from its backend and upsert the mirrored secret...
//!         let _ = &d;
//!         tokio::select! {
//!             _ = ctx.cancelled() => break,
//!             _ = tokio::time::sleep(Duration::from_secs(10)) => {}
//!         }
//!     }
//! });
//! # let _ = task;
//! ```

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use tokio_util::sync::CancellationToken;

use crate::resources::PollerDescriptor;

/// Boxed worker future produced by [`PollerTask::spawn`].
pub type BoxPollerFuture = Pin<Box<dyn Future<Output = ()> + Send + 'static>>;

/// Shared reference to a poller task.
pub type PollerTaskRef = Arc<dyn PollerTask>;

/// Worker body run once per poller.
pub trait PollerTask: Send + Sync + 'static {
    /// Builds the worker future for one resource.
    ///
    /// The future should return promptly once `ctx` is cancelled.
    fn spawn(&self, descriptor: PollerDescriptor, ctx: CancellationToken) -> BoxPollerFuture;
}

/// Function-backed poller task.
pub struct PollerFn<F> {
    f: F,
}

impl<F> PollerFn<F> {
    /// Creates a new function-backed task.
    ///
    /// Prefer [`PollerFn::arc`] when you immediately need a [`PollerTaskRef`].
    pub fn new(f: F) -> Self {
        Self { f }
    }

    /// Creates the task and returns it as a shared handle.
    pub fn arc(f: F) -> Arc<Self> {
        Arc::new(Self::new(f))
    }
}

impl<F, Fut> PollerTask for PollerFn<F>
where
    F: Fn(PollerDescriptor, CancellationToken) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = ()> + Send + 'static,
{
    fn spawn(&self, descriptor: PollerDescriptor, ctx: CancellationToken) -> BoxPollerFuture {
        Box::pin((self.f)(descriptor, ctx))
    }
}
