use std::sync::Arc;

use tokio::sync::watch;
use tokio_util::sync::CancellationToken;

use super::{
    config::DaemonConfig, daemon::Daemon, shutdown::ShutdownHandle, state::DaemonState,
};
use crate::{
    error::DaemonError,
    metrics::{MetricsSink, NoopMetrics},
    pollers::PollerFactory,
};

/// Builder for constructing a [`Daemon`].
pub struct DaemonBuilder {
    cfg: DaemonConfig,
    factory: Option<Arc<dyn PollerFactory>>,
    metrics: Arc<dyn MetricsSink>,
}

impl DaemonBuilder {
    /// Creates a new builder with the given configuration.
    pub fn new(cfg: DaemonConfig) -> Self {
        Self {
            cfg,
            factory: None,
            metrics: Arc::new(NoopMetrics),
        }
    }

    /// Sets the factory that creates one poller per managed resource. Required.
    pub fn with_factory(mut self, factory: Arc<dyn PollerFactory>) -> Self {
        self.factory = Some(factory);
        self
    }

    /// Sets the sink notified when a tracked resource is deleted.
    ///
    /// Defaults to [`NoopMetrics`].
    pub fn with_metrics(mut self, metrics: Arc<dyn MetricsSink>) -> Self {
        self.metrics = metrics;
        self
    }

    /// Builds the daemon.
    ///
    /// Fails with [`DaemonError::MissingFactory`] if no factory was set.
    pub fn build(self) -> Result<Daemon, DaemonError> {
        let factory = self.factory.ok_or(DaemonError::MissingFactory)?;
        let state_tx = Arc::new(watch::Sender::new(DaemonState::Running));
        let shutdown = ShutdownHandle::new(CancellationToken::new(), &state_tx);

        Ok(Daemon::new_internal(
            self.cfg,
            factory,
            self.metrics,
            shutdown,
            state_tx,
        ))
    }
}
