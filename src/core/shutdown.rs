//! # Shutdown coordination.
//!
//! [`ShutdownHandle`] is the external control surface of a running [`Daemon`](crate::Daemon).
//! It never touches the poller table itself: `stop()` cancels the loop's token, and
//! the loop (the table's only owner) removes every poller and ends the event source.
//!
//! ```text
//! ShutdownHandle::stop()
//!   ├─► state = Stopping                 (if still Running)
//!   └─► token.cancel()
//!         └─► Daemon::run() wakes at its next-event wait
//!               ├─► PollerTable::remove_all()
//!               ├─► drop(event stream)      → source ended
//!               └─► state = Stopped         → ShutdownHandle::stopped() resolves
//! ```
//!
//! ## Signals
//! [`ShutdownHandle::stop_on_signal`] wires OS termination signals to `stop()`:
//!
//! **Unix platforms:** `SIGINT`, `SIGTERM`, `SIGQUIT`
//!
//! **Windows platforms:** `Ctrl-C` via [`tokio::signal::ctrl_c`]

use std::sync::{Arc, Weak};

use tokio::sync::watch;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use super::state::DaemonState;

/// Cloneable handle that stops a daemon and observes its state.
#[derive(Clone, Debug)]
pub struct ShutdownHandle {
    token: CancellationToken,
    state: watch::Receiver<DaemonState>,
    publisher: Weak<watch::Sender<DaemonState>>,
}

impl ShutdownHandle {
    pub(crate) fn new(
        token: CancellationToken,
        publisher: &Arc<watch::Sender<DaemonState>>,
    ) -> Self {
        Self {
            token,
            state: publisher.subscribe(),
            publisher: Arc::downgrade(publisher),
        }
    }

    pub(crate) fn token(&self) -> &CancellationToken {
        &self.token
    }

    /// Requests shutdown and moves a running daemon to [`DaemonState::Stopping`].
    ///
    /// Safe to call any number of times, from any task, including while an event
    /// is being reconciled; calls after the first are no-ops. An event already being
    /// reconciled completes; queued events are not applied.
    pub fn stop(&self) {
        if !self.token.is_cancelled() {
            info!("daemon stop requested");
        }
        if let Some(publisher) = self.publisher.upgrade() {
            publisher.send_if_modified(|state| {
                let running = *state == DaemonState::Running;
                if running {
                    *state = DaemonState::Stopping;
                }
                running
            });
        }
        self.token.cancel();
    }

    /// True once [`stop`](Self::stop) was called or the loop exited.
    pub fn is_stop_requested(&self) -> bool {
        self.token.is_cancelled()
    }

    /// Current lifecycle state.
    pub fn state(&self) -> DaemonState {
        *self.state.borrow()
    }

    /// Completes once the daemon reached [`DaemonState::Stopped`].
    ///
    /// Also completes if the daemon was dropped without running.
    pub async fn stopped(&self) {
        let mut state = self.state.clone();
        let _ = state.wait_for(|s| *s == DaemonState::Stopped).await;
    }

    /// Spawns a watcher that calls [`stop`](Self::stop) on the first termination signal.
    ///
    /// The watcher exits on its own once the daemon stops for any other reason.
    pub fn stop_on_signal(&self) -> tokio::task::JoinHandle<()> {
        let handle = self.clone();
        tokio::spawn(async move {
            tokio::select! {
                res = wait_for_shutdown_signal() => match res {
                    Ok(()) => {
                        info!("termination signal received");
                        handle.stop();
                    }
                    Err(err) => warn!(error = %err, "failed to install signal handlers"),
                },
                _ = handle.token.cancelled() => {}
            }
        })
    }
}

/// Waits for a termination signal.
///
/// Returns `Ok(())` when any signal is received, or `Err` if signal registration fails.
#[cfg(unix)]
pub async fn wait_for_shutdown_signal() -> std::io::Result<()> {
    use tokio::signal::unix::{SignalKind, signal};

    let mut sigint = signal(SignalKind::interrupt())?;
    let mut sigterm = signal(SignalKind::terminate())?;
    let mut sigquit = signal(SignalKind::quit())?;

    tokio::select! {
        _ = sigint.recv()  => {},
        _ = sigterm.recv() => {},
        _ = sigquit.recv() => {},
    }
    Ok(())
}

/// Waits for a termination signal.
///
/// Returns `Ok(())` when any signal is received, or `Err` if signal registration fails.
#[cfg(not(unix))]
pub async fn wait_for_shutdown_signal() -> std::io::Result<()> {
    tokio::signal::ctrl_c().await
}

#[cfg(test)]
mod tests {
    use super::*;

    fn handle() -> (ShutdownHandle, Arc<watch::Sender<DaemonState>>) {
        let tx = Arc::new(watch::Sender::new(DaemonState::Running));
        (ShutdownHandle::new(CancellationToken::new(), &tx), tx)
    }

    #[test]
    fn stop_is_idempotent() {
        let (h, _tx) = handle();
        assert!(!h.is_stop_requested());
        h.stop();
        h.stop();
        assert!(h.is_stop_requested());
        assert!(h.clone().is_stop_requested());
    }

    #[test]
    fn stop_publishes_stopping_once() {
        let (h, tx) = handle();
        assert_eq!(h.state(), DaemonState::Running);

        h.stop();
        assert_eq!(h.state(), DaemonState::Stopping);

        tx.send_replace(DaemonState::Stopped);
        h.stop();
        assert_eq!(h.state(), DaemonState::Stopped);
    }

    #[test]
    fn stop_after_daemon_dropped_only_cancels() {
        let (h, tx) = handle();
        drop(tx);
        h.stop();
        assert!(h.is_stop_requested());
        assert_eq!(h.state(), DaemonState::Running);
    }

    #[tokio::test]
    async fn stopped_waits_for_terminal_state() {
        let (h, tx) = handle();
        tx.send_replace(DaemonState::Stopping);
        assert_eq!(h.state(), DaemonState::Stopping);

        let waiter = tokio::spawn({
            let h = h.clone();
            async move { h.stopped().await }
        });
        tx.send_replace(DaemonState::Stopped);
        waiter.await.unwrap();
        assert_eq!(h.state(), DaemonState::Stopped);
    }

    #[tokio::test]
    async fn stopped_resolves_when_daemon_dropped() {
        let (h, tx) = handle();
        drop(tx);
        h.stopped().await;
    }

    #[tokio::test]
    async fn signal_watcher_exits_with_daemon() {
        let (h, _tx) = handle();
        let watcher = h.stop_on_signal();
        h.stop();
        watcher.await.unwrap();
    }
}
