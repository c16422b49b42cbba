/// Lifecycle state of a [`Daemon`](crate::Daemon).
///
/// ```text
/// Running ──(stream ended | source fault | stop())──► Stopping ──(pollers removed)──► Stopped
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DaemonState {
    /// Consuming events.
    Running,
    /// Shutdown initiated; pollers are being removed.
    Stopping,
    /// Terminal; no poller is left and the event source has been ended.
    Stopped,
}

impl DaemonState {
    /// Returns a short stable label for logs.
    pub fn as_label(&self) -> &'static str {
        match self {
            DaemonState::Running => "running",
            DaemonState::Stopping => "stopping",
            DaemonState::Stopped => "stopped",
        }
    }
}
