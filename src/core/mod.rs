//! Runtime core: the reconciliation loop and its lifecycle.
//!
//! Internal modules:
//! - [`daemon`]: consumes resource events and keeps one poller per managed resource;
//! - [`builder`]: assembles a daemon from config, factory and metrics sink;
//! - [`config`]: daemon-wide settings;
//! - [`shutdown`]: stop handle and cross-platform signal handling;
//! - [`state`]: daemon lifecycle states.

mod builder;
mod config;
mod daemon;
mod shutdown;
mod state;

pub use builder::DaemonBuilder;
pub use config::DaemonConfig;
pub use daemon::Daemon;
pub use shutdown::{ShutdownHandle, wait_for_shutdown_signal};
pub use state::DaemonState;
