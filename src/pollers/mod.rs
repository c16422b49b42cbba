//! # Pollers: handles, factories and the table that owns them.
//!
//! - [`Poller`] - stop + identity contract every worker handle fulfils
//! - [`PollerHandle`] - tokio task + cancellation token implementation
//! - [`PollerTask`], [`PollerFn`] - the worker body run by a poller
//! - [`PollerFactory`], [`SpawningFactory`] - worker lifecycle adapter
//! - `PollerTable` - registry owned by the reconciliation loop (crate-internal)

mod factory;
mod handle;
mod table;
mod task;

pub use factory::{PollerFactory, SpawningFactory};
pub use handle::{Poller, PollerHandle};
pub(crate) use table::PollerTable;
pub use task::{BoxPollerFuture, PollerFn, PollerTask, PollerTaskRef};
