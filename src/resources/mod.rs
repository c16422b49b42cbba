//! # Watched resources and the events that describe them.
//!
//! This module provides the data model the reconciliation loop consumes:
//! - [`ResourceId`], [`ResourceSnapshot`] - identity and state of one resource
//! - [`ResourceEvent`] - one lifecycle notification (decodable from watch JSON)
//! - [`PollerDescriptor`], [`PollerIdentity`] - what a poller is built from and labelled with
//! - [`event_channel`] - a bounded, closable event source

mod descriptor;
mod event;
mod snapshot;
mod source;
mod watch;

pub use descriptor::{PollerDescriptor, PollerIdentity};
pub use event::ResourceEvent;
pub use snapshot::{ResourceId, ResourceSnapshot};
pub use source::{EventSender, EventStream, event_channel};
