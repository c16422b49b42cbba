//! # Channel-backed event source.
//!
//! [`event_channel`] returns a producer half ([`EventSender`]) and a consumer half
//! ([`EventStream`]) that the reconciliation loop pulls from.
//!
//! ```text
//! watch producer ── EventSender::send(ev) ──► mpsc ──► EventStream ──► Daemon::run()
//!                └─ EventSender::fail(e) ───┘                              │
//!                                                       (loop stops) drop ◄┘
//!                                                 EventSender::closed() resolves
//! ```
//!
//! ## Rules
//! - Events are delivered in send order, each exactly once.
//! - When every sender is dropped the stream ends and the loop stops cleanly.
//! - When the loop stops it drops the stream; further sends fail with [`SourceClosed`].

use tokio::sync::mpsc;
use tokio_stream::wrappers::ReceiverStream;

use super::event::ResourceEvent;
use crate::error::{SourceClosed, SourceError};

/// Consumer half of [`event_channel`]; a `Stream` of events or source faults.
pub type EventStream = ReceiverStream<Result<ResourceEvent, SourceError>>;

/// Creates a bounded event source.
///
/// The capacity is clamped to a minimum of 1.
pub fn event_channel(capacity: usize) -> (EventSender, EventStream) {
    let (tx, rx) = mpsc::channel(capacity.max(1));
    (EventSender { tx }, ReceiverStream::new(rx))
}

/// Producer half of [`event_channel`]. Cheap to clone.
#[derive(Clone, Debug)]
pub struct EventSender {
    tx: mpsc::Sender<Result<ResourceEvent, SourceError>>,
}

impl EventSender {
    /// Pushes the next event, waiting while the channel is full.
    pub async fn send(&self, event: ResourceEvent) -> Result<(), SourceClosed> {
        self.tx.send(Ok(event)).await.map_err(|_| SourceClosed)
    }

    /// Reports a fault in place of the next event; the loop treats it as fatal.
    pub async fn fail(&self, err: SourceError) -> Result<(), SourceClosed> {
        self.tx.send(Err(err)).await.map_err(|_| SourceClosed)
    }

    /// True once the consumer has ended the source.
    pub fn is_closed(&self) -> bool {
        self.tx.is_closed()
    }

    /// Completes when the consumer has ended the source.
    pub async fn closed(&self) {
        self.tx.closed().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures::StreamExt;

    #[tokio::test]
    async fn delivers_in_order_then_ends() {
        let (tx, mut rx) = event_channel(4);
        tx.send(ResourceEvent::DeletedAll).await.unwrap();
        tx.send(ResourceEvent::other("X")).await.unwrap();
        drop(tx);

        assert_eq!(rx.next().await, Some(Ok(ResourceEvent::DeletedAll)));
        assert_eq!(rx.next().await, Some(Ok(ResourceEvent::other("X"))));
        assert_eq!(rx.next().await, None);
    }

    #[tokio::test]
    async fn send_after_consumer_dropped_fails() {
        let (tx, rx) = event_channel(0);
        drop(rx);

        assert!(tx.is_closed());
        tx.closed().await;
        assert_eq!(tx.send(ResourceEvent::DeletedAll).await, Err(SourceClosed));
    }
}
