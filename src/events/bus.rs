//! # Event bus carrying operation records out of the core.
//!
//! [`Bus`] is a thin wrapper around [`tokio::sync::broadcast`]: many
//! publishers (one per actor, plus the coordinator), any number of
//! receivers, no blocking on publish.
//!
//! ```text
//! producer-1 ──┐
//! producer-2 ──┼──────► Bus ───────► RunHandle::events() receivers
//! consumer-1 ──┤  (broadcast chan)    └───► subscriber fan-out listener
//! coordinator ─┘
//! ```
//!
//! ## Rules
//! - `publish()` never blocks and never fails; with no receivers the event
//!   is simply dropped.
//! - A receiver only observes events sent **after** it subscribed.
//! - The channel keeps the most recent `capacity` events; a lagging receiver
//!   gets `RecvError::Lagged(n)` and skips the `n` oldest.

use tokio::sync::broadcast;

use super::event::Event;

/// Broadcast channel for runtime events.
///
/// Cheap to clone (the sender is `Arc`-backed internally); every actor holds
/// one.
#[derive(Clone, Debug)]
pub struct Bus {
    tx: broadcast::Sender<Event>,
}

impl Bus {
    /// Creates a bus with the given channel capacity (clamped to a minimum
    /// of 1).
    pub fn new(capacity: usize) -> Self {
        let (tx, _rx) = broadcast::channel(capacity.max(1));
        Self { tx }
    }

    /// Publishes an event to all active receivers.
    pub fn publish(&self, ev: Event) {
        let _ = self.tx.send(ev);
    }

    /// Creates an independent receiver observing subsequent events.
    pub fn subscribe(&self) -> broadcast::Receiver<Event> {
        self.tx.subscribe()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::event::EventKind;

    #[tokio::test]
    async fn test_subscribe_then_receive() {
        let bus = Bus::new(8);
        let mut rx = bus.subscribe();
        bus.publish(Event::now(EventKind::RunStarted));
        let ev = rx.recv().await.unwrap();
        assert_eq!(ev.kind, EventKind::RunStarted);
    }

    #[tokio::test]
    async fn test_publish_without_receivers_is_fine() {
        let bus = Bus::new(8);
        bus.publish(Event::now(EventKind::Paused));
    }

    #[tokio::test]
    async fn test_receiver_misses_prior_events() {
        let bus = Bus::new(8);
        bus.publish(Event::now(EventKind::RunStarted));
        let mut rx = bus.subscribe();
        bus.publish(Event::now(EventKind::Resumed));
        let ev = rx.recv().await.unwrap();
        assert_eq!(ev.kind, EventKind::Resumed);
    }
}
