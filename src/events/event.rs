//! # Runtime events emitted by actors and the coordinator.
//!
//! [`EventKind`] classifies events across three categories:
//! - **Operation events**: a committed slot mutation (`Produced`, `Consumed`),
//!   carrying the actor, the slot index, the item, and an exact buffer
//!   snapshot captured under the exclusion section.
//! - **Lifecycle events**: run and actor state (`RunStarted`, `ActorStarted`,
//!   `ActorExited`, `ActorFailed`, `Paused`, `Resumed`).
//! - **Shutdown events**: `ShutdownRequested`, `AllStoppedWithin`,
//!   `GraceExceeded`.
//!
//! ## Ordering guarantees
//! Each event carries a globally unique sequence number (`seq`) that
//! increases monotonically. Events are delivered in emission order per actor
//! and interleave arbitrarily across actors; use `seq` to reconstruct a
//! total publish order.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering as AtomicOrdering};
use std::time::SystemTime;

use crate::buffer::{Applied, Item, ItemKind, Snapshot};

/// Global sequence counter for event ordering.
static EVENT_SEQ: AtomicU64 = AtomicU64::new(0);

/// The side of the buffer an actor works.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActorRole {
    Producer,
    Consumer,
}

impl ActorRole {
    /// Returns a short lowercase name for logs and actor naming.
    pub fn as_str(&self) -> &'static str {
        match self {
            ActorRole::Producer => "producer",
            ActorRole::Consumer => "consumer",
        }
    }
}

/// Classification of runtime events.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventKind {
    /// Buffer built and actor population spawned.
    ///
    /// Sets: `at`, `seq`.
    RunStarted,

    /// An actor entered its loop.
    ///
    /// Sets: `actor`, `role`, `item_kind` (addressable runs), `at`, `seq`.
    ActorStarted,

    /// A producer committed a write.
    ///
    /// Sets: `actor`, `role`, `item_kind` (addressable runs), `slot`,
    /// `item`, `snapshot`, `at`, `seq`.
    Produced,

    /// A consumer committed a read+clear.
    ///
    /// Sets: `actor`, `role`, `item_kind` (addressable runs), `slot`,
    /// `item`, `snapshot`, `at`, `seq`.
    Consumed,

    /// An actor left its loop after observing shutdown or pause teardown.
    ///
    /// Sets: `actor`, `role`, `item_kind` (addressable runs), `at`, `seq`.
    ActorExited,

    /// An actor terminated abnormally (panic caught at the join boundary).
    ///
    /// Sets: `reason`, `at`, `seq`. The exclusion section is never held
    /// across the failure point.
    ActorFailed,

    /// The pause gate closed; actors idle at their next loop check.
    ///
    /// Sets: `at`, `seq`.
    Paused,

    /// The pause gate reopened.
    ///
    /// Sets: `at`, `seq`.
    Resumed,

    /// `stop()` was called; the liveness flag is about to drop.
    ///
    /// Sets: `at`, `seq`.
    ShutdownRequested,

    /// Every actor joined within the grace period.
    ///
    /// Sets: `at`, `seq`.
    AllStoppedWithin,

    /// The grace period elapsed with actors still running.
    ///
    /// Sets: `at`, `seq`.
    GraceExceeded,

    /// A subscriber's queue was full and an event was dropped for it.
    ///
    /// Sets: `actor` (subscriber name), `reason`, `at`, `seq`.
    SubscriberOverflow,

    /// A subscriber panicked while processing an event.
    ///
    /// Sets: `actor` (subscriber name), `reason`, `at`, `seq`.
    SubscriberPanicked,
}

/// Runtime event with optional metadata.
///
/// `seq` and `at` are always set; the remaining fields depend on the
/// [`EventKind`].
#[derive(Debug, Clone)]
pub struct Event {
    /// Globally unique, monotonically increasing sequence number.
    pub seq: u64,
    /// Wall-clock timestamp.
    pub at: SystemTime,
    /// Event classification.
    pub kind: EventKind,

    /// Name of the actor or subscriber, if applicable.
    pub actor: Option<Arc<str>>,
    /// Producer or consumer side.
    pub role: Option<ActorRole>,
    /// The actor's fixed item kind (addressable runs only).
    pub item_kind: Option<ItemKind>,
    /// Index of the mutated slot.
    pub slot: Option<usize>,
    /// The item written or removed.
    pub item: Option<Item>,
    /// Buffer state right after the operation committed.
    pub snapshot: Option<Arc<Snapshot>>,
    /// Human-readable detail (failures, drops).
    pub reason: Option<Arc<str>>,
}

impl Event {
    /// Creates an event of the given kind with the current timestamp and the
    /// next global sequence number.
    pub fn now(kind: EventKind) -> Self {
        Self {
            seq: EVENT_SEQ.fetch_add(1, AtomicOrdering::Relaxed),
            at: SystemTime::now(),
            kind,
            actor: None,
            role: None,
            item_kind: None,
            slot: None,
            item: None,
            snapshot: None,
            reason: None,
        }
    }

    /// Attaches an actor or subscriber name.
    #[inline]
    pub fn with_actor(mut self, actor: impl Into<Arc<str>>) -> Self {
        self.actor = Some(actor.into());
        self
    }

    /// Attaches the actor's role.
    #[inline]
    pub fn with_role(mut self, role: ActorRole) -> Self {
        self.role = Some(role);
        self
    }

    /// Attaches the actor's fixed item kind.
    #[inline]
    pub fn with_item_kind(mut self, kind: ItemKind) -> Self {
        self.item_kind = Some(kind);
        self
    }

    /// Attaches the slot index, item, and snapshot of a committed operation.
    #[inline]
    pub fn with_applied(mut self, applied: Applied) -> Self {
        self.slot = Some(applied.slot);
        self.item = Some(applied.item);
        self.snapshot = Some(Arc::new(applied.snapshot));
        self
    }

    /// Attaches a human-readable reason.
    #[inline]
    pub fn with_reason(mut self, reason: impl Into<Arc<str>>) -> Self {
        self.reason = Some(reason.into());
        self
    }

    /// Creates a subscriber overflow event.
    #[inline]
    pub(crate) fn subscriber_overflow(subscriber: &'static str, reason: &'static str) -> Self {
        Event::now(EventKind::SubscriberOverflow)
            .with_actor(subscriber)
            .with_reason(reason)
    }

    /// Creates a subscriber panic event.
    #[inline]
    pub(crate) fn subscriber_panicked(subscriber: &'static str, info: String) -> Self {
        Event::now(EventKind::SubscriberPanicked)
            .with_actor(subscriber)
            .with_reason(info)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::buffer::Snapshot;

    #[test]
    fn test_seq_is_monotonic() {
        let a = Event::now(EventKind::RunStarted);
        let b = Event::now(EventKind::Paused);
        assert!(b.seq > a.seq);
    }

    #[test]
    fn test_builders_set_fields() {
        let applied = Applied {
            slot: 3,
            item: Item::Symbol('K'),
            snapshot: Snapshot {
                slots: vec![None, None, None, Some(Item::Symbol('K'))],
                filled: 1,
            },
        };
        let ev = Event::now(EventKind::Produced)
            .with_actor("producer-1")
            .with_role(ActorRole::Producer)
            .with_applied(applied);

        assert_eq!(ev.kind, EventKind::Produced);
        assert_eq!(ev.actor.as_deref(), Some("producer-1"));
        assert_eq!(ev.role, Some(ActorRole::Producer));
        assert_eq!(ev.slot, Some(3));
        assert_eq!(ev.item, Some(Item::Symbol('K')));
        assert_eq!(ev.snapshot.unwrap().filled, 1);
    }
}
