//! # Producer and consumer actor loops.
//!
//! One async task per actor, all sharing the run's buffer by `Arc`. Every
//! loop follows the same shape:
//!
//! ```text
//! loop {
//!   ├─► check cancellation token
//!   ├─► wait at the pause gate (holds nothing while parked)
//!   ├─► pick a target (FIFO: next cursor; addressable: random slot)
//!   ├─► bounded blocking acquire + mutate one slot under exclusion
//!   ├─► publish Produced/Consumed with the exact post-op snapshot
//!   └─► jittered rate-controlled sleep
//! }
//! ```
//!
//! Shutdown is observed at every parked point: the cancellation token covers
//! gate waits and pacer sleeps, and the buffer resolves blocked acquires
//! with `ShuttingDown`. An actor exits without emitting a final write.

mod consumer;
mod pacing;
mod producer;

pub(crate) use consumer::{FifoConsumer, SlotConsumer};
pub(crate) use pacing::Pacer;
pub(crate) use producer::{FifoProducer, SlotProducer};

use std::sync::Arc;

use crate::buffer::ItemKind;
use crate::events::{ActorRole, Event, EventKind};

/// Builds a lifecycle/operation event stamped with the actor's identity.
fn actor_event(
    kind: EventKind,
    name: &Arc<str>,
    role: ActorRole,
    item_kind: Option<ItemKind>,
) -> Event {
    let mut ev = Event::now(kind).with_actor(name.clone()).with_role(role);
    if let Some(k) = item_kind {
        ev = ev.with_item_kind(k);
    }
    ev
}
