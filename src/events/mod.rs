//! # Observer channel: event records and the broadcast bus.

mod bus;
mod event;

pub use bus::Bus;
pub use event::{ActorRole, Event, EventKind};
