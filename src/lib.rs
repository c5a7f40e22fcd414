//! # slotvisor
//!
//! **Slotvisor** is a simulation core for the classic bounded-buffer
//! producer/consumer problem: a fixed-capacity buffer shared by independent
//! actors, coordinated through one exclusion section per buffer and
//! slot-availability signaling, with an event stream for front ends to
//! render.
//!
//! It exists so that presentation layers (GUIs, TUIs, teaching harnesses)
//! can stay dumb: they submit a [`SimConfig`], receive a [`RunHandle`], and
//! draw whatever arrives on the event stream.
//!
//! ## Architecture
//! ```text
//!     SimConfig ──► Coordinator::start()
//!                        │
//!          ┌─────────────┴───────────────────────────┐
//!          ▼                                         ▼
//!   FifoBuffer | AddressableBuffer          producer-1 .. producer-N
//!   (slots, exclusion section,              consumer-1 .. consumer-M
//!    availability signals,                   (one task per actor)
//!    liveness flag)                                  │
//!          ▲            produce/consume              │
//!          └─────────────────────────────────────────┤
//!                                                    │ publish(Event)
//!                                                    ▼
//!                                            Bus (broadcast)
//!                                     ┌──────────┴──────────┐
//!                                     ▼                     ▼
//!                          RunHandle::events()      fan-out listener
//!                          (front-end stream)               │
//!                                                   ┌───────┴───────┐
//!                                                   ▼               ▼
//!                                              LogWriter       TallyTracker
//! ```
//!
//! ## Disciplines
//! - [`Discipline::Fifo`] — one circular buffer, shared head/tail cursors,
//!   strict FIFO ordering, counting-semaphore signaling. Producers enqueue
//!   alphabetic symbols drawn to avoid what is already buffered (a
//!   best-effort hint, not a uniqueness guarantee).
//! - [`Discipline::Addressable`] — slots targeted by index, orange/apple
//!   actor pairs, per-attempt wait-class conditioning. No cross-actor
//!   ordering or fairness; random addressing can starve slots. That
//!   weakness is part of the discipline and stays visible.
//!
//! ## Liveness rules
//! - Blocked actors sleep; nothing busy-waits. Every wait is bounded by the
//!   configured acquire timeout so a shutdown request is observed within
//!   one tick even if no slot ever frees up.
//! - `stop()` is idempotent, wakes every waiter, and joins actors within a
//!   grace period.
//! - `pause()` parks actors at a gate *before* any acquire; a paused actor
//!   holds no locks and no permits, so pausing cannot deadlock a run.
//!
//! ## Example
//! ```rust
//! use slotvisor::{Coordinator, Discipline, SimConfig};
//! use std::time::Duration;
//!
//! #[tokio::main(flavor = "current_thread")]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let cfg = SimConfig {
//!         discipline: Discipline::Fifo,
//!         capacity: 8,
//!         producers: 2,
//!         consumers: 1,
//!         production_rate_hz: 20.0,
//!         consumption_rate_hz: 20.0,
//!         ..SimConfig::default()
//!     };
//!
//!     let handle = Coordinator::new(cfg).start()?;
//!     let mut events = handle.events();
//!
//!     tokio::time::sleep(Duration::from_millis(200)).await;
//!     while let Ok(ev) = events.try_recv() {
//!         if let Some(snapshot) = &ev.snapshot {
//!             println!("{:?} -> {snapshot}", ev.kind);
//!         }
//!     }
//!
//!     handle.stop().await?;
//!     Ok(())
//! }
//! ```

mod actors;
mod buffer;
mod config;
mod core;
mod error;
mod events;
mod subscribers;

// ---- Public re-exports ----

pub use buffer::{AddressableBuffer, Applied, FifoBuffer, Item, ItemKind, Snapshot};
pub use config::{Discipline, SimConfig};
pub use core::{Coordinator, RunHandle};
pub use error::{BufferError, ConfigError, RuntimeError};
pub use events::{ActorRole, Bus, Event, EventKind};
pub use subscribers::{LogWriter, Subscribe, SubscriberSet, Tallies, TallyTracker};
