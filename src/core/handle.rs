//! # Run handle: the live side of a started simulation.
//!
//! [`RunHandle`] is what [`Coordinator::start`](crate::Coordinator::start)
//! returns. It owns the actor join set, the pause gate, the cancellation
//! token, and the buffer, and exposes the control surface a front end needs:
//! `stop()`, `pause()`/`resume()`, `events()`, `snapshot()`, `tallies()`.
//!
//! ## Shutdown path
//! ```text
//! stop()
//!   ├─► publish ShutdownRequested
//!   ├─► buffer.close()        → liveness flag drops, all waiters wake
//!   ├─► token.cancel()        → gate waits and pacer sleeps resolve
//!   └─► join actors with grace:
//!         ├─ all joined  → publish AllStoppedWithin, Ok(())
//!         └─ grace over  → publish GraceExceeded,
//!                          Err(RuntimeError::GraceExceeded { stuck })
//! ```
//!
//! Dropping the handle without `stop()` aborts the actor tasks. Aborts only
//! land at await points and the exclusion sections never await, so even
//! that path cannot tear a slot mid-mutation.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use tokio::sync::{Mutex, broadcast};
use tokio::task::JoinSet;
use tokio::time;
use tokio_util::sync::CancellationToken;

use crate::buffer::{AddressableBuffer, FifoBuffer, Snapshot};
use crate::core::gate::PauseGate;
use crate::error::RuntimeError;
use crate::events::{Bus, Event, EventKind};
use crate::subscribers::{SubscriberSet, Tallies, TallyTracker};

/// The buffer a run coordinates on, behind its discipline.
pub(crate) enum RunBuffer {
    Fifo(Arc<FifoBuffer>),
    Addressable(Arc<AddressableBuffer>),
}

impl RunBuffer {
    fn close(&self) {
        match self {
            RunBuffer::Fifo(buf) => buf.close(),
            RunBuffer::Addressable(buf) => buf.close(),
        }
    }

    fn snapshot(&self) -> Snapshot {
        match self {
            RunBuffer::Fifo(buf) => buf.snapshot(),
            RunBuffer::Addressable(buf) => buf.snapshot(),
        }
    }
}

/// Control handle for one running simulation.
pub struct RunHandle {
    pub(crate) bus: Bus,
    pub(crate) gate: PauseGate,
    pub(crate) token: CancellationToken,
    pub(crate) buffer: RunBuffer,
    pub(crate) actors: Mutex<JoinSet<()>>,
    pub(crate) stopped: AtomicBool,
    pub(crate) tally: Arc<TallyTracker>,
    /// Keeps the fan-out workers alive for the run's duration.
    pub(crate) subscribers: Arc<SubscriberSet>,
    pub(crate) grace: Duration,
}

impl std::fmt::Debug for RunHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RunHandle")
            .field("stopped", &self.stopped)
            .field("grace", &self.grace)
            .finish_non_exhaustive()
    }
}

impl RunHandle {
    /// Creates a receiver over the run's event stream.
    ///
    /// The stream is lazy and non-restartable: a receiver only observes
    /// events published after this call. Events arrive in emission order
    /// per actor and interleave arbitrarily across actors.
    pub fn events(&self) -> broadcast::Receiver<Event> {
        self.bus.subscribe()
    }

    /// Diagnostic copy of the buffer's visible state, taken under the same
    /// exclusion section as mutation.
    pub fn snapshot(&self) -> Snapshot {
        self.buffer.snapshot()
    }

    /// Running produced/consumed totals.
    ///
    /// Totals lag publication by the subscriber queue; they are exact once
    /// the run is quiescent.
    pub fn tallies(&self) -> Tallies {
        self.tally.totals()
    }

    /// Closes the pause gate. Idempotent; publishes `Paused` only on the
    /// open → closed transition. Paused actors hold no locks or permits.
    pub fn pause(&self) {
        if self.gate.pause() {
            self.bus.publish(Event::now(EventKind::Paused));
        }
    }

    /// Reopens the pause gate. Idempotent; publishes `Resumed` only on the
    /// closed → open transition.
    pub fn resume(&self) {
        if self.gate.resume() {
            self.bus.publish(Event::now(EventKind::Resumed));
        }
    }

    pub fn is_paused(&self) -> bool {
        self.gate.is_paused()
    }

    /// Whether `stop()` has been called.
    pub fn is_stopped(&self) -> bool {
        self.stopped.load(Ordering::SeqCst)
    }

    /// Stops the run: drops the liveness flag, wakes every blocked actor,
    /// and joins them within the configured grace.
    ///
    /// Idempotent: the second call is a no-op returning `Ok(())`. An actor
    /// panic surfaces as an `ActorFailed` event, not as an error here;
    /// the only error is [`RuntimeError::GraceExceeded`].
    pub async fn stop(&self) -> Result<(), RuntimeError> {
        if self.stopped.swap(true, Ordering::SeqCst) {
            return Ok(());
        }

        self.bus.publish(Event::now(EventKind::ShutdownRequested));
        self.buffer.close();
        self.token.cancel();

        let mut actors = self.actors.lock().await;
        let drain = async {
            while let Some(joined) = actors.join_next().await {
                if let Err(err) = joined {
                    if err.is_panic() {
                        self.bus.publish(
                            Event::now(EventKind::ActorFailed)
                                .with_reason(format!("actor panicked: {err}")),
                        );
                    }
                }
            }
        };

        match time::timeout(self.grace, drain).await {
            Ok(()) => {
                self.bus.publish(Event::now(EventKind::AllStoppedWithin));
                Ok(())
            }
            Err(_) => {
                self.bus.publish(Event::now(EventKind::GraceExceeded));
                Err(RuntimeError::GraceExceeded {
                    grace: self.grace,
                    stuck: self.tally.alive_actors(),
                })
            }
        }
    }

    /// Number of registered subscribers (including the built-in tracker).
    pub fn subscriber_count(&self) -> usize {
        self.subscribers.len()
    }
}
