//! # Non-blocking event fan-out to multiple subscribers.
//!
//! [`SubscriberSet`] gives every subscriber a bounded queue and a dedicated
//! worker task:
//!
//! ```text
//! emit(event)
//!     ├──► [queue 1] ──► worker 1 ──► subscriber1.on_event()
//!     ├──► [queue 2] ──► worker 2 ──► subscriber2.on_event()
//!     └──► [queue N] ──► worker N ──► subscriberN.on_event()
//! ```
//!
//! ## Rules
//! - `emit()` never blocks: full queues drop the event for that subscriber
//!   only, reported as a `SubscriberOverflow` event.
//! - Each subscriber sees events in emission order; there is no ordering
//!   across subscribers.
//! - A panicking subscriber is caught, reported as `SubscriberPanicked`,
//!   and its worker keeps going.
//! - Workers end when the set is dropped (queues close).

use std::panic::AssertUnwindSafe;
use std::sync::Arc;

use futures::FutureExt;
use tokio::sync::mpsc;

use crate::events::{Bus, Event, EventKind};
use crate::subscribers::Subscribe;

/// Per-subscriber queue handle.
struct Channel {
    name: &'static str,
    tx: mpsc::Sender<Arc<Event>>,
}

/// Fan-out coordinator for registered subscribers.
pub struct SubscriberSet {
    channels: Vec<Channel>,
    bus: Bus,
}

impl SubscriberSet {
    /// Creates the set and spawns one worker per subscriber.
    ///
    /// Must be called from within a Tokio runtime.
    pub fn new(subscribers: Vec<Arc<dyn Subscribe>>, bus: Bus) -> Self {
        let mut channels = Vec::with_capacity(subscribers.len());

        for sub in subscribers {
            let name = sub.name();
            let (tx, mut rx) = mpsc::channel::<Arc<Event>>(sub.queue_capacity().max(1));
            let worker_bus = bus.clone();

            tokio::spawn(async move {
                while let Some(ev) = rx.recv().await {
                    let handled = AssertUnwindSafe(sub.on_event(ev.as_ref()))
                        .catch_unwind()
                        .await;
                    if let Err(panic) = handled {
                        let info = panic
                            .downcast_ref::<&str>()
                            .map(|s| (*s).to_string())
                            .or_else(|| panic.downcast_ref::<String>().cloned())
                            .unwrap_or_else(|| "non-string panic payload".to_string());
                        worker_bus.publish(Event::subscriber_panicked(name, info));
                    }
                }
            });

            channels.push(Channel { name, tx });
        }

        Self { channels, bus }
    }

    /// Delivers one event to every subscriber queue without blocking.
    pub fn emit(&self, ev: &Event) {
        let shared = Arc::new(ev.clone());
        for ch in &self.channels {
            if ch.tx.try_send(shared.clone()).is_err() {
                // Never report drops of overflow reports; that would feed
                // the full queue forever.
                if !matches!(ev.kind, EventKind::SubscriberOverflow) {
                    self.bus
                        .publish(Event::subscriber_overflow(ch.name, "queue full"));
                }
            }
        }
    }

    /// Number of registered subscribers.
    pub fn len(&self) -> usize {
        self.channels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.channels.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;
    use tokio::time;

    struct Counter {
        seen: AtomicUsize,
    }

    #[async_trait]
    impl Subscribe for Counter {
        async fn on_event(&self, _event: &Event) {
            self.seen.fetch_add(1, Ordering::SeqCst);
        }
        fn name(&self) -> &'static str {
            "counter"
        }
    }

    struct Bomb;

    #[async_trait]
    impl Subscribe for Bomb {
        async fn on_event(&self, _event: &Event) {
            panic!("boom");
        }
        fn name(&self) -> &'static str {
            "bomb"
        }
    }

    #[tokio::test]
    async fn test_events_reach_every_subscriber() {
        let bus = Bus::new(16);
        let counter = Arc::new(Counter {
            seen: AtomicUsize::new(0),
        });
        let set = SubscriberSet::new(vec![counter.clone() as Arc<dyn Subscribe>], bus.clone());

        for _ in 0..5 {
            set.emit(&Event::now(EventKind::Paused));
        }

        time::sleep(Duration::from_millis(100)).await;
        assert_eq!(counter.seen.load(Ordering::SeqCst), 5);
    }

    #[tokio::test]
    async fn test_panicking_subscriber_is_reported_and_survives() {
        let bus = Bus::new(16);
        let mut rx = bus.subscribe();
        let set = SubscriberSet::new(vec![Arc::new(Bomb) as Arc<dyn Subscribe>], bus.clone());

        set.emit(&Event::now(EventKind::Paused));
        set.emit(&Event::now(EventKind::Resumed));

        let reported = time::timeout(Duration::from_secs(2), async {
            loop {
                if let Ok(ev) = rx.recv().await {
                    if ev.kind == EventKind::SubscriberPanicked {
                        return ev;
                    }
                }
            }
        })
        .await
        .expect("panic report expected");
        assert_eq!(reported.actor.as_deref(), Some("bomb"));
        assert_eq!(set.len(), 1);
    }
}
