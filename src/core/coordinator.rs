//! # Coordinator: builds a run and spawns its actor population.
//!
//! The [`Coordinator`] validates a [`SimConfig`], constructs exactly one
//! buffer for the run, wires the event bus and subscriber fan-out, spawns
//! the configured producers and consumers into a `JoinSet`, and hands back
//! a [`RunHandle`].
//!
//! ```text
//! Coordinator::start(config)
//!   ├─► config.validate()                 (nothing spawned on error)
//!   ├─► Bus + SubscriberSet + listener    (TallyTracker always included)
//!   ├─► build FifoBuffer | AddressableBuffer
//!   ├─► spawn producer-1..N, consumer-1..M (child token each)
//!   ├─► publish RunStarted
//!   └─► RunHandle { stop / pause / resume / events / snapshot }
//! ```
//!
//! In addressable runs, actors alternate item kinds by index (orange,
//! apple, orange, ...) so both kinds get producer/consumer coverage, the
//! way the dual-resource setup pairs them.

use std::sync::Arc;
use std::sync::atomic::AtomicBool;

use tokio::sync::{Mutex, broadcast::error::RecvError};
use tokio::task::JoinSet;
use tokio_util::sync::CancellationToken;

use crate::actors::{FifoConsumer, FifoProducer, Pacer, SlotConsumer, SlotProducer};
use crate::buffer::{AddressableBuffer, FifoBuffer, ItemKind};
use crate::config::{Discipline, SimConfig};
use crate::core::gate::PauseGate;
use crate::core::handle::{RunBuffer, RunHandle};
use crate::error::ConfigError;
use crate::events::{Bus, Event, EventKind};
use crate::subscribers::{Subscribe, SubscriberSet, TallyTracker};

/// Builds and starts simulation runs.
pub struct Coordinator {
    config: SimConfig,
    subscribers: Vec<Arc<dyn Subscribe>>,
}

impl Coordinator {
    pub fn new(config: SimConfig) -> Self {
        Self {
            config,
            subscribers: Vec::new(),
        }
    }

    /// Registers a subscriber; it observes every event of the run started
    /// by [`start`](Self::start).
    pub fn with_subscriber(mut self, subscriber: Arc<dyn Subscribe>) -> Self {
        self.subscribers.push(subscriber);
        self
    }

    /// Validates the configuration and starts a run.
    ///
    /// Must be called from within a Tokio runtime. On `Err` nothing was
    /// spawned and no buffer exists.
    pub fn start(self) -> Result<RunHandle, ConfigError> {
        self.config.validate()?;
        let cfg = self.config;

        let bus = Bus::new(cfg.bus_capacity);
        let tally = Arc::new(TallyTracker::new());
        let mut subscribers = self.subscribers;
        subscribers.push(tally.clone());
        let set = Arc::new(SubscriberSet::new(subscribers, bus.clone()));
        spawn_fanout_listener(&bus, set.clone());

        let gate = PauseGate::new();
        let token = CancellationToken::new();
        let mut actors = JoinSet::new();

        let producer_pacer = Pacer::from_hz(cfg.production_rate_hz);
        let consumer_pacer = Pacer::from_hz(cfg.consumption_rate_hz);

        let buffer = match cfg.discipline {
            Discipline::Fifo => {
                let buf = Arc::new(FifoBuffer::new(cfg.capacity, cfg.acquire_timeout));
                for i in 0..cfg.producers {
                    let actor = FifoProducer {
                        name: actor_name("producer", i),
                        pacer: producer_pacer,
                        bus: bus.clone(),
                        gate: gate.watcher(),
                    };
                    actors.spawn(actor.run(buf.clone(), token.child_token()));
                }
                for i in 0..cfg.consumers {
                    let actor = FifoConsumer {
                        name: actor_name("consumer", i),
                        pacer: consumer_pacer,
                        bus: bus.clone(),
                        gate: gate.watcher(),
                    };
                    actors.spawn(actor.run(buf.clone(), token.child_token()));
                }
                RunBuffer::Fifo(buf)
            }
            Discipline::Addressable => {
                let buf = Arc::new(AddressableBuffer::new(cfg.capacity, cfg.acquire_timeout));
                for i in 0..cfg.producers {
                    let actor = SlotProducer {
                        name: actor_name("producer", i),
                        kind: kind_for(i),
                        pacer: producer_pacer,
                        bus: bus.clone(),
                        gate: gate.watcher(),
                    };
                    actors.spawn(actor.run(buf.clone(), token.child_token()));
                }
                for i in 0..cfg.consumers {
                    let actor = SlotConsumer {
                        name: actor_name("consumer", i),
                        kind: kind_for(i),
                        pacer: consumer_pacer,
                        bus: bus.clone(),
                        gate: gate.watcher(),
                    };
                    actors.spawn(actor.run(buf.clone(), token.child_token()));
                }
                RunBuffer::Addressable(buf)
            }
        };

        bus.publish(Event::now(EventKind::RunStarted));

        Ok(RunHandle {
            bus,
            gate,
            token,
            buffer,
            actors: Mutex::new(actors),
            stopped: AtomicBool::new(false),
            tally,
            subscribers: set,
            grace: cfg.grace,
        })
    }
}

fn actor_name(role: &str, index: usize) -> Arc<str> {
    format!("{role}-{}", index + 1).into()
}

/// Alternates kinds by actor index so both kinds get coverage.
fn kind_for(index: usize) -> ItemKind {
    if index % 2 == 0 {
        ItemKind::Orange
    } else {
        ItemKind::Apple
    }
}

/// Forwards bus events to the subscriber fan-out. Ends when the bus closes;
/// a lagging listener skips the oldest events and keeps going.
fn spawn_fanout_listener(bus: &Bus, set: Arc<SubscriberSet>) {
    let mut rx = bus.subscribe();
    tokio::spawn(async move {
        loop {
            match rx.recv().await {
                Ok(ev) => set.emit(&ev),
                Err(RecvError::Lagged(_)) => continue,
                Err(RecvError::Closed) => break,
            }
        }
    });
}
