//! Consumer loops for both buffer disciplines.

use std::sync::Arc;

use rand::Rng;
use tokio_util::sync::CancellationToken;

use super::{Pacer, actor_event};
use crate::buffer::{AddressableBuffer, FifoBuffer, ItemKind};
use crate::core::gate::PauseWatcher;
use crate::error::BufferError;
use crate::events::{ActorRole, Bus, EventKind};

/// Consumer against the FIFO discipline: drains the oldest item per round.
pub(crate) struct FifoConsumer {
    pub name: Arc<str>,
    pub pacer: Pacer,
    pub bus: Bus,
    pub gate: PauseWatcher,
}

impl FifoConsumer {
    pub async fn run(mut self, buffer: Arc<FifoBuffer>, token: CancellationToken) {
        self.bus.publish(actor_event(
            EventKind::ActorStarted,
            &self.name,
            ActorRole::Consumer,
            None,
        ));

        loop {
            if token.is_cancelled() {
                break;
            }
            if !self.gate.wait_ready(&token).await {
                break;
            }

            match buffer.consume().await {
                Ok(applied) => self.bus.publish(
                    actor_event(EventKind::Consumed, &self.name, ActorRole::Consumer, None)
                        .with_applied(applied),
                ),
                Err(BufferError::ShuttingDown) => break,
            }

            if !self.pacer.rest(&token).await {
                break;
            }
        }

        self.bus.publish(actor_event(
            EventKind::ActorExited,
            &self.name,
            ActorRole::Consumer,
            None,
        ));
    }
}

/// Consumer against the addressable discipline.
///
/// Targets one random slot per attempt; a missed attempt (empty slot or the
/// other kind) re-selects a fresh random index rather than queueing on the
/// old one. Repeatedly unlucky draws can leave a slot unserved for a while;
/// the discipline trades fairness for addressing simplicity.
pub(crate) struct SlotConsumer {
    pub name: Arc<str>,
    pub kind: ItemKind,
    pub pacer: Pacer,
    pub bus: Bus,
    pub gate: PauseWatcher,
}

impl SlotConsumer {
    pub async fn run(mut self, buffer: Arc<AddressableBuffer>, token: CancellationToken) {
        self.bus.publish(actor_event(
            EventKind::ActorStarted,
            &self.name,
            ActorRole::Consumer,
            Some(self.kind),
        ));

        loop {
            if token.is_cancelled() {
                break;
            }
            if !self.gate.wait_ready(&token).await {
                break;
            }

            let index = rand::rng().random_range(0..buffer.capacity());
            match buffer.poll_consume(self.kind, index).await {
                Ok(Some(applied)) => {
                    self.bus.publish(
                        actor_event(
                            EventKind::Consumed,
                            &self.name,
                            ActorRole::Consumer,
                            Some(self.kind),
                        )
                        .with_applied(applied),
                    );
                    if !self.pacer.rest(&token).await {
                        break;
                    }
                }
                // Missed attempt: the bounded wait inside poll_consume
                // already slept, go pick another slot.
                Ok(None) => continue,
                Err(BufferError::ShuttingDown) => break,
            }
        }

        self.bus.publish(actor_event(
            EventKind::ActorExited,
            &self.name,
            ActorRole::Consumer,
            Some(self.kind),
        ));
    }
}
