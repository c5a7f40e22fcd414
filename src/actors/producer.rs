//! Producer loops for both buffer disciplines.

use std::sync::Arc;

use rand::Rng;
use tokio_util::sync::CancellationToken;

use super::{Pacer, actor_event};
use crate::buffer::{AddressableBuffer, FifoBuffer, Item, ItemKind, Snapshot};
use crate::core::gate::PauseWatcher;
use crate::error::BufferError;
use crate::events::{ActorRole, Bus, EventKind};

/// Producer against the FIFO discipline: enqueues one symbol per round.
pub(crate) struct FifoProducer {
    pub name: Arc<str>,
    pub pacer: Pacer,
    pub bus: Bus,
    pub gate: PauseWatcher,
}

impl FifoProducer {
    pub async fn run(mut self, buffer: Arc<FifoBuffer>, token: CancellationToken) {
        self.bus.publish(actor_event(
            EventKind::ActorStarted,
            &self.name,
            ActorRole::Producer,
            None,
        ));

        loop {
            if token.is_cancelled() {
                break;
            }
            if !self.gate.wait_ready(&token).await {
                break;
            }

            // Symbol generation runs outside the exclusion section; the
            // produce below re-acquires it for the actual write.
            let symbol = draw_symbol(&buffer.snapshot());
            match buffer.produce(Item::Symbol(symbol)).await {
                Ok(applied) => self.bus.publish(
                    actor_event(EventKind::Produced, &self.name, ActorRole::Producer, None)
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
            ActorRole::Producer,
            None,
        ));
    }
}

/// Producer against the addressable discipline: targets one random slot per
/// round and waits for it to free up.
pub(crate) struct SlotProducer {
    pub name: Arc<str>,
    pub kind: ItemKind,
    pub pacer: Pacer,
    pub bus: Bus,
    pub gate: PauseWatcher,
}

impl SlotProducer {
    pub async fn run(mut self, buffer: Arc<AddressableBuffer>, token: CancellationToken) {
        self.bus.publish(actor_event(
            EventKind::ActorStarted,
            &self.name,
            ActorRole::Producer,
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
            match buffer.produce(self.kind, index).await {
                Ok(applied) => self.bus.publish(
                    actor_event(
                        EventKind::Produced,
                        &self.name,
                        ActorRole::Producer,
                        Some(self.kind),
                    )
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
            ActorRole::Producer,
            Some(self.kind),
        ));
    }
}

/// Draws a symbol not currently present in the buffer, best effort.
///
/// The exclusion section is released between the snapshot and the eventual
/// write, so two producers can still pick the same symbol concurrently.
/// Distinctness is a display hint, not a uniqueness guarantee. When all 26
/// symbols are buffered the hint has nothing left to offer and any symbol
/// is drawn.
fn draw_symbol(snapshot: &Snapshot) -> char {
    let mut rng = rand::rng();
    let free: Vec<char> = ('A'..='Z')
        .filter(|c| !snapshot.contains_symbol(*c))
        .collect();
    if free.is_empty() {
        char::from(rng.random_range(b'A'..=b'Z'))
    } else {
        free[rng.random_range(0..free.len())]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn snapshot_with(symbols: &[char], capacity: usize) -> Snapshot {
        let mut slots = vec![None; capacity];
        for (i, c) in symbols.iter().enumerate() {
            slots[i] = Some(Item::Symbol(*c));
        }
        Snapshot {
            slots,
            filled: symbols.len(),
        }
    }

    #[test]
    fn test_draw_symbol_avoids_buffered_symbols() {
        let taken: Vec<char> = ('A'..='Y').collect();
        let snap = snapshot_with(&taken, 26);
        for _ in 0..50 {
            assert_eq!(draw_symbol(&snap), 'Z');
        }
    }

    #[test]
    fn test_draw_symbol_exhausted_alphabet_still_yields_a_symbol() {
        let taken: Vec<char> = ('A'..='Z').collect();
        let snap = snapshot_with(&taken, 26);
        let c = draw_symbol(&snap);
        assert!(c.is_ascii_uppercase());
    }

    #[test]
    fn test_draw_symbol_empty_buffer_uses_full_alphabet() {
        let snap = snapshot_with(&[], 8);
        let c = draw_symbol(&snap);
        assert!(('A'..='Z').contains(&c));
    }
}
