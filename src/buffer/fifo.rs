//! # FIFO bounded buffer.
//!
//! One circular buffer shared by any number of producers and consumers.
//! A single head/tail cursor pair is shared across all actors and every
//! mutation happens under the exclusion section, which is what makes the
//! dequeue order equal the enqueue order regardless of how many actors run.
//!
//! ## Signaling
//! ```text
//! produce(item):                         consume():
//!   acquire `empty` permit ◄──────────┐    acquire `filled` permit ◄────┐
//!   lock state                        │    lock state                   │
//!   write at tail, tail+1, count+1    │    read+clear at head, head+1   │
//!   unlock                            │    unlock                       │
//!   release one `filled` permit ──────┼──► release one `empty` permit ──┘
//! ```
//!
//! ## Rules
//! - A producer that finds the buffer full **waits**; it never drops or
//!   overwrites live data.
//! - A consumer that finds the buffer empty **waits**; it never fabricates
//!   an "empty" sentinel as if it were data.
//! - Waits are bounded by the acquire timeout; each tick re-checks the
//!   liveness flag and retries. `close()` also closes both semaphores, so
//!   waiters wake immediately instead of waiting out their tick.

use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use tokio::sync::{Semaphore, SemaphorePermit};
use tokio::time;

use super::{Applied, Item, Snapshot};
use crate::error::BufferError;

/// Cursor/slot state guarded by the exclusion section.
struct FifoState {
    slots: Vec<Option<Item>>,
    /// Next slot to read. Advances modulo capacity, only on commit.
    head: usize,
    /// Next slot to write. Advances modulo capacity, only on commit.
    tail: usize,
    /// Always equals the number of `Some` slots.
    filled_count: usize,
}

impl FifoState {
    fn snapshot(&self) -> Snapshot {
        Snapshot {
            slots: self.slots.clone(),
            filled: self.filled_count,
        }
    }
}

/// Bounded circular buffer with strict FIFO ordering.
///
/// Shared by reference ([`Arc`](std::sync::Arc)) across all actors of a run.
/// The two semaphores count free and filled slots; the mutex guards the
/// cursors, the count, and the slots themselves, so cross-slot invariants
/// update atomically with each write.
pub struct FifoBuffer {
    capacity: usize,
    state: Mutex<FifoState>,
    /// Counts free slots; starts at `capacity`.
    empty: Semaphore,
    /// Counts filled slots; starts at 0.
    filled: Semaphore,
    /// Transitions true → false exactly once, never reverts.
    alive: AtomicBool,
    acquire_timeout: Duration,
}

impl FifoBuffer {
    /// Creates a buffer with the given capacity (clamped to a minimum of 1)
    /// and bounded-acquire timeout.
    pub fn new(capacity: usize, acquire_timeout: Duration) -> Self {
        let capacity = capacity.max(1);
        Self {
            capacity,
            state: Mutex::new(FifoState {
                slots: vec![None; capacity],
                head: 0,
                tail: 0,
                filled_count: 0,
            }),
            empty: Semaphore::new(capacity),
            filled: Semaphore::new(0),
            alive: AtomicBool::new(true),
            acquire_timeout,
        }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn is_alive(&self) -> bool {
        self.alive.load(Ordering::Acquire)
    }

    /// Number of currently filled slots.
    pub fn filled(&self) -> usize {
        self.state().filled_count
    }

    /// Consistent copy of the buffer's visible state.
    ///
    /// Takes the same exclusion section as mutation, so the copy never shows
    /// a half-applied operation.
    pub fn snapshot(&self) -> Snapshot {
        self.state().snapshot()
    }

    /// Marks the buffer non-alive and wakes every waiter.
    ///
    /// Idempotent. Blocked `produce`/`consume` calls resolve with
    /// [`BufferError::ShuttingDown`] without mutating any slot.
    pub fn close(&self) {
        self.alive.store(false, Ordering::Release);
        self.empty.close();
        self.filled.close();
    }

    /// Enqueues `item`, sleeping until a slot is free.
    ///
    /// On success the item is written at the tail cursor and exactly one
    /// waiting consumer is signalled. Fails only with
    /// [`BufferError::ShuttingDown`], in which case nothing was written.
    pub async fn produce(&self, item: Item) -> Result<Applied, BufferError> {
        let permit = self.acquire(&self.empty).await?;
        if !self.is_alive() {
            // Woke up into a shutdown; give the permit back untouched.
            return Err(BufferError::ShuttingDown);
        }

        let applied = {
            let mut st = self.state();
            let slot = st.tail;
            debug_assert!(st.slots[slot].is_none(), "tail slot must be free");
            st.slots[slot] = Some(item);
            st.tail = (st.tail + 1) % self.capacity;
            st.filled_count += 1;
            Applied {
                slot,
                item,
                snapshot: st.snapshot(),
            }
        };

        permit.forget();
        self.filled.add_permits(1);
        Ok(applied)
    }

    /// Dequeues the oldest item, sleeping until a slot is filled.
    ///
    /// On success the slot at the head cursor is cleared and exactly one
    /// waiting producer is signalled. Fails only with
    /// [`BufferError::ShuttingDown`].
    pub async fn consume(&self) -> Result<Applied, BufferError> {
        let permit = self.acquire(&self.filled).await?;
        if !self.is_alive() {
            return Err(BufferError::ShuttingDown);
        }

        let applied = {
            let mut st = self.state();
            let slot = st.head;
            let item = match st.slots[slot].take() {
                Some(item) => item,
                None => unreachable!("filled permit implies a committed write"),
            };
            st.head = (st.head + 1) % self.capacity;
            st.filled_count -= 1;
            Applied {
                slot,
                item,
                snapshot: st.snapshot(),
            }
        };

        permit.forget();
        self.empty.add_permits(1);
        Ok(applied)
    }

    /// Bounded-timeout acquire loop.
    ///
    /// A timeout tick is not a failure: it only forces a liveness re-check
    /// before parking again. A closed semaphore means `close()` ran.
    async fn acquire<'a>(&self, sem: &'a Semaphore) -> Result<SemaphorePermit<'a>, BufferError> {
        loop {
            if !self.is_alive() {
                return Err(BufferError::ShuttingDown);
            }
            match time::timeout(self.acquire_timeout, sem.acquire()).await {
                Ok(Ok(permit)) => return Ok(permit),
                // Closed semaphore: close() ran while we were parked.
                Ok(Err(_closed)) => return Err(BufferError::ShuttingDown),
                Err(_elapsed) => continue,
            }
        }
    }

    fn state(&self) -> std::sync::MutexGuard<'_, FifoState> {
        self.state
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    const TICK: Duration = Duration::from_millis(50);

    fn buffer(capacity: usize) -> Arc<FifoBuffer> {
        Arc::new(FifoBuffer::new(capacity, TICK))
    }

    #[tokio::test]
    async fn test_produce_then_consume_round() {
        let buf = buffer(4);
        let produced = buf.produce(Item::Symbol('A')).await.unwrap();
        assert_eq!(produced.slot, 0);
        assert_eq!(produced.snapshot.filled, 1);

        let consumed = buf.consume().await.unwrap();
        assert_eq!(consumed.item, Item::Symbol('A'));
        assert_eq!(consumed.slot, 0);
        assert!(consumed.snapshot.is_empty());
    }

    #[tokio::test]
    async fn test_fifo_order_with_wraparound() {
        let buf = buffer(2);
        let consumer = {
            let buf = buf.clone();
            tokio::spawn(async move {
                let mut seen = Vec::new();
                for _ in 0..3 {
                    seen.push(buf.consume().await.unwrap().item);
                }
                seen
            })
        };

        for c in ['A', 'B', 'C'] {
            buf.produce(Item::Symbol(c)).await.unwrap();
        }

        let seen = consumer.await.unwrap();
        assert_eq!(
            seen,
            vec![Item::Symbol('A'), Item::Symbol('B'), Item::Symbol('C')]
        );
    }

    #[tokio::test]
    async fn test_full_buffer_blocks_producer_until_stop() {
        let buf = buffer(1);
        buf.produce(Item::Symbol('A')).await.unwrap();

        let blocked = {
            let buf = buf.clone();
            tokio::spawn(async move { buf.produce(Item::Symbol('B')).await })
        };

        // The second produce must stay pending: no consumer ever drains.
        time::sleep(TICK * 2).await;
        assert!(!blocked.is_finished());

        buf.close();
        let res = time::timeout(TICK * 2, blocked)
            .await
            .expect("waiter must wake within one timeout tick of close")
            .unwrap();
        assert_eq!(res, Err(BufferError::ShuttingDown));

        // The live item was not overwritten.
        assert_eq!(buf.snapshot().slots[0], Some(Item::Symbol('A')));
    }

    #[tokio::test]
    async fn test_empty_buffer_blocks_consumer() {
        let buf = buffer(2);
        let blocked = {
            let buf = buf.clone();
            tokio::spawn(async move { buf.consume().await })
        };
        time::sleep(TICK * 2).await;
        assert!(!blocked.is_finished());

        buf.produce(Item::Symbol('Z')).await.unwrap();
        let res = time::timeout(TICK * 4, blocked).await.unwrap().unwrap();
        assert_eq!(res.unwrap().item, Item::Symbol('Z'));
    }

    #[tokio::test]
    async fn test_close_is_idempotent_and_sticky() {
        let buf = buffer(2);
        buf.close();
        buf.close();
        assert!(!buf.is_alive());
        assert_eq!(
            buf.produce(Item::Symbol('A')).await,
            Err(BufferError::ShuttingDown)
        );
        assert_eq!(buf.consume().await, Err(BufferError::ShuttingDown));
    }

    #[tokio::test]
    async fn test_filled_count_matches_slots() {
        let buf = buffer(8);
        for c in ['A', 'B', 'C', 'D'] {
            buf.produce(Item::Symbol(c)).await.unwrap();
        }
        buf.consume().await.unwrap();

        let snap = buf.snapshot();
        assert_eq!(snap.filled, 3);
        assert_eq!(snap.slots.iter().filter(|s| s.is_some()).count(), 3);
        assert_eq!(buf.filled(), 3);
    }

    #[tokio::test]
    async fn test_many_producers_one_consumer_loses_nothing() {
        let buf = buffer(4);
        let mut producers = Vec::new();
        for base in 0..4u32 {
            let buf = buf.clone();
            producers.push(tokio::spawn(async move {
                for i in 0..8u32 {
                    let c = char::from(b'A' + ((base * 8 + i) % 26) as u8);
                    buf.produce(Item::Symbol(c)).await.unwrap();
                }
            }));
        }

        let consumer = {
            let buf = buf.clone();
            tokio::spawn(async move {
                let mut n = 0;
                for _ in 0..32 {
                    buf.consume().await.unwrap();
                    n += 1;
                }
                n
            })
        };

        for p in producers {
            p.await.unwrap();
        }
        assert_eq!(consumer.await.unwrap(), 32);
        assert_eq!(buf.filled(), 0);
    }
}
