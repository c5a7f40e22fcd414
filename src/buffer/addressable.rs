//! # Addressable bounded buffer.
//!
//! Fixed-size slots picked by index rather than by a shared cursor. Each
//! operation targets one slot: `produce(kind, index)` waits for that slot to
//! be empty, `consume(kind, index)` waits for it to hold the requested kind.
//!
//! Waiters are conditioned **per attempt**, not per slot: two wait classes
//! (`freed` for producers, `stocked` for consumers) wake every parked actor
//! whenever any slot changes, and each woken actor re-checks its own target
//! under the lock. This trades strict ordering and fairness for simple slot
//! addressing: an actor targeting a busy index gets no FIFO service
//! guarantee, and random index targeting can starve individual slots. That
//! weakness is deliberate and documented, not fixed.
//!
//! ## Missed-wakeup safety
//! A waiter registers with its wait class *while still holding* the exclusion
//! section, so a notification between re-check and park cannot be lost. Even
//! if it were, the bounded wait tick re-checks the slot anyway.

use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use tokio::sync::Notify;
use tokio::time;

use super::{Applied, Item, ItemKind, Snapshot};
use crate::error::BufferError;

/// Slot and count state guarded by the exclusion section.
struct SlotState {
    slots: Vec<Option<ItemKind>>,
    /// Always equals the number of `Some` slots.
    filled_count: usize,
}

impl SlotState {
    fn snapshot(&self) -> Snapshot {
        Snapshot {
            slots: self.slots.iter().map(|s| s.map(Item::Tagged)).collect(),
            filled: self.filled_count,
        }
    }
}

/// Bounded buffer with per-index addressing and two wait classes.
///
/// Shared by reference ([`Arc`](std::sync::Arc)) across all actors of a run.
/// All operations panic if `index >= capacity`; the coordinator only hands
/// actors indices drawn from `0..capacity`.
pub struct AddressableBuffer {
    capacity: usize,
    state: Mutex<SlotState>,
    /// Wait class for producers: some slot may have become empty.
    freed: Notify,
    /// Wait class for consumers: some slot may have become filled.
    stocked: Notify,
    /// Transitions true → false exactly once, never reverts.
    alive: AtomicBool,
    acquire_timeout: Duration,
}

impl AddressableBuffer {
    /// Creates a buffer with the given capacity (clamped to a minimum of 1)
    /// and bounded-acquire timeout.
    pub fn new(capacity: usize, acquire_timeout: Duration) -> Self {
        let capacity = capacity.max(1);
        Self {
            capacity,
            state: Mutex::new(SlotState {
                slots: vec![None; capacity],
                filled_count: 0,
            }),
            freed: Notify::new(),
            stocked: Notify::new(),
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
    pub fn snapshot(&self) -> Snapshot {
        self.state().snapshot()
    }

    /// Marks the buffer non-alive and wakes both wait classes.
    ///
    /// Idempotent. Blocked operations resolve with
    /// [`BufferError::ShuttingDown`] on their next wakeup or timeout tick.
    pub fn close(&self) {
        self.alive.store(false, Ordering::Release);
        self.freed.notify_waiters();
        self.stocked.notify_waiters();
    }

    /// Writes `kind` into slot `index`, sleeping until that slot is empty.
    pub async fn produce(&self, kind: ItemKind, index: usize) -> Result<Applied, BufferError> {
        loop {
            if !self.is_alive() {
                return Err(BufferError::ShuttingDown);
            }
            let notified = self.freed.notified();
            tokio::pin!(notified);
            {
                let mut st = self.state();
                if st.slots[index].is_none() {
                    st.slots[index] = Some(kind);
                    st.filled_count += 1;
                    let applied = Applied {
                        slot: index,
                        item: Item::Tagged(kind),
                        snapshot: st.snapshot(),
                    };
                    drop(st);
                    self.stocked.notify_waiters();
                    return Ok(applied);
                }
                // Register for the wait class before releasing the lock so a
                // concurrent notify cannot slip between re-check and park.
                notified.as_mut().enable();
            }
            let _ = time::timeout(self.acquire_timeout, notified).await;
        }
    }

    /// Clears slot `index`, sleeping until it holds an item of `kind`.
    ///
    /// A slot filled with the *other* kind does not satisfy the wait; the
    /// caller stays parked until some consumer of that kind drains the slot
    /// and a matching producer refills it.
    pub async fn consume(&self, kind: ItemKind, index: usize) -> Result<Applied, BufferError> {
        loop {
            if !self.is_alive() {
                return Err(BufferError::ShuttingDown);
            }
            let notified = self.stocked.notified();
            tokio::pin!(notified);
            {
                let mut st = self.state();
                if let Some(applied) = Self::take_matching(&mut st, kind, index) {
                    drop(st);
                    self.freed.notify_waiters();
                    return Ok(applied);
                }
                notified.as_mut().enable();
            }
            let _ = time::timeout(self.acquire_timeout, notified).await;
        }
    }

    /// One bounded consume attempt: check, wait at most one acquire timeout
    /// on the `stocked` class, re-check once.
    ///
    /// Returns `Ok(None)` when the target slot still does not hold `kind`;
    /// the caller is expected to re-select another index. This is the
    /// re-selection primitive of the addressable discipline's consumers.
    pub async fn poll_consume(
        &self,
        kind: ItemKind,
        index: usize,
    ) -> Result<Option<Applied>, BufferError> {
        if !self.is_alive() {
            return Err(BufferError::ShuttingDown);
        }
        let notified = self.stocked.notified();
        tokio::pin!(notified);
        {
            let mut st = self.state();
            if let Some(applied) = Self::take_matching(&mut st, kind, index) {
                drop(st);
                self.freed.notify_waiters();
                return Ok(Some(applied));
            }
            notified.as_mut().enable();
        }
        let _ = time::timeout(self.acquire_timeout, notified).await;

        if !self.is_alive() {
            return Err(BufferError::ShuttingDown);
        }
        let taken = {
            let mut st = self.state();
            Self::take_matching(&mut st, kind, index)
        };
        if taken.is_some() {
            self.freed.notify_waiters();
        }
        Ok(taken)
    }

    /// Non-blocking produce probe. `Ok(None)` means the slot was occupied.
    pub fn try_produce(&self, kind: ItemKind, index: usize) -> Result<Option<Applied>, BufferError> {
        if !self.is_alive() {
            return Err(BufferError::ShuttingDown);
        }
        let applied = {
            let mut st = self.state();
            if st.slots[index].is_some() {
                None
            } else {
                st.slots[index] = Some(kind);
                st.filled_count += 1;
                Some(Applied {
                    slot: index,
                    item: Item::Tagged(kind),
                    snapshot: st.snapshot(),
                })
            }
        };
        if applied.is_some() {
            self.stocked.notify_waiters();
        }
        Ok(applied)
    }

    /// Non-blocking consume probe. `Ok(None)` means the slot did not hold
    /// an item of `kind`.
    pub fn try_consume(&self, kind: ItemKind, index: usize) -> Result<Option<Applied>, BufferError> {
        if !self.is_alive() {
            return Err(BufferError::ShuttingDown);
        }
        let taken = {
            let mut st = self.state();
            Self::take_matching(&mut st, kind, index)
        };
        if taken.is_some() {
            self.freed.notify_waiters();
        }
        Ok(taken)
    }

    fn take_matching(st: &mut SlotState, kind: ItemKind, index: usize) -> Option<Applied> {
        match st.slots[index] {
            Some(present) if present == kind => {
                st.slots[index] = None;
                st.filled_count -= 1;
                Some(Applied {
                    slot: index,
                    item: Item::Tagged(kind),
                    snapshot: st.snapshot(),
                })
            }
            _ => None,
        }
    }

    fn state(&self) -> std::sync::MutexGuard<'_, SlotState> {
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

    fn buffer(capacity: usize) -> Arc<AddressableBuffer> {
        Arc::new(AddressableBuffer::new(capacity, TICK))
    }

    #[tokio::test]
    async fn test_produce_and_consume_same_slot() {
        let buf = buffer(4);
        let put = buf.produce(ItemKind::Orange, 2).await.unwrap();
        assert_eq!(put.slot, 2);
        assert_eq!(buf.filled(), 1);

        let got = buf.consume(ItemKind::Orange, 2).await.unwrap();
        assert_eq!(got.item, Item::Tagged(ItemKind::Orange));
        assert_eq!(buf.filled(), 0);
    }

    #[tokio::test]
    async fn test_produce_blocks_on_occupied_slot() {
        let buf = buffer(2);
        buf.produce(ItemKind::Apple, 0).await.unwrap();

        let blocked = {
            let buf = buf.clone();
            tokio::spawn(async move { buf.produce(ItemKind::Apple, 0).await })
        };
        time::sleep(TICK * 2).await;
        assert!(!blocked.is_finished());

        buf.consume(ItemKind::Apple, 0).await.unwrap();
        let res = time::timeout(TICK * 4, blocked).await.unwrap().unwrap();
        assert_eq!(res.unwrap().slot, 0);
        assert_eq!(buf.filled(), 1);
    }

    #[tokio::test]
    async fn test_consume_ignores_other_kind() {
        let buf = buffer(2);
        buf.produce(ItemKind::Orange, 1).await.unwrap();

        // An apple consumer must not take the orange, even across timeout
        // ticks and wait-class wakeups.
        let blocked = {
            let buf = buf.clone();
            tokio::spawn(async move { buf.consume(ItemKind::Apple, 1).await })
        };
        time::sleep(TICK * 3).await;
        assert!(!blocked.is_finished());
        assert_eq!(buf.filled(), 1);

        // Drain the orange and refill with an apple; the waiter completes.
        buf.consume(ItemKind::Orange, 1).await.unwrap();
        buf.produce(ItemKind::Apple, 1).await.unwrap();
        let res = time::timeout(TICK * 4, blocked).await.unwrap().unwrap();
        assert_eq!(res.unwrap().item, Item::Tagged(ItemKind::Apple));
    }

    #[tokio::test]
    async fn test_poll_consume_misses_then_hits() {
        let buf = buffer(3);
        let miss = buf.poll_consume(ItemKind::Orange, 0).await.unwrap();
        assert!(miss.is_none());

        buf.produce(ItemKind::Orange, 0).await.unwrap();
        let hit = buf.poll_consume(ItemKind::Orange, 0).await.unwrap();
        assert_eq!(hit.unwrap().item, Item::Tagged(ItemKind::Orange));
    }

    #[tokio::test]
    async fn test_try_probes() {
        let buf = buffer(2);
        assert!(buf.try_consume(ItemKind::Apple, 0).unwrap().is_none());
        assert!(buf.try_produce(ItemKind::Apple, 0).unwrap().is_some());
        // Occupied now.
        assert!(buf.try_produce(ItemKind::Orange, 0).unwrap().is_none());
        // Wrong kind stays put.
        assert!(buf.try_consume(ItemKind::Orange, 0).unwrap().is_none());
        assert!(buf.try_consume(ItemKind::Apple, 0).unwrap().is_some());
    }

    #[tokio::test]
    async fn test_close_wakes_blocked_producer() {
        let buf = buffer(1);
        buf.produce(ItemKind::Orange, 0).await.unwrap();

        let blocked = {
            let buf = buf.clone();
            tokio::spawn(async move { buf.produce(ItemKind::Orange, 0).await })
        };
        time::sleep(TICK).await;
        buf.close();

        let res = time::timeout(TICK * 2, blocked).await.unwrap().unwrap();
        assert_eq!(res, Err(BufferError::ShuttingDown));
        // The live item survived shutdown untouched.
        assert_eq!(buf.filled(), 1);
    }

    #[tokio::test]
    async fn test_snapshot_consistent_under_concurrency() {
        let buf = buffer(8);
        let mut tasks = Vec::new();
        for i in 0..8 {
            let buf = buf.clone();
            tasks.push(tokio::spawn(async move {
                let kind = if i % 2 == 0 {
                    ItemKind::Orange
                } else {
                    ItemKind::Apple
                };
                for _ in 0..10 {
                    buf.produce(kind, i).await.unwrap();
                    buf.consume(kind, i).await.unwrap();
                }
            }));
        }
        for _ in 0..20 {
            let snap = buf.snapshot();
            assert_eq!(
                snap.filled,
                snap.slots.iter().filter(|s| s.is_some()).count()
            );
            time::sleep(Duration::from_millis(1)).await;
        }
        for t in tasks {
            t.await.unwrap();
        }
        assert_eq!(buf.filled(), 0);
    }
}
