//! # Bounded buffers shared by producer and consumer actors.
//!
//! Two coordination disciplines over the same storage shape:
//!
//! - [`FifoBuffer`] — one circular buffer with shared head/tail cursors.
//!   Producers and consumers are serviced in strict FIFO order; slot
//!   availability is signalled with a pair of counting semaphores.
//! - [`AddressableBuffer`] — fixed slots picked by index. Actors target a
//!   specific slot and are conditioned per attempt through wait-class
//!   notifications; there is no cross-actor ordering or fairness guarantee.
//!
//! ## Shared rules
//! - All slot, cursor, and count mutation happens under one exclusion
//!   section per buffer; the critical sections never await.
//! - Blocked operations sleep on availability signals; every wait is bounded
//!   by the buffer's acquire timeout so shutdown is observed within one tick.
//!   A timeout is a liveness re-check, never an error.
//! - `close()` flips the liveness flag exactly once and wakes every waiter;
//!   blocked operations then resolve with
//!   [`BufferError::ShuttingDown`](crate::BufferError::ShuttingDown) and no
//!   partial write.

mod addressable;
mod fifo;
mod slot;

pub use addressable::AddressableBuffer;
pub use fifo::FifoBuffer;
pub use slot::{Item, ItemKind, Snapshot};

/// Result of a committed produce or consume operation.
///
/// Captured inside the exclusion section, so `snapshot` is exactly the
/// buffer's visible state at the instant the operation applied.
#[derive(Debug, Clone, PartialEq)]
pub struct Applied {
    /// Index of the slot that was written or cleared.
    pub slot: usize,
    /// The item that was stored or removed.
    pub item: Item,
    /// Buffer state immediately after the operation.
    pub snapshot: Snapshot,
}
