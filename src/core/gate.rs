//! # Pause gate for actor loops.
//!
//! A [`PauseGate`] is a watch-channel latch checked by every actor at the
//! top of each loop iteration, **before** any acquire. A paused actor is
//! parked on the watch channel; it holds no locks and no permits, so
//! pausing can never deadlock the buffer or starve other actors.

use tokio::sync::watch;
use tokio_util::sync::CancellationToken;

/// Owner side of the gate, held by the run handle.
#[derive(Debug)]
pub(crate) struct PauseGate {
    tx: watch::Sender<bool>,
}

impl PauseGate {
    /// Creates an open gate.
    pub fn new() -> Self {
        let (tx, _rx) = watch::channel(false);
        Self { tx }
    }

    /// Closes the gate. Returns `false` if it was already closed.
    pub fn pause(&self) -> bool {
        self.tx.send_if_modified(|paused| {
            if *paused {
                false
            } else {
                *paused = true;
                true
            }
        })
    }

    /// Opens the gate. Returns `false` if it was already open.
    pub fn resume(&self) -> bool {
        self.tx.send_if_modified(|paused| {
            if *paused {
                *paused = false;
                true
            } else {
                false
            }
        })
    }

    pub fn is_paused(&self) -> bool {
        *self.tx.borrow()
    }

    /// Creates an actor-side watcher.
    pub fn watcher(&self) -> PauseWatcher {
        PauseWatcher {
            rx: self.tx.subscribe(),
        }
    }
}

/// Actor side of the gate.
#[derive(Debug, Clone)]
pub(crate) struct PauseWatcher {
    rx: watch::Receiver<bool>,
}

impl PauseWatcher {
    /// Waits until the gate is open.
    ///
    /// Returns `false` if `token` was cancelled while waiting; the caller
    /// should exit its loop. A dropped gate counts as open; cancellation
    /// governs shutdown, not the gate.
    pub async fn wait_ready(&mut self, token: &CancellationToken) -> bool {
        loop {
            if !*self.rx.borrow_and_update() {
                return true;
            }
            tokio::select! {
                changed = self.rx.changed() => {
                    if changed.is_err() {
                        return true;
                    }
                }
                _ = token.cancelled() => return false,
            }
        }
    }
}
