//! # Stateful subscriber tracking operation totals and live actors.
//!
//! [`TallyTracker`] listens to operation and actor-lifecycle events and
//! maintains:
//! - running produced/consumed totals (the counters front ends display,
//!   and what lets a teardown check that nothing was lost or duplicated);
//! - the set of actors that have started but not yet exited, used by
//!   [`RunHandle::stop`](crate::RunHandle::stop) to name stuck actors when
//!   the grace period runs out.
//!
//! Totals lag publication by the fan-out queue, so treat them as
//! diagnostics: exact once the run is quiescent, approximate while actors
//! are mid-flight.

use std::collections::HashSet;
use std::sync::Mutex;

use async_trait::async_trait;

use crate::events::{Event, EventKind};
use crate::subscribers::Subscribe;

/// Running totals of committed operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Tallies {
    /// Committed produce operations.
    pub produced: u64,
    /// Committed consume operations.
    pub consumed: u64,
}

#[derive(Default)]
struct Inner {
    tallies: Tallies,
    alive: HashSet<String>,
}

/// Tracks operation totals and which actors are currently alive.
#[derive(Default)]
pub struct TallyTracker {
    inner: Mutex<Inner>,
}

impl TallyTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Current produced/consumed totals.
    pub fn totals(&self) -> Tallies {
        self.inner().tallies
    }

    /// Names of actors that started but have not exited, sorted for stable
    /// reporting.
    pub fn alive_actors(&self) -> Vec<String> {
        let mut names: Vec<String> = self.inner().alive.iter().cloned().collect();
        names.sort();
        names
    }

    fn inner(&self) -> std::sync::MutexGuard<'_, Inner> {
        self.inner
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
    }
}

#[async_trait]
impl Subscribe for TallyTracker {
    async fn on_event(&self, event: &Event) {
        let mut inner = self.inner();
        match event.kind {
            EventKind::Produced => inner.tallies.produced += 1,
            EventKind::Consumed => inner.tallies.consumed += 1,
            EventKind::ActorStarted => {
                if let Some(name) = &event.actor {
                    inner.alive.insert(name.to_string());
                }
            }
            EventKind::ActorExited => {
                if let Some(name) = &event.actor {
                    inner.alive.remove(name.as_ref());
                }
            }
            _ => {}
        }
    }

    fn name(&self) -> &'static str {
        "tally_tracker"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::ActorRole;

    #[tokio::test]
    async fn test_tallies_follow_operations() {
        let tracker = TallyTracker::new();
        tracker.on_event(&Event::now(EventKind::Produced)).await;
        tracker.on_event(&Event::now(EventKind::Produced)).await;
        tracker.on_event(&Event::now(EventKind::Consumed)).await;

        let totals = tracker.totals();
        assert_eq!(totals.produced, 2);
        assert_eq!(totals.consumed, 1);
    }

    #[tokio::test]
    async fn test_alive_set_tracks_lifecycle() {
        let tracker = TallyTracker::new();
        let started = Event::now(EventKind::ActorStarted)
            .with_actor("producer-1")
            .with_role(ActorRole::Producer);
        tracker.on_event(&started).await;
        assert_eq!(tracker.alive_actors(), vec!["producer-1".to_string()]);

        let exited = Event::now(EventKind::ActorExited).with_actor("producer-1");
        tracker.on_event(&exited).await;
        assert!(tracker.alive_actors().is_empty());
    }
}
