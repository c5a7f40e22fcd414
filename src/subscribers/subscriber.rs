//! # Subscriber trait for in-process event observers.

use async_trait::async_trait;

use crate::events::Event;

/// An in-process observer of runtime events.
///
/// Subscribers are registered with the [`Coordinator`](crate::Coordinator)
/// before a run starts and receive every event published from that point on,
/// each through its own bounded queue and worker; a slow or panicking
/// subscriber never blocks actors or its peers.
#[async_trait]
pub trait Subscribe: Send + Sync {
    /// Handles one event. Called from the subscriber's dedicated worker.
    async fn on_event(&self, event: &Event);

    /// Stable name used in overflow/panic reports.
    fn name(&self) -> &'static str;

    /// Capacity of this subscriber's queue; events beyond it are dropped
    /// for this subscriber only.
    fn queue_capacity(&self) -> usize {
        256
    }
}
