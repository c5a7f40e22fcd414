//! # Event subscribers: trait, fan-out, and the built-in observers.

mod log;
mod set;
mod subscriber;
mod tally;

pub use log::LogWriter;
pub use set::SubscriberSet;
pub use subscriber::Subscribe;
pub use tally::{Tallies, TallyTracker};
