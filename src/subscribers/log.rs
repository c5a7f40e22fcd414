//! # Stdout log writer.
//!
//! Prints one line per event in the `[label] key=value` form, with operation
//! lines carrying the rendered buffer state a front end would display.

use async_trait::async_trait;

use crate::events::{Event, EventKind};
use crate::subscribers::Subscribe;

/// Base subscriber that logs events to stdout. Useful for demos and
/// debugging; front ends normally consume the event stream directly.
#[derive(Default)]
pub struct LogWriter;

#[async_trait]
impl Subscribe for LogWriter {
    async fn on_event(&self, e: &Event) {
        match e.kind {
            EventKind::Produced | EventKind::Consumed => {
                let verb = if e.kind == EventKind::Produced {
                    "produced"
                } else {
                    "consumed"
                };
                let item = e
                    .item
                    .map(|i| i.to_string())
                    .unwrap_or_else(|| "?".to_string());
                let buffer = e
                    .snapshot
                    .as_ref()
                    .map(|s| s.to_string())
                    .unwrap_or_default();
                println!(
                    "[{verb}] actor={:?} item='{item}' slot={:?} buffer={buffer}",
                    e.actor, e.slot
                );
            }
            EventKind::RunStarted => println!("[run-started]"),
            EventKind::ActorStarted => println!("[actor-started] actor={:?}", e.actor),
            EventKind::ActorExited => println!("[actor-exited] actor={:?}", e.actor),
            EventKind::ActorFailed => {
                println!("[actor-failed] reason={:?}", e.reason);
            }
            EventKind::Paused => println!("[paused]"),
            EventKind::Resumed => println!("[resumed]"),
            EventKind::ShutdownRequested => println!("[shutdown-requested]"),
            EventKind::AllStoppedWithin => println!("[all-stopped-within-grace]"),
            EventKind::GraceExceeded => println!("[grace-exceeded]"),
            EventKind::SubscriberOverflow => {
                println!("[subscriber-overflow] subscriber={:?}", e.actor);
            }
            EventKind::SubscriberPanicked => {
                println!(
                    "[subscriber-panicked] subscriber={:?} reason={:?}",
                    e.actor, e.reason
                );
            }
        }
    }

    fn name(&self) -> &'static str {
        "log_writer"
    }
}
