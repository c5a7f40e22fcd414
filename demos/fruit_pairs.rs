//! Addressable run: orange/apple producer-consumer pairs target random
//! slots, with a pause/resume cycle in the middle.

use std::sync::Arc;
use std::time::Duration;

use slotvisor::{Coordinator, Discipline, LogWriter, SimConfig};

#[tokio::main(flavor = "multi_thread")]
async fn main() -> anyhow::Result<()> {
    let cfg = SimConfig {
        discipline: Discipline::Addressable,
        capacity: 20,
        producers: 4,
        consumers: 4,
        production_rate_hz: 3.0,
        consumption_rate_hz: 2.0,
        ..SimConfig::default()
    };

    let handle = Coordinator::new(cfg)
        .with_subscriber(Arc::new(LogWriter))
        .start()?;

    tokio::time::sleep(Duration::from_secs(2)).await;

    handle.pause();
    println!("-- paused, buffer: {}", handle.snapshot());
    tokio::time::sleep(Duration::from_secs(1)).await;
    handle.resume();

    tokio::time::sleep(Duration::from_secs(2)).await;
    handle.stop().await?;

    let totals = handle.tallies();
    println!(
        "done: produced={} consumed={} left={}",
        totals.produced,
        totals.consumed,
        handle.snapshot().filled
    );
    Ok(())
}
