//! FIFO run with the stdout log writer: three producers feed one consumer
//! through a small circular buffer, then the run is stopped cleanly.

use std::sync::Arc;
use std::time::Duration;

use slotvisor::{Coordinator, Discipline, LogWriter, SimConfig};

#[tokio::main(flavor = "multi_thread")]
async fn main() -> anyhow::Result<()> {
    let cfg = SimConfig {
        discipline: Discipline::Fifo,
        capacity: 8,
        producers: 3,
        consumers: 1,
        production_rate_hz: 4.0,
        consumption_rate_hz: 6.0,
        ..SimConfig::default()
    };

    let handle = Coordinator::new(cfg)
        .with_subscriber(Arc::new(LogWriter))
        .start()?;
    println!(
        "run started: {} subscribers, buffer {}",
        handle.subscriber_count(),
        handle.snapshot()
    );

    tokio::time::sleep(Duration::from_secs(3)).await;

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
