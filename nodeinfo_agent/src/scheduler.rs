//! Drives collect → report cycles, once or at a fixed interval.

use crate::config::Configuration;
use crate::containers::ContainerCollector;
use crate::error::CycleError;
use crate::hardware::HardwareCollector;
use crate::reporter::SnapshotSink;
use crate::snapshot;
use tokio::time::sleep;
use tracing::{error, info, warn};

/// Everything one cycle needs; owned across cycles so probe state persists.
pub struct Cycle {
    hardware: HardwareCollector,
    containers: ContainerCollector,
    sink: Box<dyn SnapshotSink>,
}

impl Cycle {
    pub fn new(
        hardware: HardwareCollector,
        containers: ContainerCollector,
        sink: Box<dyn SnapshotSink>,
    ) -> Self {
        Self {
            hardware,
            containers,
            sink,
        }
    }

    /// Collect, build, deliver. Only container failures abort; delivery
    /// failures are logged and swallowed.
    pub async fn run(&mut self) -> Result<(), CycleError> {
        let node = self.hardware.collect();
        let containers = self.containers.collect().await?;
        let count = containers.len();
        let snapshot = snapshot::build(node, containers);
        match self.sink.send(&snapshot).await {
            Ok(()) => info!(containers = count, "snapshot delivered"),
            Err(e) => warn!("delivery failed: {e}"),
        }
        Ok(())
    }
}

pub struct Scheduler {
    config: Configuration,
    cycle: Cycle,
}

impl Scheduler {
    pub fn new(config: Configuration, cycle: Cycle) -> Self {
        Self { config, cycle }
    }

    /// Single-shot returns the cycle's outcome. Periodic mode never returns;
    /// a failed cycle is logged and the next one still runs after the sleep.
    pub async fn run(&mut self) -> Result<(), CycleError> {
        let Some(every) = self.config.interval() else {
            info!("single-shot run");
            return self.cycle.run().await;
        };

        info!(interval_secs = every.as_secs(), "periodic run");
        let mut n: u64 = 0;
        loop {
            n += 1;
            info!(cycle = n, "start processing");
            if let Err(e) = self.cycle.run().await {
                error!(cycle = n, "cycle aborted: {e}");
            }
            sleep(every).await;
        }
    }
}
