use anyhow::Result;
use std::time::Duration;
use tokio::time::{interval, MissedTickBehavior};
use tracing::{debug, info};

use crate::refresh::cycle::RefreshCycle;

/// Background refresh loop: one cycle right away, then one per period.
pub struct RefreshScheduler {
    cycle: RefreshCycle,
    period: Duration,
}

impl RefreshScheduler {
    pub fn new(cycle: RefreshCycle, period: Duration) -> Self {
        Self { cycle, period }
    }

    /// Never returns during normal operation. Cycles run inline, so a slow cycle
    /// pushes the next tick back instead of overlapping with it.
    pub async fn run(self) -> Result<()> {
        info!("refresh scheduler started, period {:?}", self.period);
        let mut ticker = interval(self.period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            ticker.tick().await;
            let outcome = self.cycle.run().await;
            debug!("refresh tick done: {}", outcome.label());
        }
    }
}
