use std::time::Duration;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;

use crate::*;

pub const DEFAULT_TICK_PERIOD: Duration = Duration::from_millis(100);

/// Posts a clock tick to the game every `period` until the coordinator stops.
pub fn spawn_ticker(handle: GameHandle, period: Duration) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(period);
        interval.set_missed_tick_behavior(MissedTickBehavior::Skip);
        // the first tick completes immediately
        interval.tick().await;

        loop {
            interval.tick().await;
            if handle.tick().is_err() {
                break;
            }
        }
        log::debug!("Ticker stopped");
    })
}
