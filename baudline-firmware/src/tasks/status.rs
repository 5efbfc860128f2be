//! Periodic line statistics
//!
//! Logs the receive and transmit counters so a bad baud rate or a noisy
//! line shows up in the RTT log without a debugger attached.

use defmt::*;
use embassy_time::{Duration, Ticker};

use crate::channels::MAILBOX;

/// Reporting interval in seconds
pub const STATUS_INTERVAL_S: u64 = 10;

/// Status task
#[embassy_executor::task]
pub async fn status_task() {
    let mut ticker = Ticker::every(Duration::from_secs(STATUS_INTERVAL_S));
    let mut last = MAILBOX.stats().snapshot();

    loop {
        ticker.next().await;

        let stats = MAILBOX.stats().snapshot();
        if stats == last {
            continue;
        }
        info!(
            "Line: rx={} tx={} false_starts={} framing={} overruns={}",
            stats.frames_received, stats.frames_sent, stats.false_starts, stats.framing_errors, stats.overruns
        );
        last = stats;
    }
}
