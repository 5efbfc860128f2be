//! Bracket-echo application task
//!
//! Replies to every received character with `[c]` and lets the digits
//! `0` to `3` drive the two indicator LEDs.

use baudline_core::echo::{EchoApp, Indicators};
use baudline_hal::OutputPin;
use baudline_hal_rp2040::OutputLine;
use defmt::*;

use crate::channels::{ring_tx_kick, LINE_ACTIVITY, MAILBOX};

/// Echo task
#[embassy_executor::task]
pub async fn echo_task(mut led0: OutputLine<'static>, mut led1: OutputLine<'static>) {
    info!("Echo task started");

    let mut app = EchoApp::new();

    loop {
        if let Some(indicators) = app.poll(&MAILBOX, ring_tx_kick) {
            apply(&mut led0, &mut led1, indicators);
        }

        let errors = MAILBOX.take_errors();
        if !errors.is_empty() {
            warn!("Line errors: framing={} overrun={}", errors.framing, errors.overrun);
        }

        if app.is_waiting(&MAILBOX) {
            LINE_ACTIVITY.wait().await;
        }
    }
}

fn apply(led0: &mut OutputLine<'static>, led1: &mut OutputLine<'static>, indicators: Indicators) {
    debug!("Indicators: {}", indicators);
    led0.set_state(indicators.led0);
    led1.set_state(indicators.led1);
}
