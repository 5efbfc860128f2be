//! GPIO lines
//!
//! The receive line is both sampled by the bit layer and watched for
//! falling edges. The edge future has to stay alive while transmit
//! events are handled, so the embassy `Input` sits in a `RefCell` and the
//! bit layer reads the level through a shared reference. Level reads
//! only happen on receive timer firings, after the edge future has been
//! dropped.

use core::cell::RefCell;

use baudline_hal::{InputPin, OutputPin};
use embassy_rp::gpio::{AnyPin, Input, Level, Output, Pull};
use embassy_rp::Peri;

/// Receive line: level reads plus falling-edge waits
pub struct InputLine<'d> {
    input: RefCell<Input<'d>>,
}

impl<'d> InputLine<'d> {
    /// Configure `pin` as a pulled-up input
    ///
    /// The pull-up keeps an unconnected line idle-high.
    pub fn new(pin: Peri<'d, AnyPin>) -> Self {
        Self {
            input: RefCell::new(Input::new(pin, Pull::Up)),
        }
    }

    /// Wait for the next high-to-low transition
    ///
    /// The edge detector is armed when this future is first polled and
    /// stays armed until it completes or is dropped. The line cannot be
    /// read through [`InputPin`] while the future exists.
    #[allow(clippy::await_holding_refcell_ref)]
    pub async fn wait_for_falling_edge(&self) {
        let mut input = self.input.borrow_mut();
        input.wait_for_falling_edge().await;
    }
}

impl InputPin for &InputLine<'_> {
    fn is_high(&self) -> bool {
        self.input.borrow().is_high()
    }
}

/// Push-pull output: transmit line or indicator LED
pub struct OutputLine<'d> {
    output: Output<'d>,
}

impl<'d> OutputLine<'d> {
    /// Configure `pin` as an output starting at `high`
    pub fn new(pin: Peri<'d, AnyPin>, high: bool) -> Self {
        let level = if high { Level::High } else { Level::Low };
        Self {
            output: Output::new(pin, level),
        }
    }
}

impl OutputPin for OutputLine<'_> {
    fn set_high(&mut self) {
        self.output.set_high();
    }

    fn set_low(&mut self) {
        self.output.set_low();
    }

    fn is_set_high(&self) -> bool {
        self.output.is_set_high()
    }
}
