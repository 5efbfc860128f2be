//! RP2040 bindings for the software UART
//!
//! Implements the `baudline-hal` traits on top of embassy-rp:
//!
//! - GPIO lines for the receive and transmit pins and the indicator LEDs
//! - Deadline-based bit timer channels on the embassy time driver
//! - Pin selection by number for config-driven setup
//!
//! Everything here is meant to be used from a single high-priority task
//! that waits on the receive edge and both timer deadlines and forwards
//! whichever fires first to the driver.

#![no_std]
#![deny(unsafe_code)]

pub mod gpio;
pub mod pins;
pub mod timer;

pub use gpio::{InputLine, OutputLine};
pub use timer::DeadlineTimer;
