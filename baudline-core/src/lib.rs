//! Board-agnostic core of the software UART
//!
//! This crate contains everything that does not depend on a specific chip:
//!
//! - Bit period derivation and configuration validation
//! - Receive bit-sampler state machine (start/stop validation, LSB-first)
//! - Transmit bit-driver state machine (back-to-back frames)
//! - Single-slot byte mailbox shared between interrupt and main context
//! - The [`SoftUart`] driver dispatching edge and timer events
//! - A non-blocking serial port over the mailbox
//! - The bracket-echo reference application logic
//!
//! Wire format is fixed: 8 data bits, no parity, 1 stop bit, idle high,
//! least-significant bit first.

#![no_std]
#![deny(unsafe_code)]

pub mod config;
pub mod driver;
pub mod echo;
pub mod error;
pub mod event;
pub mod mailbox;
pub mod port;
pub mod rx;
pub mod timing;
pub mod tx;

pub use config::{ConfigError, FramingPolicy, OverrunPolicy, UartConfig};
pub use driver::SoftUart;
pub use error::{LineError, LineErrors, LineStats, StatsSnapshot};
pub use event::Event;
pub use mailbox::Mailbox;
pub use port::SerialPort;
pub use timing::BitPeriod;
