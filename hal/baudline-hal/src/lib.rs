//! Baudline Hardware Abstraction Layer
//!
//! This crate defines the hardware traits the software UART is written
//! against. A chip-specific HAL implements them once, and the same bit
//! layer then runs on that chip or inside the host simulator.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────┐
//! │  Application (baudline-firmware, etc.)  │
//! └─────────────────────────────────────────┘
//!                     │
//!                     ▼
//! ┌─────────────────────────────────────────┐
//! │  baudline-core (bit layer + mailbox)    │
//! └─────────────────────────────────────────┘
//!                     │
//!                     ▼
//! ┌─────────────────────────────────────────┐
//! │  baudline-hal (this crate - traits)     │
//! └─────────────────────────────────────────┘
//!                     │
//!         ┌───────────┴───────────┐
//!         ▼                       ▼
//! ┌───────────────┐       ┌───────────────┐
//! │ baudline-hal- │       │ baudline-sim  │
//! │    rp2040     │       │   (host)      │
//! └───────────────┘       └───────────────┘
//! ```
//!
//! # Traits
//!
//! - [`gpio::OutputPin`], [`gpio::InputPin`] - Digital I/O
//! - [`timer::BitTimer`] - One timer channel paced in bit periods
//! - [`uart::UartTx`], [`uart::UartRx`] - Non-blocking byte I/O

#![no_std]
#![deny(unsafe_code)]

pub mod gpio;
pub mod timer;
pub mod uart;

// Re-export key traits at crate root for convenience
pub use gpio::{InputPin, OutputPin};
pub use timer::{BitTimer, DeadlineSchedule};
pub use uart::{Uart, UartRx, UartTx};
