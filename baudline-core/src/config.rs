//! Driver configuration
//!
//! Everything here is fixed for the driver's lifetime. The baud rate is
//! chosen at build time and checked against the timer clock before the
//! driver is constructed; a mismatch is a configuration error, never a
//! runtime one.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::timing::BitPeriod;

/// Reference timer clock (1 MHz SMCLK-style tick)
pub const DEFAULT_CLOCK_HZ: u32 = 1_000_000;

/// Reference baud rate
pub const DEFAULT_BAUD: u32 = 9600;

/// Fewest timer ticks per bit we accept
///
/// Below this the half-bit offset loses too much resolution and interrupt
/// latency eats a noticeable part of the bit.
pub const MIN_TICKS_PER_BIT: u32 = 8;

/// Largest accepted deviation between the realised and requested baud
/// rate, in parts per thousand
///
/// A frame is sampled 9.5 bit periods after its start edge, so 2% of
/// rate error accumulates to roughly a fifth of a bit at the stop bit.
pub const MAX_BAUD_ERROR_PERMILLE: u32 = 20;

/// What to do with a frame whose stop bit sampled low
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum FramingPolicy {
    /// Drop the byte; only the error flag and counter record it
    #[default]
    Discard,
    /// Deliver the byte anyway and latch the framing error flag
    Deliver,
}

/// What to do when a byte completes while the previous one is unread
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum OverrunPolicy {
    /// Keep the unread byte, drop the new one (oldest wins)
    #[default]
    DropNew,
    /// Replace the unread byte with the new one (newest wins)
    Overwrite,
}

/// Configuration errors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ConfigError {
    /// Baud rate of zero
    ZeroBaud,
    /// Timer clock of zero
    ZeroClock,
    /// Too few timer ticks per bit to place samples reliably
    BaudTooHigh {
        /// Ticks per bit the clock would give
        ticks_per_bit: u32,
    },
    /// The integer bit period misses the requested rate by too much
    BaudMismatch {
        /// Rate error in parts per thousand
        error_permille: u32,
    },
}

/// Software UART configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct UartConfig {
    /// Timer input clock in Hz
    pub clock_hz: u32,
    /// Baud rate in bits per second
    pub baud: u32,
    /// Stop-bit failure handling
    pub framing: FramingPolicy,
    /// Receive overrun handling
    pub overrun: OverrunPolicy,
}

impl Default for UartConfig {
    fn default() -> Self {
        Self {
            clock_hz: DEFAULT_CLOCK_HZ,
            baud: DEFAULT_BAUD,
            framing: FramingPolicy::default(),
            overrun: OverrunPolicy::default(),
        }
    }
}

impl UartConfig {
    /// Create a config with default policies
    pub const fn new(clock_hz: u32, baud: u32) -> Self {
        Self {
            clock_hz,
            baud,
            framing: FramingPolicy::Discard,
            overrun: OverrunPolicy::DropNew,
        }
    }

    /// Set the framing error policy
    pub const fn with_framing(mut self, framing: FramingPolicy) -> Self {
        self.framing = framing;
        self
    }

    /// Set the overrun policy
    pub const fn with_overrun(mut self, overrun: OverrunPolicy) -> Self {
        self.overrun = overrun;
        self
    }

    /// Check the clock/baud pair and derive the bit period
    pub fn validate(&self) -> Result<BitPeriod, ConfigError> {
        BitPeriod::new(self.clock_hz, self.baud)
    }
}
