//! Bit period derivation
//!
//! The bit period is the timer interval for one serial bit, rounded to the
//! nearest whole timer tick. Sampling is placed half a period after the
//! start edge and one period apart after that, so every sample lands on a
//! bit center.

use crate::config::{ConfigError, MAX_BAUD_ERROR_PERMILLE, MIN_TICKS_PER_BIT};

/// Bits in one frame: start + 8 data + stop
pub const BITS_PER_FRAME: u32 = 10;

/// Duration of one serial bit in timer ticks
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct BitPeriod {
    ticks: u32,
    clock_hz: u32,
    baud: u32,
}

impl BitPeriod {
    /// Derive the bit period for `baud` on a timer clocked at `clock_hz`
    pub fn new(clock_hz: u32, baud: u32) -> Result<Self, ConfigError> {
        if baud == 0 {
            return Err(ConfigError::ZeroBaud);
        }
        if clock_hz == 0 {
            return Err(ConfigError::ZeroClock);
        }

        // Round to nearest
        let ticks = ((clock_hz as u64 + baud as u64 / 2) / baud as u64) as u32;
        if ticks < MIN_TICKS_PER_BIT {
            return Err(ConfigError::BaudTooHigh { ticks_per_bit: ticks });
        }

        let period = Self {
            ticks,
            clock_hz,
            baud,
        };

        let error_permille = period.error_permille();
        if error_permille > MAX_BAUD_ERROR_PERMILLE {
            return Err(ConfigError::BaudMismatch { error_permille });
        }

        Ok(period)
    }

    /// Ticks per bit
    pub const fn ticks(&self) -> u32 {
        self.ticks
    }

    /// Ticks from a start edge to the center of the start bit
    pub const fn half(&self) -> u32 {
        self.ticks / 2
    }

    /// Ticks for a complete frame
    pub const fn frame_ticks(&self) -> u32 {
        self.ticks * BITS_PER_FRAME
    }

    /// Offset from the start edge at which bit `slot` is sampled
    ///
    /// Slot 0 is the start bit, slots 1..=8 the data bits, slot 9 the stop bit.
    pub const fn sample_offset(&self, slot: u32) -> u32 {
        self.half() + slot * self.ticks
    }

    /// Timer clock the period was derived for
    pub const fn clock_hz(&self) -> u32 {
        self.clock_hz
    }

    /// Requested baud rate
    pub const fn baud(&self) -> u32 {
        self.baud
    }

    /// Deviation of the realised rate from the requested one (permille)
    pub fn error_permille(&self) -> u32 {
        let realised = self.ticks as u64 * self.baud as u64;
        let clock = self.clock_hz as u64;
        (realised.abs_diff(clock) * 1000 / clock) as u32
    }
}
