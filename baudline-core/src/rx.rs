//! Receive bit-sampler
//!
//! A falling edge on the idle line starts a frame. The timer channel is
//! then scheduled half a bit later to re-check the start bit at its
//! center, and every full bit after that to sample the data bits and the
//! stop bit:
//!
//! ```text
//!  idle ─┐     ┌─────┐           ┌─────┬─────
//!        │start│ d0  │ d1 ... d7 │stop │
//!        └─────┴─────┴── ... ────┘     │
//!        ^  ^     ^                 ^
//!      edge │     │                 └ 9.5 bits: stop sample, back to Idle
//!           │     └ 1.5 bits: d0 sample, then every bit
//!           └ 0.5 bits: start re-check
//! ```
//!
//! Only the start and stop bits are validated. Data bits are sampled once
//! at their center with no majority vote.

use baudline_hal::{BitTimer, InputPin};

use crate::timing::BitPeriod;

/// Receive frame phase
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum RxPhase {
    /// Waiting for a falling edge
    Idle,
    /// Edge seen, start bit not yet confirmed
    StartDetected,
    /// Waiting to sample data bit `index` (0..=7)
    SamplingBit(u8),
    /// All data bits in, waiting to sample the stop bit
    StopExpected,
}

/// What a timer firing produced
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum RxOutcome {
    /// Frame still in progress
    Pending,
    /// Start bit was high at its center; frame abandoned
    FalseStart,
    /// Frame complete with a valid stop bit
    Byte(u8),
    /// Frame complete but the stop bit sampled low
    FramingError(u8),
    /// Timer fired with no frame in progress
    Spurious,
}

/// Receive-side frame state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct RxFrame {
    /// Current phase
    pub phase: RxPhase,
    /// Data bits accumulated so far, LSB first
    pub shift: u8,
    /// Number of data bits sampled
    pub bits_received: u8,
}

impl RxFrame {
    /// Frame state at rest
    pub const IDLE: Self = Self {
        phase: RxPhase::Idle,
        shift: 0,
        bits_received: 0,
    };
}

/// Receive bit-sampler
///
/// Owns the receive pin and the receive timer channel. All methods are
/// meant to be called from interrupt context only.
pub struct ReceiveSampler<P, T> {
    pin: P,
    timer: T,
    period: BitPeriod,
    frame: RxFrame,
}

impl<P: InputPin, T: BitTimer> ReceiveSampler<P, T> {
    /// Create an idle sampler with its timer stopped
    pub fn new(pin: P, mut timer: T, period: BitPeriod) -> Self {
        timer.disarm();
        Self {
            pin,
            timer,
            period,
            frame: RxFrame::IDLE,
        }
    }

    /// Current frame state
    pub fn frame(&self) -> RxFrame {
        self.frame
    }

    /// Current phase
    pub fn phase(&self) -> RxPhase {
        self.frame.phase
    }

    /// Check whether no frame is in progress
    pub fn is_idle(&self) -> bool {
        self.frame.phase == RxPhase::Idle
    }

    /// Get access to the receive timer
    pub fn timer(&self) -> &T {
        &self.timer
    }

    /// Get access to the receive pin
    pub fn pin(&self) -> &P {
        &self.pin
    }

    /// Handle a falling edge on the receive pin
    ///
    /// Edges during a frame are data transitions and are ignored.
    pub fn on_falling_edge(&mut self) {
        if self.frame.phase != RxPhase::Idle {
            return;
        }

        self.frame = RxFrame {
            phase: RxPhase::StartDetected,
            ..RxFrame::IDLE
        };
        self.timer.rearm_once(self.period.half());
    }

    /// Handle a firing of the receive timer channel
    pub fn on_timer(&mut self) -> RxOutcome {
        let level = self.pin.is_high();

        match self.frame.phase {
            RxPhase::Idle => {
                self.timer.disarm();
                RxOutcome::Spurious
            }
            RxPhase::StartDetected => {
                if level {
                    self.abort();
                    return RxOutcome::FalseStart;
                }
                self.frame.phase = RxPhase::SamplingBit(0);
                self.timer.arm(self.period.ticks());
                RxOutcome::Pending
            }
            RxPhase::SamplingBit(index) => {
                if level {
                    self.frame.shift |= 1 << index;
                }
                self.frame.bits_received += 1;
                self.frame.phase = if index < 7 {
                    RxPhase::SamplingBit(index + 1)
                } else {
                    RxPhase::StopExpected
                };
                RxOutcome::Pending
            }
            RxPhase::StopExpected => {
                let byte = self.frame.shift;
                self.abort();
                if level {
                    RxOutcome::Byte(byte)
                } else {
                    RxOutcome::FramingError(byte)
                }
            }
        }
    }

    /// Drop any frame in progress and stop the timer
    pub fn abort(&mut self) {
        self.timer.disarm();
        self.frame = RxFrame::IDLE;
    }
}
