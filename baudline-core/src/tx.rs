//! Transmit bit-driver
//!
//! Shifts one frame out on the transmit pin, one level change per timer
//! firing. The start bit is driven the moment a frame begins and every
//! following bit is driven on the next firing, so each level is held for
//! exactly one bit period:
//!
//! ```text
//! begin   tick1  tick2        tick8  tick9  tick10
//!   │ start │ d0  │ d1  ...    │ d7  │ stop │
//!   ▼       ▼     ▼            ▼     ▼      ▼ frame done
//! ```
//!
//! When the frame is done the caller either begins the next frame on the
//! same tick (back-to-back, no gap beyond the stop bit) or releases the
//! timer.

use baudline_hal::{BitTimer, OutputPin};

use crate::timing::BitPeriod;

/// Transmit frame phase
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum TxPhase {
    /// Line idle (high), timer stopped
    Idle,
    /// Start bit on the wire
    SendingStart,
    /// Data bit `index` (0..=7) on the wire
    SendingBit(u8),
    /// Stop bit on the wire
    SendingStop,
}

/// What a timer firing produced
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum TxOutcome {
    /// Frame still in progress
    Busy,
    /// Stop bit has been held for a full period
    FrameDone,
    /// Timer fired with no frame in progress
    Spurious,
}

/// Transmit-side frame state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct TxFrame {
    /// Current phase
    pub phase: TxPhase,
    /// Byte being shifted out
    pub pending: u8,
    /// Data bits driven so far
    pub bits_sent: u8,
}

impl TxFrame {
    /// Frame state at rest
    pub const IDLE: Self = Self {
        phase: TxPhase::Idle,
        pending: 0,
        bits_sent: 0,
    };
}

/// Transmit bit-driver
///
/// Owns the transmit pin and the transmit timer channel.
pub struct TransmitDriver<P, T> {
    pin: P,
    timer: T,
    period: BitPeriod,
    frame: TxFrame,
}

impl<P: OutputPin, T: BitTimer> TransmitDriver<P, T> {
    /// Create an idle driver: line high, timer stopped
    pub fn new(mut pin: P, mut timer: T, period: BitPeriod) -> Self {
        pin.set_high();
        timer.disarm();
        Self {
            pin,
            timer,
            period,
            frame: TxFrame::IDLE,
        }
    }

    /// Current frame state
    pub fn frame(&self) -> TxFrame {
        self.frame
    }

    /// Current phase
    pub fn phase(&self) -> TxPhase {
        self.frame.phase
    }

    /// Check whether no frame is in progress
    pub fn is_idle(&self) -> bool {
        self.frame.phase == TxPhase::Idle
    }

    /// Get access to the transmit timer
    pub fn timer(&self) -> &T {
        &self.timer
    }

    /// Get access to the transmit pin
    pub fn pin(&self) -> &P {
        &self.pin
    }

    /// Begin shifting out `byte`
    ///
    /// Drives the start bit immediately. When called on the tick that
    /// finished the previous frame the timer is still running and `arm`
    /// keeps its phase. Returns `false` if a frame is already in progress.
    pub fn begin(&mut self, byte: u8) -> bool {
        if self.frame.phase != TxPhase::Idle {
            return false;
        }

        self.frame = TxFrame {
            phase: TxPhase::SendingStart,
            pending: byte,
            bits_sent: 0,
        };
        self.pin.set_low();
        self.timer.arm(self.period.ticks());
        true
    }

    /// Handle a firing of the transmit timer channel
    pub fn on_timer(&mut self) -> TxOutcome {
        match self.frame.phase {
            TxPhase::Idle => {
                self.timer.disarm();
                TxOutcome::Spurious
            }
            TxPhase::SendingStart => {
                self.drive_bit(0);
                TxOutcome::Busy
            }
            TxPhase::SendingBit(index) if index < 7 => {
                self.drive_bit(index + 1);
                TxOutcome::Busy
            }
            TxPhase::SendingBit(_) => {
                self.pin.set_high();
                self.frame.phase = TxPhase::SendingStop;
                TxOutcome::Busy
            }
            TxPhase::SendingStop => {
                // Timer keeps running so a follow-up frame stays in phase
                self.frame = TxFrame::IDLE;
                TxOutcome::FrameDone
            }
        }
    }

    /// Stop the timer and leave the line idle
    pub fn release(&mut self) {
        self.timer.disarm();
        self.pin.set_high();
        self.frame = TxFrame::IDLE;
    }

    fn drive_bit(&mut self, index: u8) {
        self.pin.set_state(self.frame.pending & (1 << index) != 0);
        self.frame.bits_sent += 1;
        self.frame.phase = TxPhase::SendingBit(index);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Default)]
    struct MockPin {
        high: bool,
        history: heapless::Vec<bool, 32>,
    }

    impl OutputPin for MockPin {
        fn set_high(&mut self) {
            self.high = true;
            let _ = self.history.push(true);
        }

        fn set_low(&mut self) {
            self.high = false;
            let _ = self.history.push(false);
        }

        fn is_set_high(&self) -> bool {
            self.high
        }
    }

    #[derive(Default)]
    struct MockTimer {
        period: Option<u32>,
        arm_calls: u8,
    }

    impl BitTimer for MockTimer {
        fn arm(&mut self, period_ticks: u32) {
            self.arm_calls += 1;
            if self.period.is_none() {
                self.period = Some(period_ticks);
            }
        }

        fn rearm_once(&mut self, _delay_ticks: u32) {
            unreachable!("transmitter never schedules one-shots");
        }

        fn disarm(&mut self) {
            self.period = None;
        }

        fn is_armed(&self) -> bool {
            self.period.is_some()
        }
    }

    fn driver() -> TransmitDriver<MockPin, MockTimer> {
        let period = BitPeriod::new(1_000_000, 9600).unwrap();
        let mut driver = TransmitDriver::new(MockPin::default(), MockTimer::default(), period);
        driver.pin.history.clear();
        driver
    }

    #[test]
    fn test_new_idles_high() {
        let driver = driver();
        assert!(driver.pin().is_set_high());
        assert!(!driver.timer().is_armed());
        assert!(driver.is_idle());
    }

    #[test]
    fn test_frame_levels_for_0x41() {
        let mut driver = driver();
        assert!(driver.begin(0x41));
        assert_eq!(driver.timer().period, Some(104));

        for _ in 0..9 {
            assert_eq!(driver.on_timer(), TxOutcome::Busy);
        }
        assert_eq!(driver.on_timer(), TxOutcome::FrameDone);

        let expected = [false, true, false, false, false, false, false, true, false, true];
        assert_eq!(driver.pin.history.as_slice(), &expected);
        assert_eq!(driver.frame().bits_sent, 0);
        assert!(driver.is_idle());
    }

    #[test]
    fn test_phase_progression() {
        let mut driver = driver();
        driver.begin(0xFF);
        assert_eq!(driver.phase(), TxPhase::SendingStart);

        driver.on_timer();
        assert_eq!(driver.phase(), TxPhase::SendingBit(0));
        for i in 1..8 {
            driver.on_timer();
            assert_eq!(driver.phase(), TxPhase::SendingBit(i));
        }
        assert_eq!(driver.frame().bits_sent, 8);

        driver.on_timer();
        assert_eq!(driver.phase(), TxPhase::SendingStop);
    }

    #[test]
    fn test_begin_rejected_mid_frame() {
        let mut driver = driver();
        assert!(driver.begin(1));
        driver.on_timer();
        assert!(!driver.begin(2));
        assert_eq!(driver.frame().pending, 1);
    }

    #[test]
    fn test_back_to_back_keeps_timer_phase() {
        let mut driver = driver();
        driver.begin(0x00);
        for _ in 0..9 {
            driver.on_timer();
        }
        assert_eq!(driver.on_timer(), TxOutcome::FrameDone);
        assert!(driver.timer().is_armed());

        assert!(driver.begin(0xFF));
        assert_eq!(driver.timer().arm_calls, 2);
        assert_eq!(driver.timer().period, Some(104));
        assert!(driver.pin().is_set_low());
    }

    #[test]
    fn test_release_stops_timer() {
        let mut driver = driver();
        driver.begin(0x12);
        driver.release();
        assert!(!driver.timer().is_armed());
        assert!(driver.pin().is_set_high());
        assert!(driver.is_idle());
    }

    #[test]
    fn test_spurious_tick() {
        let mut driver = driver();
        assert_eq!(driver.on_timer(), TxOutcome::Spurious);
        assert!(!driver.timer().is_armed());
    }
}
