//! Line errors and statistics
//!
//! Nothing on the line is fatal. Errors are latched as flags the
//! application may collect at its leisure, and counted so a long-running
//! link can be characterised.

use portable_atomic::{AtomicU32, Ordering};

/// Recoverable receive-side errors surfaced to the application
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum LineError {
    /// A stop bit sampled low
    Framing,
    /// A byte completed while the previous one was still unread
    Overrun,
}

/// Latched error flags, cleared when taken
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct LineErrors {
    /// At least one framing error since the flags were last taken
    pub framing: bool,
    /// At least one overrun since the flags were last taken
    pub overrun: bool,
}

impl LineErrors {
    /// No flags set
    pub const fn none() -> Self {
        Self {
            framing: false,
            overrun: false,
        }
    }

    /// Check if no error is latched
    pub const fn is_empty(&self) -> bool {
        !self.framing && !self.overrun
    }

    /// Latch one error
    pub fn set(&mut self, error: LineError) {
        match error {
            LineError::Framing => self.framing = true,
            LineError::Overrun => self.overrun = true,
        }
    }

    /// Most significant latched error
    ///
    /// Overrun wins because it means a byte was lost outright.
    pub const fn first(&self) -> Option<LineError> {
        if self.overrun {
            Some(LineError::Overrun)
        } else if self.framing {
            Some(LineError::Framing)
        } else {
            None
        }
    }
}

/// Running line counters
///
/// Written from interrupt context, read from anywhere.
#[derive(Debug, Default)]
pub struct LineStats {
    frames_received: AtomicU32,
    frames_sent: AtomicU32,
    false_starts: AtomicU32,
    framing_errors: AtomicU32,
    overruns: AtomicU32,
}

/// Point-in-time copy of [`LineStats`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct StatsSnapshot {
    /// Frames with a valid stop bit
    pub frames_received: u32,
    /// Frames shifted out completely
    pub frames_sent: u32,
    /// Falling edges whose start bit did not hold low
    pub false_starts: u32,
    /// Frames whose stop bit sampled low
    pub framing_errors: u32,
    /// Bytes lost or replaced because the previous byte was unread
    pub overruns: u32,
}

impl LineStats {
    /// Create zeroed counters
    pub const fn new() -> Self {
        Self {
            frames_received: AtomicU32::new(0),
            frames_sent: AtomicU32::new(0),
            false_starts: AtomicU32::new(0),
            framing_errors: AtomicU32::new(0),
            overruns: AtomicU32::new(0),
        }
    }

    pub(crate) fn record_received(&self) {
        self.frames_received.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_sent(&self) {
        self.frames_sent.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_false_start(&self) {
        self.false_starts.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_framing_error(&self) {
        self.framing_errors.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_overrun(&self) {
        self.overruns.fetch_add(1, Ordering::Relaxed);
    }

    /// Zero all counters
    pub fn reset(&self) {
        self.frames_received.store(0, Ordering::Relaxed);
        self.frames_sent.store(0, Ordering::Relaxed);
        self.false_starts.store(0, Ordering::Relaxed);
        self.framing_errors.store(0, Ordering::Relaxed);
        self.overruns.store(0, Ordering::Relaxed);
    }

    /// Copy the current counter values
    pub fn snapshot(&self) -> StatsSnapshot {
        StatsSnapshot {
            frames_received: self.frames_received.load(Ordering::Relaxed),
            frames_sent: self.frames_sent.load(Ordering::Relaxed),
            false_starts: self.false_starts.load(Ordering::Relaxed),
            framing_errors: self.framing_errors.load(Ordering::Relaxed),
            overruns: self.overruns.load(Ordering::Relaxed),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_flags_latch_and_rank() {
        let mut errors = LineErrors::none();
        assert!(errors.is_empty());
        assert_eq!(errors.first(), None);

        errors.set(LineError::Framing);
        assert_eq!(errors.first(), Some(LineError::Framing));

        errors.set(LineError::Overrun);
        assert!(!errors.is_empty());
        assert_eq!(errors.first(), Some(LineError::Overrun));
    }

    #[test]
    fn test_stats_count_and_reset() {
        let stats = LineStats::new();
        stats.record_received();
        stats.record_received();
        stats.record_sent();
        stats.record_false_start();
        stats.record_framing_error();
        stats.record_overrun();

        let snap = stats.snapshot();
        assert_eq!(snap.frames_received, 2);
        assert_eq!(snap.frames_sent, 1);
        assert_eq!(snap.false_starts, 1);
        assert_eq!(snap.framing_errors, 1);
        assert_eq!(snap.overruns, 1);

        stats.reset();
        assert_eq!(stats.snapshot(), StatsSnapshot::default());
    }
}
