//! Receive-line stimulus
//!
//! A [`Waveform`] is a list of `(tick, level)` changes to replay on the
//! receive wire. Bit widths are given in fractional ticks so that a far
//! end running slightly off the nominal rate can be modelled.

/// Exact bit width in ticks for a nominal rate
pub fn nominal_bit_ticks(clock_hz: u32, baud: u32) -> f64 {
    f64::from(clock_hz) / f64::from(baud)
}

/// Scheduled level changes for a wire
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Waveform {
    changes: Vec<(u64, bool)>,
}

impl Waveform {
    /// Empty waveform; the line stays idle-high
    pub fn new() -> Self {
        Self::default()
    }

    /// Append an 8N1 frame for `byte` starting at `start`
    pub fn frame(self, start: u64, byte: u8, bit_ticks: f64) -> Self {
        self.frame_with_stop(start, byte, bit_ticks, true)
    }

    /// Append a frame whose stop bit has level `stop`
    ///
    /// With a low stop bit the line returns high once the stop slot ends.
    pub fn frame_with_stop(mut self, start: u64, byte: u8, bit_ticks: f64, stop: bool) -> Self {
        let edge = |slot: u32| start + (f64::from(slot) * bit_ticks).round() as u64;

        self.changes.push((edge(0), false));
        for bit in 0..8 {
            self.changes.push((edge(bit + 1), byte & (1 << bit) != 0));
        }
        self.changes.push((edge(9), stop));
        if !stop {
            self.changes.push((edge(10), true));
        }
        self
    }

    /// Append a low pulse of `width` ticks
    pub fn glitch(mut self, at: u64, width: u64) -> Self {
        self.changes.push((at, false));
        self.changes.push((at + width, true));
        self
    }

    /// Append a single level change
    pub fn level(mut self, at: u64, high: bool) -> Self {
        self.changes.push((at, high));
        self
    }

    /// Level changes in time order
    ///
    /// The sort is stable, so changes scheduled for the same tick apply in
    /// the order they were added.
    pub fn changes(&self) -> Vec<(u64, bool)> {
        let mut changes = self.changes.clone();
        changes.sort_by_key(|&(at, _)| at);
        changes
    }
}
