//! Simulated signal wire and the pins attached to it
//!
//! A wire idles high like a UART line with a pull-up. It keeps a log of
//! every level change so waveforms can be checked after a run, and it
//! latches falling edges for the simulator to turn into pin-change
//! interrupts.

use std::cell::RefCell;
use std::rc::Rc;

use baudline_hal::{InputPin, OutputPin};

use crate::clock::SimClock;

#[derive(Debug)]
struct WireState {
    level: bool,
    transitions: Vec<(u64, bool)>,
    falling_edge: bool,
}

/// A single digital signal
#[derive(Debug, Clone)]
pub struct Wire {
    state: Rc<RefCell<WireState>>,
    clock: SimClock,
}

impl Wire {
    /// Create an idle-high wire
    pub fn new(clock: SimClock) -> Self {
        Self {
            state: Rc::new(RefCell::new(WireState {
                level: true,
                transitions: Vec::new(),
                falling_edge: false,
            })),
            clock,
        }
    }

    /// Current level
    pub fn level(&self) -> bool {
        self.state.borrow().level
    }

    /// Drive the wire to `high` at the current tick
    pub fn drive(&self, high: bool) {
        let mut state = self.state.borrow_mut();
        if state.level == high {
            return;
        }
        if state.level && !high {
            state.falling_edge = true;
        }
        state.level = high;
        state.transitions.push((self.clock.now(), high));
    }

    /// Every level change so far as `(tick, new_level)`
    pub fn transitions(&self) -> Vec<(u64, bool)> {
        self.state.borrow().transitions.clone()
    }

    /// Level the wire had at `tick`, counting changes made at that tick
    pub fn level_at(&self, tick: u64) -> bool {
        self.state
            .borrow()
            .transitions
            .iter()
            .take_while(|(at, _)| *at <= tick)
            .last()
            .map_or(true, |&(_, level)| level)
    }

    /// Ticks at which the wire fell
    pub fn falling_edges(&self) -> Vec<u64> {
        self.state
            .borrow()
            .transitions
            .iter()
            .filter(|(_, level)| !level)
            .map(|&(at, _)| at)
            .collect()
    }

    /// Read back the ten bit slots of a frame starting at `start`
    ///
    /// Each slot is read at its center, the way a receiver would.
    pub fn frame_levels(&self, start: u64, bit_ticks: u64) -> [bool; 10] {
        let mut levels = [true; 10];
        for (slot, level) in levels.iter_mut().enumerate() {
            *level = self.level_at(start + bit_ticks / 2 + slot as u64 * bit_ticks);
        }
        levels
    }

    /// Consume the latched falling edge, if any
    pub(crate) fn take_falling_edge(&self) -> bool {
        std::mem::take(&mut self.state.borrow_mut().falling_edge)
    }

    /// Pin that drives this wire
    pub fn output_pin(&self) -> SimOutputPin {
        SimOutputPin(self.clone())
    }

    /// Pin that reads this wire
    pub fn input_pin(&self) -> SimInputPin {
        SimInputPin(self.clone())
    }
}

/// Output pin driving a [`Wire`]
#[derive(Debug, Clone)]
pub struct SimOutputPin(Wire);

impl OutputPin for SimOutputPin {
    fn set_high(&mut self) {
        self.0.drive(true);
    }

    fn set_low(&mut self) {
        self.0.drive(false);
    }

    fn is_set_high(&self) -> bool {
        self.0.level()
    }
}

/// Input pin reading a [`Wire`]
#[derive(Debug, Clone)]
pub struct SimInputPin(Wire);

impl InputPin for SimInputPin {
    fn is_high(&self) -> bool {
        self.0.level()
    }
}
