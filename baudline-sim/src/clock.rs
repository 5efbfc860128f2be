//! Shared simulation clock

use std::cell::Cell;
use std::rc::Rc;

/// Current simulation time in timer ticks, shared by every sim object
#[derive(Debug, Clone, Default)]
pub struct SimClock(Rc<Cell<u64>>);

impl SimClock {
    /// Clock at tick zero
    pub fn new() -> Self {
        Self::default()
    }

    /// Current tick
    pub fn now(&self) -> u64 {
        self.0.get()
    }

    pub(crate) fn set(&self, tick: u64) {
        debug_assert!(tick >= self.0.get(), "simulation time ran backwards");
        self.0.set(tick);
    }
}
