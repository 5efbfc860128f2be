//! Simulated timer compare channel

use std::cell::RefCell;
use std::rc::Rc;

use baudline_hal::{BitTimer, DeadlineSchedule};

use crate::clock::SimClock;

#[derive(Debug, Default)]
struct TimerState {
    schedule: DeadlineSchedule<u64, u64>,
    firings: Vec<u64>,
}

/// One timer channel on the shared [`SimClock`]
///
/// Clones share the same channel, so the simulator can watch the
/// deadline of a timer the driver owns.
#[derive(Debug, Clone)]
pub struct SimTimer {
    state: Rc<RefCell<TimerState>>,
    clock: SimClock,
}

impl SimTimer {
    /// Create a stopped channel
    pub fn new(clock: SimClock) -> Self {
        Self {
            state: Rc::default(),
            clock,
        }
    }

    /// Tick at which the channel next fires
    pub fn deadline(&self) -> Option<u64> {
        self.state.borrow().schedule.deadline()
    }

    /// Period when running periodically
    pub fn period(&self) -> Option<u64> {
        self.state.borrow().schedule.period()
    }

    /// Every tick the channel has fired at
    pub fn firings(&self) -> Vec<u64> {
        self.state.borrow().firings.clone()
    }

    /// Record a firing at the current tick and schedule the next one
    pub(crate) fn fire(&self) {
        let mut state = self.state.borrow_mut();
        state.firings.push(self.clock.now());
        state.schedule.fired();
    }
}

impl BitTimer for SimTimer {
    fn arm(&mut self, period_ticks: u32) {
        let now = self.clock.now();
        self.state.borrow_mut().schedule.arm(now, u64::from(period_ticks));
    }

    fn rearm_once(&mut self, delay_ticks: u32) {
        let now = self.clock.now();
        self.state.borrow_mut().schedule.rearm_once(now, u64::from(delay_ticks));
    }

    fn disarm(&mut self) {
        self.state.borrow_mut().schedule.disarm();
    }

    fn is_armed(&self) -> bool {
        self.deadline().is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_one_shot_is_consumed() {
        let clock = SimClock::new();
        let mut timer = SimTimer::new(clock.clone());

        timer.rearm_once(52);
        assert_eq!(timer.deadline(), Some(52));

        clock.set(52);
        timer.fire();
        assert!(!timer.is_armed());
        assert_eq!(timer.firings(), vec![52]);
    }

    #[test]
    fn test_periodic_keeps_phase() {
        let clock = SimClock::new();
        let mut timer = SimTimer::new(clock.clone());

        timer.arm(104);
        clock.set(50);
        timer.arm(104);
        assert_eq!(timer.deadline(), Some(104));

        clock.set(104);
        timer.fire();
        assert_eq!(timer.deadline(), Some(208));
    }

    #[test]
    fn test_arm_replaces_one_shot() {
        let clock = SimClock::new();
        let mut timer = SimTimer::new(clock.clone());

        timer.rearm_once(52);
        clock.set(52);
        timer.fire();
        timer.arm(104);
        assert_eq!(timer.deadline(), Some(156));
        assert_eq!(timer.period(), Some(104));

        timer.disarm();
        assert_eq!(timer.deadline(), None);
    }
}
