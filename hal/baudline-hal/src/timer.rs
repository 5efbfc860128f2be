//! Bit timer abstraction
//!
//! One [`BitTimer`] is one independently schedulable timer channel whose
//! unit is the tick of the timer's input clock. The software UART gives
//! each direction its own channel so receive sampling (aligned to bit
//! centers) and transmit shifting (aligned to bit edges) never have to
//! share a phase.
//!
//! The timer itself never calls back into the driver. Whoever owns the
//! interrupt vector observes the firing and forwards it as an event.

/// A timer channel counting in input-clock ticks
pub trait BitTimer {
    /// Start firing every `period_ticks`, first firing one period from now
    ///
    /// Calling `arm` while the channel is already running periodically
    /// must be a no-op: the phase is kept and no extra firing is queued.
    /// Calling it while a one-shot is pending replaces the one-shot.
    fn arm(&mut self, period_ticks: u32);

    /// Schedule exactly one firing `delay_ticks` from now
    ///
    /// Replaces any pending schedule. After the firing the channel is
    /// stopped until armed again.
    fn rearm_once(&mut self, delay_ticks: u32);

    /// Stop the channel and mask its interrupt
    fn disarm(&mut self);

    /// Check whether a firing is scheduled
    fn is_armed(&self) -> bool;
}

impl<T: BitTimer + ?Sized> BitTimer for &mut T {
    fn arm(&mut self, period_ticks: u32) {
        (**self).arm(period_ticks);
    }

    fn rearm_once(&mut self, delay_ticks: u32) {
        (**self).rearm_once(delay_ticks);
    }

    fn disarm(&mut self) {
        (**self).disarm();
    }

    fn is_armed(&self) -> bool {
        (**self).is_armed()
    }
}

/// Deadline bookkeeping for one [`BitTimer`] channel
///
/// Backends that cannot program a compare register directly (a shared
/// time driver, a simulator) keep one of these per channel and compare
/// [`deadline`](Self::deadline) against their clock. `I` is the instant
/// type and `D` the duration type of that clock.
///
/// Periodic deadlines advance from the previous deadline, never from the
/// time a firing was handled. Arming right after a one-shot fired counts
/// from the one-shot's deadline, so a half-bit delay followed by a
/// periodic schedule stays on bit centers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DeadlineSchedule<I, D> {
    deadline: Option<I>,
    period: Option<D>,
    /// Deadline of a one-shot that just fired
    anchor: Option<I>,
}

impl<I, D> DeadlineSchedule<I, D> {
    /// A stopped channel
    pub const fn stopped() -> Self {
        Self {
            deadline: None,
            period: None,
            anchor: None,
        }
    }
}

impl<I, D> Default for DeadlineSchedule<I, D> {
    fn default() -> Self {
        Self::stopped()
    }
}

impl<I, D> DeadlineSchedule<I, D>
where
    I: Copy + core::ops::Add<D, Output = I>,
    D: Copy,
{
    /// Instant the channel is next due
    pub fn deadline(&self) -> Option<I> {
        self.deadline
    }

    /// Period when running periodically
    pub fn period(&self) -> Option<D> {
        self.period
    }

    /// See [`BitTimer::arm`]
    pub fn arm(&mut self, now: I, period: D) {
        if self.period.is_some() && self.deadline.is_some() {
            return;
        }
        let base = self.anchor.take().unwrap_or(now);
        self.period = Some(period);
        self.deadline = Some(base + period);
    }

    /// See [`BitTimer::rearm_once`]
    pub fn rearm_once(&mut self, now: I, delay: D) {
        self.anchor = None;
        self.period = None;
        self.deadline = Some(now + delay);
    }

    /// See [`BitTimer::disarm`]
    pub fn disarm(&mut self) {
        *self = Self::stopped();
    }

    /// Account for one firing
    ///
    /// One-shots are consumed, periodic channels move one period on.
    pub fn fired(&mut self) {
        match (self.deadline, self.period) {
            (Some(at), Some(period)) => self.deadline = Some(at + period),
            (at, None) => {
                self.anchor = at;
                self.deadline = None;
            }
            (None, Some(_)) => {}
        }
    }
}
