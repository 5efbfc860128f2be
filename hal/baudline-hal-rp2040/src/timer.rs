//! Bit timer channels on the embassy time driver
//!
//! A [`DeadlineTimer`] does not touch the hardware alarm itself. It only
//! tracks the instant its channel is due; the UART task awaits that
//! instant alongside the receive edge and calls [`DeadlineTimer::fired`]
//! before dispatching the timer event. `fired` takes `&self` so it can be
//! reached through the driver's shared accessors.

use core::cell::Cell;

use baudline_hal::{BitTimer, DeadlineSchedule};
use embassy_time::{Duration, Instant, Timer};

/// One bit timer channel
pub struct DeadlineTimer {
    clock_hz: u32,
    schedule: Cell<DeadlineSchedule<Instant, Duration>>,
}

impl DeadlineTimer {
    /// Create a stopped channel counting ticks of a `clock_hz` reference
    pub const fn new(clock_hz: u32) -> Self {
        Self {
            clock_hz,
            schedule: Cell::new(DeadlineSchedule::stopped()),
        }
    }

    /// Instant the channel is next due
    pub fn deadline(&self) -> Option<Instant> {
        self.schedule.get().deadline()
    }

    /// Wait until the channel is due
    ///
    /// Pends forever while the channel is stopped.
    pub async fn wait(deadline: Option<Instant>) {
        match deadline {
            Some(at) => Timer::at(at).await,
            None => core::future::pending().await,
        }
    }

    /// Account for one firing
    pub fn fired(&self) {
        self.update(|schedule| schedule.fired());
    }

    fn update(&self, f: impl FnOnce(&mut DeadlineSchedule<Instant, Duration>)) {
        let mut schedule = self.schedule.get();
        f(&mut schedule);
        self.schedule.set(schedule);
    }

    fn duration(&self, ticks: u32) -> Duration {
        Duration::from_micros(u64::from(ticks) * 1_000_000 / u64::from(self.clock_hz))
    }
}

impl BitTimer for DeadlineTimer {
    fn arm(&mut self, period_ticks: u32) {
        let period = self.duration(period_ticks);
        self.update(|schedule| schedule.arm(Instant::now(), period));
    }

    fn rearm_once(&mut self, delay_ticks: u32) {
        let delay = self.duration(delay_ticks);
        self.update(|schedule| schedule.rearm_once(Instant::now(), delay));
    }

    fn disarm(&mut self) {
        self.update(|schedule| schedule.disarm());
    }

    fn is_armed(&self) -> bool {
        self.deadline().is_some()
    }
}
