//! Discrete-event driver for a [`SoftUart`]
//!
//! The simulator owns the driver and the sim-side handles onto its pins
//! and timers. Each step jumps the clock to the nearest pending event and
//! dispatches in a fixed order for events sharing a tick:
//!
//! 1. transmit timer
//! 2. scheduled receive-line changes
//! 3. receive timer
//!
//! After any step that may move a wire, a latched falling edge on the
//! receive wire is delivered as [`Event::FallingEdge`].

use std::collections::VecDeque;

use baudline_core::{ConfigError, Event, Mailbox, SoftUart, UartConfig};

use crate::clock::SimClock;
use crate::stimulus::{nominal_bit_ticks, Waveform};
use crate::timer::SimTimer;
use crate::wire::{SimInputPin, SimOutputPin, Wire};

/// The driver as wired up by the simulator
pub type SimUart<'m> = SoftUart<'m, SimInputPin, SimOutputPin, SimTimer, SimTimer>;

/// Host simulation of one UART instance and its two wires
pub struct Simulator<'m> {
    clock: SimClock,
    uart: SimUart<'m>,
    rx_wire: Wire,
    tx_wire: Wire,
    rx_timer: SimTimer,
    tx_timer: SimTimer,
    stimulus: VecDeque<(u64, bool)>,
}

impl<'m> Simulator<'m> {
    /// Simulator with separate receive and transmit wires
    pub fn new(config: UartConfig, mailbox: &'m Mailbox) -> Result<Self, ConfigError> {
        let clock = SimClock::new();
        let rx_wire = Wire::new(clock.clone());
        let tx_wire = Wire::new(clock.clone());
        Self::build(clock, config, mailbox, rx_wire, tx_wire)
    }

    /// Simulator with the transmit wire fed straight back into the receiver
    pub fn looped_back(config: UartConfig, mailbox: &'m Mailbox) -> Result<Self, ConfigError> {
        let clock = SimClock::new();
        let wire = Wire::new(clock.clone());
        Self::build(clock, config, mailbox, wire.clone(), wire)
    }

    fn build(
        clock: SimClock,
        config: UartConfig,
        mailbox: &'m Mailbox,
        rx_wire: Wire,
        tx_wire: Wire,
    ) -> Result<Self, ConfigError> {
        let rx_timer = SimTimer::new(clock.clone());
        let tx_timer = SimTimer::new(clock.clone());
        let uart = SoftUart::new(
            config,
            rx_wire.input_pin(),
            tx_wire.output_pin(),
            rx_timer.clone(),
            tx_timer.clone(),
            mailbox,
        )?;

        Ok(Self {
            clock,
            uart,
            rx_wire,
            tx_wire,
            rx_timer,
            tx_timer,
            stimulus: VecDeque::new(),
        })
    }

    /// Current tick
    pub fn now(&self) -> u64 {
        self.clock.now()
    }

    /// Ticks per bit the driver runs at
    pub fn bit_ticks(&self) -> u64 {
        u64::from(self.uart.period().ticks())
    }

    /// Ticks per frame the driver runs at
    pub fn frame_ticks(&self) -> u64 {
        u64::from(self.uart.period().frame_ticks())
    }

    /// Exact bit width a far end at the configured rate would use
    pub fn nominal_bit_ticks(&self) -> f64 {
        let config = self.uart.config();
        nominal_bit_ticks(config.clock_hz, config.baud)
    }

    /// The driver under test
    pub fn uart(&self) -> &SimUart<'m> {
        &self.uart
    }

    /// Wire the receiver listens on
    pub fn rx_wire(&self) -> &Wire {
        &self.rx_wire
    }

    /// Wire the transmitter drives
    pub fn tx_wire(&self) -> &Wire {
        &self.tx_wire
    }

    /// Receive timer channel
    pub fn rx_timer(&self) -> &SimTimer {
        &self.rx_timer
    }

    /// Transmit timer channel
    pub fn tx_timer(&self) -> &SimTimer {
        &self.tx_timer
    }

    /// Queue a byte for transmission at the current tick
    pub fn putc(&mut self, byte: u8) -> bool {
        let queued = self.uart.putc(byte);
        self.dispatch_edge();
        queued
    }

    /// Take a received byte, if any
    pub fn getc(&self) -> Option<u8> {
        self.uart.getc()
    }

    /// Schedule level changes on the receive wire
    ///
    /// Changes dated before the current tick are applied on the next step.
    pub fn drive(&mut self, waveform: &Waveform) {
        let mut merged: Vec<_> = self.stimulus.drain(..).collect();
        merged.extend(waveform.changes());
        merged.sort_by_key(|&(at, _)| at);
        self.stimulus = merged.into();
    }

    /// Run for `ticks` from now
    pub fn run_for(&mut self, ticks: u64) {
        self.run_until(self.now() + ticks);
    }

    /// Process every event up to and including tick `end`
    pub fn run_until(&mut self, end: u64) {
        while let Some(next) = self.next_event() {
            if next > end {
                break;
            }
            self.step(next.max(self.now()));
        }
        if end > self.now() {
            self.clock.set(end);
        }
    }

    /// Run until both directions are idle, giving up after `limit` ticks
    ///
    /// Returns `true` if the driver went idle in time.
    pub fn run_until_idle(&mut self, limit: u64) -> bool {
        let end = self.now() + limit;
        while !self.is_quiet() {
            match self.next_event() {
                Some(next) if next <= end => self.step(next.max(self.now())),
                _ => return false,
            }
        }
        true
    }

    fn is_quiet(&self) -> bool {
        self.uart.is_idle() && !self.uart.mailbox().is_transmitting()
    }

    fn next_event(&self) -> Option<u64> {
        [
            self.tx_timer.deadline(),
            self.stimulus.front().map(|&(at, _)| at),
            self.rx_timer.deadline(),
        ]
        .into_iter()
        .flatten()
        .min()
    }

    fn step(&mut self, tick: u64) {
        self.clock.set(tick);

        if self.tx_timer.deadline() == Some(tick) {
            self.tx_timer.fire();
            self.uart.on_event(Event::TxTimer);
            self.dispatch_edge();
        }

        while let Some(&(at, level)) = self.stimulus.front() {
            if at > tick {
                break;
            }
            self.stimulus.pop_front();
            self.rx_wire.drive(level);
            self.dispatch_edge();
        }

        if self.rx_timer.deadline() == Some(tick) {
            self.rx_timer.fire();
            self.uart.on_event(Event::RxTimer);
        }
    }

    fn dispatch_edge(&mut self) {
        if self.rx_wire.take_falling_edge() {
            self.uart.on_event(Event::FallingEdge);
        }
    }
}
