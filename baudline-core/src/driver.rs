//! The software UART driver
//!
//! [`SoftUart`] owns the receive sampler, the transmit driver and a
//! reference to the shared [`Mailbox`]. Interrupt handlers forward their
//! events to [`SoftUart::on_event`]; the application only ever touches
//! the mailbox, either directly or through [`SoftUart::getc`] /
//! [`SoftUart::putc`] when it also owns the driver (host simulation,
//! single-context firmware).
//!
//! Receive and transmit each use their own timer channel, both paced at
//! the same bit period. Either direction may be mid-frame while the other
//! starts.

use baudline_hal::{BitTimer, InputPin, OutputPin};

use crate::config::{ConfigError, FramingPolicy, UartConfig};
use crate::error::LineError;
use crate::event::Event;
use crate::mailbox::{Deposit, Mailbox};
use crate::rx::{ReceiveSampler, RxOutcome, RxPhase};
use crate::timing::BitPeriod;
use crate::tx::{TransmitDriver, TxOutcome, TxPhase};

/// Software UART: 8N1, fixed baud, one instance
pub struct SoftUart<'m, RX, TX, RT, TT> {
    rx: ReceiveSampler<RX, RT>,
    tx: TransmitDriver<TX, TT>,
    mailbox: &'m Mailbox,
    config: UartConfig,
    period: BitPeriod,
}

impl<'m, RX, TX, RT, TT> SoftUart<'m, RX, TX, RT, TT>
where
    RX: InputPin,
    TX: OutputPin,
    RT: BitTimer,
    TT: BitTimer,
{
    /// Initialise the driver
    ///
    /// Validates the configuration, drives the transmit line idle-high,
    /// stops both timer channels and empties the mailbox. Call once at
    /// startup, before enabling the edge and timer interrupts.
    pub fn new(
        config: UartConfig,
        rx_pin: RX,
        tx_pin: TX,
        rx_timer: RT,
        tx_timer: TT,
        mailbox: &'m Mailbox,
    ) -> Result<Self, ConfigError> {
        let period = config.validate()?;
        mailbox.reset();

        #[cfg(feature = "defmt")]
        defmt::info!(
            "soft uart: {} baud, {} ticks/bit ({} permille error)",
            config.baud,
            period.ticks(),
            period.error_permille()
        );

        Ok(Self {
            rx: ReceiveSampler::new(rx_pin, rx_timer, period),
            tx: TransmitDriver::new(tx_pin, tx_timer, period),
            mailbox,
            config,
            period,
        })
    }

    /// Single entry point for every interrupt source
    pub fn on_event(&mut self, event: Event) {
        match event {
            Event::FallingEdge => self.rx.on_falling_edge(),
            Event::RxTimer => {
                let outcome = self.rx.on_timer();
                self.complete_rx(outcome);
            }
            Event::TxTimer => {
                if self.tx.on_timer() == TxOutcome::FrameDone {
                    self.mailbox.stats().record_sent();
                    self.mailbox.transmit_finished();
                    self.start_next_frame();
                }
            }
            Event::TransmitRequested => {
                // A busy transmitter picks the byte up at its stop bit
                if self.tx.is_idle() {
                    self.start_next_frame();
                }
            }
        }
    }

    /// Take a received byte, if one is waiting
    pub fn getc(&self) -> Option<u8> {
        self.mailbox.try_receive()
    }

    /// Queue a byte and wake the transmitter
    ///
    /// Returns `false` if the transmit slot is still occupied.
    pub fn putc(&mut self, byte: u8) -> bool {
        if !self.mailbox.try_send(byte) {
            return false;
        }
        self.on_event(Event::TransmitRequested);
        true
    }

    /// Check that neither direction has a frame in progress
    ///
    /// When idle both timer channels are stopped.
    pub fn is_idle(&self) -> bool {
        self.rx.is_idle() && self.tx.is_idle()
    }

    /// Current receive phase
    pub fn rx_phase(&self) -> RxPhase {
        self.rx.phase()
    }

    /// Current transmit phase
    pub fn tx_phase(&self) -> TxPhase {
        self.tx.phase()
    }

    /// Receive sampler
    pub fn receiver(&self) -> &ReceiveSampler<RX, RT> {
        &self.rx
    }

    /// Transmit driver
    pub fn transmitter(&self) -> &TransmitDriver<TX, TT> {
        &self.tx
    }

    /// Shared mailbox
    pub fn mailbox(&self) -> &'m Mailbox {
        self.mailbox
    }

    /// Active configuration
    pub fn config(&self) -> &UartConfig {
        &self.config
    }

    /// Derived bit period
    pub fn period(&self) -> BitPeriod {
        self.period
    }

    fn start_next_frame(&mut self) {
        match self.mailbox.take_transmit() {
            Some(byte) => {
                self.tx.begin(byte);
            }
            None => self.tx.release(),
        }
    }

    fn complete_rx(&mut self, outcome: RxOutcome) {
        let mailbox = self.mailbox;
        let stats = mailbox.stats();
        match outcome {
            RxOutcome::Pending | RxOutcome::Spurious => {}
            RxOutcome::FalseStart => {
                stats.record_false_start();
                #[cfg(feature = "defmt")]
                defmt::debug!("soft uart: false start");
            }
            RxOutcome::Byte(byte) => {
                stats.record_received();
                self.deliver(byte);
            }
            RxOutcome::FramingError(byte) => {
                stats.record_framing_error();
                mailbox.latch_error(LineError::Framing);
                #[cfg(feature = "defmt")]
                defmt::warn!("soft uart: framing error (byte {=u8:#x})", byte);

                if self.config.framing == FramingPolicy::Deliver {
                    self.deliver(byte);
                }
            }
        }
    }

    fn deliver(&self, byte: u8) {
        match self.mailbox.deposit(byte, self.config.overrun) {
            Deposit::Stored => {}
            Deposit::Overwrote | Deposit::Dropped => {
                self.mailbox.stats().record_overrun();
                #[cfg(feature = "defmt")]
                defmt::warn!("soft uart: receive overrun");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::OverrunPolicy;
    use core::cell::Cell;

    struct Line<'a>(&'a Cell<bool>);

    impl InputPin for Line<'_> {
        fn is_high(&self) -> bool {
            self.0.get()
        }
    }

    impl OutputPin for Line<'_> {
        fn set_high(&mut self) {
            self.0.set(true);
        }

        fn set_low(&mut self) {
            self.0.set(false);
        }

        fn is_set_high(&self) -> bool {
            self.0.get()
        }
    }

    /// Timer that only remembers whether it is running
    #[derive(Default)]
    struct Flag {
        armed: bool,
    }

    impl BitTimer for Flag {
        fn arm(&mut self, _period_ticks: u32) {
            self.armed = true;
        }

        fn rearm_once(&mut self, _delay_ticks: u32) {
            self.armed = true;
        }

        fn disarm(&mut self) {
            self.armed = false;
        }

        fn is_armed(&self) -> bool {
            self.armed
        }
    }

    type Uart<'a> = SoftUart<'a, Line<'a>, Line<'a>, Flag, Flag>;

    fn uart<'a>(config: UartConfig, rx: &'a Cell<bool>, tx: &'a Cell<bool>, mailbox: &'a Mailbox) -> Uart<'a> {
        SoftUart::new(config, Line(rx), Line(tx), Flag::default(), Flag::default(), mailbox).unwrap()
    }

    /// Feed a whole frame into the receiver, one timer event per bit
    fn feed_frame(uart: &mut Uart<'_>, rx: &Cell<bool>, byte: u8, stop: bool) {
        rx.set(false);
        uart.on_event(Event::FallingEdge);
        uart.on_event(Event::RxTimer);
        for i in 0..8 {
            rx.set(byte & (1 << i) != 0);
            uart.on_event(Event::RxTimer);
        }
        rx.set(stop);
        uart.on_event(Event::RxTimer);
        rx.set(true);
    }

    #[test]
    fn test_init_rejects_bad_config() {
        let rx = Cell::new(true);
        let tx = Cell::new(false);
        let mailbox = Mailbox::new();
        let result = SoftUart::new(
            UartConfig::new(1_000_000, 0),
            Line(&rx),
            Line(&tx),
            Flag::default(),
            Flag::default(),
            &mailbox,
        );
        assert!(matches!(result, Err(ConfigError::ZeroBaud)));
    }

    #[test]
    fn test_init_idles_line_and_timers() {
        let rx = Cell::new(true);
        let tx = Cell::new(false);
        let mailbox = Mailbox::new();
        assert!(mailbox.try_send(1));

        let uart = uart(UartConfig::default(), &rx, &tx, &mailbox);
        assert!(tx.get());
        assert!(uart.is_idle());
        assert!(!uart.receiver().timer().is_armed());
        assert!(!uart.transmitter().timer().is_armed());
        assert!(!mailbox.is_transmit_busy());
        assert_eq!(uart.period().ticks(), 104);
    }

    #[test]
    fn test_received_byte_reaches_mailbox() {
        let rx = Cell::new(true);
        let tx = Cell::new(true);
        let mailbox = Mailbox::new();
        let mut uart = uart(UartConfig::default(), &rx, &tx, &mailbox);

        assert_eq!(uart.getc(), None);
        feed_frame(&mut uart, &rx, b'A', true);
        assert_eq!(uart.getc(), Some(b'A'));
        assert_eq!(uart.getc(), None);
        assert_eq!(mailbox.stats().snapshot().frames_received, 1);
        assert!(uart.is_idle());
    }

    #[test]
    fn test_framing_error_discarded_by_default() {
        let rx = Cell::new(true);
        let tx = Cell::new(true);
        let mailbox = Mailbox::new();
        let mut uart = uart(UartConfig::default(), &rx, &tx, &mailbox);

        feed_frame(&mut uart, &rx, 0x5A, false);
        assert_eq!(uart.getc(), None);
        assert!(mailbox.take_errors().framing);
        assert_eq!(mailbox.stats().snapshot().framing_errors, 1);
    }

    #[test]
    fn test_framing_error_delivered_when_configured() {
        let rx = Cell::new(true);
        let tx = Cell::new(true);
        let mailbox = Mailbox::new();
        let config = UartConfig::default().with_framing(FramingPolicy::Deliver);
        let mut uart = uart(config, &rx, &tx, &mailbox);

        feed_frame(&mut uart, &rx, 0x5A, false);
        assert_eq!(uart.getc(), Some(0x5A));
        assert!(mailbox.take_errors().framing);
    }

    #[test]
    fn test_overrun_policies() {
        for (policy, expected) in [(OverrunPolicy::DropNew, 1), (OverrunPolicy::Overwrite, 2)] {
            let rx = Cell::new(true);
            let tx = Cell::new(true);
            let mailbox = Mailbox::new();
            let mut uart = uart(UartConfig::default().with_overrun(policy), &rx, &tx, &mailbox);

            feed_frame(&mut uart, &rx, 1, true);
            feed_frame(&mut uart, &rx, 2, true);

            assert_eq!(uart.getc(), Some(expected));
            assert!(mailbox.take_errors().overrun);
            assert_eq!(mailbox.stats().snapshot().overruns, 1);
        }
    }

    #[test]
    fn test_false_start_counted() {
        let rx = Cell::new(true);
        let tx = Cell::new(true);
        let mailbox = Mailbox::new();
        let mut uart = uart(UartConfig::default(), &rx, &tx, &mailbox);

        uart.on_event(Event::FallingEdge);
        rx.set(true);
        uart.on_event(Event::RxTimer);

        assert!(uart.is_idle());
        assert_eq!(uart.getc(), None);
        assert!(mailbox.take_errors().is_empty());
        assert_eq!(mailbox.stats().snapshot().false_starts, 1);
    }

    #[test]
    fn test_putc_starts_frame_and_frees_slot() {
        let rx = Cell::new(true);
        let tx = Cell::new(true);
        let mailbox = Mailbox::new();
        let mut uart = uart(UartConfig::default(), &rx, &tx, &mailbox);

        assert!(uart.putc(b'x'));
        assert_eq!(uart.tx_phase(), TxPhase::SendingStart);
        assert!(!tx.get());
        assert!(uart.transmitter().timer().is_armed());
        assert!(!mailbox.is_transmit_busy());
        assert!(mailbox.is_transmitting());

        // Second byte waits in the slot, third is refused
        assert!(uart.putc(b'y'));
        assert!(!uart.putc(b'z'));
    }

    #[test]
    fn test_queued_byte_follows_stop_bit() {
        let rx = Cell::new(true);
        let tx = Cell::new(true);
        let mailbox = Mailbox::new();
        let mut uart = uart(UartConfig::default(), &rx, &tx, &mailbox);

        uart.putc(0x01);
        uart.putc(0x02);
        for _ in 0..10 {
            uart.on_event(Event::TxTimer);
        }

        assert_eq!(uart.tx_phase(), TxPhase::SendingStart);
        assert_eq!(uart.transmitter().frame().pending, 0x02);
        assert!(!tx.get());
        assert!(uart.transmitter().timer().is_armed());

        for _ in 0..10 {
            uart.on_event(Event::TxTimer);
        }
        assert!(uart.is_idle());
        assert!(tx.get());
        assert!(!uart.transmitter().timer().is_armed());
        assert!(!mailbox.is_transmitting());
        assert_eq!(mailbox.stats().snapshot().frames_sent, 2);
    }

    #[test]
    fn test_transmit_request_while_busy_is_deferred() {
        let rx = Cell::new(true);
        let tx = Cell::new(true);
        let mailbox = Mailbox::new();
        let mut uart = uart(UartConfig::default(), &rx, &tx, &mailbox);

        uart.putc(0xAA);
        uart.on_event(Event::TxTimer);
        let frame = uart.transmitter().frame();

        assert!(mailbox.try_send(0x55));
        uart.on_event(Event::TransmitRequested);
        assert_eq!(uart.transmitter().frame(), frame);
        assert!(mailbox.is_transmit_busy());
    }

    /// Receive pin that counts level reads
    struct CountingLine<'a> {
        level: &'a Cell<bool>,
        reads: &'a Cell<u32>,
    }

    impl InputPin for CountingLine<'_> {
        fn is_high(&self) -> bool {
            self.reads.set(self.reads.get() + 1);
            self.level.get()
        }
    }

    #[test]
    fn test_only_rx_timer_reads_rx_pin() {
        let level = Cell::new(true);
        let reads = Cell::new(0);
        let tx = Cell::new(true);
        let mailbox = Mailbox::new();
        let rx = CountingLine {
            level: &level,
            reads: &reads,
        };
        let mut uart =
            SoftUart::new(UartConfig::default(), rx, Line(&tx), Flag::default(), Flag::default(), &mailbox).unwrap();

        // Two whole frames out, plus a start edge in the middle of them
        uart.putc(0x55);
        uart.putc(0xAA);
        level.set(false);
        uart.on_event(Event::FallingEdge);
        uart.on_event(Event::TransmitRequested);
        for _ in 0..20 {
            uart.on_event(Event::TxTimer);
        }
        assert_eq!(reads.get(), 0);
        assert_eq!(mailbox.stats().snapshot().frames_sent, 2);

        uart.on_event(Event::RxTimer);
        assert_eq!(reads.get(), 1);
        assert_eq!(uart.rx_phase(), RxPhase::SamplingBit(0));
    }

    #[test]
    fn test_full_duplex() {
        let rx = Cell::new(true);
        let tx = Cell::new(true);
        let mailbox = Mailbox::new();
        let mut uart = uart(UartConfig::default(), &rx, &tx, &mailbox);

        uart.putc(b'T');
        rx.set(false);
        uart.on_event(Event::FallingEdge);
        uart.on_event(Event::TxTimer);
        uart.on_event(Event::RxTimer);

        assert_eq!(uart.rx_phase(), RxPhase::SamplingBit(0));
        assert_eq!(uart.tx_phase(), TxPhase::SendingBit(0));
        assert!(!uart.is_idle());
    }
}
