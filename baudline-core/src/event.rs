//! Events that drive the bit layer
//!
//! Two interrupt sources feed the driver: the receive pin's edge detector
//! and the timer channels. The transmit request is raised from main
//! context after a byte has been placed in the mailbox, typically by
//! pending a software interrupt.

/// Events accepted by [`crate::SoftUart::on_event`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Event {
    /// Falling edge seen on the receive pin
    FallingEdge,
    /// Receive timer channel fired
    RxTimer,
    /// Transmit timer channel fired
    TxTimer,
    /// A byte was placed in the transmit slot
    TransmitRequested,
}

impl Event {
    /// Check whether handling this event reads the receive pin
    ///
    /// Only receive timer firings sample the line. Everything else leaves
    /// the pin alone, so an edge detector on it can stay armed while they
    /// are handled.
    pub const fn samples_rx_line(self) -> bool {
        matches!(self, Event::RxTimer)
    }
}
