//! UART serial communication abstractions
//!
//! Byte-level traits in the `nb` style: every call returns immediately,
//! with [`nb::Error::WouldBlock`] standing in for "not yet". Callers that
//! really want to wait can wrap a call in `nb::block!`, but nothing in
//! this workspace does so from interrupt context.

/// UART transmitter
pub trait UartTx {
    /// Error type for transmit operations
    type Error;

    /// Queue one byte for transmission
    ///
    /// Returns `WouldBlock` when the transmit slot is still occupied.
    fn write(&mut self, byte: u8) -> nb::Result<(), Self::Error>;

    /// Check that every queued byte has left the wire
    fn flush(&mut self) -> nb::Result<(), Self::Error>;
}

/// UART receiver
pub trait UartRx {
    /// Error type for receive operations
    type Error;

    /// Take the next received byte
    ///
    /// Returns `WouldBlock` when nothing is waiting.
    fn read(&mut self) -> nb::Result<u8, Self::Error>;
}

/// Combined UART interface
pub trait Uart: UartTx + UartRx {}

// Blanket implementation
impl<T: UartTx + UartRx> Uart for T {}
