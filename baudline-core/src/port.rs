//! Non-blocking serial port over the mailbox
//!
//! [`SerialPort`] is the handle the application keeps. It implements the
//! `nb`-style [`UartRx`]/[`UartTx`] traits and rings a doorbell after
//! every queued byte so the transmitter notices it, typically by pending
//! the software interrupt that runs the bit layer.

use core::convert::Infallible;

use baudline_hal::{UartRx, UartTx};

use crate::error::LineError;
use crate::mailbox::Mailbox;

/// Application-side handle to the software UART
#[derive(Clone, Copy)]
pub struct SerialPort<'m> {
    mailbox: &'m Mailbox,
    doorbell: fn(),
}

impl<'m> SerialPort<'m> {
    /// Create a port; `doorbell` is called after each queued byte
    pub const fn new(mailbox: &'m Mailbox, doorbell: fn()) -> Self {
        Self { mailbox, doorbell }
    }

    /// Shared mailbox
    pub fn mailbox(&self) -> &'m Mailbox {
        self.mailbox
    }
}

impl UartRx for SerialPort<'_> {
    type Error = LineError;

    /// Latched line errors are reported once, ahead of the next byte
    fn read(&mut self) -> nb::Result<u8, Self::Error> {
        if let Some(error) = self.mailbox.take_errors().first() {
            return Err(nb::Error::Other(error));
        }
        self.mailbox.try_receive().ok_or(nb::Error::WouldBlock)
    }
}

impl UartTx for SerialPort<'_> {
    type Error = Infallible;

    fn write(&mut self, byte: u8) -> nb::Result<(), Self::Error> {
        if !self.mailbox.try_send(byte) {
            return Err(nb::Error::WouldBlock);
        }
        (self.doorbell)();
        Ok(())
    }

    fn flush(&mut self) -> nb::Result<(), Self::Error> {
        if self.mailbox.is_transmitting() {
            Err(nb::Error::WouldBlock)
        } else {
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::OverrunPolicy;
    use core::sync::atomic::{AtomicU32, Ordering};

    fn no_doorbell() {}

    #[test]
    fn test_read_would_block_when_empty() {
        let mailbox = Mailbox::new();
        let mut port = SerialPort::new(&mailbox, no_doorbell);
        assert_eq!(port.read(), Err(nb::Error::WouldBlock));
    }

    #[test]
    fn test_read_reports_error_before_byte() {
        let mailbox = Mailbox::new();
        mailbox.deposit(b'a', OverrunPolicy::DropNew);
        mailbox.deposit(b'b', OverrunPolicy::DropNew);

        let mut port = SerialPort::new(&mailbox, no_doorbell);
        assert_eq!(port.read(), Err(nb::Error::Other(LineError::Overrun)));
        assert_eq!(port.read(), Ok(b'a'));
        assert_eq!(port.read(), Err(nb::Error::WouldBlock));
    }

    #[test]
    fn test_write_rings_doorbell() {
        static RINGS: AtomicU32 = AtomicU32::new(0);
        fn ring() {
            RINGS.fetch_add(1, Ordering::Relaxed);
        }

        let mailbox = Mailbox::new();
        let mut port = SerialPort::new(&mailbox, ring);

        assert_eq!(port.write(b'x'), Ok(()));
        assert_eq!(port.write(b'y'), Err(nb::Error::WouldBlock));
        assert_eq!(RINGS.load(Ordering::Relaxed), 1);
        assert_eq!(port.flush(), Err(nb::Error::WouldBlock));

        assert_eq!(mailbox.take_transmit(), Some(b'x'));
        mailbox.transmit_finished();
        assert_eq!(port.flush(), Ok(()));
    }
}
