//! Bracket-echo reference application
//!
//! Every received character is sent back as `[c]`. The digits `0` to `3`
//! additionally select the state of two indicator outputs, read as a
//! two-bit number: bit 0 drives indicator 0, bit 1 drives indicator 1.
//! Other characters leave the indicators alone.
//!
//! The application never blocks. Replies wait in a small outbox and go
//! out one byte per [`EchoApp::poll`] as the transmit slot frees up; while
//! the outbox cannot take a whole reply, received bytes are left in the
//! mailbox.

use heapless::Deque;

use crate::mailbox::Mailbox;

/// Outbox capacity in bytes
pub const OUTBOX_SIZE: usize = 16;

/// Bytes in one reply
const REPLY_LEN: usize = 3;

/// Requested state of the two indicator outputs
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Indicators {
    /// Indicator 0 lit
    pub led0: bool,
    /// Indicator 1 lit
    pub led1: bool,
}

impl Indicators {
    /// Decode a command digit
    pub fn from_digit(c: u8) -> Option<Self> {
        match c {
            b'0'..=b'3' => {
                let value = c - b'0';
                Some(Self {
                    led0: value & 0b01 != 0,
                    led1: value & 0b10 != 0,
                })
            }
            _ => None,
        }
    }
}

/// Reply for one received character
pub fn reply(c: u8) -> [u8; REPLY_LEN] {
    [b'[', c, b']']
}

/// Echo application state
#[derive(Debug, Default)]
pub struct EchoApp {
    outbox: Deque<u8, OUTBOX_SIZE>,
}

impl EchoApp {
    /// Create an application with an empty outbox
    pub const fn new() -> Self {
        Self {
            outbox: Deque::new(),
        }
    }

    /// Bytes waiting to be sent
    pub fn pending(&self) -> usize {
        self.outbox.len()
    }

    /// Whether the outbox has room for a whole reply
    pub fn can_accept(&self) -> bool {
        self.outbox.capacity() - self.outbox.len() >= REPLY_LEN
    }

    /// Whether another [`EchoApp::poll`] would make no progress
    ///
    /// True when no received byte can be taken and no outbox byte can be
    /// handed to the transmitter. Only the bit layer can change that.
    pub fn is_waiting(&self, mailbox: &Mailbox) -> bool {
        let cannot_read = !mailbox.has_received() || !self.can_accept();
        let cannot_send = self.outbox.is_empty() || mailbox.is_transmit_busy();
        cannot_read && cannot_send
    }

    /// One pass of the main loop
    ///
    /// Returns the indicator state to apply if the character just read was
    /// a command digit. Call `doorbell` whenever a byte was queued so the
    /// transmitter wakes up.
    pub fn poll(&mut self, mailbox: &Mailbox, doorbell: impl FnOnce()) -> Option<Indicators> {
        let mut indicators = None;

        if self.can_accept() {
            if let Some(c) = mailbox.try_receive() {
                for byte in reply(c) {
                    // Room was checked above
                    let _ = self.outbox.push_back(byte);
                }
                indicators = Indicators::from_digit(c);
            }
        }

        if let Some(&byte) = self.outbox.front() {
            if mailbox.try_send(byte) {
                self.outbox.pop_front();
                doorbell();
            }
        }

        indicators
    }
}
