//! Single-slot byte mailbox between the bit layer and the application
//!
//! One slot inbound, one slot outbound. All slot state lives in a single
//! `Cell` behind a `critical_section::Mutex`, so every read-modify-write
//! from main context is atomic with respect to the edge and timer
//! interrupts. Critical sections are a handful of instructions long.
//!
//! The mailbox is designed to live in a `static` for the life of the
//! program:
//!
//! ```ignore
//! static MAILBOX: Mailbox = Mailbox::new();
//! ```

use core::cell::Cell;

use critical_section::Mutex;

use crate::config::OverrunPolicy;
use crate::error::{LineError, LineErrors, LineStats};

/// Result of depositing a received byte
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Deposit {
    /// Slot was empty, byte stored
    Stored,
    /// Slot was full, the unread byte was replaced
    Overwrote,
    /// Slot was full, the new byte was dropped
    Dropped,
}

#[derive(Debug, Clone, Copy)]
struct Slots {
    /// Received byte waiting for the application
    received: Option<u8>,
    /// Byte waiting for the transmitter to latch it
    transmit: Option<u8>,
    /// A frame is being shifted out
    transmitting: bool,
    /// Latched error flags
    errors: LineErrors,
}

impl Slots {
    const EMPTY: Self = Self {
        received: None,
        transmit: None,
        transmitting: false,
        errors: LineErrors::none(),
    };
}

/// Byte mailbox shared between interrupt and main context
pub struct Mailbox {
    slots: Mutex<Cell<Slots>>,
    stats: LineStats,
}

impl Default for Mailbox {
    fn default() -> Self {
        Self::new()
    }
}

impl Mailbox {
    /// Create an empty mailbox
    pub const fn new() -> Self {
        Self {
            slots: Mutex::new(Cell::new(Slots::EMPTY)),
            stats: LineStats::new(),
        }
    }

    fn update<R>(&self, f: impl FnOnce(&mut Slots) -> R) -> R {
        critical_section::with(|cs| {
            let cell = self.slots.borrow(cs);
            let mut slots = cell.get();
            let result = f(&mut slots);
            cell.set(slots);
            result
        })
    }

    fn read(&self) -> Slots {
        critical_section::with(|cs| self.slots.borrow(cs).get())
    }

    // ---- application side ----

    /// Take the received byte, if any
    ///
    /// Read and clear happen in one critical section, so a deposit racing
    /// with this call lands either entirely before or entirely after it.
    pub fn try_receive(&self) -> Option<u8> {
        self.update(|slots| slots.received.take())
    }

    /// Check whether a received byte is waiting
    pub fn has_received(&self) -> bool {
        self.read().received.is_some()
    }

    /// Place a byte in the transmit slot
    ///
    /// Returns `false` if the slot still holds a byte the transmitter has
    /// not latched yet. The caller must then retry later; there is no
    /// queue beyond this one slot.
    pub fn try_send(&self, byte: u8) -> bool {
        self.update(|slots| {
            if slots.transmit.is_some() {
                false
            } else {
                slots.transmit = Some(byte);
                true
            }
        })
    }

    /// Check whether the transmit slot is occupied
    pub fn is_transmit_busy(&self) -> bool {
        self.read().transmit.is_some()
    }

    /// Check whether any byte is queued or still on the wire
    pub fn is_transmitting(&self) -> bool {
        let slots = self.read();
        slots.transmitting || slots.transmit.is_some()
    }

    /// Take and clear the latched error flags
    pub fn take_errors(&self) -> LineErrors {
        self.update(|slots| core::mem::take(&mut slots.errors))
    }

    /// Line counters
    pub fn stats(&self) -> &LineStats {
        &self.stats
    }

    // ---- interrupt side ----

    /// Empty every slot and zero the counters
    pub(crate) fn reset(&self) {
        self.update(|slots| *slots = Slots::EMPTY);
        self.stats.reset();
    }

    /// Store a completed byte according to `policy`
    pub(crate) fn deposit(&self, byte: u8, policy: OverrunPolicy) -> Deposit {
        self.update(|slots| {
            if slots.received.is_none() {
                slots.received = Some(byte);
                return Deposit::Stored;
            }

            slots.errors.set(LineError::Overrun);
            match policy {
                OverrunPolicy::Overwrite => {
                    slots.received = Some(byte);
                    Deposit::Overwrote
                }
                OverrunPolicy::DropNew => Deposit::Dropped,
            }
        })
    }

    /// Latch an error flag
    pub(crate) fn latch_error(&self, error: LineError) {
        self.update(|slots| slots.errors.set(error));
    }

    /// Move the pending transmit byte into the transmitter
    ///
    /// Frees the slot for the next byte and marks the line busy.
    pub(crate) fn take_transmit(&self) -> Option<u8> {
        self.update(|slots| {
            let byte = slots.transmit.take();
            if byte.is_some() {
                slots.transmitting = true;
            }
            byte
        })
    }

    /// Mark the transmit line idle
    pub(crate) fn transmit_finished(&self) {
        self.update(|slots| slots.transmitting = false);
    }
}
