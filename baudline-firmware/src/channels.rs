//! State shared between the bit-layer task and the application
//!
//! The mailbox is the only data path. The signals are doorbells only:
//! they carry no data and coalesce if raised twice.

use baudline_core::Mailbox;
use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::signal::Signal;

/// Byte mailbox between the bit layer and the echo application
pub static MAILBOX: Mailbox = Mailbox::new();

/// A byte was placed in the transmit slot (application -> bit layer)
pub static TX_KICK: Signal<CriticalSectionRawMutex, ()> = Signal::new();

/// The bit layer finished handling a timer or transmit event
/// (bit layer -> application)
pub static LINE_ACTIVITY: Signal<CriticalSectionRawMutex, ()> = Signal::new();

/// Doorbell handed to the application for queued bytes
pub fn ring_tx_kick() {
    TX_KICK.signal(());
}
