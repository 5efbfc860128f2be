//! Host-side simulation of the software UART
//!
//! Time is counted in timer ticks on a shared [`SimClock`]. Pins are
//! views onto a [`Wire`] that records every level change, and each
//! [`SimTimer`] channel remembers its next deadline. The [`Simulator`]
//! walks from deadline to deadline, forwarding timer firings and falling
//! edges to the driver exactly the way the interrupt vectors would on
//! hardware, so a run is fully deterministic.
//!
//! ```ignore
//! let mailbox = Mailbox::new();
//! let mut sim = Simulator::looped_back(UartConfig::default(), &mailbox)?;
//! sim.putc(b'A');
//! sim.run_for(sim.frame_ticks());
//! assert_eq!(sim.getc(), Some(b'A'));
//! ```

pub mod clock;
pub mod simulator;
pub mod stimulus;
pub mod timer;
pub mod wire;

pub use clock::SimClock;
pub use simulator::{SimUart, Simulator};
pub use stimulus::{nominal_bit_ticks, Waveform};
pub use timer::SimTimer;
pub use wire::{SimInputPin, SimOutputPin, Wire};
