//! Embassy async tasks
//!
//! The bit layer runs on a high-priority interrupt executor; everything
//! else runs in thread mode and talks to it through the mailbox.

pub mod echo;
pub mod status;
pub mod uart;

pub use echo::echo_task;
pub use status::status_task;
pub use uart::uart_task;
