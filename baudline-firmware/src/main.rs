//! Baudline - Software UART demo firmware
//!
//! Bracket-echo application for RP2040 boards: every character received
//! on the software UART pins is echoed back as `[c]`, and the digits
//! `0` to `3` switch the two indicator LEDs.
//!
//! The bit layer runs on a high-priority interrupt executor so that edge
//! and timer handling preempts the application, the way interrupt
//! vectors would on a bare-metal part.

#![no_std]
#![no_main]

use defmt::*;
use embassy_executor::{InterruptExecutor, Spawner};
use embassy_rp::interrupt;
use embassy_rp::interrupt::{InterruptExt, Priority};
use {defmt_rtt as _, panic_probe as _};

use baudline_hal_rp2040::OutputLine;

mod channels;
mod config;
mod tasks;

include!(concat!(env!("OUT_DIR"), "/uart_pins.rs"));

/// Executor for the bit layer
static EXECUTOR_UART: InterruptExecutor = InterruptExecutor::new();

#[interrupt]
unsafe fn SWI_IRQ_1() {
    EXECUTOR_UART.on_interrupt()
}

/// Main entry point
#[embassy_executor::main]
async fn main(spawner: Spawner) {
    info!("Baudline firmware starting...");

    let p = embassy_rp::init(Default::default());
    info!("Peripherals initialized");

    let (rx_pin, tx_pin, led0_pin, led1_pin) = take_uart_pins!(p);
    let led0 = OutputLine::new(led0_pin, false);
    let led1 = OutputLine::new(led1_pin, false);

    // Bit layer preempts everything in thread mode
    interrupt::SWI_IRQ_1.set_priority(Priority::P1);
    let uart_spawner = EXECUTOR_UART.start(interrupt::SWI_IRQ_1);
    uart_spawner
        .spawn(tasks::uart_task(rx_pin, tx_pin, config::uart_config()))
        .unwrap();

    spawner.spawn(tasks::echo_task(led0, led1)).unwrap();
    spawner.spawn(tasks::status_task()).unwrap();

    info!("All tasks spawned");
}
