//! Bit-layer task
//!
//! Plays the role of the pin-change and timer interrupt vectors: waits
//! for whichever of the receive edge, the two timer deadlines or the
//! transmit doorbell comes first and hands it to the driver.
//!
//! The edge future survives transmit events so an edge that arrives
//! while a transmit bit is being driven is still caught. It is dropped
//! before the receiver samples the line and re-armed afterwards.

use baudline_core::{Event, SoftUart, UartConfig};
use baudline_hal_rp2040::{DeadlineTimer, InputLine, OutputLine};
use defmt::*;
use core::pin::pin;

use embassy_futures::select::{select4, Either4};
use embassy_rp::gpio::AnyPin;
use embassy_rp::Peri;

use crate::channels::{LINE_ACTIVITY, MAILBOX, TX_KICK};

/// Software UART task
#[embassy_executor::task]
pub async fn uart_task(rx_pin: Peri<'static, AnyPin>, tx_pin: Peri<'static, AnyPin>, config: UartConfig) {
    let rx = InputLine::new(rx_pin);
    let tx = OutputLine::new(tx_pin, true);
    let rx_timer = DeadlineTimer::new(config.clock_hz);
    let tx_timer = DeadlineTimer::new(config.clock_hz);

    let mut uart = match SoftUart::new(config, &rx, tx, rx_timer, tx_timer, &MAILBOX) {
        Ok(uart) => uart,
        Err(e) => {
            error!("UART config rejected: {:?}", e);
            return;
        }
    };
    info!("UART task started: {} baud, {} ticks/bit", config.baud, uart.period().ticks());

    loop {
        let mut edge = pin!(rx.wait_for_falling_edge());

        let event = loop {
            let rx_due = uart.receiver().timer().deadline();
            let tx_due = uart.transmitter().timer().deadline();

            let event = match select4(
                edge.as_mut(),
                DeadlineTimer::wait(rx_due),
                DeadlineTimer::wait(tx_due),
                TX_KICK.wait(),
            )
            .await
            {
                Either4::First(()) => Event::FallingEdge,
                Either4::Second(()) => Event::RxTimer,
                Either4::Third(()) => {
                    uart.transmitter().timer().fired();
                    Event::TxTimer
                }
                Either4::Fourth(()) => Event::TransmitRequested,
            };

            if event == Event::FallingEdge || event.samples_rx_line() {
                break event;
            }

            uart.on_event(event);
            LINE_ACTIVITY.signal(());
        };

        // Edge future is gone here; the receive line is free to read.
        if event.samples_rx_line() {
            uart.receiver().timer().fired();
        }
        uart.on_event(event);

        if event != Event::FallingEdge {
            LINE_ACTIVITY.signal(());
        }
    }
}
