//! Line settings baked in from uart.toml

use baudline_core::UartConfig;

include!(concat!(env!("OUT_DIR"), "/uart_config.rs"));

/// Driver configuration from uart.toml
pub const fn uart_config() -> UartConfig {
    UartConfig::new(CLOCK_HZ, BAUD)
        .with_framing(FRAMING)
        .with_overrun(OVERRUN)
}
