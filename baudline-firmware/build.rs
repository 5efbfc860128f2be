//! Build script for baudline-firmware
//!
//! - Sets up linker search paths for memory.x
//! - Validates uart.toml at compile time
//! - Generates the line settings and pin assignments from uart.toml

use std::collections::HashSet;
use std::env;
use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};

use baudline_core::config::{MAX_BAUD_ERROR_PERMILLE, MIN_TICKS_PER_BIT};
use baudline_core::{BitPeriod, ConfigError};

/// GPIOs available on the RP2040
const GPIO_COUNT: u8 = 30;

fn main() {
    setup_linker();
    let config = load_config();
    let uart = validate_uart(&config);
    let pins = validate_pins(&config);
    generate(&uart, &pins);
}

/// Set up linker search paths for memory.x
fn setup_linker() {
    let out_dir = PathBuf::from(env::var("OUT_DIR").unwrap());

    // Copy memory.x to the output directory
    let memory_x = include_bytes!("memory.x");
    let mut f = File::create(out_dir.join("memory.x")).unwrap();
    f.write_all(memory_x).unwrap();

    // Tell rustc where to find memory.x
    println!("cargo:rustc-link-search={}", out_dir.display());

    println!("cargo:rustc-link-arg-bins=--nmagic");
    println!("cargo:rustc-link-arg-bins=-Tlink.x");
    println!("cargo:rustc-link-arg-bins=-Tlink-rp.x");
    if env::var_os("CARGO_FEATURE_DEFMT").is_some() {
        println!("cargo:rustc-link-arg-bins=-Tdefmt.x");
    }

    // Re-run if memory.x changes
    println!("cargo:rerun-if-changed=memory.x");
    println!("cargo:rerun-if-changed=build.rs");
}

/// Read and parse uart.toml
fn load_config() -> toml::Value {
    println!("cargo:rerun-if-changed=uart.toml");

    let config_path = Path::new("uart.toml");

    if !config_path.exists() {
        panic!(
            "\n\
            ╔══════════════════════════════════════════════════════════════════╗\n\
            ║  ERROR: uart.toml not found!                                     ║\n\
            ║                                                                  ║\n\
            ║  The firmware requires a uart.toml configuration file.           ║\n\
            ║  Please create one in the baudline-firmware directory.           ║\n\
            ╚══════════════════════════════════════════════════════════════════╝\n"
        );
    }

    let content = match fs::read_to_string(config_path) {
        Ok(content) => content,
        Err(e) => {
            panic!(
                "\n\
                ╔══════════════════════════════════════════════════════════════════╗\n\
                ║  ERROR: Failed to read uart.toml                                 ║\n\
                ║                                                                  ║\n\
                ║  Error: {:<56} ║\n\
                ╚══════════════════════════════════════════════════════════════════╝\n",
                e
            );
        }
    };

    match toml::from_str(&content) {
        Ok(value) => value,
        Err(e) => {
            panic!(
                "\n\
                ╔══════════════════════════════════════════════════════════════════╗\n\
                ║  ERROR: Invalid TOML syntax in uart.toml                         ║\n\
                ╠══════════════════════════════════════════════════════════════════╣\n\
                {}\n\
                ╚══════════════════════════════════════════════════════════════════╝\n",
                format_error_lines(&e.to_string())
            );
        }
    }
}

/// Format error message lines with box drawing
fn format_error_lines(msg: &str) -> String {
    msg.lines()
        .map(|line| {
            let truncated = if line.len() > 64 {
                format!("{}...", &line[..61])
            } else {
                line.to_string()
            };
            format!("║  {:<64} ║", truncated)
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// Abort the build with a list of problems
fn fail(title: &str, errors: &[String]) -> ! {
    panic!(
        "\n\
        ╔══════════════════════════════════════════════════════════════════╗\n\
        ║  ERROR: {:<56} ║\n\
        ╠══════════════════════════════════════════════════════════════════╣\n\
        {}\n\
        ╚══════════════════════════════════════════════════════════════════╝\n",
        title,
        errors
            .iter()
            .map(|e| format!("║  • {:<62} ║", e))
            .collect::<Vec<_>>()
            .join("\n")
    );
}

struct UartSettings {
    clock_hz: u32,
    baud: u32,
    framing: &'static str,
    overrun: &'static str,
}

/// Validate the [uart] section
fn validate_uart(config: &toml::Value) -> UartSettings {
    let uart = match config.get("uart") {
        Some(toml::Value::Table(t)) => t,
        _ => fail("Invalid uart configuration", &["Missing [uart] section".into()]),
    };

    let mut errors = Vec::new();

    let mut positive = |key: &str| match uart.get(key) {
        Some(toml::Value::Integer(v)) if *v > 0 && *v <= i64::from(u32::MAX) => *v as u32,
        Some(_) => {
            errors.push(format!("[uart] {} must be a positive 32-bit integer", key));
            0
        }
        None => {
            errors.push(format!("[uart] missing '{}'", key));
            0
        }
    };
    let clock_hz = positive("clock_hz");
    let baud = positive("baud");

    let framing = match uart.get("framing").and_then(|v| v.as_str()) {
        None | Some("discard") => "Discard",
        Some("deliver") => "Deliver",
        Some(_) => {
            errors.push("[uart] framing must be 'discard' or 'deliver'".into());
            "Discard"
        }
    };

    let overrun = match uart.get("overrun").and_then(|v| v.as_str()) {
        None | Some("drop_new") => "DropNew",
        Some("overwrite") => "Overwrite",
        Some(_) => {
            errors.push("[uart] overrun must be 'drop_new' or 'overwrite'".into());
            "DropNew"
        }
    };

    // Same derivation the driver runs at startup
    if clock_hz > 0 && baud > 0 {
        match BitPeriod::new(clock_hz, baud) {
            Ok(_) => {}
            Err(ConfigError::BaudTooHigh { ticks_per_bit }) => errors.push(format!(
                "[uart] {} baud leaves {} ticks/bit (min {})",
                baud, ticks_per_bit, MIN_TICKS_PER_BIT
            )),
            Err(ConfigError::BaudMismatch { error_permille }) => errors.push(format!(
                "[uart] {} baud is off by {} permille at {} Hz (max {})",
                baud, error_permille, clock_hz, MAX_BAUD_ERROR_PERMILLE
            )),
            Err(e) => errors.push(format!("[uart] rejected: {:?}", e)),
        }
    }

    if !errors.is_empty() {
        fail("Invalid uart configuration", &errors);
    }

    UartSettings {
        clock_hz,
        baud,
        framing,
        overrun,
    }
}

/// Parse a pin string such as "gpio11"
fn parse_pin_string(s: &str) -> Option<u8> {
    let pin: u8 = s.trim().strip_prefix("gpio")?.parse().ok()?;
    (pin < GPIO_COUNT).then_some(pin)
}

struct PinSettings {
    rx: u8,
    tx: u8,
    led0: u8,
    led1: u8,
}

/// Validate the [pins] section
fn validate_pins(config: &toml::Value) -> PinSettings {
    let pins = match config.get("pins") {
        Some(toml::Value::Table(t)) => t,
        _ => fail("Invalid pin configuration", &["Missing [pins] section".into()]),
    };

    let mut errors = Vec::new();
    let mut seen = HashSet::new();

    let mut pin = |key: &str| match pins.get(key).and_then(|v| v.as_str()) {
        Some(s) => match parse_pin_string(s) {
            Some(n) => {
                if !seen.insert(n) {
                    errors.push(format!("[pins] {} reuses gpio{}", key, n));
                }
                n
            }
            None => {
                errors.push(format!("[pins] {} = '{}' is not gpio0-gpio29", key, s));
                0
            }
        },
        None => {
            errors.push(format!("[pins] missing '{}'", key));
            0
        }
    };

    let settings = PinSettings {
        rx: pin("rx"),
        tx: pin("tx"),
        led0: pin("led0"),
        led1: pin("led1"),
    };

    if !errors.is_empty() {
        fail("Invalid pin configuration", &errors);
    }

    settings
}

/// Write the generated sources to OUT_DIR
fn generate(uart: &UartSettings, pins: &PinSettings) {
    let out_dir = PathBuf::from(env::var("OUT_DIR").unwrap());

    let config_rs = format!(
        "// Generated from uart.toml by build.rs\n\
         pub const CLOCK_HZ: u32 = {};\n\
         pub const BAUD: u32 = {};\n\
         pub const FRAMING: baudline_core::FramingPolicy = baudline_core::FramingPolicy::{};\n\
         pub const OVERRUN: baudline_core::OverrunPolicy = baudline_core::OverrunPolicy::{};\n",
        uart.clock_hz, uart.baud, uart.framing, uart.overrun
    );
    fs::write(out_dir.join("uart_config.rs"), config_rs).unwrap();

    let pins_rs = format!(
        "// Generated from uart.toml by build.rs\n\
         /// Take (rx, tx, led0, led1) from peripherals\n\
         macro_rules! take_uart_pins {{\n\
         \x20   ($p:expr) => {{\n\
         \x20       (\n\
         \x20           baudline_hal_rp2040::take_pin!($p, {}),\n\
         \x20           baudline_hal_rp2040::take_pin!($p, {}),\n\
         \x20           baudline_hal_rp2040::take_pin!($p, {}),\n\
         \x20           baudline_hal_rp2040::take_pin!($p, {}),\n\
         \x20       )\n\
         \x20   }};\n\
         }}\n",
        pins.rx, pins.tx, pins.led0, pins.led1
    );
    fs::write(out_dir.join("uart_pins.rs"), pins_rs).unwrap();

    println!(
        "cargo:warning=uart.toml validated: {} baud, rx gpio{}, tx gpio{}",
        uart.baud, pins.rx, pins.tx
    );
}
