//! Build script for dmx512-firmware
//!
//! - Sets up linker search paths for memory.x
//! - Validates dmx512.toml at compile time
//! - Generates the configuration constants the firmware includes

use std::env;
use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};

use dmx512_core::config::SerialConfig;
use dmx512_core::dmx::{DmxTiming, CHANNEL_COUNT};
use dmx512_core::serial::TX_CAPACITY;
use dmx512_hal::uart::{DataBits, UartConfig};
use serde::Deserialize;

/// Highest priority level the 4-bit F4 NVIC can encode
const MAX_INTERRUPT_PRIORITY: u8 = 15;

#[derive(Deserialize)]
#[serde(deny_unknown_fields)]
struct FirmwareConfig {
    dmx: DmxSection,
    debug: DebugSection,
}

#[derive(Deserialize)]
#[serde(deny_unknown_fields)]
struct DmxSection {
    frame_interval_ms: u64,
    timing: DmxTiming,
    serial: SerialConfig,
}

#[derive(Deserialize)]
#[serde(deny_unknown_fields)]
struct DebugSection {
    serial: SerialConfig,
}

fn main() {
    setup_linker();
    let config = validate_config();
    generate_constants(&config);
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
    println!("cargo:rustc-link-arg-bins=-Tdefmt.x");

    // Re-run if memory.x changes
    println!("cargo:rerun-if-changed=memory.x");
    println!("cargo:rerun-if-changed=build.rs");
}

/// Validate dmx512.toml configuration at compile time
fn validate_config() -> FirmwareConfig {
    println!("cargo:rerun-if-changed=dmx512.toml");

    let config_path = Path::new("dmx512.toml");

    if !config_path.exists() {
        panic!(
            "\n\
            ╔══════════════════════════════════════════════════════════════════╗\n\
            ║  ERROR: dmx512.toml not found!                                   ║\n\
            ║                                                                  ║\n\
            ║  The firmware requires a dmx512.toml configuration file.         ║\n\
            ║  Please create one in the dmx512-firmware directory.             ║\n\
            ╚══════════════════════════════════════════════════════════════════╝\n"
        );
    }

    let config_content = match fs::read_to_string(config_path) {
        Ok(content) => content,
        Err(e) => {
            panic!(
                "\n\
                ╔══════════════════════════════════════════════════════════════════╗\n\
                ║  ERROR: Failed to read dmx512.toml                               ║\n\
                ║                                                                  ║\n\
                ║  Error: {:<56} ║\n\
                ╚══════════════════════════════════════════════════════════════════╝\n",
                e
            );
        }
    };

    // Syntax and shape in one pass: unknown keys and bad enum names fail here
    let config: FirmwareConfig = match toml::from_str(&config_content) {
        Ok(config) => config,
        Err(e) => {
            let error_msg = e.to_string();
            panic!(
                "\n\
                ╔══════════════════════════════════════════════════════════════════╗\n\
                ║  ERROR: Invalid dmx512.toml                                      ║\n\
                ╠══════════════════════════════════════════════════════════════════╣\n\
                ║                                                                  ║\n\
                {}\n\
                ║                                                                  ║\n\
                ╚══════════════════════════════════════════════════════════════════╝\n",
                format_error_lines(&error_msg)
            );
        }
    };

    let mut errors = Vec::new();
    validate_dmx(&config.dmx, &mut errors);
    validate_serial("debug.serial", &config.debug.serial, &mut errors);

    if !errors.is_empty() {
        panic!(
            "\n\
            ╔══════════════════════════════════════════════════════════════════╗\n\
            ║  ERROR: Invalid configuration in dmx512.toml                     ║\n\
            ╠══════════════════════════════════════════════════════════════════╣\n\
            {}\n\
            ╚══════════════════════════════════════════════════════════════════╝\n",
            errors
                .iter()
                .map(|e| format!("║  • {:<62} ║", e))
                .collect::<Vec<_>>()
                .join("\n")
        );
    }

    println!("cargo:warning=dmx512.toml validated successfully");
    config
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

/// Validate the DMX512 section: line settings, timing and frame rate
fn validate_dmx(dmx: &DmxSection, errors: &mut Vec<String>) {
    validate_serial("dmx.serial", &dmx.serial, errors);

    if dmx.serial.uart != UartConfig::DMX512 {
        errors.push("[dmx.serial.uart] must be 250000 baud, 8 data bits, no parity, 2 stop".into());
    }

    if let Err(e) = dmx.timing.validate() {
        errors.push(format!("[dmx.timing] {:?}", e));
    }

    // Full frame must leave the UART before the next one starts
    let t = &dmx.timing;
    let char_us = UartConfig::DMX512.frame_time_us() as u64;
    let frame_us = (t.turnaround_us + t.break_us + t.mark_after_break_us) as u64
        + (CHANNEL_COUNT as u64 + 1) * char_us;
    if dmx.frame_interval_ms * 1_000 < frame_us {
        errors.push(format!(
            "[dmx] frame_interval_ms must be at least {}",
            frame_us.div_ceil(1_000)
        ));
    }

    if TX_CAPACITY < CHANNEL_COUNT {
        errors.push("transmit queue cannot hold a full universe".into());
    }
}

/// Validate settings shared by both serial channels
fn validate_serial(section: &str, serial: &SerialConfig, errors: &mut Vec<String>) {
    if serial.interrupt_priority > MAX_INTERRUPT_PRIORITY {
        errors.push(format!(
            "[{}] interrupt_priority must be 0-{}",
            section, MAX_INTERRUPT_PRIORITY
        ));
    }
    if serial.uart.data_bits == DataBits::Seven {
        errors.push(format!("[{}.uart] 7 data bits not supported on STM32F4", section));
    }
    if serial.uart.baudrate == 0 {
        errors.push(format!("[{}.uart] baudrate must be non-zero", section));
    }
}

/// Write the validated configuration as Rust constants
fn generate_constants(config: &FirmwareConfig) {
    let out_dir = PathBuf::from(env::var("OUT_DIR").unwrap());
    let mut f = File::create(out_dir.join("config.rs")).unwrap();

    writeln!(f, "// Generated by build.rs from dmx512.toml").unwrap();
    writeln!(
        f,
        "pub const FRAME_INTERVAL_MS: u64 = {};",
        config.dmx.frame_interval_ms
    )
    .unwrap();
    writeln!(
        f,
        "pub const DMX_TIMING: DmxTiming = DmxTiming {{ turnaround_us: {}, break_us: {}, mark_after_break_us: {} }};",
        config.dmx.timing.turnaround_us,
        config.dmx.timing.break_us,
        config.dmx.timing.mark_after_break_us
    )
    .unwrap();
    writeln!(
        f,
        "pub const DMX_SERIAL: SerialConfig = {};",
        serial_expr(&config.dmx.serial)
    )
    .unwrap();
    writeln!(
        f,
        "pub const DEBUG_SERIAL: SerialConfig = {};",
        serial_expr(&config.debug.serial)
    )
    .unwrap();
}

/// Rust expression constructing `serial`
fn serial_expr(serial: &SerialConfig) -> String {
    let uart = &serial.uart;
    format!(
        "SerialConfig {{ uart: UartConfig {{ baudrate: {}, data_bits: DataBits::{:?}, parity: Parity::{:?}, stop_bits: StopBits::{:?} }}, interrupt_priority: {}, mode: TransmitMode::{:?} }}",
        uart.baudrate,
        uart.data_bits,
        uart.parity,
        uart.stop_bits,
        serial.interrupt_priority,
        serial.mode
    )
}
