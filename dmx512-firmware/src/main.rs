//! dmx512 - Serial-to-DMX512 Bridge Firmware
//!
//! Main firmware binary for STM32F407 boards with an RS-485 transceiver.
//! A debug console on UART5, one DMX512 universe on USART1.
//!
//! Both UARTs run through interrupt-driven buffered channels. The main loop
//! owns the DMX512 frame timing: every frame interval it sends one complete
//! frame, then lets the USART1 interrupt drain the channel data while it
//! sleeps until the next tick.

#![no_std]
#![no_main]

mod board;
mod config;

use defmt::*;
use embassy_executor::Spawner;
use embassy_stm32::gpio::{Level, Output, OutputOpenDrain, Speed};
use embassy_stm32::usart::Uart;
use embassy_stm32::pac::usart::Usart;
use embassy_stm32::{interrupt, pac};
use embassy_time::{Duration, Ticker};
use heapless::String;
use static_cell::StaticCell;
use {defmt_rtt as _, panic_probe as _};

use dmx512_core::serial::{ErrorCounters, RX_CAPACITY, TX_CAPACITY};
use dmx512_core::{BufferedSerial, DmxDriver, DmxUniverse, FrameReport};
use dmx512_hal::gpio::OutputType;
use dmx512_hal_stm32f4::uart::to_embassy_config;
use dmx512_hal_stm32f4::{DirectionPin, EmbassyClock, PacUsart, TxBreakLine, UartBusError};

type Channel = BufferedSerial<PacUsart, RX_CAPACITY, TX_CAPACITY>;

/// Write a status line to the debug console every this many frames
const STATUS_EVERY_FRAMES: u32 = 20;

/// Channel data sent every frame
static UNIVERSE: StaticCell<DmxUniverse> = StaticCell::new();

/// DMX512 line (USART1)
static DMX_SERIAL: Channel =
    BufferedSerial::new(PacUsart::new(pac::USART1, interrupt::USART1));

/// Debug console (UART5)
static DEBUG_SERIAL: Channel = BufferedSerial::new(PacUsart::new(
    // SAFETY: the PAC types UART5 as a plain UART; SR, DR and CR1 sit at the
    // same offsets as on a USART, and nothing else is accessed.
    unsafe { Usart::from_ptr(pac::UART5.as_ptr()) },
    interrupt::UART5,
));

#[interrupt]
unsafe fn USART1() {
    DMX_SERIAL.on_interrupt();
}

#[interrupt]
unsafe fn UART5() {
    DEBUG_SERIAL.on_interrupt();
}

/// Main entry point
#[embassy_executor::main]
async fn main(_spawner: Spawner) {
    info!("dmx512 bridge starting...");

    let p = embassy_stm32::init(board::peripheral_config());
    info!("Peripherals initialized");

    let mut led = Output::new(p.PA8, Level::High, Speed::Low);

    // Debug console: embassy applies clocks, pins and framing, the buffered
    // channel takes over data transfer. The Uart handles must stay alive.
    let debug_uart_config = unwrap!(to_embassy_config(&config::DEBUG_SERIAL.uart));
    let _debug_uart = unwrap!(Uart::new_blocking(
        p.UART5,
        p.PD2,  // RX
        p.PC12, // TX
        debug_uart_config
    )
    .map_err(UartBusError::from));
    DEBUG_SERIAL.initialize(&config::DEBUG_SERIAL);
    info!("Debug UART initialized ({} baud)", config::DEBUG_SERIAL.uart.baudrate);

    // RS-485 transceiver direction, driver disabled until the first frame
    let direction = DirectionPin::from(OutputOpenDrain::new(p.PB5, Level::Low, Speed::Low));

    let dmx_uart_config = unwrap!(to_embassy_config(&config::DMX_SERIAL.uart));
    let _dmx_uart = unwrap!(Uart::new_blocking(
        p.USART1,
        p.PB7, // RX
        p.PB6, // TX
        dmx_uart_config
    )
    .map_err(UartBusError::from));
    DMX_SERIAL.initialize(&config::DMX_SERIAL);

    // The TX pin doubles as break generator
    let break_line = TxBreakLine::new(pac::GPIOB, board::DMX_TX_PIN, OutputType::OpenDrain);

    let mut driver = unwrap!(DmxDriver::new(
        &DMX_SERIAL,
        direction,
        break_line,
        EmbassyClock::new(),
        config::DMX_TIMING,
    ));
    info!("DMX512 driver ready: {}", driver.timing());

    let universe = UNIVERSE.init(DmxUniverse::new());
    let mut dmx_errors = ErrorCounters::default();
    let mut debug_errors = ErrorCounters::default();

    let mut ticker = Ticker::every(Duration::from_millis(config::FRAME_INTERVAL_MS));
    info!("Entering main loop, frame every {} ms", config::FRAME_INTERVAL_MS);

    loop {
        led.toggle();

        if let Some(byte) = DEBUG_SERIAL.read() {
            DEBUG_SERIAL.write_blocking(byte);
        }

        let report = driver.send_frame(universe);
        trace!("Frame {}: {}", driver.frames_sent(), report);
        if !report.is_complete() {
            warn!("Frame truncated: {} slots queued", report.slots_queued);
        }

        if driver.frames_sent() % STATUS_EVERY_FRAMES == 0 {
            let line = status_line(driver.frames_sent(), &report, &dmx_errors);
            DEBUG_SERIAL.write_bytes(line.as_bytes());
        }

        check_errors("DMX", &DMX_SERIAL, &mut dmx_errors);
        check_errors("Debug", &DEBUG_SERIAL, &mut debug_errors);

        ticker.next().await;
    }
}

/// Warn when a channel's receive error counters moved since the last check
fn check_errors(name: &str, serial: &Channel, last: &mut ErrorCounters) {
    let now = serial.error_counters();
    if now != *last {
        warn!(
            "{} receive errors: overrun={} framing={} parity={} noise={} dropped={}",
            name, now.overrun, now.framing, now.parity, now.noise, now.rx_dropped
        );
        *last = now;
    }
}

/// One-line summary for the debug console
fn status_line(frames: u32, report: &FrameReport, errors: &ErrorCounters) -> String<96> {
    let mut line = String::new();
    // Truncation only shortens the line
    let _ = core::fmt::Write::write_fmt(
        &mut line,
        format_args!(
            "dmx frames={} break={}us mab={}us rx_errors={}\r\n",
            frames,
            report.break_time.as_micros(),
            report.mark_after_break.as_micros(),
            errors.total()
        ),
    );
    line
}
