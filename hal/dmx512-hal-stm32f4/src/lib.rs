//! STM32F4-specific HAL for the dmx512 bridge firmware
//!
//! Implements the `dmx512-hal` traits on top of embassy-stm32. Supported
//! chips:
//!
//! - STM32F407VG (reference board)
//! - STM32F405RG
//!
//! # Features
//!
//! - `stm32f407vg` / `stm32f405rg` - Select the target chip
//! - `defmt` - Enable debug formatting support
//!
//! # Usage
//!
//! Peripheral setup (clocks, pin muxing, baud rate) goes through
//! embassy-stm32 as usual. The types here then take over the parts the
//! interrupt-driven serial channel and the DMX512 driver need at register
//! level: data and status registers plus interrupt enables of a USART, the
//! TX pin's mode during a break, and a microsecond clock.

#![no_std]

pub mod gpio;
pub mod time;
pub mod uart;

pub use gpio::{DirectionPin, TxBreakLine};
pub use time::EmbassyClock;
pub use uart::{PacUsart, UartBusError};
