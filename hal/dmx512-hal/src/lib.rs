//! dmx512 Hardware Abstraction Layer
//!
//! This crate defines the capability traits the bridge firmware is written
//! against. Chip-specific HALs implement them once per target; host tests
//! implement them with simulated hardware.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────┐
//! │  Application (dmx512-firmware)          │
//! └─────────────────────────────────────────┘
//!                     │
//!                     ▼
//! ┌─────────────────────────────────────────┐
//! │  dmx512-core (ring buffers, DMX frames) │
//! └─────────────────────────────────────────┘
//!                     │
//!                     ▼
//! ┌─────────────────────────────────────────┐
//! │  dmx512-hal (this crate - traits)       │
//! └─────────────────────────────────────────┘
//!                     │
//!         ┌───────────┴───────────┐
//!         ▼                       ▼
//! ┌───────────────┐       ┌───────────────┐
//! │  dmx512-hal-  │       │   simulated   │
//! │    stm32f4    │       │  test bench   │
//! └───────────────┘       └───────────────┘
//! ```
//!
//! # Traits
//!
//! - [`gpio::OutputPin`] - Digital output (RS-485 direction, status LED)
//! - [`uart::SerialRegisters`] - Register-level serial transport
//! - [`uart::BreakControl`] - Forcing the TX line low outside UART framing
//! - [`time::Monotonic`] - Monotonic clock with deadline waits

#![no_std]
#![deny(unsafe_code)]

pub mod gpio;
pub mod time;
pub mod uart;

// Re-export key traits at crate root for convenience
pub use gpio::{OutputPin, OutputType};
pub use time::{Instant, Monotonic};
pub use uart::{BreakControl, Interrupt, LineErrors, SerialRegisters, UartConfig};
