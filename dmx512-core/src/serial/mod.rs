//! Interrupt-driven buffered serial channel
//!
//! Turns a register-level, one-byte-at-a-time transport into a buffered
//! byte stream that foreground code and the interrupt handler share.

pub mod channel;
pub mod errors;
pub mod io;

pub use crate::config::TransmitMode;
pub use channel::BufferedSerial;
pub use errors::{ErrorCounters, SerialError};

/// Receive queue capacity used by both channels on the reference board
pub const RX_CAPACITY: usize = 16;

/// Transmit queue capacity: one full DMX512 universe
pub const TX_CAPACITY: usize = 512;
