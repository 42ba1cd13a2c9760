//! Board-agnostic core logic for the serial-to-DMX512 bridge
//!
//! This crate contains all logic that does not depend on a specific chip:
//!
//! - Lock-free single-producer/single-consumer byte ring buffer
//! - Interrupt-driven buffered serial channel on top of a register-level transport
//! - DMX512 universe (channel buffer) and frame timing driver
//! - Configuration type definitions

#![no_std]
#![deny(unsafe_code)]

pub mod config;
pub mod dmx;
pub mod ring;
pub mod serial;

pub use config::SerialConfig;
pub use dmx::{DmxDriver, DmxTiming, DmxUniverse, FrameReport};
pub use ring::RingBuffer;
pub use serial::{BufferedSerial, SerialError, TransmitMode};
