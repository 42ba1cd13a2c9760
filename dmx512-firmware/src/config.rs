//! Build-time configuration
//!
//! Constants generated by `build.rs` from `dmx512.toml`:
//!
//! - `FRAME_INTERVAL_MS` - time between frame starts
//! - `DMX_TIMING` - turnaround, break and mark-after-break
//! - `DMX_SERIAL` / `DEBUG_SERIAL` - serial channel settings

use dmx512_core::config::{SerialConfig, TransmitMode};
use dmx512_core::DmxTiming;
use dmx512_hal::uart::{DataBits, Parity, StopBits, UartConfig};

include!(concat!(env!("OUT_DIR"), "/config.rs"));
