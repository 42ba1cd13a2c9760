//! DMX512 transmitter
//!
//! A DMX512 packet on the wire:
//!
//! ```text
//!   turnaround   break    MAB   start code   slot 1 ... slot 512
//! ──┐          ┌──────┐       ┌──┬──────────┬────────┬─────┬─────────
//!   │ driver   │ line │ line  │  │   0x00   │        │     │
//!   │ disabled │ low  │ high  │  │  8-N-2   │  8-N-2 │ ... │
//! ──┘          └──────┘       └──┴──────────┴────────┴─────┴─────────
//!   ≥ 200 µs     ≥ 88 µs  ≥ 12 µs
//! ```
//!
//! The break and mark-after-break are produced by driving the TX pin
//! directly; everything after is ordinary UART framing at 250 kbit/s.

pub mod driver;
pub mod timing;
pub mod universe;

pub use driver::{DmxDriver, FrameReport};
pub use timing::{DmxTiming, TimingError};
pub use universe::{DmxError, DmxUniverse, CHANNEL_COUNT};

/// Start code identifying a standard dimmer/channel data packet
pub const NULL_START_CODE: u8 = 0x00;
