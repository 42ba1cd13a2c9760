//! Microsecond clock backed by the embassy time driver

use dmx512_hal::time::{Instant, Monotonic};

/// [`Monotonic`] on top of `embassy_time::Instant`
///
/// Waits busy-spin; frame timing must not yield to the executor between the
/// break and the start code. Resolution is one tick of the embassy time
/// driver, so enable a `tick-hz-1_000_000` class tick rate on
/// `embassy-time` for sub-100 µs deadlines.
#[derive(Debug, Clone, Copy, Default)]
pub struct EmbassyClock;

impl EmbassyClock {
    pub const fn new() -> Self {
        Self
    }
}

impl Monotonic for EmbassyClock {
    fn now(&self) -> Instant {
        Instant::from_micros(embassy_time::Instant::now().as_micros())
    }
}
