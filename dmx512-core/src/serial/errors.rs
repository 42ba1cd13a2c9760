//! Serial channel errors and receive-side error accounting

use dmx512_hal::uart::LineErrors;
use portable_atomic::{AtomicU32, Ordering};

/// Errors from buffered serial operations
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum SerialError {
    /// Transmit queue full in non-blocking mode; the byte was not accepted
    BufferFull,
}

/// Snapshot of the receive-side error counters
///
/// Receive errors never change channel behavior: bad or surplus bytes are
/// still dropped. They are only counted so the application can report them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ErrorCounters {
    /// Hardware overrun flags (byte lost before software read it)
    pub overrun: u32,
    /// Framing errors
    pub framing: u32,
    /// Parity errors
    pub parity: u32,
    /// Noise errors
    pub noise: u32,
    /// Bytes read from hardware but dropped because the receive queue was full
    pub rx_dropped: u32,
}

impl ErrorCounters {
    /// Sum of all counters
    pub fn total(&self) -> u32 {
        self.overrun
            .saturating_add(self.framing)
            .saturating_add(self.parity)
            .saturating_add(self.noise)
            .saturating_add(self.rx_dropped)
    }
}

/// Interrupt-safe backing store for [`ErrorCounters`]
pub(crate) struct ErrorCells {
    overrun: AtomicU32,
    framing: AtomicU32,
    parity: AtomicU32,
    noise: AtomicU32,
    rx_dropped: AtomicU32,
}

impl ErrorCells {
    pub(crate) const fn new() -> Self {
        Self {
            overrun: AtomicU32::new(0),
            framing: AtomicU32::new(0),
            parity: AtomicU32::new(0),
            noise: AtomicU32::new(0),
            rx_dropped: AtomicU32::new(0),
        }
    }

    pub(crate) fn record(&self, errors: LineErrors) {
        if errors.overrun {
            self.overrun.fetch_add(1, Ordering::Relaxed);
        }
        if errors.framing {
            self.framing.fetch_add(1, Ordering::Relaxed);
        }
        if errors.parity {
            self.parity.fetch_add(1, Ordering::Relaxed);
        }
        if errors.noise {
            self.noise.fetch_add(1, Ordering::Relaxed);
        }
    }

    pub(crate) fn record_dropped(&self) {
        self.rx_dropped.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn snapshot(&self) -> ErrorCounters {
        ErrorCounters {
            overrun: self.overrun.load(Ordering::Relaxed),
            framing: self.framing.load(Ordering::Relaxed),
            parity: self.parity.load(Ordering::Relaxed),
            noise: self.noise.load(Ordering::Relaxed),
            rx_dropped: self.rx_dropped.load(Ordering::Relaxed),
        }
    }

    pub(crate) fn reset(&self) {
        self.overrun.store(0, Ordering::Relaxed);
        self.framing.store(0, Ordering::Relaxed);
        self.parity.store(0, Ordering::Relaxed);
        self.noise.store(0, Ordering::Relaxed);
        self.rx_dropped.store(0, Ordering::Relaxed);
    }
}
