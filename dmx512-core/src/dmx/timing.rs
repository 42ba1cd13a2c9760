//! DMX512 frame timing parameters

use core::time::Duration;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Shortest break a receiver is guaranteed to detect (µs)
pub const MIN_BREAK_US: u32 = 88;

/// Shortest mark-after-break (µs)
pub const MIN_MARK_AFTER_BREAK_US: u32 = 12;

/// Shortest driver-off window between frames (µs)
pub const MIN_TURNAROUND_US: u32 = 200;

/// Timing parameter below its protocol minimum
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum TimingError {
    /// Break shorter than [`MIN_BREAK_US`]
    BreakTooShort(u32),
    /// Mark-after-break shorter than [`MIN_MARK_AFTER_BREAK_US`]
    MarkAfterBreakTooShort(u32),
    /// Turnaround shorter than [`MIN_TURNAROUND_US`]
    TurnaroundTooShort(u32),
}

/// Durations of the out-of-band part of a frame, in microseconds
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct DmxTiming {
    /// Direction signal deasserted before the break
    pub turnaround_us: u32,
    /// TX line held low
    pub break_us: u32,
    /// TX line held high before the start code
    pub mark_after_break_us: u32,
}

impl Default for DmxTiming {
    fn default() -> Self {
        Self::DEFAULT
    }
}

impl DmxTiming {
    /// Reference board timing: 200 µs turnaround, 100 µs break, 12 µs MAB
    pub const DEFAULT: Self = Self {
        turnaround_us: 200,
        break_us: 100,
        mark_after_break_us: 12,
    };

    /// Check every parameter against its protocol minimum
    pub const fn validate(&self) -> Result<(), TimingError> {
        if self.turnaround_us < MIN_TURNAROUND_US {
            return Err(TimingError::TurnaroundTooShort(self.turnaround_us));
        }
        if self.break_us < MIN_BREAK_US {
            return Err(TimingError::BreakTooShort(self.break_us));
        }
        if self.mark_after_break_us < MIN_MARK_AFTER_BREAK_US {
            return Err(TimingError::MarkAfterBreakTooShort(
                self.mark_after_break_us,
            ));
        }
        Ok(())
    }

    pub fn turnaround(&self) -> Duration {
        Duration::from_micros(self.turnaround_us as u64)
    }

    pub fn break_time(&self) -> Duration {
        Duration::from_micros(self.break_us as u64)
    }

    pub fn mark_after_break(&self) -> Duration {
        Duration::from_micros(self.mark_after_break_us as u64)
    }
}
