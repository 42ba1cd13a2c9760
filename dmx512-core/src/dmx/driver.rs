//! DMX512 frame driver
//!
//! Runs one frame per call through a fixed sequence:
//!
//! 1. Idle: wait until the previous frame's last stop bit has left the UART
//! 2. Turnaround: direction signal deasserted for the turnaround time
//! 3. Driver enabled: direction signal asserted
//! 4. Break: TX line forced low
//! 5. Mark-after-break: TX line released high
//! 6. Start code, written directly to the data register
//! 7. Channel data, queued on the buffered serial channel
//!
//! The call returns once the channel data is queued. The direction signal
//! stays asserted until the next frame's turnaround (or [`DmxDriver::release`]).

use core::time::Duration;

use dmx512_hal::gpio::OutputPin;
use dmx512_hal::time::Monotonic;
use dmx512_hal::uart::{BreakControl, SerialRegisters};

use super::timing::{DmxTiming, TimingError};
use super::universe::{DmxUniverse, CHANNEL_COUNT};
use super::NULL_START_CODE;
use crate::serial::BufferedSerial;

/// Timing actually observed while sending one frame
///
/// Measured against the driver's clock; useful for diagnostics on targets
/// where the clock is coarse or the deadline waits are preempted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FrameReport {
    /// Direction signal deasserted
    pub turnaround: Duration,
    /// TX line held low
    pub break_time: Duration,
    /// TX line held high before the start code
    pub mark_after_break: Duration,
    /// Channel slots accepted by the buffered channel
    pub slots_queued: usize,
}

#[cfg(feature = "defmt")]
impl defmt::Format for FrameReport {
    fn format(&self, f: defmt::Formatter) {
        defmt::write!(
            f,
            "turnaround={}us break={}us mab={}us slots={}",
            self.turnaround.as_micros() as u64,
            self.break_time.as_micros() as u64,
            self.mark_after_break.as_micros() as u64,
            self.slots_queued
        )
    }
}

impl FrameReport {
    /// Check if all 512 slots were queued
    pub fn is_complete(&self) -> bool {
        self.slots_queued == CHANNEL_COUNT
    }
}

/// DMX512 transmitter on top of a [`BufferedSerial`]
///
/// - `D`: RS-485 direction signal (high = driver enabled)
/// - `B`: direct control of the TX line for the break
/// - `C`: clock used for every timing deadline
pub struct DmxDriver<'a, U, D, B, C, const RX: usize, const TX: usize> {
    serial: &'a BufferedSerial<U, RX, TX>,
    direction: D,
    line: B,
    clock: C,
    timing: DmxTiming,
    frames_sent: u32,
}

impl<'a, U, D, B, C, const RX: usize, const TX: usize> DmxDriver<'a, U, D, B, C, RX, TX>
where
    U: SerialRegisters,
    D: OutputPin,
    B: BreakControl,
    C: Monotonic,
{
    /// Create a driver; the direction signal starts deasserted
    ///
    /// The serial channel must already be initialized with 8-N-2 framing at
    /// 250 kbit/s.
    pub fn new(
        serial: &'a BufferedSerial<U, RX, TX>,
        mut direction: D,
        line: B,
        clock: C,
        timing: DmxTiming,
    ) -> Result<Self, TimingError> {
        timing.validate()?;
        direction.set_low();

        Ok(Self {
            serial,
            direction,
            line,
            clock,
            timing,
            frames_sent: 0,
        })
    }

    /// Emit one complete frame: break, MAB, start code and 512 slots
    pub fn send_frame(&mut self, universe: &DmxUniverse) -> FrameReport {
        self.serial.flush_write_buffer();

        self.direction.set_low();
        let off_at = self.clock.now();
        self.clock.wait_until(off_at + self.timing.turnaround());
        let on_at = self.clock.now();
        self.direction.set_high();

        self.line.begin_break();
        let break_at = self.clock.now();
        self.clock.wait_until(break_at + self.timing.break_time());
        self.line.end_break();
        let mark_at = self.clock.now();
        self.clock.wait_until(mark_at + self.timing.mark_after_break());
        let data_at = self.clock.now();

        self.serial.write_blocking(NULL_START_CODE);
        let slots_queued = self.serial.write_bytes(universe.slots());

        self.frames_sent = self.frames_sent.wrapping_add(1);

        FrameReport {
            turnaround: on_at.duration_since(off_at),
            break_time: mark_at.duration_since(break_at),
            mark_after_break: data_at.duration_since(mark_at),
            slots_queued,
        }
    }

    /// True once the previous frame has completely left the UART
    pub fn is_idle(&self) -> bool {
        self.serial.is_write_finished()
    }

    /// Frames sent since creation (wrapping)
    pub fn frames_sent(&self) -> u32 {
        self.frames_sent
    }

    pub fn timing(&self) -> DmxTiming {
        self.timing
    }

    /// Replace the timing parameters; the old ones stay on error
    pub fn set_timing(&mut self, timing: DmxTiming) -> Result<(), TimingError> {
        timing.validate()?;
        self.timing = timing;
        Ok(())
    }

    pub fn serial(&self) -> &'a BufferedSerial<U, RX, TX> {
        self.serial
    }

    /// Finish the last frame, disable the line driver and return the parts
    pub fn release(mut self) -> (D, B, C) {
        self.serial.flush_write_buffer();
        self.direction.set_low();
        (self.direction, self.line, self.clock)
    }
}
