//! Configuration types
//!
//! Board-agnostic configuration for the serial channels. The firmware
//! embeds these values at build time from `dmx512.toml`.

use dmx512_hal::uart::{DataBits, Parity, StopBits, UartConfig};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Interrupt priority of the DMX512 USART on the reference board
pub const DMX_INTERRUPT_PRIORITY: u8 = 3;

/// Interrupt priority of the debug UART on the reference board
pub const DEBUG_INTERRUPT_PRIORITY: u8 = 10;

/// What a write does when the transmit queue is full
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum TransmitMode {
    /// Spin until the interrupt handler frees a slot
    #[default]
    Blocking,
    /// Reject the byte and return immediately
    NonBlocking,
}

/// Serial channel configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct SerialConfig {
    /// Line framing, applied by the chip HAL
    pub uart: UartConfig,
    /// NVIC priority of the channel's interrupt
    pub interrupt_priority: u8,
    /// Full-queue policy for buffered writes
    #[cfg_attr(feature = "serde", serde(default))]
    pub mode: TransmitMode,
}

impl SerialConfig {
    /// DMX512 line: 250 kbit/s 8-N-2, blocking writes
    pub const fn dmx512() -> Self {
        Self {
            uart: UartConfig::DMX512,
            interrupt_priority: DMX_INTERRUPT_PRIORITY,
            mode: TransmitMode::Blocking,
        }
    }

    /// Debug console: 115200 8-N-1, blocking writes
    pub const fn debug() -> Self {
        Self {
            uart: UartConfig {
                baudrate: 115_200,
                data_bits: DataBits::Eight,
                parity: Parity::None,
                stop_bits: StopBits::One,
            },
            interrupt_priority: DEBUG_INTERRUPT_PRIORITY,
            mode: TransmitMode::Blocking,
        }
    }

    /// Same configuration with a different full-queue policy
    pub const fn with_mode(mut self, mode: TransmitMode) -> Self {
        self.mode = mode;
        self
    }
}

impl Default for SerialConfig {
    fn default() -> Self {
        Self::debug()
    }
}
