//! UART serial communication abstractions
//!
//! Provides the register-level transport trait that the buffered serial
//! channel is built on, plus the framing configuration types.
//!
//! The transport is deliberately stateless: one byte in, one byte out, one
//! flag at a time. Queuing lives in `dmx512-core`.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Interrupt sources of a serial peripheral
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Interrupt {
    /// Transmit data register empty
    TxEmpty,
    /// Receive data register not empty
    RxNotEmpty,
}

/// Hardware error flags observed on the receive line
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct LineErrors {
    /// A byte arrived before the previous one was read
    pub overrun: bool,
    /// Stop bit not found where expected
    pub framing: bool,
    /// Parity check failed
    pub parity: bool,
    /// Noise detected on the line
    pub noise: bool,
}

impl LineErrors {
    /// No error flag set
    pub const NONE: Self = Self {
        overrun: false,
        framing: false,
        parity: false,
        noise: false,
    };

    /// Check if any error flag is set
    pub fn any(&self) -> bool {
        self.overrun || self.framing || self.parity || self.noise
    }
}

/// Register-level serial transport
///
/// Every method maps to a single register access. All methods take `&self`
/// because the same peripheral is touched from foreground code and from the
/// interrupt handler; implementations must not cache state that the other
/// context could invalidate.
pub trait SerialRegisters {
    /// Write one byte to the transmit data register
    ///
    /// No sanity checks: the caller must have seen
    /// [`is_transmit_register_empty`](Self::is_transmit_register_empty).
    fn write_data(&self, byte: u8);

    /// Read one byte from the receive data register
    ///
    /// No sanity checks: the caller must have seen
    /// [`is_receive_register_not_empty`](Self::is_receive_register_not_empty).
    fn read_data(&self) -> u8;

    /// Returns true if a byte can be written
    ///
    /// The previous byte may still be in the shift register.
    fn is_transmit_register_empty(&self) -> bool;

    /// Returns true once the last written byte, stop bits included, has
    /// left the shift register
    fn is_transmission_complete(&self) -> bool;

    /// Returns true if a byte has been received
    fn is_receive_register_not_empty(&self) -> bool;

    /// Read and acknowledge the receive error flags
    fn take_line_errors(&self) -> LineErrors;

    /// Enable one interrupt source
    fn enable_interrupt(&self, interrupt: Interrupt);

    /// Disable one interrupt source
    fn disable_interrupt(&self, interrupt: Interrupt);

    /// Check whether an interrupt source is enabled
    fn is_interrupt_enabled(&self, interrupt: Interrupt) -> bool;

    /// Enable or disable the peripheral's interrupt vector in the NVIC
    fn enable_interrupt_vector(&self, enable: bool, priority: u8);

    /// Enable/Disable Transmitter
    fn set_transmitter_enable(&self, enable: bool);

    /// Enable/Disable Receiver
    fn set_receiver_enable(&self, enable: bool);
}

impl<T: SerialRegisters + ?Sized> SerialRegisters for &T {
    fn write_data(&self, byte: u8) {
        T::write_data(self, byte)
    }

    fn read_data(&self) -> u8 {
        T::read_data(self)
    }

    fn is_transmit_register_empty(&self) -> bool {
        T::is_transmit_register_empty(self)
    }

    fn is_transmission_complete(&self) -> bool {
        T::is_transmission_complete(self)
    }

    fn is_receive_register_not_empty(&self) -> bool {
        T::is_receive_register_not_empty(self)
    }

    fn take_line_errors(&self) -> LineErrors {
        T::take_line_errors(self)
    }

    fn enable_interrupt(&self, interrupt: Interrupt) {
        T::enable_interrupt(self, interrupt)
    }

    fn disable_interrupt(&self, interrupt: Interrupt) {
        T::disable_interrupt(self, interrupt)
    }

    fn is_interrupt_enabled(&self, interrupt: Interrupt) -> bool {
        T::is_interrupt_enabled(self, interrupt)
    }

    fn enable_interrupt_vector(&self, enable: bool, priority: u8) {
        T::enable_interrupt_vector(self, enable, priority)
    }

    fn set_transmitter_enable(&self, enable: bool) {
        T::set_transmitter_enable(self, enable)
    }

    fn set_receiver_enable(&self, enable: bool) {
        T::set_receiver_enable(self, enable)
    }
}

/// Direct control over the TX line, outside UART framing
///
/// A DMX512 break is a low period longer than any valid character, which the
/// UART cannot produce by itself. Implementations typically switch the TX pin
/// from its alternate function to a plain GPIO output and back.
pub trait BreakControl {
    /// Force the TX line low
    fn begin_break(&mut self);

    /// Release the TX line to idle-high and hand it back to the UART
    fn end_break(&mut self);
}

/// UART configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct UartConfig {
    /// Baud rate in bits per second
    pub baudrate: u32,
    /// Number of data bits (typically 8)
    pub data_bits: DataBits,
    /// Parity mode
    pub parity: Parity,
    /// Number of stop bits
    pub stop_bits: StopBits,
}

impl UartConfig {
    /// DMX512 line settings: 250 kbit/s, 8 data bits, no parity, 2 stop bits
    pub const DMX512: Self = Self {
        baudrate: 250_000,
        data_bits: DataBits::Eight,
        parity: Parity::None,
        stop_bits: StopBits::Two,
    };

    /// Number of bit periods one character occupies on the wire
    pub const fn bits_per_frame(&self) -> u32 {
        let data = match self.data_bits {
            DataBits::Seven => 7,
            DataBits::Eight => 8,
            DataBits::Nine => 9,
        };
        let parity = match self.parity {
            Parity::None => 0,
            Parity::Even | Parity::Odd => 1,
        };
        let stop = match self.stop_bits {
            StopBits::One => 1,
            StopBits::Two => 2,
        };
        1 + data + parity + stop
    }

    /// Time to shift out one character, rounded up to whole microseconds
    pub const fn frame_time_us(&self) -> u32 {
        let bits = self.bits_per_frame() * 1_000_000;
        bits.div_ceil(self.baudrate)
    }
}

impl Default for UartConfig {
    fn default() -> Self {
        Self {
            baudrate: 115200,
            data_bits: DataBits::Eight,
            parity: Parity::None,
            stop_bits: StopBits::One,
        }
    }
}

/// Number of data bits per frame
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum DataBits {
    Seven,
    Eight,
    Nine,
}

/// Parity mode
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum Parity {
    None,
    Even,
    Odd,
}

/// Number of stop bits
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum StopBits {
    One,
    Two,
}
