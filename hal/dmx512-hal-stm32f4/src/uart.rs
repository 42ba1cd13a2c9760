//! USART register access for STM32F4
//!
//! The F4 USART has a single status register (SR) and a shared data
//! register (DR). Error flags clear with an SR read followed by a DR read.

use dmx512_hal::uart::{
    DataBits, Interrupt, LineErrors, Parity, SerialRegisters, StopBits, UartConfig,
};
use embassy_stm32::interrupt::{Interrupt as IrqLine, InterruptExt, Priority};
use embassy_stm32::pac::usart::Usart;
use embassy_stm32::usart;

/// Priority bits implemented by the F4 NVIC
const NVIC_PRIO_BITS: u8 = 4;

/// Error from UART setup
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum UartBusError {
    /// Baud rate cannot be generated from the peripheral clock
    Baudrate,
    /// Framing combination the peripheral cannot produce
    Unsupported,
    /// Other configuration error
    Other,
}

impl From<usart::ConfigError> for UartBusError {
    fn from(e: usart::ConfigError) -> Self {
        match e {
            usart::ConfigError::BaudrateTooLow | usart::ConfigError::BaudrateTooHigh => {
                UartBusError::Baudrate
            }
            _ => UartBusError::Other,
        }
    }
}

/// Translate a framing description into an embassy-stm32 USART config
///
/// The F4 USART has no 7-bit word length; 7 data bits are rejected.
pub fn to_embassy_config(config: &UartConfig) -> Result<usart::Config, UartBusError> {
    let mut out = usart::Config::default();
    out.baudrate = config.baudrate;
    out.data_bits = match config.data_bits {
        DataBits::Seven => return Err(UartBusError::Unsupported),
        DataBits::Eight => usart::DataBits::DataBits8,
        DataBits::Nine => usart::DataBits::DataBits9,
    };
    out.parity = match config.parity {
        Parity::None => usart::Parity::ParityNone,
        Parity::Even => usart::Parity::ParityEven,
        Parity::Odd => usart::Parity::ParityOdd,
    };
    out.stop_bits = match config.stop_bits {
        StopBits::One => usart::StopBits::STOP1,
        StopBits::Two => usart::StopBits::STOP2,
    };
    Ok(out)
}

/// Map a logical priority level (0 = most urgent) to the NVIC encoding
fn nvic_priority(level: u8) -> Priority {
    let level = level.min((1 << NVIC_PRIO_BITS) - 1);
    Priority::from(level << (8 - NVIC_PRIO_BITS))
}

/// Register-level view of one USART plus its NVIC line
///
/// Cheap to construct in a `const` context so it can live inside a
/// `static` buffered channel:
///
/// ```ignore
/// static DMX: BufferedSerial<PacUsart, 16, 512> =
///     BufferedSerial::new(PacUsart::new(pac::USART1, interrupt::USART1));
/// ```
#[derive(Clone, Copy)]
pub struct PacUsart {
    regs: Usart,
    irq: IrqLine,
}

impl PacUsart {
    pub const fn new(regs: Usart, irq: IrqLine) -> Self {
        Self { regs, irq }
    }

    pub fn regs(&self) -> Usart {
        self.regs
    }
}

impl SerialRegisters for PacUsart {
    fn write_data(&self, byte: u8) {
        self.regs.dr().write(|w| w.set_dr(byte as u16));
    }

    fn read_data(&self) -> u8 {
        self.regs.dr().read().dr() as u8
    }

    fn is_transmit_register_empty(&self) -> bool {
        self.regs.sr().read().txe()
    }

    fn is_transmission_complete(&self) -> bool {
        self.regs.sr().read().tc()
    }

    fn is_receive_register_not_empty(&self) -> bool {
        self.regs.sr().read().rxne()
    }

    fn take_line_errors(&self) -> LineErrors {
        let sr = self.regs.sr().read();
        let errors = LineErrors {
            overrun: sr.ore(),
            framing: sr.fe(),
            parity: sr.pe(),
            noise: sr.ne(),
        };
        // With RXNE set the receive path's DR read completes the clear
        if errors.any() && !sr.rxne() {
            let _ = self.regs.dr().read();
        }
        errors
    }

    fn enable_interrupt(&self, interrupt: Interrupt) {
        match interrupt {
            Interrupt::TxEmpty => self.regs.cr1().modify(|w| w.set_txeie(true)),
            Interrupt::RxNotEmpty => self.regs.cr1().modify(|w| w.set_rxneie(true)),
        }
    }

    fn disable_interrupt(&self, interrupt: Interrupt) {
        match interrupt {
            Interrupt::TxEmpty => self.regs.cr1().modify(|w| w.set_txeie(false)),
            Interrupt::RxNotEmpty => self.regs.cr1().modify(|w| w.set_rxneie(false)),
        }
    }

    fn is_interrupt_enabled(&self, interrupt: Interrupt) -> bool {
        let cr1 = self.regs.cr1().read();
        match interrupt {
            Interrupt::TxEmpty => cr1.txeie(),
            Interrupt::RxNotEmpty => cr1.rxneie(),
        }
    }

    fn enable_interrupt_vector(&self, enable: bool, priority: u8) {
        if enable {
            self.irq.set_priority(nvic_priority(priority));
            // SAFETY: the firmware defines a handler for this line that only
            // calls into the buffered channel, which is interrupt-safe.
            unsafe { self.irq.enable() };
        } else {
            self.irq.disable();
        }
    }

    fn set_transmitter_enable(&self, enable: bool) {
        self.regs.cr1().modify(|w| w.set_te(enable));
    }

    fn set_receiver_enable(&self, enable: bool) {
        self.regs.cr1().modify(|w| w.set_re(enable));
    }
}
