//! GPIO for STM32F4: RS-485 direction pin and DMX break generation

use dmx512_hal::gpio::{OutputPin, OutputType};
use dmx512_hal::uart::BreakControl;
use embassy_stm32::gpio::{Output, OutputOpenDrain};
use embassy_stm32::pac::gpio::{vals, Gpio};

/// Push-pull or open-drain embassy output behind [`OutputPin`]
pub enum DirectionPin<'d> {
    PushPull(Output<'d>),
    OpenDrain(OutputOpenDrain<'d>),
}

impl<'d> From<Output<'d>> for DirectionPin<'d> {
    fn from(pin: Output<'d>) -> Self {
        DirectionPin::PushPull(pin)
    }
}

impl<'d> From<OutputOpenDrain<'d>> for DirectionPin<'d> {
    fn from(pin: OutputOpenDrain<'d>) -> Self {
        DirectionPin::OpenDrain(pin)
    }
}

impl OutputPin for DirectionPin<'_> {
    fn set_high(&mut self) {
        match self {
            DirectionPin::PushPull(pin) => pin.set_high(),
            DirectionPin::OpenDrain(pin) => pin.set_high(),
        }
    }

    fn set_low(&mut self) {
        match self {
            DirectionPin::PushPull(pin) => pin.set_low(),
            DirectionPin::OpenDrain(pin) => pin.set_low(),
        }
    }

    fn is_set_high(&self) -> bool {
        match self {
            DirectionPin::PushPull(pin) => pin.is_set_high(),
            DirectionPin::OpenDrain(pin) => pin.is_set_high(),
        }
    }
}

/// Generates the DMX break on a USART TX pin
///
/// The pin stays muxed to the USART except during a break, when it is
/// switched to a GPIO output driven low. Returning the pin to alternate
/// function mode ends the break; the idle UART line is high.
pub struct TxBreakLine {
    port: Gpio,
    pin: usize,
}

impl TxBreakLine {
    /// Take over pin `pin` of `port`, already configured as USART TX
    ///
    /// `output_type` applies to both the break and the UART phases.
    pub fn new(port: Gpio, pin: usize, output_type: OutputType) -> Self {
        let ot = match output_type {
            OutputType::PushPull => vals::Ot::PUSH_PULL,
            OutputType::OpenDrain => vals::Ot::OPEN_DRAIN,
        };
        critical_section::with(|_| port.otyper().modify(|w| w.set_ot(pin, ot)));
        Self { port, pin }
    }

    fn set_mode(&self, mode: vals::Moder) {
        // MODER is shared with the other pins of the port
        critical_section::with(|_| self.port.moder().modify(|w| w.set_moder(self.pin, mode)));
    }
}

impl BreakControl for TxBreakLine {
    fn begin_break(&mut self) {
        self.port.bsrr().write(|w| w.set_br(self.pin, true));
        self.set_mode(vals::Moder::OUTPUT);
    }

    fn end_break(&mut self) {
        self.port.bsrr().write(|w| w.set_bs(self.pin, true));
        self.set_mode(vals::Moder::ALTERNATE);
    }
}
