//! GPIO pin abstractions
//!
//! Provides the digital output trait used for the RS-485 direction signal
//! and the status LED.

/// Electrical configuration of an output pin
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum OutputType {
    /// Pin actively drives both levels
    #[default]
    PushPull,
    /// Pin only drives low; high is left to the bus pull-up.
    /// Required when several drivers share the direction line.
    OpenDrain,
}

/// Digital output pin
///
/// Implementations should handle the actual hardware register manipulation
/// for the specific chip.
pub trait OutputPin {
    /// Set the pin high (logic 1)
    fn set_high(&mut self);

    /// Set the pin low (logic 0)
    fn set_low(&mut self);

    /// Toggle the pin state
    fn toggle(&mut self) {
        if self.is_set_high() {
            self.set_low();
        } else {
            self.set_high();
        }
    }

    /// Set the pin to a specific state
    fn set_state(&mut self, high: bool) {
        if high {
            self.set_high();
        } else {
            self.set_low();
        }
    }

    /// Check if the pin is currently set high
    fn is_set_high(&self) -> bool;

    /// Check if the pin is currently set low
    fn is_set_low(&self) -> bool {
        !self.is_set_high()
    }
}

impl<P: OutputPin + ?Sized> OutputPin for &mut P {
    fn set_high(&mut self) {
        P::set_high(self)
    }

    fn set_low(&mut self) {
        P::set_low(self)
    }

    fn toggle(&mut self) {
        P::toggle(self)
    }

    fn is_set_high(&self) -> bool {
        P::is_set_high(self)
    }
}
