//! Reference board: STM32F407 with a 25 MHz crystal
//!
//! Pin assignments:
//!
//! | Function              | Pin  |
//! |-----------------------|------|
//! | Status LED            | PA8  |
//! | Debug UART5 TX / RX   | PC12 / PD2 |
//! | RS-485 direction      | PB5  |
//! | DMX USART1 TX / RX    | PB6 / PB7 |

use embassy_stm32::rcc::{
    AHBPrescaler, APBPrescaler, Hse, HseMode, Pll, PllMul, PllPDiv, PllPreDiv, PllQDiv,
    PllSource, Sysclk,
};
use embassy_stm32::time::Hertz;
use embassy_stm32::Config;

/// Pin number of the DMX TX line on GPIOB
pub const DMX_TX_PIN: usize = 6;

/// 168 MHz system clock, 48 MHz for USB
pub fn peripheral_config() -> Config {
    let mut config = Config::default();
    config.rcc.hse = Some(Hse {
        freq: Hertz(25_000_000),
        mode: HseMode::Oscillator,
    });
    config.rcc.pll_src = PllSource::HSE;
    config.rcc.pll = Some(Pll {
        prediv: PllPreDiv::DIV25,
        mul: PllMul::MUL336,
        divp: Some(PllPDiv::DIV2),
        divq: Some(PllQDiv::DIV7),
        divr: None,
    });
    config.rcc.ahb_pre = AHBPrescaler::DIV1;
    config.rcc.apb1_pre = APBPrescaler::DIV4;
    config.rcc.apb2_pre = APBPrescaler::DIV2;
    config.rcc.sys = Sysclk::PLL1_P;
    config
}
