//! Simulated bench: one USART, the RS-485 direction pin, the TX break
//! control and a virtual clock, all sharing one timeline.
//!
//! Hardware behavior modelled:
//! - the transmitter has two stages like a real USART: a byte written to the
//!   data register moves to the shift register as soon as that is free, and
//!   the shift register takes one character time (44 µs at 250 kbit/s 8-N-2)
//!   to put it on the wire
//! - TXE reports the data register, TC reports both stages
//! - every poll of the TXE flag costs 1 µs, so spin loops make progress
//! - interrupts never preempt; tests call `on_interrupt` when one is pending

#![allow(dead_code)]

use std::cell::RefCell;
use std::rc::Rc;

use dmx512_core::BufferedSerial;
use dmx512_hal::gpio::OutputPin;
use dmx512_hal::time::{Instant, Monotonic};
use dmx512_hal::uart::{BreakControl, Interrupt, LineErrors, SerialRegisters, UartConfig};

/// Character time at 250 kbit/s, 11 bits per character
pub const BYTE_TIME_US: u64 = UartConfig::DMX512.frame_time_us() as u64;

/// Upper bound on simulation steps before a test is declared hung
const STEP_LIMIT: usize = 10_000_000;

/// Something observable on the bus
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WireEvent {
    DirectionHigh { at: u64 },
    DirectionLow { at: u64 },
    BreakStart { at: u64 },
    BreakEnd { at: u64 },
    Byte { value: u8, started: u64, finished: u64 },
}

#[derive(Default)]
struct State {
    now: u64,
    /// Byte in the data register and when it was written
    dr: Option<(u8, u64)>,
    /// Byte in the shift register and when its last stop bit ends
    shifting: Option<(u8, u64)>,
    /// When the shift register last went idle
    shifter_free_at: u64,
    events: Vec<WireEvent>,
    bytes_sent: usize,
    rdr: Option<u8>,
    errors: LineErrors,
    tx_irq: bool,
    rx_irq: bool,
    vector_priority: Option<u8>,
    line_low: bool,
    direction_high: bool,
}

impl State {
    /// Advance both transmitter stages up to `now`
    fn settle(&mut self) {
        loop {
            if let Some((value, finished)) = self.shifting {
                if self.now < finished {
                    return;
                }
                self.events.push(WireEvent::Byte {
                    value,
                    started: finished - BYTE_TIME_US,
                    finished,
                });
                self.bytes_sent += 1;
                self.shifting = None;
                self.shifter_free_at = finished;
            }
            match self.dr.take() {
                Some((value, written)) => {
                    let started = written.max(self.shifter_free_at);
                    self.shifting = Some((value, started + BYTE_TIME_US));
                }
                None => return,
            }
        }
    }

    fn is_idle(&self) -> bool {
        self.dr.is_none() && self.shifting.is_none()
    }
}

#[derive(Clone, Default)]
pub struct Bench {
    state: Rc<RefCell<State>>,
}

impl Bench {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn usart(&self) -> SimUsart {
        SimUsart {
            state: self.state.clone(),
        }
    }

    pub fn direction(&self) -> SimDirection {
        SimDirection {
            state: self.state.clone(),
        }
    }

    pub fn break_line(&self) -> SimBreak {
        SimBreak {
            state: self.state.clone(),
        }
    }

    pub fn clock(&self) -> SimClock {
        SimClock {
            state: self.state.clone(),
        }
    }

    pub fn now(&self) -> u64 {
        self.state.borrow().now
    }

    pub fn advance(&self, us: u64) {
        let mut state = self.state.borrow_mut();
        state.now += us;
        state.settle();
    }

    pub fn events(&self) -> Vec<WireEvent> {
        let mut state = self.state.borrow_mut();
        state.settle();
        state.events.clone()
    }

    pub fn clear_events(&self) {
        self.state.borrow_mut().events.clear();
    }

    /// Bytes that have completely left the transmitter
    pub fn wire_bytes(&self) -> Vec<u8> {
        self.events()
            .into_iter()
            .filter_map(|e| match e {
                WireEvent::Byte { value, .. } => Some(value),
                _ => None,
            })
            .collect()
    }

    /// Count of bytes that have left the transmitter since the bench started
    pub fn bytes_sent(&self) -> usize {
        let mut state = self.state.borrow_mut();
        state.settle();
        state.bytes_sent
    }

    pub fn tx_interrupt_enabled(&self) -> bool {
        self.state.borrow().tx_irq
    }

    pub fn vector_priority(&self) -> Option<u8> {
        self.state.borrow().vector_priority
    }

    /// A byte arrives on the receive line
    pub fn inject_rx(&self, byte: u8) {
        let mut state = self.state.borrow_mut();
        if state.rdr.is_some() {
            state.errors.overrun = true;
        }
        state.rdr = Some(byte);
    }

    /// Would the NVIC run the USART handler right now?
    pub fn interrupt_pending(&self) -> bool {
        let mut state = self.state.borrow_mut();
        state.settle();
        (state.tx_irq && state.dr.is_none()) || (state.rx_irq && state.rdr.is_some())
    }

    /// Run hardware and the interrupt handler one step
    pub fn step<const RX: usize, const TX: usize>(&self, serial: &BufferedSerial<SimUsart, RX, TX>) {
        if self.interrupt_pending() {
            serial.on_interrupt();
        } else {
            self.advance(1);
        }
    }

    /// Run until the channel has nothing left to send
    pub fn run_until_idle<const RX: usize, const TX: usize>(
        &self,
        serial: &BufferedSerial<SimUsart, RX, TX>,
    ) {
        for _ in 0..STEP_LIMIT {
            if serial.is_write_finished() {
                return;
            }
            self.step(serial);
        }
        panic!("transmitter did not go idle");
    }
}

pub struct SimUsart {
    state: Rc<RefCell<State>>,
}

impl SerialRegisters for SimUsart {
    fn write_data(&self, byte: u8) {
        let mut state = self.state.borrow_mut();
        state.settle();
        assert!(state.dr.is_none(), "write to busy data register");
        assert!(!state.line_low, "UART write during break");
        state.dr = Some((byte, state.now));
        state.settle();
    }

    fn read_data(&self) -> u8 {
        self.state.borrow_mut().rdr.take().unwrap_or(0)
    }

    fn is_transmit_register_empty(&self) -> bool {
        let mut state = self.state.borrow_mut();
        state.now += 1;
        state.settle();
        state.dr.is_none()
    }

    fn is_transmission_complete(&self) -> bool {
        let mut state = self.state.borrow_mut();
        state.settle();
        state.is_idle()
    }

    fn is_receive_register_not_empty(&self) -> bool {
        self.state.borrow().rdr.is_some()
    }

    fn take_line_errors(&self) -> LineErrors {
        core::mem::take(&mut self.state.borrow_mut().errors)
    }

    fn enable_interrupt(&self, interrupt: Interrupt) {
        let mut state = self.state.borrow_mut();
        match interrupt {
            Interrupt::TxEmpty => state.tx_irq = true,
            Interrupt::RxNotEmpty => state.rx_irq = true,
        }
    }

    fn disable_interrupt(&self, interrupt: Interrupt) {
        let mut state = self.state.borrow_mut();
        match interrupt {
            Interrupt::TxEmpty => state.tx_irq = false,
            Interrupt::RxNotEmpty => state.rx_irq = false,
        }
    }

    fn is_interrupt_enabled(&self, interrupt: Interrupt) -> bool {
        let state = self.state.borrow();
        match interrupt {
            Interrupt::TxEmpty => state.tx_irq,
            Interrupt::RxNotEmpty => state.rx_irq,
        }
    }

    fn enable_interrupt_vector(&self, enable: bool, priority: u8) {
        self.state.borrow_mut().vector_priority = enable.then_some(priority);
    }

    fn set_transmitter_enable(&self, _enable: bool) {}

    fn set_receiver_enable(&self, _enable: bool) {}
}

pub struct SimDirection {
    state: Rc<RefCell<State>>,
}

impl OutputPin for SimDirection {
    fn set_high(&mut self) {
        let mut state = self.state.borrow_mut();
        state.settle();
        let at = state.now;
        state.direction_high = true;
        state.events.push(WireEvent::DirectionHigh { at });
    }

    fn set_low(&mut self) {
        let mut state = self.state.borrow_mut();
        state.settle();
        let at = state.now;
        state.direction_high = false;
        state.events.push(WireEvent::DirectionLow { at });
    }

    fn is_set_high(&self) -> bool {
        self.state.borrow().direction_high
    }
}

pub struct SimBreak {
    state: Rc<RefCell<State>>,
}

impl BreakControl for SimBreak {
    fn begin_break(&mut self) {
        let mut state = self.state.borrow_mut();
        state.settle();
        assert!(state.is_idle(), "break while a character is on the wire");
        let at = state.now;
        state.line_low = true;
        state.events.push(WireEvent::BreakStart { at });
    }

    fn end_break(&mut self) {
        let mut state = self.state.borrow_mut();
        let at = state.now;
        state.line_low = false;
        state.events.push(WireEvent::BreakEnd { at });
    }
}

/// Virtual clock: waiting jumps straight to the deadline
pub struct SimClock {
    state: Rc<RefCell<State>>,
}

impl Monotonic for SimClock {
    fn now(&self) -> Instant {
        Instant::from_micros(self.state.borrow().now)
    }

    fn wait_until(&mut self, deadline: Instant) {
        let mut state = self.state.borrow_mut();
        state.now = state.now.max(deadline.as_micros());
        state.settle();
    }
}
