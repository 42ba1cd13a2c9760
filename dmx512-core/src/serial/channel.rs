//! Buffered serial channel implementation
//!
//! Foreground code and the interrupt handler share one [`BufferedSerial`]
//! through `&self`. Each ring buffer has exactly one producer and one
//! consumer, so single pushes and pops need no locking. Only the compound
//! check-then-act sequences that touch the TxEmpty interrupt enable run with
//! interrupts masked.

use core::hint::spin_loop;

use dmx512_hal::uart::{Interrupt, SerialRegisters};
use portable_atomic::{AtomicBool, Ordering};

use super::errors::{ErrorCells, ErrorCounters, SerialError};
use crate::config::{SerialConfig, TransmitMode};
use crate::ring::RingBuffer;

/// Interrupt-driven serial channel with `RX`/`TX` byte queues
///
/// Typical placement is a `static`, shared by the application loop and the
/// peripheral's interrupt handler:
///
/// ```ignore
/// static DMX: BufferedSerial<Usart1, 16, 512> = BufferedSerial::new(Usart1::new());
///
/// #[interrupt]
/// fn USART1() {
///     DMX.on_interrupt();
/// }
/// ```
pub struct BufferedSerial<U, const RX: usize, const TX: usize> {
    usart: U,
    rx: RingBuffer<RX>,
    tx: RingBuffer<TX>,
    blocking: AtomicBool,
    initialized: AtomicBool,
    errors: ErrorCells,
}

impl<U, const RX: usize, const TX: usize> BufferedSerial<U, RX, TX> {
    /// Wrap a transport; nothing is touched until [`initialize`](Self::initialize)
    pub const fn new(usart: U) -> Self {
        Self {
            usart,
            rx: RingBuffer::new(),
            tx: RingBuffer::new(),
            blocking: AtomicBool::new(true),
            initialized: AtomicBool::new(false),
            errors: ErrorCells::new(),
        }
    }

    /// Underlying transport
    pub fn usart(&self) -> &U {
        &self.usart
    }

    /// Check if [`initialize`](Self::initialize) has run
    pub fn is_initialized(&self) -> bool {
        self.initialized.load(Ordering::Acquire)
    }

    /// Full-queue policy recorded at initialization
    pub fn transmit_mode(&self) -> TransmitMode {
        if self.blocking.load(Ordering::Relaxed) {
            TransmitMode::Blocking
        } else {
            TransmitMode::NonBlocking
        }
    }

    /// Bytes waiting in the transmit queue
    pub fn pending_transmit(&self) -> usize {
        self.tx.len()
    }

    /// Bytes waiting in the receive queue
    pub fn pending_receive(&self) -> usize {
        self.rx.len()
    }

    /// Receive error counters accumulated by the interrupt handler
    pub fn error_counters(&self) -> ErrorCounters {
        self.errors.snapshot()
    }

    /// Zero the receive error counters
    pub fn reset_error_counters(&self) {
        self.errors.reset();
    }

    /// Non-blocking read of one received byte
    pub fn read(&self) -> Option<u8> {
        self.rx.pop()
    }

    /// Read up to `buf.len()` received bytes
    ///
    /// Never blocks; returns how many bytes were copied, which is short
    /// when the receive queue runs empty.
    pub fn read_bytes(&self, buf: &mut [u8]) -> usize {
        let mut count = 0;
        for slot in buf.iter_mut() {
            match self.rx.pop() {
                Some(byte) => {
                    *slot = byte;
                    count += 1;
                }
                None => break,
            }
        }
        count
    }

    /// Drop everything in the receive queue
    ///
    /// Returns how many bytes were discarded.
    pub fn discard_receive_buffer(&self) -> usize {
        self.rx.clear()
    }
}

impl<U: SerialRegisters, const RX: usize, const TX: usize> BufferedSerial<U, RX, TX> {
    /// Arm the receive interrupt and record the full-queue policy
    ///
    /// Framing (baud rate, parity, stop bits) must already be applied by the
    /// chip HAL. Must run before any other operation.
    pub fn initialize(&self, config: &SerialConfig) {
        self.blocking
            .store(config.mode == TransmitMode::Blocking, Ordering::Relaxed);

        self.usart
            .enable_interrupt_vector(true, config.interrupt_priority);
        self.usart.enable_interrupt(Interrupt::RxNotEmpty);
        self.usart.set_transmitter_enable(true);
        self.usart.set_receiver_enable(true);

        self.initialized.store(true, Ordering::Release);
    }

    /// Write one byte straight to the hardware, bypassing the transmit queue
    ///
    /// Spins until the data register is free. Meant for time-critical
    /// protocol bytes; must not interleave with buffered writes.
    pub fn write_blocking(&self, byte: u8) {
        while !self.usart.is_transmit_register_empty() {
            spin_loop();
        }
        self.usart.write_data(byte);
    }

    /// [`write_blocking`](Self::write_blocking) for each byte, in order
    pub fn write_all_blocking(&self, data: &[u8]) {
        for &byte in data {
            self.write_blocking(byte);
        }
    }

    /// Queue one byte for interrupt-driven transmission
    ///
    /// When nothing is queued and the data register is free the byte goes
    /// out directly. Otherwise it is queued; a full queue spins in
    /// [`TransmitMode::Blocking`] and fails with
    /// [`SerialError::BufferFull`] in [`TransmitMode::NonBlocking`].
    pub fn write(&self, byte: u8) -> Result<(), SerialError> {
        debug_assert!(self.is_initialized(), "serial channel used before initialize");

        if self.tx.is_empty() && self.usart.is_transmit_register_empty() {
            self.usart.write_data(byte);
            return Ok(());
        }

        let mut pending = byte;
        while let Err(rejected) = self.tx.push(pending) {
            if !self.blocking.load(Ordering::Relaxed) {
                return Err(SerialError::BufferFull);
            }
            pending = rejected;
            spin_loop();
        }

        // CR1-style enable bits are read-modify-write; the handler clears
        // TxEmpty from interrupt context.
        critical_section::with(|_| self.usart.enable_interrupt(Interrupt::TxEmpty));
        Ok(())
    }

    /// Queue bytes until the first rejection
    ///
    /// Returns how many bytes were accepted. A short count is not an error.
    pub fn write_bytes(&self, data: &[u8]) -> usize {
        let mut count = 0;
        for &byte in data {
            if self.write(byte).is_err() {
                break;
            }
            count += 1;
        }
        count
    }

    /// True iff nothing is queued and the last byte has fully left the wire
    ///
    /// An empty data register alone is not enough: the byte before it can
    /// still be in the shift register.
    pub fn is_write_finished(&self) -> bool {
        self.tx.is_empty()
            && self.usart.is_transmit_register_empty()
            && self.usart.is_transmission_complete()
    }

    /// Spin until [`is_write_finished`](Self::is_write_finished)
    pub fn flush_write_buffer(&self) {
        while !self.is_write_finished() {
            spin_loop();
        }
    }

    /// Abort buffered transmission
    ///
    /// Disables the TxEmpty interrupt and drops every queued byte without
    /// sending it. Returns how many bytes were discarded. Bytes already in
    /// the data register or the shift register still go out.
    pub fn discard_transmit_buffer(&self) -> usize {
        critical_section::with(|_| {
            self.usart.disable_interrupt(Interrupt::TxEmpty);
            self.tx.clear()
        })
    }

    /// Interrupt service routine body
    ///
    /// Call from the peripheral's interrupt vector. Services both directions
    /// independently: one received byte into the receive queue, one queued
    /// byte out to the data register. TxEmpty is disabled once the transmit
    /// queue runs dry.
    pub fn on_interrupt(&self) {
        let errors = self.usart.take_line_errors();
        if errors.any() {
            self.errors.record(errors);
        }

        if self.usart.is_receive_register_not_empty() {
            let byte = self.usart.read_data();
            if self.rx.push(byte).is_err() {
                self.errors.record_dropped();
            }
        }

        // Only the transmit side owned by an enabled TxEmpty is serviced, so a
        // receive-triggered run never races discard_transmit_buffer.
        if self.usart.is_interrupt_enabled(Interrupt::TxEmpty)
            && self.usart.is_transmit_register_empty()
        {
            match self.tx.pop() {
                Some(byte) => self.usart.write_data(byte),
                None => self.usart.disable_interrupt(Interrupt::TxEmpty),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use core::cell::{Cell, RefCell};
    use dmx512_hal::uart::LineErrors;

    /// Mock USART with a single data register per direction
    #[derive(Default)]
    struct MockUsart {
        /// Byte in the transmit data register (TXE is false while Some)
        tdr: Cell<Option<u8>>,
        /// Bytes that left the transmit data register
        wire: RefCell<heapless::Vec<u8, 1024>>,
        /// Byte in the receive data register
        rdr: Cell<Option<u8>>,
        errors: Cell<LineErrors>,
        tx_irq: Cell<bool>,
        rx_irq: Cell<bool>,
        vector: Cell<Option<u8>>,
        tx_enabled: Cell<bool>,
        rx_enabled: Cell<bool>,
        /// Shift the transmit register out whenever TXE is polled
        auto_shift: Cell<bool>,
        /// Shift register still clocking out a byte (TC is false while set)
        shifting: Cell<bool>,
    }

    impl MockUsart {
        /// Hardware finished sending the byte in the data register
        fn shift(&self) {
            if let Some(byte) = self.tdr.take() {
                self.wire.borrow_mut().push(byte).unwrap();
            }
        }

        fn receive(&self, byte: u8) {
            if self.rdr.get().is_some() {
                let mut errors = self.errors.get();
                errors.overrun = true;
                self.errors.set(errors);
            }
            self.rdr.set(Some(byte));
        }

        fn wire(&self) -> heapless::Vec<u8, 1024> {
            self.wire.borrow().clone()
        }
    }

    impl SerialRegisters for MockUsart {
        fn write_data(&self, byte: u8) {
            assert!(self.tdr.get().is_none(), "write to busy data register");
            self.tdr.set(Some(byte));
        }

        fn read_data(&self) -> u8 {
            self.rdr.take().unwrap_or(0)
        }

        fn is_transmit_register_empty(&self) -> bool {
            if self.auto_shift.get() {
                self.shift();
            }
            self.tdr.get().is_none()
        }

        fn is_transmission_complete(&self) -> bool {
            self.tdr.get().is_none() && !self.shifting.get()
        }

        fn is_receive_register_not_empty(&self) -> bool {
            self.rdr.get().is_some()
        }

        fn take_line_errors(&self) -> LineErrors {
            self.errors.replace(LineErrors::NONE)
        }

        fn enable_interrupt(&self, interrupt: Interrupt) {
            match interrupt {
                Interrupt::TxEmpty => self.tx_irq.set(true),
                Interrupt::RxNotEmpty => self.rx_irq.set(true),
            }
        }

        fn disable_interrupt(&self, interrupt: Interrupt) {
            match interrupt {
                Interrupt::TxEmpty => self.tx_irq.set(false),
                Interrupt::RxNotEmpty => self.rx_irq.set(false),
            }
        }

        fn is_interrupt_enabled(&self, interrupt: Interrupt) -> bool {
            match interrupt {
                Interrupt::TxEmpty => self.tx_irq.get(),
                Interrupt::RxNotEmpty => self.rx_irq.get(),
            }
        }

        fn enable_interrupt_vector(&self, enable: bool, priority: u8) {
            self.vector.set(enable.then_some(priority));
        }

        fn set_transmitter_enable(&self, enable: bool) {
            self.tx_enabled.set(enable);
        }

        fn set_receiver_enable(&self, enable: bool) {
            self.rx_enabled.set(enable);
        }
    }

    type TestSerial = BufferedSerial<MockUsart, 4, 8>;

    fn serial(mode: TransmitMode) -> TestSerial {
        let serial = BufferedSerial::new(MockUsart::default());
        serial.initialize(&SerialConfig::dmx512().with_mode(mode));
        serial
    }

    /// Let the hardware and the interrupt handler run until the queue is empty
    fn drain(serial: &TestSerial) {
        let usart = serial.usart();
        loop {
            usart.shift();
            if !usart.tx_irq.get() {
                break;
            }
            serial.on_interrupt();
        }
        usart.shift();
    }

    #[test]
    fn test_initialize_arms_receive_path() {
        let serial = serial(TransmitMode::NonBlocking);
        let usart = serial.usart();

        assert!(serial.is_initialized());
        assert_eq!(serial.transmit_mode(), TransmitMode::NonBlocking);
        assert_eq!(usart.vector.get(), Some(3));
        assert!(usart.rx_irq.get());
        assert!(!usart.tx_irq.get());
        assert!(usart.tx_enabled.get());
        assert!(usart.rx_enabled.get());
    }

    #[test]
    fn test_write_fast_path_skips_queue() {
        let serial = serial(TransmitMode::Blocking);

        serial.write(0x42).unwrap();

        assert_eq!(serial.usart().tdr.get(), Some(0x42));
        assert_eq!(serial.pending_transmit(), 0);
        assert!(!serial.usart().tx_irq.get());
    }

    #[test]
    fn test_write_queues_when_register_busy() {
        let serial = serial(TransmitMode::Blocking);

        serial.write(1).unwrap();
        serial.write(2).unwrap();
        serial.write(3).unwrap();

        assert_eq!(serial.pending_transmit(), 2);
        assert!(serial.usart().tx_irq.get());
        assert!(!serial.is_write_finished());

        drain(&serial);

        assert_eq!(serial.usart().wire().as_slice(), &[1, 2, 3]);
        assert!(serial.is_write_finished());
        assert!(!serial.usart().tx_irq.get());
    }

    #[test]
    fn test_write_finished_only_after_register_empties() {
        let serial = serial(TransmitMode::Blocking);

        serial.write(7).unwrap();
        assert!(!serial.is_write_finished());

        serial.usart().shift();
        assert!(serial.is_write_finished());
    }

    #[test]
    fn test_write_finished_waits_for_shift_register() {
        let serial = serial(TransmitMode::Blocking);

        serial.write(7).unwrap();
        serial.usart().shift();
        serial.usart().shifting.set(true);

        // Data register free, stop bits still on the line
        assert!(serial.usart().is_transmit_register_empty());
        assert!(!serial.is_write_finished());

        serial.usart().shifting.set(false);
        assert!(serial.is_write_finished());
    }

    #[test]
    fn test_non_blocking_full_queue_rejects() {
        let serial = serial(TransmitMode::NonBlocking);

        // One byte in the data register plus eight queued
        let accepted = serial.write_bytes(&[0, 1, 2, 3, 4, 5, 6, 7, 8, 9, 10]);
        assert_eq!(accepted, 9);
        assert_eq!(serial.write(0xEE), Err(SerialError::BufferFull));

        drain(&serial);

        assert_eq!(serial.usart().wire().as_slice(), &[0, 1, 2, 3, 4, 5, 6, 7, 8]);
    }

    #[test]
    fn test_discard_transmit_buffer() {
        let serial = serial(TransmitMode::NonBlocking);
        serial.write_bytes(&[10, 11, 12, 13]);

        assert_eq!(serial.discard_transmit_buffer(), 3);
        assert!(!serial.usart().tx_irq.get());

        drain(&serial);

        assert_eq!(serial.usart().wire().as_slice(), &[10]);
        assert!(serial.is_write_finished());
        assert_eq!(serial.discard_transmit_buffer(), 0);
    }

    #[test]
    fn test_interrupt_ignores_transmit_side_when_disabled() {
        let serial = serial(TransmitMode::NonBlocking);
        serial.write_bytes(&[1, 2]);
        serial.usart().disable_interrupt(Interrupt::TxEmpty);
        serial.usart().shift();

        serial.usart().receive(0x55);
        serial.on_interrupt();

        assert_eq!(serial.pending_transmit(), 1);
        assert_eq!(serial.read(), Some(0x55));
    }

    #[test]
    fn test_write_blocking_bypasses_queue() {
        let serial = serial(TransmitMode::Blocking);
        serial.usart().auto_shift.set(true);

        serial.write_all_blocking(&[0x00, 0xFF, 0x10]);
        serial.usart().shift();

        assert_eq!(serial.usart().wire().as_slice(), &[0x00, 0xFF, 0x10]);
        assert_eq!(serial.pending_transmit(), 0);
        assert!(!serial.usart().tx_irq.get());
    }

    #[test]
    fn test_read_in_arrival_order() {
        let serial = serial(TransmitMode::Blocking);
        assert_eq!(serial.read(), None);

        for byte in [b'a', b'b', b'c'] {
            serial.usart().receive(byte);
            serial.on_interrupt();
        }

        let mut buf = [0u8; 8];
        assert_eq!(serial.read_bytes(&mut buf), 3);
        assert_eq!(&buf[..3], b"abc");
        assert_eq!(serial.read_bytes(&mut buf), 0);
    }

    #[test]
    fn test_receive_overflow_is_counted() {
        let serial = serial(TransmitMode::Blocking);

        for byte in 0..6 {
            serial.usart().receive(byte);
            serial.on_interrupt();
        }

        assert_eq!(serial.pending_receive(), 4);
        assert_eq!(serial.error_counters().rx_dropped, 2);

        // Oldest bytes survive, newest are dropped
        let mut buf = [0u8; 4];
        assert_eq!(serial.read_bytes(&mut buf), 4);
        assert_eq!(buf, [0, 1, 2, 3]);
    }

    #[test]
    fn test_hardware_overrun_is_counted() {
        let serial = serial(TransmitMode::Blocking);

        serial.usart().receive(1);
        serial.usart().receive(2);
        serial.on_interrupt();

        assert_eq!(serial.error_counters().overrun, 1);
        assert_eq!(serial.read(), Some(2));

        serial.reset_error_counters();
        assert_eq!(serial.error_counters().total(), 0);
    }

    #[test]
    fn test_discard_receive_buffer() {
        let serial = serial(TransmitMode::Blocking);
        for byte in 0..3 {
            serial.usart().receive(byte);
            serial.on_interrupt();
        }

        assert_eq!(serial.discard_receive_buffer(), 3);
        assert_eq!(serial.read(), None);
    }
}
