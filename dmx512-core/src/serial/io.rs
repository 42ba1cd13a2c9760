//! `embedded-io` integration
//!
//! Lets generic byte-stream code (formatters, line editors, protocol
//! parsers) run on top of a [`BufferedSerial`]. The blocking traits follow
//! the `embedded-io` contract: `read` and `write` wait for at least one byte
//! and then move as much as is immediately possible.

use core::convert::Infallible;
use core::hint::spin_loop;

use dmx512_hal::uart::SerialRegisters;
use embedded_io::{ErrorType, Read, ReadReady, Write, WriteReady};

use super::channel::BufferedSerial;

impl<U: SerialRegisters, const RX: usize, const TX: usize> ErrorType for BufferedSerial<U, RX, TX> {
    type Error = Infallible;
}

impl<U: SerialRegisters, const RX: usize, const TX: usize> Read for BufferedSerial<U, RX, TX> {
    fn read(&mut self, buf: &mut [u8]) -> Result<usize, Self::Error> {
        if buf.is_empty() {
            return Ok(0);
        }
        loop {
            let count = self.read_bytes(buf);
            if count > 0 {
                return Ok(count);
            }
            spin_loop();
        }
    }
}

impl<U: SerialRegisters, const RX: usize, const TX: usize> ReadReady
    for BufferedSerial<U, RX, TX>
{
    fn read_ready(&mut self) -> Result<bool, Self::Error> {
        Ok(self.pending_receive() > 0)
    }
}

impl<U: SerialRegisters, const RX: usize, const TX: usize> Write for BufferedSerial<U, RX, TX> {
    fn write(&mut self, buf: &[u8]) -> Result<usize, Self::Error> {
        if buf.is_empty() {
            return Ok(0);
        }
        loop {
            let count = self.write_bytes(buf);
            if count > 0 {
                return Ok(count);
            }
            spin_loop();
        }
    }

    fn flush(&mut self) -> Result<(), Self::Error> {
        self.flush_write_buffer();
        Ok(())
    }
}

impl<U: SerialRegisters, const RX: usize, const TX: usize> WriteReady
    for BufferedSerial<U, RX, TX>
{
    fn write_ready(&mut self) -> Result<bool, Self::Error> {
        Ok(self.pending_transmit() < TX)
    }
}
