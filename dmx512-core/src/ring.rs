//! Lock-free single-producer/single-consumer byte queue
//!
//! One side of the queue runs in foreground code, the other in an interrupt
//! handler. Both hold a shared reference; the roles are fixed by convention:
//!
//! - transmit queue: foreground pushes, interrupt pops
//! - receive queue: interrupt pushes, foreground pops
//!
//! The producer owns `tail`, the consumer owns `head`. Each side publishes
//! its index with a `Release` store and observes the other side's index with
//! an `Acquire` load, so a slot written before a push is visible to the pop
//! that observes the new tail, and a slot is only reused after the pop that
//! freed it is visible to the producer.

use portable_atomic::{AtomicU8, AtomicUsize, Ordering};

/// Fixed-capacity circular byte queue with exactly `N` usable slots
///
/// `N` must be a power of two so the free-running indices can wrap at
/// `usize::MAX` without breaking the slot mapping.
pub struct RingBuffer<const N: usize> {
    slots: [AtomicU8; N],
    /// Next slot to pop (written by the consumer only)
    head: AtomicUsize,
    /// Next slot to push (written by the producer only)
    tail: AtomicUsize,
}

impl<const N: usize> Default for RingBuffer<N> {
    fn default() -> Self {
        Self::new()
    }
}

impl<const N: usize> RingBuffer<N> {
    const MASK: usize = N - 1;

    const CAPACITY_CHECK: () = assert!(
        N.is_power_of_two(),
        "RingBuffer capacity must be a power of two"
    );

    /// Create an empty queue
    pub const fn new() -> Self {
        #[allow(clippy::let_unit_value)]
        let () = Self::CAPACITY_CHECK;

        Self {
            slots: [const { AtomicU8::new(0) }; N],
            head: AtomicUsize::new(0),
            tail: AtomicUsize::new(0),
        }
    }

    /// Maximum number of bytes the queue can hold
    pub const fn capacity(&self) -> usize {
        N
    }

    /// Number of bytes currently queued
    pub fn len(&self) -> usize {
        let tail = self.tail.load(Ordering::Acquire);
        let head = self.head.load(Ordering::Acquire);
        tail.wrapping_sub(head)
    }

    /// Check if the queue holds no bytes
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Check if a push would fail
    pub fn is_full(&self) -> bool {
        self.len() >= N
    }

    /// Append a byte (producer side)
    ///
    /// Returns the byte back if the queue is full; queued data is never
    /// overwritten.
    pub fn push(&self, byte: u8) -> Result<(), u8> {
        let tail = self.tail.load(Ordering::Relaxed);
        let head = self.head.load(Ordering::Acquire);

        if tail.wrapping_sub(head) >= N {
            return Err(byte);
        }

        self.slots[tail & Self::MASK].store(byte, Ordering::Relaxed);
        self.tail.store(tail.wrapping_add(1), Ordering::Release);
        Ok(())
    }

    /// Look at the oldest byte without removing it (consumer side)
    pub fn peek(&self) -> Option<u8> {
        let head = self.head.load(Ordering::Relaxed);
        let tail = self.tail.load(Ordering::Acquire);

        if head == tail {
            return None;
        }

        Some(self.slots[head & Self::MASK].load(Ordering::Relaxed))
    }

    /// Remove and return the oldest byte (consumer side)
    pub fn pop(&self) -> Option<u8> {
        let head = self.head.load(Ordering::Relaxed);
        let tail = self.tail.load(Ordering::Acquire);

        if head == tail {
            return None;
        }

        let byte = self.slots[head & Self::MASK].load(Ordering::Relaxed);
        self.head.store(head.wrapping_add(1), Ordering::Release);
        Some(byte)
    }

    /// Drop every queued byte (consumer side)
    ///
    /// Returns how many bytes were discarded.
    pub fn clear(&self) -> usize {
        let mut count = 0;
        while self.pop().is_some() {
            count += 1;
        }
        count
    }
}
