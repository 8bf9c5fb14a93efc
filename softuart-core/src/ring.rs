//! Receive ring buffer
//!
//! Single-producer single-consumer byte queue between the receive
//! interrupt (producer) and foreground reads (consumer). Each index is
//! written by exactly one side, so no lock is needed; acquire/release
//! pairs on the index atomics order the data writes against the index
//! updates.
//!
//! Overflow policy: when the buffer is full the incoming byte is dropped
//! silently and the buffered data is left untouched (newest dropped,
//! oldest preserved). Usable capacity is `N - 1`.

#![allow(unsafe_code)]

use core::cell::UnsafeCell;
use core::sync::atomic::{AtomicUsize, Ordering};

/// Fixed-capacity SPSC ring buffer for received bytes
///
/// `N` must be a power of two (and at least 2) so index wrap is a mask.
///
/// # Concurrency contract
///
/// [`push`](RxRing::push) may only be called from the receive interrupt;
/// [`pop`](RxRing::pop), [`pop_unchecked`](RxRing::pop_unchecked),
/// [`available`](RxRing::available) and [`is_empty`](RxRing::is_empty)
/// only from foreground context. One producer, one consumer, ever.
pub struct RxRing<const N: usize> {
    buf: UnsafeCell<[u8; N]>,
    /// Write index, advanced only by the producer
    head: AtomicUsize,
    /// Read index, advanced only by the consumer
    tail: AtomicUsize,
}

// SAFETY: the SPSC contract above partitions all mutation by role; the
// index atomics publish buffer writes before the consumer can observe the
// advanced head (and vice versa for the tail).
unsafe impl<const N: usize> Sync for RxRing<N> {}
unsafe impl<const N: usize> Send for RxRing<N> {}

impl<const N: usize> RxRing<N> {
    const CAPACITY_OK: () = assert!(
        N.is_power_of_two() && N >= 2,
        "ring capacity must be a power of two"
    );

    /// Create an empty ring buffer
    pub const fn new() -> Self {
        let () = Self::CAPACITY_OK;
        Self {
            buf: UnsafeCell::new([0; N]),
            head: AtomicUsize::new(0),
            tail: AtomicUsize::new(0),
        }
    }

    /// Append a byte; returns whether it was accepted
    ///
    /// Producer side only (receive interrupt). On overflow the byte is
    /// dropped and `false` returned; nothing else changes.
    pub fn push(&self, byte: u8) -> bool {
        let head = self.head.load(Ordering::Relaxed);
        let next = (head + 1) & (N - 1);
        if next == self.tail.load(Ordering::Acquire) {
            return false;
        }
        // SAFETY: `head` is owned by the producer and `next != tail`, so
        // this slot is not visible to the consumer yet.
        unsafe {
            (*self.buf.get())[head] = byte;
        }
        self.head.store(next, Ordering::Release);
        true
    }

    /// Remove and return the oldest byte, if any
    ///
    /// Consumer side only.
    pub fn pop(&self) -> Option<u8> {
        let tail = self.tail.load(Ordering::Relaxed);
        if tail == self.head.load(Ordering::Acquire) {
            return None;
        }
        // SAFETY: `tail != head`, so this slot holds published data the
        // producer will not touch until we advance `tail`.
        let byte = unsafe { (*self.buf.get())[tail] };
        self.tail.store((tail + 1) & (N - 1), Ordering::Release);
        Some(byte)
    }

    /// Remove and return the oldest byte without an emptiness check
    ///
    /// Consumer side only. The caller must have just confirmed
    /// `available() > 0`; on an empty ring the returned byte is stale and
    /// the indices desynchronize.
    pub fn pop_unchecked(&self) -> u8 {
        let tail = self.tail.load(Ordering::Relaxed);
        // SAFETY: caller guarantees the ring is non-empty, making this the
        // same slot access as `pop`.
        let byte = unsafe { (*self.buf.get())[tail] };
        self.tail.store((tail + 1) & (N - 1), Ordering::Release);
        byte
    }

    /// Number of bytes currently buffered
    pub fn available(&self) -> usize {
        let head = self.head.load(Ordering::Acquire);
        let tail = self.tail.load(Ordering::Relaxed);
        head.wrapping_sub(tail) & (N - 1)
    }

    /// True if no bytes are buffered
    pub fn is_empty(&self) -> bool {
        self.head.load(Ordering::Acquire) == self.tail.load(Ordering::Relaxed)
    }
}

impl<const N: usize> Default for RxRing<N> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_pop_is_idempotent() {
        let ring: RxRing<16> = RxRing::new();
        assert!(ring.is_empty());
        assert_eq!(ring.pop(), None);
        assert_eq!(ring.pop(), None);
        assert!(ring.is_empty());
        assert_eq!(ring.available(), 0);
    }

    #[test]
    fn test_capacity_law() {
        let ring: RxRing<16> = RxRing::new();
        for i in 0..15 {
            assert!(ring.push(i), "push {} should fit", i);
        }
        assert_eq!(ring.available(), 15);
        // 16th byte is dropped, buffer unchanged
        assert!(!ring.push(0xFF));
        assert_eq!(ring.available(), 15);
        // A pop frees one slot; push succeeds again
        assert_eq!(ring.pop(), Some(0));
        assert!(ring.push(0xFF));
        assert_eq!(ring.available(), 15);
    }

    #[test]
    fn test_fifo_order() {
        let ring: RxRing<8> = RxRing::new();
        for b in [0x10, 0x20, 0x30] {
            assert!(ring.push(b));
        }
        assert_eq!(ring.pop(), Some(0x10));
        assert!(ring.push(0x40));
        assert_eq!(ring.pop(), Some(0x20));
        assert_eq!(ring.pop(), Some(0x30));
        assert_eq!(ring.pop(), Some(0x40));
        assert_eq!(ring.pop(), None);
    }

    #[test]
    fn test_wraps_around_capacity() {
        let ring: RxRing<4> = RxRing::new();
        // Cycle well past the physical array length
        for round in 0u8..10 {
            assert!(ring.push(round));
            assert_eq!(ring.pop(), Some(round));
        }
        assert!(ring.is_empty());
    }

    #[test]
    fn test_pop_unchecked_after_available() {
        let ring: RxRing<8> = RxRing::new();
        ring.push(0xAB);
        ring.push(0xCD);
        assert!(ring.available() > 0);
        assert_eq!(ring.pop_unchecked(), 0xAB);
        assert_eq!(ring.pop_unchecked(), 0xCD);
        assert!(ring.is_empty());
    }

    #[test]
    fn test_overflow_preserves_oldest() {
        let ring: RxRing<4> = RxRing::new();
        assert!(ring.push(1));
        assert!(ring.push(2));
        assert!(ring.push(3));
        assert!(!ring.push(4)); // full, dropped
        assert_eq!(ring.pop(), Some(1));
        assert_eq!(ring.pop(), Some(2));
        assert_eq!(ring.pop(), Some(3));
        assert_eq!(ring.pop(), None);
    }
}
