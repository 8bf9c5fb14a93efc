//! Statically allocated port singleton
//!
//! Interrupt handlers need a fixed, allocation-free path to the one
//! [`Port`] instance. A [`SharedPort`] is a `const`-constructible cell
//! meant for a `static`: bind the port once at startup, then the two
//! interrupt vectors and foreground code all reach it through short
//! critical sections.
//!
//! The blocking `send` polls outside the critical section, so the
//! transmit interrupt keeps running while foreground waits for the
//! previous frame to finish.
//!
//! ```ignore
//! static SERIAL: SharedPort<Timer, TxCh, RxCh, NullPin, 16> = SharedPort::new();
//!
//! #[interrupt]
//! fn TIMER_CH0() {
//!     SERIAL.on_tx_interrupt();
//! }
//! ```

use core::cell::RefCell;

use critical_section::Mutex;
use softuart_hal::gpio::{NullPin, OutputPin};
use softuart_hal::timer::{BitTimer, InputChannel, OutputChannel};

use crate::port::Port;

/// Critical-section guarded wrapper around an optional [`Port`]
pub struct SharedPort<T, TX, RX, P = NullPin, const N: usize = 16>
where
    T: BitTimer,
    TX: OutputChannel,
    RX: InputChannel,
    P: OutputPin,
{
    inner: Mutex<RefCell<Option<Port<T, TX, RX, P, N>>>>,
}

impl<T, TX, RX, P, const N: usize> SharedPort<T, TX, RX, P, N>
where
    T: BitTimer,
    TX: OutputChannel,
    RX: InputChannel,
    P: OutputPin,
{
    /// Create an empty cell, usable in a `static`
    pub const fn new() -> Self {
        Self {
            inner: Mutex::new(RefCell::new(None)),
        }
    }

    /// Bind the port and bring it up
    ///
    /// Call once at startup, before interrupts are globally enabled.
    /// Returns the previously bound port, if any.
    pub fn bind(&self, mut port: Port<T, TX, RX, P, N>) -> Option<Port<T, TX, RX, P, N>> {
        port.init();
        critical_section::with(|cs| self.inner.borrow_ref_mut(cs).replace(port))
    }

    /// Take the port back out, shutting it down first
    pub fn unbind(&self) -> Option<Port<T, TX, RX, P, N>> {
        critical_section::with(|cs| {
            let mut slot = self.inner.borrow_ref_mut(cs);
            if let Some(port) = slot.as_mut() {
                port.shutdown();
            }
            slot.take()
        })
    }

    /// Run a closure against the bound port
    ///
    /// Returns `None` if no port is bound.
    pub fn with<F, R>(&self, f: F) -> Option<R>
    where
        F: FnOnce(&mut Port<T, TX, RX, P, N>) -> R,
    {
        critical_section::with(|cs| self.inner.borrow_ref_mut(cs).as_mut().map(f))
    }

    /// Send one byte, blocking until any previous frame completes
    ///
    /// Each attempt runs in its own critical section; between attempts
    /// interrupts are free to drain the in-flight frame. Returns `false`
    /// if no port is bound (rather than spinning forever).
    pub fn send(&self, byte: u8) -> bool {
        loop {
            match self.with(|port| port.try_send(byte)) {
                None => return false,
                Some(true) => return true,
                Some(false) => core::hint::spin_loop(),
            }
        }
    }

    /// Remove and return the oldest received byte, if any
    pub fn read(&self) -> Option<u8> {
        self.with(|port| port.read()).flatten()
    }

    /// Remove and return the oldest received byte without checking
    ///
    /// Caller must have just confirmed `available() > 0`.
    pub fn read_unchecked(&self) -> u8 {
        self.with(|port| port.read_unchecked()).unwrap_or(0)
    }

    /// Number of received bytes waiting
    pub fn available(&self) -> usize {
        self.with(|port| port.available()).unwrap_or(0)
    }

    /// True if no received bytes are waiting (or no port is bound)
    pub fn is_empty(&self) -> bool {
        self.with(|port| port.is_empty()).unwrap_or(true)
    }

    /// Transmit interrupt entry point
    pub fn on_tx_interrupt(&self) {
        self.with(|port| port.on_tx_interrupt());
    }

    /// Receive interrupt entry point
    pub fn on_rx_interrupt(&self) {
        self.with(|port| port.on_rx_interrupt());
    }
}

impl<T, TX, RX, P, const N: usize> Default for SharedPort<T, TX, RX, P, N>
where
    T: BitTimer,
    TX: OutputChannel,
    RX: InputChannel,
    P: OutputPin,
{
    fn default() -> Self {
        Self::new()
    }
}
