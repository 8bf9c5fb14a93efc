//! Port lifecycle and foreground API
//!
//! A [`Port`] owns the timer, both capture/compare channels, the two bit
//! engines, and the receive ring. Foreground code talks to it through
//! `send`/`read`/`available`; the platform's two timer interrupt vectors
//! call [`Port::on_tx_interrupt`] and [`Port::on_rx_interrupt`].
//!
//! The port monopolizes the timer. Nothing else may reprogram the counter
//! or either channel while the port is active.

use softuart_hal::gpio::{NullPin, OutputPin};
use softuart_hal::timer::{BitTimer, InputChannel, Level, OutputChannel};

use crate::config::{ConfigError, Timing};
use crate::ring::RxRing;
use crate::rx::RxEngine;
use crate::tx::TxEngine;

/// Full-duplex software UART port
///
/// `N` is the receive ring capacity (power of two). `P` is the optional
/// diagnostic timing pin; the default [`NullPin`] compiles to nothing.
pub struct Port<T, TX, RX, P = NullPin, const N: usize = 16>
where
    T: BitTimer,
    TX: OutputChannel,
    RX: InputChannel,
    P: OutputPin,
{
    timer: T,
    tx_channel: TX,
    rx_channel: RX,
    debug_pin: Option<P>,
    tx: TxEngine,
    rx: RxEngine,
    ring: RxRing<N>,
    timing: Timing,
}

impl<T, TX, RX, const N: usize> Port<T, TX, RX, NullPin, N>
where
    T: BitTimer,
    TX: OutputChannel,
    RX: InputChannel,
{
    /// Create a port without a diagnostic pin
    ///
    /// Validates the clock/baud combination; the port does nothing until
    /// [`init`](Port::init) runs.
    pub fn new(timer: T, tx_channel: TX, rx_channel: RX, timing: Timing) -> Result<Self, ConfigError> {
        Self::with_debug_pin(timer, tx_channel, rx_channel, timing, None)
    }
}

impl<T, TX, RX, P, const N: usize> Port<T, TX, RX, P, N>
where
    T: BitTimer,
    TX: OutputChannel,
    RX: InputChannel,
    P: OutputPin,
{
    /// Create a port, optionally with a diagnostic timing pin
    ///
    /// The pin is toggled at the end of every receive interrupt; scoping
    /// it against the RX line shows how close the sampler runs to the next
    /// bit boundary.
    pub fn with_debug_pin(
        timer: T,
        tx_channel: TX,
        rx_channel: RX,
        timing: Timing,
        debug_pin: Option<P>,
    ) -> Result<Self, ConfigError> {
        timing.validate()?;
        Ok(Self {
            timer,
            tx_channel,
            rx_channel,
            debug_pin,
            tx: TxEngine::new(),
            rx: RxEngine::new(),
            ring: RxRing::new(),
            timing,
        })
    }

    /// Configure pins and timer, and start listening
    ///
    /// Must run after clock calibration so the tick constants match the
    /// achieved frequency, and before interrupts are globally enabled.
    pub fn init(&mut self) {
        // TX idles at mark; the output unit owns the pin from here on
        self.tx_channel.force_output(Level::High);
        self.tx_channel.disable_interrupt();
        // Arm start-edge detection
        self.rx_channel.enter_capture();
        self.rx_channel.enable_interrupt();
        self.timer.start();
    }

    /// Stop the timer and release the pins
    ///
    /// Waits for an in-flight transmission, then holds the line at mark
    /// for one further bit period: the transmit engine never waits for its
    /// own stop bit, so the hold guarantees the final stop bit's duration
    /// before the pin reverts to GPIO.
    pub fn shutdown(&mut self) {
        while self.tx_channel.interrupt_enabled() {
            core::hint::spin_loop();
        }
        let start = self.timer.now();
        let hold = self.timing.ticks_per_bit();
        while self.timer.now().wrapping_sub(start) < hold {
            core::hint::spin_loop();
        }
        self.rx_channel.disable_interrupt();
        self.rx_channel.release();
        self.tx_channel.release();
        self.timer.stop();
    }

    /// Queue one byte if no transmission is in flight
    ///
    /// Returns `false` while the previous frame is still shifting out.
    pub fn try_send(&mut self, byte: u8) -> bool {
        if self.tx_channel.interrupt_enabled() {
            return false;
        }
        // Resync to the running counter so the first edge is strictly in
        // the future no matter how long the caller waited.
        let now = self.timer.now();
        self.tx_channel
            .set_match(now.wrapping_add(self.timing.ticks_per_bit()));
        self.tx_channel.set_output(Level::High);
        self.tx_channel.enable_interrupt();
        self.tx.load(byte, self.timing.stop_bits);
        true
    }

    /// Send one byte, blocking until any previous frame completes
    ///
    /// Busy-waits on the transmit interrupt disabling itself. Interrupts
    /// must be globally enabled, or this never returns. When the port
    /// lives behind a [`SharedPort`](crate::shared::SharedPort), use that
    /// wrapper's `send` instead so the wait happens outside the critical
    /// section.
    pub fn send(&mut self, byte: u8) {
        while !self.try_send(byte) {
            core::hint::spin_loop();
        }
    }

    /// True when no transmission is in flight
    pub fn tx_idle(&self) -> bool {
        !self.tx_channel.interrupt_enabled()
    }

    /// Remove and return the oldest received byte, if any
    pub fn read(&mut self) -> Option<u8> {
        self.ring.pop()
    }

    /// Remove and return the oldest received byte without checking
    ///
    /// Caller must have just confirmed `available() > 0`, e.g. when
    /// draining a counted batch.
    pub fn read_unchecked(&mut self) -> u8 {
        self.ring.pop_unchecked()
    }

    /// Number of received bytes waiting
    pub fn available(&self) -> usize {
        self.ring.available()
    }

    /// True if no received bytes are waiting
    pub fn is_empty(&self) -> bool {
        self.ring.is_empty()
    }

    /// Receive ring, for producer access from the receive interrupt
    pub fn ring(&self) -> &RxRing<N> {
        &self.ring
    }

    /// Timing parameters this port was built with
    pub fn timing(&self) -> &Timing {
        &self.timing
    }

    /// Transmit interrupt entry point: emit the next frame bit
    pub fn on_tx_interrupt(&mut self) {
        self.tx
            .step(&mut self.tx_channel, self.timing.ticks_per_bit());
    }

    /// Receive interrupt entry point: start-edge detect or bit sample
    pub fn on_rx_interrupt(&mut self) {
        self.rx.step(&mut self.rx_channel, &self.ring, &self.timing);
        if let Some(pin) = &mut self.debug_pin {
            pin.toggle();
        }
    }
}
