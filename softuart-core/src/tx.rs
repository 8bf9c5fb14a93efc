//! Transmit engine
//!
//! A one-shot bit shifter clocked by the TX channel's compare interrupt.
//! The whole frame lives in one 16-bit shift register: start bit in the
//! LSB, then the 8 data bits LSB-first, then the stop bit(s). The register
//! reaching zero doubles as the end-of-frame condition, which is why the
//! stop bits are the highest set bits.

use softuart_hal::timer::{Level, OutputChannel};

use crate::config::StopBits;

// Stop-bit patterns, positioned above the 8 data bits (before the start
// bit is shifted in).
const STOP_ONE: u16 = 0x0100;
const STOP_TWO: u16 = 0x0300;

/// Interrupt-driven transmit bit shifter
///
/// Owned by the transmit interrupt; foreground code interacts with it only
/// through [`Port::send`](crate::port::Port::send) while the interrupt is
/// disabled.
#[derive(Debug, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct TxEngine {
    /// Remaining frame bits, LSB sent next; zero means idle
    shift: u16,
}

impl TxEngine {
    /// Create an idle engine
    pub const fn new() -> Self {
        Self { shift: 0 }
    }

    /// True when no frame bits remain
    pub fn is_idle(&self) -> bool {
        self.shift == 0
    }

    /// Pack a byte into the shift register with framing
    ///
    /// Only valid while the engine is idle (the previous frame has fully
    /// shifted out).
    pub fn load(&mut self, byte: u8, stop_bits: StopBits) {
        let stop = match stop_bits {
            StopBits::One => STOP_ONE,
            StopBits::Two => STOP_TWO,
        };
        // Data plus stop bit(s), then shift left to prepend the start '0'
        self.shift = (byte as u16 | stop) << 1;
    }

    /// One transmit-interrupt step: emit the next bit
    ///
    /// Advances the channel's match time one bit period, drives the line
    /// from the register's LSB, and shifts. When the register empties the
    /// channel interrupt is disabled, which is the completion signal
    /// foreground code polls. Returns `true` on that final step.
    pub fn step<C: OutputChannel>(&mut self, channel: &mut C, ticks_per_bit: u16) -> bool {
        channel.advance_match(ticks_per_bit);
        channel.set_output(Level::from_bit(self.shift & 1 != 0));
        self.shift >>= 1;
        if self.shift == 0 {
            channel.disable_interrupt();
            true
        } else {
            false
        }
    }
}
