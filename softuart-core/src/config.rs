//! Compile-time port configuration
//!
//! All timing parameters are fixed for the life of the port: oscillator
//! frequency, baud rate, and stop-bit count. The derived tick counts are
//! `const fn` so chip code can fold them into constants.

/// Minimum timer ticks per bit the receive path can sustain.
///
/// The receive interrupt needs on the order of 200+ cycles to run; below
/// this floor the sampler falls behind the incoming bits. 9600 baud at
/// 3.6864 MHz (384 ticks) is known to work.
pub const MIN_TICKS_PER_BIT: u32 = 378;

/// Number of stop bits per frame
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum StopBits {
    #[default]
    One,
    Two,
}

impl StopBits {
    /// Stop-bit count as a number
    pub const fn count(self) -> u16 {
        match self {
            StopBits::One => 1,
            StopBits::Two => 2,
        }
    }
}

/// Errors detected when validating a timing configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ConfigError {
    /// Baud rate too fast for the clock; the receive interrupt cannot keep
    /// up below [`MIN_TICKS_PER_BIT`] ticks per bit
    BaudTooFast,
    /// Ticks per bit does not fit the 16-bit timer
    BaudTooSlow,
}

/// Bit-timing parameters for one port
///
/// The tick calculations are exact only when `clock_hz` divides evenly by
/// the baud rate; UART-friendly clock choices (3.6864 MHz, 7.3728 MHz,
/// 14.7456 MHz, ...) have zero built-in error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Timing {
    /// Timer clock frequency in Hz
    pub clock_hz: u32,
    /// Baud rate in bits per second
    pub baud: u32,
    /// Stop bits appended to each frame
    pub stop_bits: StopBits,
}

impl Timing {
    /// Create a timing configuration
    pub const fn new(clock_hz: u32, baud: u32, stop_bits: StopBits) -> Self {
        Self {
            clock_hz,
            baud,
            stop_bits,
        }
    }

    /// Timer ticks per serial bit
    pub const fn ticks_per_bit(&self) -> u16 {
        (self.clock_hz / self.baud) as u16
    }

    /// Timer ticks per half a serial bit
    ///
    /// Used once per frame to move the sample point from the start edge to
    /// the center of the first data bit.
    pub const fn ticks_per_half_bit(&self) -> u16 {
        (self.clock_hz / (self.baud * 2)) as u16
    }

    /// Total bits per frame: start + 8 data + stop bit(s)
    pub const fn frame_bits(&self) -> u16 {
        1 + 8 + self.stop_bits.count()
    }

    /// Check that the clock/baud combination is usable
    pub const fn validate(&self) -> Result<(), ConfigError> {
        let ticks = self.clock_hz / self.baud;
        if ticks < MIN_TICKS_PER_BIT {
            return Err(ConfigError::BaudTooFast);
        }
        if ticks > u16::MAX as u32 {
            return Err(ConfigError::BaudTooSlow);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tick_math_9600_at_16mhz() {
        let t = Timing::new(16_000_000, 9600, StopBits::One);
        assert_eq!(t.ticks_per_bit(), 1666);
        assert_eq!(t.ticks_per_half_bit(), 833);
        assert_eq!(t.frame_bits(), 10);
        assert!(t.validate().is_ok());
    }

    #[test]
    fn test_uart_friendly_clock_is_exact() {
        let t = Timing::new(3_686_400, 9600, StopBits::One);
        assert_eq!(t.ticks_per_bit(), 384);
        assert_eq!(t.ticks_per_half_bit(), 192);
    }

    #[test]
    fn test_two_stop_bits() {
        let t = Timing::new(16_000_000, 9600, StopBits::Two);
        assert_eq!(t.frame_bits(), 11);
    }

    #[test]
    fn test_baud_too_fast_rejected() {
        // 115200 at 1 MHz is under 9 ticks per bit
        let t = Timing::new(1_000_000, 115_200, StopBits::One);
        assert_eq!(t.validate(), Err(ConfigError::BaudTooFast));
    }

    #[test]
    fn test_baud_too_slow_rejected() {
        let t = Timing::new(16_000_000, 100, StopBits::One);
        assert_eq!(t.validate(), Err(ConfigError::BaudTooSlow));
    }
}
