//! Clock calibration abstractions
//!
//! Bit timing is only as good as the oscillator feeding the timer. Parts
//! with a numerically controlled oscillator expose a fine tuning register
//! and a coarse range-select register; the calibration loop in
//! `softuart-core` walks both against an accurate low-frequency reference
//! (typically a watch crystal) until the measured tick rate matches the
//! target.

/// Numerically controlled oscillator with fine and coarse tuning
///
/// The fine register covers a full 8-bit range and is expected to wrap;
/// the coarse register selects overlapping frequency ranges from 0 to
/// [`coarse_max`](TunableOscillator::coarse_max). Adjacent coarse ranges
/// must overlap, otherwise some target frequencies are unreachable.
pub trait TunableOscillator {
    /// Current fine tuning value
    fn fine(&self) -> u8;

    /// Set the fine tuning value
    fn set_fine(&mut self, value: u8);

    /// Current coarse range-select value
    fn coarse(&self) -> u8;

    /// Set the coarse range-select value
    fn set_coarse(&mut self, value: u8);

    /// Highest valid coarse value
    fn coarse_max(&self) -> u8 {
        0x0F
    }
}

/// Reference-clock capture source for calibration
///
/// While active, the implementation captures the free-running counter on
/// each tick of a divided reference clock. One reference tick then spans a
/// known number of target-oscillator ticks, which is the quantity the
/// calibration loop compares against.
pub trait ReferenceTimebase {
    /// Claim the capture channel and apply the reference divider
    fn begin(&mut self);

    /// Block until the next reference edge; returns the captured counter
    fn wait_capture(&mut self) -> u16;

    /// Restore the divider and release the capture channel
    fn end(&mut self);
}
