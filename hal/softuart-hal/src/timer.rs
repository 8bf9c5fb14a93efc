//! Timer channel abstractions
//!
//! The driver monopolizes one hardware timer: its free-running counter and
//! two capture/compare channels. One channel serializes bits onto the TX
//! line through the timer's output unit; the other watches the RX line,
//! first in capture mode (start-edge detect), then in compare mode
//! (bit-center sampling).
//!
//! All times are raw 16-bit counter values; wraparound is expected and
//! handled with wrapping arithmetic by the core.

/// Logic level on a serial line.
///
/// Idle (mark) is high, a start bit (space) is low.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Level {
    Low,
    High,
}

impl Level {
    /// Level for a data bit value
    pub fn from_bit(bit: bool) -> Self {
        if bit {
            Level::High
        } else {
            Level::Low
        }
    }

    /// True if this is the high (mark) level
    pub fn is_high(self) -> bool {
        matches!(self, Level::High)
    }
}

/// Free-running 16-bit timer counter
///
/// Both channels compare against (or capture) this single counter. The
/// counter must run continuously from 0 to 0xFFFF and wrap.
pub trait BitTimer {
    /// Current counter value
    fn now(&self) -> u16;

    /// Start the counter in continuous mode
    fn start(&mut self);

    /// Stop the counter
    fn stop(&mut self);
}

/// Output-compare channel driving the TX line
///
/// The channel's output unit owns the TX pin: the level programmed with
/// [`set_output`](OutputChannel::set_output) is driven by hardware at the
/// next compare match, which is what gives the waveform its jitter-free
/// edges even when interrupt latency varies.
pub trait OutputChannel {
    /// Program the compare match time
    fn set_match(&mut self, at: u16);

    /// Advance the programmed match time by `ticks`
    ///
    /// Builds on the previous match value, not on the current counter, so
    /// accumulated interrupt latency never skews the bit grid.
    fn advance_match(&mut self, ticks: u16);

    /// Level the output unit drives at the next compare match
    fn set_output(&mut self, level: Level);

    /// Drive the line immediately, bypassing the compare unit
    ///
    /// Used to hold the idle (mark) level while no frame is in flight.
    fn force_output(&mut self, level: Level);

    /// Enable the compare-match interrupt
    fn enable_interrupt(&mut self);

    /// Disable the compare-match interrupt
    fn disable_interrupt(&mut self);

    /// Whether the compare-match interrupt is enabled
    ///
    /// The transmit engine disables its own interrupt after the final bit;
    /// foreground code polls this to detect transmit completion.
    fn interrupt_enabled(&self) -> bool;

    /// Detach the channel from the pin and return it to idle GPIO
    fn release(&mut self);
}

/// Capture/compare channel watching the RX line
///
/// Two modes:
/// - **capture**: a falling edge on the RX input latches the counter into
///   the match register and raises the interrupt (start-bit detect);
/// - **compare**: the channel fires when the counter reaches the match
///   register, latching the RX input level at that instant.
///
/// Because a capture leaves the edge time in the match register,
/// [`advance_match`](InputChannel::advance_match) after a capture schedules
/// relative to the observed edge, not to when the interrupt got serviced.
pub trait InputChannel {
    /// Program the compare match time
    fn set_match(&mut self, at: u16);

    /// Advance the match time by `ticks`, relative to the last match or
    /// capture value
    fn advance_match(&mut self, ticks: u16);

    /// Arm falling-edge capture on the RX input
    fn enter_capture(&mut self);

    /// Switch to compare mode, keeping the current match register value
    fn enter_compare(&mut self);

    /// Whether the channel is currently in capture mode
    fn in_capture_mode(&self) -> bool;

    /// RX input level latched at the most recent compare match
    fn latched_level(&self) -> Level;

    /// Enable the capture/compare interrupt
    fn enable_interrupt(&mut self);

    /// Disable the capture/compare interrupt
    fn disable_interrupt(&mut self);

    /// Detach the channel from the pin and return it to idle GPIO
    fn release(&mut self);
}
