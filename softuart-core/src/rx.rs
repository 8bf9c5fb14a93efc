//! Receive engine
//!
//! The RX channel alternates between two modes. In capture mode it waits
//! for the falling start-bit edge; the capture latches the edge time into
//! the match register. From there every step schedules itself one bit
//! period ahead and samples the line level the channel latched at the
//! match instant, so each of the 8 data bits is read at its center.
//! After the 8th sample the byte goes into the ring and the channel is
//! re-armed for capture; the stop bit is never sampled, the idle-high
//! line is trusted to provide it.

use softuart_hal::timer::InputChannel;

use crate::config::Timing;
use crate::ring::RxRing;

/// Receive-interrupt state machine
///
/// Live state exists only between a start edge and the 8th data sample;
/// outside that window the engine is idle and the channel sits in capture
/// mode.
#[derive(Debug, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct RxEngine {
    /// Index of the data bit the next compare event will sample
    bit: u8,
    /// Accumulated data byte, filled LSB first
    data: u8,
}

impl RxEngine {
    /// Create an idle engine
    pub const fn new() -> Self {
        Self { bit: 0, data: 0 }
    }

    /// One receive-interrupt step
    ///
    /// Returns the completed byte when this step finished a frame (it has
    /// already been pushed into `ring`; overflow drops it silently).
    pub fn step<C: InputChannel, const N: usize>(
        &mut self,
        channel: &mut C,
        ring: &RxRing<N>,
        timing: &Timing,
    ) -> Option<u8> {
        // Generic reschedule: one bit period past the edge or past the
        // previous sample point.
        channel.advance_match(timing.ticks_per_bit());

        if channel.in_capture_mode() {
            // Start edge. Push the sample point out another half bit so it
            // lands on the center of the first data bit.
            channel.advance_match(timing.ticks_per_half_bit());
            self.bit = 0;
            self.data = 0;
            channel.enter_compare();
            return None;
        }

        if channel.latched_level().is_high() {
            self.data |= 1 << self.bit;
        }
        self.bit += 1;
        if self.bit < 8 {
            return None;
        }

        let byte = self.data;
        ring.push(byte);
        channel.enter_capture();
        Some(byte)
    }
}
