//! Recorded line waveforms
//!
//! A [`Waveform`] is a level history over absolute simulation time: an
//! initial level plus a sorted list of transitions. The simulated TX
//! output unit records into one; tests query it at bit centers, and the
//! same type encodes reference frames to feed the receive path.

use softuart_hal::timer::Level;

/// Level history of one serial line
#[derive(Debug, Clone)]
pub struct Waveform {
    initial: Level,
    transitions: Vec<(u64, Level)>,
}

impl Waveform {
    /// A line holding `initial` with no transitions yet
    pub fn new(initial: Level) -> Self {
        Self {
            initial,
            transitions: Vec::new(),
        }
    }

    /// Encode an 8-N-1 frame for `byte` with its start edge at `start`
    ///
    /// Idle-high before the start bit and from the stop bit onward. Stop
    /// bits and trailing idle are indistinguishable on the line, so the
    /// same encoding serves one or two stop bits.
    pub fn frame(byte: u8, start: u64, ticks_per_bit: u64) -> Self {
        let mut wave = Self::new(Level::High);
        wave.record(start, Level::Low);
        for bit in 0..8 {
            wave.record(
                start + (1 + bit as u64) * ticks_per_bit,
                Level::from_bit(byte & (1 << bit) != 0),
            );
        }
        wave.record(start + 9 * ticks_per_bit, Level::High);
        wave
    }

    /// Record the line being driven to `level` at time `at`
    ///
    /// Same-level writes are dropped, so repeated mark bits leave no
    /// transition, just like a real line.
    pub fn record(&mut self, at: u64, level: Level) {
        if self.level_at(at) != level {
            self.transitions.push((at, level));
        }
    }

    /// Line level at time `at`
    pub fn level_at(&self, at: u64) -> Level {
        let mut level = self.initial;
        for &(t, l) in &self.transitions {
            if t > at {
                break;
            }
            level = l;
        }
        level
    }

    /// All recorded transitions, in time order
    pub fn transitions(&self) -> &[(u64, Level)] {
        &self.transitions
    }

    /// Time of the first transition to `to` at or after `at`
    pub fn first_transition_to(&self, to: Level, at: u64) -> Option<u64> {
        self.transitions
            .iter()
            .find(|&&(t, l)| t >= at && l == to)
            .map(|&(t, _)| t)
    }

    /// Sample `count` bit centers starting half a bit after `start`
    pub fn sample_centers(&self, start: u64, ticks_per_bit: u64, count: usize) -> Vec<bool> {
        (0..count as u64)
            .map(|bit| {
                self.level_at(start + bit * ticks_per_bit + ticks_per_bit / 2)
                    .is_high()
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_level_before_first_transition_is_initial() {
        let wave = Waveform::frame(0xFF, 1000, 100);
        assert_eq!(wave.level_at(0), Level::High);
        assert_eq!(wave.level_at(999), Level::High);
        assert_eq!(wave.level_at(1000), Level::Low);
    }

    #[test]
    fn test_frame_centers_decode_back() {
        let wave = Waveform::frame(0x55, 500, 384);
        let bits = wave.sample_centers(500, 384, 11);
        // start, 0x55 LSB-first, stop
        assert_eq!(
            bits,
            [false, true, false, true, false, true, false, true, false, true, true]
        );
    }

    #[test]
    fn test_same_level_writes_leave_no_transition() {
        let mut wave = Waveform::new(Level::High);
        wave.record(10, Level::High);
        wave.record(20, Level::Low);
        wave.record(30, Level::Low);
        assert_eq!(wave.transitions().len(), 1);
    }

    #[test]
    fn test_first_transition_to() {
        let wave = Waveform::frame(0x0F, 1000, 100);
        assert_eq!(wave.first_transition_to(Level::Low, 0), Some(1000));
        // First data bit is 1: line returns high one bit period in
        assert_eq!(wave.first_transition_to(Level::High, 1000), Some(1100));
    }
}
