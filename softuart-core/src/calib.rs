//! Oscillator calibration
//!
//! Bang-bang tuning of a numerically controlled oscillator against an
//! accurate low-frequency reference. The reference is divided down so one
//! reference tick spans a known number of oscillator ticks
//! (`target_delta`); the loop nudges the fine register one step per
//! capture in the direction that reduces the error, spilling into the
//! coarse range-select register when the fine register wraps.
//!
//! The reference loop runs once at startup. Boards that would rather skip
//! it can store the returned [`Tuning`] and re-apply it on later boots,
//! accepting the temperature drift that comes with that.

use softuart_hal::osc::{ReferenceTimebase, TunableOscillator};

/// Calibration failure conditions
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum CalibrationError {
    /// The loop exhausted its capture budget without the measured delta
    /// reaching the target. Carries the last measurement for diagnostics.
    NoConvergence { last_delta: u16 },
}

/// Calibration parameters
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct CalibrationConfig {
    /// Oscillator ticks expected per reference tick
    pub target_delta: u16,
    /// Reference ticks to try before giving up
    ///
    /// A healthy oscillator converges in at most a few full sweeps of the
    /// fine register per coarse range; the default covers the worst case
    /// with margin. Without this bound a broken crystal is a boot hang.
    pub max_captures: u32,
}

impl CalibrationConfig {
    /// Default capture budget: full fine sweep across every coarse range,
    /// doubled for margin
    pub const DEFAULT_MAX_CAPTURES: u32 = 2 * 16 * 256;

    /// Build a config from the clock target and reference rate
    pub const fn new(clock_hz: u32, reference_hz: u32) -> Self {
        Self {
            target_delta: target_delta(clock_hz, reference_hz),
            max_captures: Self::DEFAULT_MAX_CAPTURES,
        }
    }
}

/// Oscillator ticks per divided-reference tick for a target frequency
///
/// With a 32.768 kHz crystal divided by 8 (4096 Hz reference), a 16 MHz
/// target gives 3906.
pub const fn target_delta(clock_hz: u32, reference_hz: u32) -> u16 {
    (clock_hz / reference_hz) as u16
}

/// Converged oscillator settings
///
/// Plain copyable data so it can be reported over the port itself or
/// stashed and re-applied on a later boot in place of calibration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Tuning {
    /// Fine tuning register value
    pub fine: u8,
    /// Coarse range-select register value
    pub coarse: u8,
}

impl Tuning {
    /// Apply stored settings to the oscillator, skipping calibration
    pub fn apply<O: TunableOscillator>(&self, osc: &mut O) {
        osc.set_coarse(self.coarse);
        osc.set_fine(self.fine);
    }
}

/// Tune the oscillator until its measured rate matches the target
///
/// Claims the reference timebase for the duration and releases it on both
/// the success and failure paths, so the capture channel is free for the
/// port afterwards. Must run before [`Port::init`](crate::port::Port::init)
/// for the tick constants to be valid.
pub fn calibrate<O, R>(
    osc: &mut O,
    reference: &mut R,
    config: &CalibrationConfig,
) -> Result<Tuning, CalibrationError>
where
    O: TunableOscillator,
    R: ReferenceTimebase,
{
    reference.begin();

    // Prime with one throwaway capture so the first delta spans a real
    // reference interval.
    let mut last_capture = reference.wait_capture();
    let mut last_delta = 0u16;

    for _ in 0..config.max_captures {
        let capture = reference.wait_capture();
        let delta = capture.wrapping_sub(last_capture);
        last_capture = capture;
        last_delta = delta;

        if delta == config.target_delta {
            reference.end();
            return Ok(Tuning {
                fine: osc.fine(),
                coarse: osc.coarse(),
            });
        }

        if delta > config.target_delta {
            // More ticks than expected: oscillator fast, slow it down
            let fine = osc.fine().wrapping_sub(1);
            osc.set_fine(fine);
            if fine == 0xFF {
                // Fine rolled under: drop to the next coarse range
                let coarse = osc.coarse();
                if coarse > 0 {
                    osc.set_coarse(coarse - 1);
                }
            }
        } else {
            // Too slow, speed it up
            let fine = osc.fine().wrapping_add(1);
            osc.set_fine(fine);
            if fine == 0x00 {
                // Fine rolled over: climb to the next coarse range
                let coarse = osc.coarse();
                if coarse < osc.coarse_max() {
                    osc.set_coarse(coarse + 1);
                }
            }
        }
    }

    reference.end();
    Err(CalibrationError::NoConvergence { last_delta })
}
