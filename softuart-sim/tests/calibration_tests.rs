//! Calibration loop against the simulated oscillator
//!
//! The unit tests in the core crate cover the step rules; these run the
//! whole loop against the `clock_bench` model the way firmware would at
//! boot, including the stored-tuning fast path.

use softuart_core::calib::{calibrate, CalibrationConfig, CalibrationError, Tuning};
use softuart_sim::{clock_bench, ClockModel};

const TARGET_HZ: u32 = 16_000_000;
const REFERENCE_HZ: u32 = 4096;

#[test]
fn converges_to_the_target_window_from_cold() {
    // Coarse 0, fine 0 is the slowest the model goes
    let (mut osc, mut reference) = clock_bench(ClockModel::default(), 0, 0);
    let config = CalibrationConfig::new(TARGET_HZ, REFERENCE_HZ);

    let tuning = calibrate(&mut osc, &mut reference, &config).unwrap();
    assert_eq!(osc.hz() / REFERENCE_HZ, TARGET_HZ / REFERENCE_HZ);
    assert_eq!(tuning.fine, 250);
    assert!(!reference.is_active());
}

#[test]
fn capture_count_stays_within_the_default_budget() {
    let (mut osc, mut reference) = clock_bench(ClockModel::default(), 0, 0);
    let config = CalibrationConfig::new(TARGET_HZ, REFERENCE_HZ);

    assert!(calibrate(&mut osc, &mut reference, &config).is_ok());
    // Worst-case slow start climbs one fine step per capture
    assert!(
        reference.captures() < CalibrationConfig::DEFAULT_MAX_CAPTURES / 2,
        "took {} captures",
        reference.captures()
    );
}

#[test]
fn fast_start_walks_down_without_touching_coarse() {
    // Already in the target's coarse range, 400 kHz fast: fine steps
    // alone must reach the window.
    let (mut osc, mut reference) = clock_bench(ClockModel::default(), 100, 15);
    let config = CalibrationConfig::new(TARGET_HZ, REFERENCE_HZ);

    assert!(calibrate(&mut osc, &mut reference, &config).is_ok());
    assert_eq!(osc.hz() / REFERENCE_HZ, TARGET_HZ / REFERENCE_HZ);
    assert_eq!(osc.coarse_writes(), 0);
}

#[test]
fn unreachable_target_fails_and_releases_the_reference() {
    let (mut osc, mut reference) = clock_bench(ClockModel::default(), 0, 0);
    let config = CalibrationConfig {
        target_delta: u16::MAX,
        max_captures: 1_000,
    };

    let result = calibrate(&mut osc, &mut reference, &config);
    assert!(matches!(
        result,
        Err(CalibrationError::NoConvergence { .. })
    ));
    // Priming capture plus the full budget
    assert_eq!(reference.captures(), 1_001);
    assert!(!reference.is_active());
}

#[test]
fn stored_tuning_skips_the_reference_loop() {
    let (mut osc, mut reference) = clock_bench(ClockModel::default(), 0, 0);
    let config = CalibrationConfig::new(TARGET_HZ, REFERENCE_HZ);
    let tuning = calibrate(&mut osc, &mut reference, &config).unwrap();
    let calibrated_hz = osc.hz();

    // Next boot: same model, stored settings, no reference needed
    let (mut osc, reference) = clock_bench(ClockModel::default(), 0, 0);
    tuning.apply(&mut osc);
    assert_eq!(osc.hz(), calibrated_hz);
    assert_eq!(reference.captures(), 0);
}
