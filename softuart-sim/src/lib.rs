//! Host-side simulation harness for the softuart driver
//!
//! Implements the `softuart-hal` traits against a simulated timer, line,
//! and tunable oscillator so the core's bit engines, port lifecycle, and
//! calibration loop run under `cargo test` with exact, scriptable timing.
//!
//! Event order mirrors hardware: the harness advances time to a compare
//! match, the simulated output unit (or input latch) acts, and only then
//! does the corresponding interrupt entry point run.

mod osc;
mod timer;
mod waveform;

pub use osc::{clock_bench, ClockModel, SimOscillator, SimReference};
pub use timer::{SimCounter, SimRxChannel, SimTimer, SimTxChannel};
pub use waveform::Waveform;

use softuart_core::config::{ConfigError, Timing};
use softuart_core::port::Port;
use softuart_hal::gpio::NullPin;

/// A `Port` wired to the simulated timer
pub type SimPort<const N: usize = 16> = Port<SimCounter, SimTxChannel, SimRxChannel, NullPin, N>;

/// Build a port on `sim`'s counter and channels
pub fn sim_port<const N: usize>(sim: &SimTimer, timing: Timing) -> Result<SimPort<N>, ConfigError> {
    Port::new(sim.counter(), sim.tx_channel(), sim.rx_channel(), timing)
}

/// Clock out the in-flight frame, one compare event at a time
///
/// Returns the number of compare events it took (bit periods from the
/// scheduling edge to the interrupt disabling itself).
pub fn clock_out<const N: usize>(port: &mut SimPort<N>, sim: &SimTimer) -> usize {
    let mut events = 0;
    while sim.tx_irq_enabled() {
        sim.fire_tx_match();
        port.on_tx_interrupt();
        events += 1;
    }
    // The output unit drives the final stop-bit level at the next match
    // even with the interrupt masked
    sim.flush_tx_output();
    events
}

/// Drive one noise-free frame of `byte` into the port's receive path
///
/// Places the start edge two bit periods of idle past the current time,
/// then walks the port's own sample schedule against the encoded frame,
/// latching whatever the line holds at each sample instant.
pub fn feed_byte<const N: usize>(port: &mut SimPort<N>, sim: &SimTimer, byte: u8) {
    let ticks_per_bit = port.timing().ticks_per_bit() as u64;
    let start = sim.now_abs() + 2 * ticks_per_bit;
    let frame = Waveform::frame(byte, start, ticks_per_bit);

    sim.inject_start_edge(start);
    port.on_rx_interrupt();
    for _ in 0..8 {
        let at = sim.advance_to_rx_match();
        sim.latch_rx(frame.level_at(at));
        port.on_rx_interrupt();
    }
}
