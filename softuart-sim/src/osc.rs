//! Simulated tunable oscillator and reference clock
//!
//! A monotonic model of a numerically controlled oscillator: each coarse
//! range step is worth a fixed frequency increment, each fine step a much
//! smaller one, with adjacent coarse ranges overlapping (a fine sweep
//! spans more than one coarse step). The reference side measures it the
//! way hardware does: a free-running counter clocked by the oscillator,
//! captured once per reference tick.

use std::cell::Cell;
use std::rc::Rc;

use softuart_hal::osc::{ReferenceTimebase, TunableOscillator};

/// Frequency model for the simulated oscillator
#[derive(Debug, Clone, Copy)]
pub struct ClockModel {
    /// Frequency at coarse 0, fine 0
    pub base_hz: u32,
    /// Frequency added per coarse step
    pub coarse_step_hz: u32,
    /// Frequency added per fine step
    pub fine_step_hz: u32,
    /// Divided reference clock rate
    pub reference_hz: u32,
}

impl Default for ClockModel {
    fn default() -> Self {
        // Fine span (255 * 4 kHz) overlaps the 1 MHz coarse step, like
        // the overlapping ranges of a real DCO. Reference: 32.768 kHz
        // crystal divided by 8.
        Self {
            base_hz: 1_000_000,
            coarse_step_hz: 1_000_000,
            fine_step_hz: 4_000,
            reference_hz: 4096,
        }
    }
}

struct OscState {
    model: ClockModel,
    fine: Cell<u8>,
    coarse: Cell<u8>,
    coarse_writes: Cell<u32>,
}

impl OscState {
    fn hz(&self) -> u32 {
        self.model.base_hz
            + self.coarse.get() as u32 * self.model.coarse_step_hz
            + self.fine.get() as u32 * self.model.fine_step_hz
    }
}

/// Build an oscillator/reference pair sharing one register file
pub fn clock_bench(model: ClockModel, fine: u8, coarse: u8) -> (SimOscillator, SimReference) {
    let state = Rc::new(OscState {
        model,
        fine: Cell::new(fine),
        coarse: Cell::new(coarse),
        coarse_writes: Cell::new(0),
    });
    (
        SimOscillator {
            state: Rc::clone(&state),
        },
        SimReference {
            state,
            counter: 0,
            captures: 0,
            active: false,
        },
    )
}

/// Simulated tunable oscillator registers
pub struct SimOscillator {
    state: Rc<OscState>,
}

impl SimOscillator {
    /// Modeled output frequency for the current register values
    pub fn hz(&self) -> u32 {
        self.state.hz()
    }

    /// Number of coarse register writes so far
    pub fn coarse_writes(&self) -> u32 {
        self.state.coarse_writes.get()
    }
}

impl TunableOscillator for SimOscillator {
    fn fine(&self) -> u8 {
        self.state.fine.get()
    }

    fn set_fine(&mut self, value: u8) {
        self.state.fine.set(value);
    }

    fn coarse(&self) -> u8 {
        self.state.coarse.get()
    }

    fn set_coarse(&mut self, value: u8) {
        self.state.coarse.set(value);
        self.state.coarse_writes.set(self.state.coarse_writes.get() + 1);
    }
}

/// Simulated reference-clock capture source
pub struct SimReference {
    state: Rc<OscState>,
    counter: u16,
    captures: u32,
    active: bool,
}

impl SimReference {
    /// Reference ticks consumed so far
    pub fn captures(&self) -> u32 {
        self.captures
    }

    /// Whether the capture channel is currently claimed
    pub fn is_active(&self) -> bool {
        self.active
    }
}

impl ReferenceTimebase for SimReference {
    fn begin(&mut self) {
        self.active = true;
    }

    fn wait_capture(&mut self) -> u16 {
        assert!(self.active, "capture without begin()");
        self.captures += 1;
        let per_tick = (self.state.hz() / self.state.model.reference_hz) as u16;
        self.counter = self.counter.wrapping_add(per_tick);
        self.counter
    }

    fn end(&mut self) {
        self.active = false;
    }
}
