//! Simulated timer peripheral
//!
//! One free-running 16-bit counter and two capture/compare channels,
//! backed by a shared core so a harness handle can fire compare events
//! and script the RX line while a `Port` owns the channel handles.
//!
//! Simulation time is a 64-bit absolute tick count; the 16-bit counter
//! the port sees is its low half, so counter wraparound gets exercised
//! for free on any frame that straddles a 0xFFFF boundary.

use std::cell::RefCell;
use std::rc::Rc;

use softuart_hal::timer::{BitTimer, InputChannel, Level, OutputChannel};

use crate::waveform::Waveform;

/// Ticks consumed by each counter read
///
/// Models the cycles foreground code burns between register reads, and
/// guarantees busy-waits against the counter make progress.
const TICKS_PER_READ: u64 = 8;

struct TxRegs {
    match_at: u16,
    pending: Level,
    irq: bool,
    released: bool,
}

struct RxRegs {
    match_at: u16,
    capture: bool,
    latched: Level,
    irq: bool,
    released: bool,
}

struct TimerCore {
    now_abs: u64,
    running: bool,
    tx: TxRegs,
    rx: RxRegs,
    line: Waveform,
}

impl TimerCore {
    fn counter(&self) -> u16 {
        (self.now_abs & 0xFFFF) as u16
    }

    /// Absolute time of a 16-bit match value, interpreted as the next
    /// occurrence at or after now
    fn abs_of(&self, match_at: u16) -> u64 {
        self.now_abs + match_at.wrapping_sub(self.counter()) as u64
    }
}

/// Shared simulated timer
///
/// Clone-free: hand out channel/counter handles with the accessor
/// methods, keep the `SimTimer` itself as the harness handle.
pub struct SimTimer {
    core: Rc<RefCell<TimerCore>>,
}

impl Default for SimTimer {
    fn default() -> Self {
        Self::new()
    }
}

impl SimTimer {
    pub fn new() -> Self {
        Self {
            core: Rc::new(RefCell::new(TimerCore {
                now_abs: 0,
                running: false,
                tx: TxRegs {
                    match_at: 0,
                    pending: Level::High,
                    irq: false,
                    released: false,
                },
                rx: RxRegs {
                    match_at: 0,
                    capture: false,
                    latched: Level::High,
                    irq: false,
                    released: false,
                },
                line: Waveform::new(Level::High),
            })),
        }
    }

    /// Counter handle for `Port::new`
    pub fn counter(&self) -> SimCounter {
        SimCounter {
            core: Rc::clone(&self.core),
        }
    }

    /// TX channel handle for `Port::new`
    pub fn tx_channel(&self) -> SimTxChannel {
        SimTxChannel {
            core: Rc::clone(&self.core),
        }
    }

    /// RX channel handle for `Port::new`
    pub fn rx_channel(&self) -> SimRxChannel {
        SimRxChannel {
            core: Rc::clone(&self.core),
        }
    }

    /// Current absolute simulation time
    pub fn now_abs(&self) -> u64 {
        self.core.borrow().now_abs
    }

    /// Let idle time pass
    pub fn advance(&self, ticks: u64) {
        self.core.borrow_mut().now_abs += ticks;
    }

    /// Whether the TX compare interrupt is armed (a frame is in flight)
    pub fn tx_irq_enabled(&self) -> bool {
        self.core.borrow().tx.irq
    }

    /// Advance to the TX match, drive the pending level onto the line
    ///
    /// Returns the absolute time of the compare event. The caller then
    /// runs the transmit interrupt, exactly as hardware would.
    pub fn fire_tx_match(&self) -> u64 {
        let mut core = self.core.borrow_mut();
        assert!(core.tx.irq, "TX compare fired with interrupt disabled");
        let at = core.abs_of(core.tx.match_at);
        core.now_abs = at;
        let level = core.tx.pending;
        core.line.record(at, level);
        at
    }

    /// Advance to the TX match and drive the pending level, interrupt or
    /// not
    ///
    /// The compare unit keeps acting on match even once the interrupt is
    /// masked; this applies the stop bit the final interrupt programmed
    /// but never waits for.
    pub fn flush_tx_output(&self) -> u64 {
        let mut core = self.core.borrow_mut();
        let at = core.abs_of(core.tx.match_at);
        core.now_abs = at;
        let level = core.tx.pending;
        core.line.record(at, level);
        at
    }

    /// Put a falling start edge on the RX input at absolute time `at`
    ///
    /// The capture latches the edge time into the match register; the
    /// caller then runs the receive interrupt.
    pub fn inject_start_edge(&self, at: u64) {
        let mut core = self.core.borrow_mut();
        assert!(
            core.rx.capture,
            "start edge while the channel is not in capture mode"
        );
        assert!(at >= core.now_abs, "edge scheduled in the past");
        core.now_abs = at;
        core.rx.match_at = core.counter();
    }

    /// Advance to the RX compare match; returns its absolute time
    pub fn advance_to_rx_match(&self) -> u64 {
        let mut core = self.core.borrow_mut();
        let at = core.abs_of(core.rx.match_at);
        core.now_abs = at;
        at
    }

    /// Latch the RX input level the next compare sample will observe
    pub fn latch_rx(&self, level: Level) {
        self.core.borrow_mut().rx.latched = level;
    }

    /// Copy of the recorded TX waveform
    pub fn waveform(&self) -> Waveform {
        self.core.borrow().line.clone()
    }

    pub fn timer_running(&self) -> bool {
        self.core.borrow().running
    }

    pub fn tx_released(&self) -> bool {
        self.core.borrow().tx.released
    }

    pub fn rx_released(&self) -> bool {
        self.core.borrow().rx.released
    }
}

/// Free-running counter handle
pub struct SimCounter {
    core: Rc<RefCell<TimerCore>>,
}

impl BitTimer for SimCounter {
    fn now(&self) -> u16 {
        let mut core = self.core.borrow_mut();
        let value = core.counter();
        core.now_abs += TICKS_PER_READ;
        value
    }

    fn start(&mut self) {
        self.core.borrow_mut().running = true;
    }

    fn stop(&mut self) {
        self.core.borrow_mut().running = false;
    }
}

/// Output-compare channel handle (TX line)
pub struct SimTxChannel {
    core: Rc<RefCell<TimerCore>>,
}

impl OutputChannel for SimTxChannel {
    fn set_match(&mut self, at: u16) {
        self.core.borrow_mut().tx.match_at = at;
    }

    fn advance_match(&mut self, ticks: u16) {
        let mut core = self.core.borrow_mut();
        core.tx.match_at = core.tx.match_at.wrapping_add(ticks);
    }

    fn set_output(&mut self, level: Level) {
        self.core.borrow_mut().tx.pending = level;
    }

    fn force_output(&mut self, level: Level) {
        let mut core = self.core.borrow_mut();
        let at = core.now_abs;
        core.line.record(at, level);
        core.tx.pending = level;
    }

    fn enable_interrupt(&mut self) {
        self.core.borrow_mut().tx.irq = true;
    }

    fn disable_interrupt(&mut self) {
        self.core.borrow_mut().tx.irq = false;
    }

    fn interrupt_enabled(&self) -> bool {
        self.core.borrow().tx.irq
    }

    fn release(&mut self) {
        self.core.borrow_mut().tx.released = true;
    }
}

/// Capture/compare channel handle (RX line)
pub struct SimRxChannel {
    core: Rc<RefCell<TimerCore>>,
}

impl InputChannel for SimRxChannel {
    fn set_match(&mut self, at: u16) {
        self.core.borrow_mut().rx.match_at = at;
    }

    fn advance_match(&mut self, ticks: u16) {
        let mut core = self.core.borrow_mut();
        core.rx.match_at = core.rx.match_at.wrapping_add(ticks);
    }

    fn enter_capture(&mut self) {
        self.core.borrow_mut().rx.capture = true;
    }

    fn enter_compare(&mut self) {
        self.core.borrow_mut().rx.capture = false;
    }

    fn in_capture_mode(&self) -> bool {
        self.core.borrow().rx.capture
    }

    fn latched_level(&self) -> Level {
        self.core.borrow().rx.latched
    }

    fn enable_interrupt(&mut self) {
        self.core.borrow_mut().rx.irq = true;
    }

    fn disable_interrupt(&mut self) {
        self.core.borrow_mut().rx.irq = false;
    }

    fn release(&mut self) {
        self.core.borrow_mut().rx.released = true;
    }
}
