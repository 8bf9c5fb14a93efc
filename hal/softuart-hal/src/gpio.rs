//! GPIO pin abstractions
//!
//! The TX and RX lines belong to the timer channels, not to software GPIO;
//! the only pin the core drives directly is the optional diagnostic timing
//! pin toggled at the end of the receive interrupt.

/// Digital output pin
///
/// Implementations should handle the actual hardware register manipulation
/// for the specific chip.
pub trait OutputPin {
    /// Set the pin high (logic 1)
    fn set_high(&mut self);

    /// Set the pin low (logic 0)
    fn set_low(&mut self);

    /// Toggle the pin state
    fn toggle(&mut self);
}

/// Placeholder pin for ports built without a diagnostic pin
///
/// All operations are no-ops; the optimizer removes them entirely.
#[derive(Debug, Default, Clone, Copy)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct NullPin;

impl OutputPin for NullPin {
    fn set_high(&mut self) {}

    fn set_low(&mut self) {}

    fn toggle(&mut self) {}
}
