//! Softuart Hardware Abstraction Layer
//!
//! This crate defines the hardware seam between the board-agnostic UART
//! core (`softuart-core`) and chip-specific timer/clock code. The driver
//! needs surprisingly little from the hardware:
//!
//! ```text
//! ┌─────────────────────────────────────────┐
//! │  Application (echo loop, print helpers) │
//! └─────────────────────────────────────────┘
//!                     │
//!                     ▼
//! ┌─────────────────────────────────────────┐
//! │  softuart-core (engines, ring, port)    │
//! └─────────────────────────────────────────┘
//!                     │
//!                     ▼
//! ┌─────────────────────────────────────────┐
//! │  softuart-hal (this crate - traits)     │
//! └─────────────────────────────────────────┘
//!                     │
//!                     ▼
//!          chip timer + clock registers
//! ```
//!
//! # Traits
//!
//! - [`timer::BitTimer`] - free-running counter shared by both channels
//! - [`timer::OutputChannel`] - output-compare channel driving the TX line
//! - [`timer::InputChannel`] - capture/compare channel watching the RX line
//! - [`osc::TunableOscillator`], [`osc::ReferenceTimebase`] - clock calibration
//! - [`gpio::OutputPin`] - optional diagnostic timing pin

#![no_std]
#![deny(unsafe_code)]

pub mod gpio;
pub mod osc;
pub mod timer;

// Re-export key traits at crate root for convenience
pub use gpio::{NullPin, OutputPin};
pub use osc::{ReferenceTimebase, TunableOscillator};
pub use timer::{BitTimer, InputChannel, Level, OutputChannel};
