//! Board-agnostic core of the softuart driver
//!
//! A full-duplex 8-N-1 software UART built on a single hardware timer with
//! two capture/compare channels. This crate contains everything that does
//! not touch chip registers directly:
//!
//! - SPSC ring buffer for received bytes
//! - Interrupt-driven transmit bit shifter
//! - Capture/compare receive state machine
//! - Bang-bang oscillator calibration loop
//! - Port lifecycle (init, shutdown) and the foreground API
//! - Critical-section singleton wrapper for interrupt dispatch
//!
//! The hardware seam is the trait set in `softuart-hal`. Interrupt
//! handlers are modeled as single-step transition functions: the platform's
//! two timer vectors call [`Port::on_tx_interrupt`] and
//! [`Port::on_rx_interrupt`] (usually through [`shared::SharedPort`]), and
//! all state they need lives inside the [`Port`].

#![no_std]
#![deny(unsafe_code)]

pub mod calib;
pub mod config;
pub mod port;
pub mod ring;
pub mod rx;
pub mod shared;
pub mod tx;

pub use calib::{calibrate, CalibrationConfig, CalibrationError, Tuning};
pub use config::{ConfigError, StopBits, Timing};
pub use port::Port;
pub use ring::RxRing;
pub use shared::SharedPort;
