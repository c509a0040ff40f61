//! Cortex-M platform backend
//!
//! Power-mode entry for Cortex-M4 based low-energy parts. Peripheral register
//! access is supplied by the board support code through the traits in
//! `platform::traits`.

#![cfg(feature = "cortex-m")]

mod power;

pub use power::CortexMPower;
