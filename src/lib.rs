#![cfg_attr(not(test), no_std)]

//! sleepwalk - Interrupt-driven firmware core for low-energy microcontrollers
//!
//! Peripheral drivers advance their state machines from interrupt context and
//! post deferred events; a cooperative main loop dispatches those events and
//! otherwise sleeps in the deepest energy mode no driver has blocked.

#[cfg(any(test, feature = "mock"))]
extern crate std;

// Platform abstraction layer (hardware traits, mock and Cortex-M backends)
pub mod platform;

// Core systems: event scheduler, sleep arbitration, logging, shared state
pub mod core;

// Interrupt-driven peripheral drivers (I2C master, LEUART transmit, LETIMER)
pub mod peripherals;

// Note: Logging macros (log_info!, log_warn!, log_error!, log_debug!, log_trace!)
// are exported at crate root via #[macro_export] in core::logging
