//! Core firmware functionality
//!
//! This module contains the concurrency substrate shared by every peripheral
//! driver: the deferred-event scheduler, energy-mode arbitration, logging and
//! interrupt-safe shared state.

pub mod logging;
pub mod scheduler;
pub mod sleep;
pub mod traits;
