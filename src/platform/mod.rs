//! Platform abstraction layer
//!
//! Hardware access for the drivers goes through the traits in [`traits`].
//! Register-level implementations live with the board support code; this
//! crate ships the mock backend for host tests and a Cortex-M power backend.

pub mod error;
pub mod traits;

#[cfg(feature = "cortex-m")]
pub mod cortex;

#[cfg(any(test, feature = "mock"))]
pub mod mock;

// Re-export commonly used types
pub use error::{PlatformError, Result};
pub use traits::{EnergyMode, I2cBus, LowEnergyTimer, PowerControl, SerialPort};
