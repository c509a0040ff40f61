//! Mock platform implementation for testing
//!
//! This module provides mock implementations of the hardware traits so the
//! drivers' state machines can be exercised without hardware: tests raise
//! interrupt flags by hand and inspect the recorded register commands.
//!
//! # Feature Gate
//!
//! This module is available in two contexts:
//! - During test builds (`#[cfg(test)]`)
//! - When the `mock` feature is enabled

#![cfg(any(test, feature = "mock"))]

mod i2c;
mod power;
mod timer;
mod uart;

pub use i2c::{I2cOp, MockI2cBus};
pub use power::MockPower;
pub use timer::MockTimer;
pub use uart::MockSerial;
