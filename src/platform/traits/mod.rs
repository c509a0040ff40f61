//! Platform abstraction traits
//!
//! This module defines the traits that hardware backends must provide.

pub mod i2c;
pub mod power;
pub mod timer;
pub mod uart;

// Re-export trait interfaces
pub use i2c::{ClockRatio, I2cBus, I2cConfig, I2cIrq, I2C_READ, I2C_WRITE};
pub use power::{EnergyMode, PowerControl};
pub use timer::{LowEnergyTimer, TimerCounts, TimerIrq};
pub use uart::{SerialIrq, SerialPort, UartConfig, UartParity, UartStopBits, LEUART_MAX_BAUD};
