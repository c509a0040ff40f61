//! I2C master peripheral trait
//!
//! This is a register-level view of the peripheral: each method issues one
//! command or moves one byte. Sequencing (START, address, register, repeated
//! START, data, STOP) belongs to the interrupt-driven driver in
//! `peripherals::i2c`.

use bitflags::bitflags;

use crate::platform::{error::I2cError, Result};

/// Address-byte direction bit for a read
pub const I2C_READ: u8 = 1;
/// Address-byte direction bit for a write
pub const I2C_WRITE: u8 = 0;

bitflags! {
    /// I2C interrupt sources (IF/IEN bit positions)
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct I2cIrq: u32 {
        /// Received data valid
        const RXDATAV = 1 << 5;
        /// Acknowledge received
        const ACK = 1 << 6;
        /// Not-acknowledge received
        const NACK = 1 << 7;
        /// Master STOP condition completed
        const MSTOP = 1 << 8;
    }
}

/// SCL high/low ratio
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ClockRatio {
    /// 4:4, standard mode
    Standard,
    /// 6:3, fast mode
    Asymmetric,
    /// 11:6, fast mode plus
    Fast,
}

impl ClockRatio {
    /// Highest bus frequency reachable with this ratio, in Hz
    pub const fn max_frequency(self) -> u32 {
        match self {
            ClockRatio::Standard => 92_000,
            ClockRatio::Asymmetric => 392_157,
            ClockRatio::Fast => 987_167,
        }
    }
}

/// I2C configuration
#[derive(Debug, Clone, Copy)]
pub struct I2cConfig {
    /// Bus frequency in Hz
    pub frequency: u32,
    /// SCL high/low ratio
    pub clock_ratio: ClockRatio,
}

impl Default for I2cConfig {
    fn default() -> Self {
        Self {
            frequency: 92_000, // standard-mode maximum for 4:4
            clock_ratio: ClockRatio::Standard,
        }
    }
}

impl I2cConfig {
    /// Fast-mode configuration used by the on-board sensors
    pub const fn fast() -> Self {
        Self {
            frequency: ClockRatio::Asymmetric.max_frequency(),
            clock_ratio: ClockRatio::Asymmetric,
        }
    }

    /// Check the frequency against the selected clock ratio
    pub fn validate(&self) -> Result<()> {
        if self.frequency == 0 || self.frequency > self.clock_ratio.max_frequency() {
            return Err(I2cError::InvalidFrequency.into());
        }
        Ok(())
    }
}

/// I2C master peripheral
///
/// # Safety Invariants
///
/// - Peripheral clock enabled and pins routed before `configure`
/// - Only one owner per I2C peripheral instance
/// - Command methods are only called from the owning driver, in interrupt
///   context or with the peripheral's interrupt masked
pub trait I2cBus {
    /// Apply frequency and clock ratio, enable master mode
    fn configure(&mut self, config: &I2cConfig) -> Result<()>;

    /// Force the bus into a known idle state
    ///
    /// Abort any transfer, clear the transmit buffer, issue START+STOP, wait
    /// for the STOP to complete, clear the resulting flags, abort again. The
    /// interrupt enable mask is preserved.
    fn reset_bus(&mut self);

    /// Hardware state machine reports idle
    fn is_idle(&self) -> bool;

    /// Enable interrupt sources (clears their stale flags first)
    fn enable_interrupts(&mut self, irq: I2cIrq);

    /// Read the pending and enabled interrupt flags and clear them
    fn take_interrupts(&mut self) -> I2cIrq;

    /// Issue a START (or repeated START) condition
    fn start(&mut self);

    /// Load one byte into the transmit buffer
    fn write(&mut self, byte: u8);

    /// Read the received byte
    fn read(&mut self) -> u8;

    /// Acknowledge the received byte
    fn ack(&mut self);

    /// Not-acknowledge the received byte
    fn nack(&mut self);

    /// Issue a STOP condition
    fn stop(&mut self);
}
