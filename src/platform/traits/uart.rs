//! Low-energy UART transmit trait
//!
//! Register-level view of the LEUART transmitter. Byte streaming is driven by
//! the interrupt state machine in `peripherals::leuart`.

use bitflags::bitflags;

use crate::platform::{error::UartError, Result};

/// Highest baud rate the LEUART reaches from the 32.768 kHz clock
pub const LEUART_MAX_BAUD: u32 = 9600;

bitflags! {
    /// LEUART interrupt sources (IF/IEN bit positions)
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct SerialIrq: u32 {
        /// Transmission complete (shift register empty)
        const TXC = 1 << 0;
        /// Transmit buffer level (room for another byte)
        const TXBL = 1 << 1;
    }
}

/// UART configuration
#[derive(Debug, Clone, Copy)]
pub struct UartConfig {
    /// Baud rate in bits per second
    pub baud_rate: u32,
    /// Data bits (8 or 9)
    pub data_bits: u8,
    /// Parity mode
    pub parity: UartParity,
    /// Stop bits
    pub stop_bits: UartStopBits,
}

impl Default for UartConfig {
    fn default() -> Self {
        Self {
            baud_rate: 9600,
            data_bits: 8,
            parity: UartParity::None,
            stop_bits: UartStopBits::One,
        }
    }
}

impl UartConfig {
    pub fn validate(&self) -> Result<()> {
        if self.baud_rate == 0 || self.baud_rate > LEUART_MAX_BAUD {
            return Err(UartError::InvalidBaudRate.into());
        }
        if !(8..=9).contains(&self.data_bits) {
            return Err(UartError::InvalidDataBits.into());
        }
        Ok(())
    }
}

/// UART parity modes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum UartParity {
    None,
    Even,
    Odd,
}

/// UART stop bits
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum UartStopBits {
    One,
    Two,
}

/// LEUART transmitter
///
/// # Safety Invariants
///
/// - Peripheral clock enabled and TX pin routed before `configure`
/// - Only one owner per LEUART instance
pub trait SerialPort {
    /// Apply the frame format, enable the transmitter, wait for register sync
    fn configure(&mut self, config: &UartConfig) -> Result<()>;

    /// Set bits in the interrupt enable register
    fn enable_interrupts(&mut self, irq: SerialIrq);

    /// Clear bits in the interrupt enable register
    fn disable_interrupts(&mut self, irq: SerialIrq);

    /// Clear pending interrupt flags
    fn clear_interrupts(&mut self, irq: SerialIrq);

    /// Read the pending and enabled interrupt flags and clear them
    fn take_interrupts(&mut self) -> SerialIrq;

    /// Load one byte into the transmit buffer
    fn write(&mut self, byte: u8);
}
