//! Mock LEUART transmitter for testing

use crate::platform::{
    error::{PlatformError, UartError},
    traits::{SerialIrq, SerialPort, UartConfig},
    Result,
};
use std::vec::Vec;

/// Mock LEUART transmitter
///
/// Captures transmitted bytes and tracks the interrupt enable register so
/// tests can check which interrupt the driver is waiting on.
///
/// # Example
///
/// ```ignore
/// let mut port = MockSerial::new();
/// port.write(b'A');
/// assert_eq!(port.tx_buffer(), b"A");
/// ```
#[derive(Debug)]
pub struct MockSerial {
    config: Option<UartConfig>,
    tx_buffer: Vec<u8>,
    enabled: SerialIrq,
    pending: SerialIrq,
    cleared: Vec<SerialIrq>,
}

impl MockSerial {
    pub fn new() -> Self {
        Self {
            config: None,
            tx_buffer: Vec::new(),
            enabled: SerialIrq::empty(),
            pending: SerialIrq::empty(),
            cleared: Vec::new(),
        }
    }

    /// Get transmitted data (for test verification)
    pub fn tx_buffer(&self) -> &[u8] {
        &self.tx_buffer
    }

    /// Currently enabled interrupt sources
    pub fn enabled(&self) -> SerialIrq {
        self.enabled
    }

    /// Every `clear_interrupts` call, in order
    pub fn cleared(&self) -> &[SerialIrq] {
        &self.cleared
    }

    /// Mark interrupt flags pending
    pub fn raise(&mut self, irq: SerialIrq) {
        self.pending |= irq;
    }

    /// Get configured baud rate
    pub fn baud_rate(&self) -> Option<u32> {
        self.config.map(|config| config.baud_rate)
    }
}

impl Default for MockSerial {
    fn default() -> Self {
        Self::new()
    }
}

impl SerialPort for MockSerial {
    fn configure(&mut self, config: &UartConfig) -> Result<()> {
        if config.baud_rate == 0 {
            return Err(PlatformError::Uart(UartError::InvalidBaudRate));
        }
        self.config = Some(*config);
        Ok(())
    }

    fn enable_interrupts(&mut self, irq: SerialIrq) {
        self.enabled |= irq;
    }

    fn disable_interrupts(&mut self, irq: SerialIrq) {
        self.enabled &= !irq;
    }

    fn clear_interrupts(&mut self, irq: SerialIrq) {
        self.pending &= !irq;
        self.cleared.push(irq);
    }

    fn take_interrupts(&mut self) -> SerialIrq {
        let fired = self.pending & self.enabled;
        self.pending &= !fired;
        fired
    }

    fn write(&mut self, byte: u8) {
        self.tx_buffer.push(byte);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mock_serial_write() {
        let mut port = MockSerial::new();
        port.write(b'H');
        port.write(b'i');
        assert_eq!(port.tx_buffer(), b"Hi");
    }

    #[test]
    fn test_mock_serial_interrupt_mask() {
        let mut port = MockSerial::new();
        port.enable_interrupts(SerialIrq::TXBL | SerialIrq::TXC);
        port.disable_interrupts(SerialIrq::TXBL);
        assert_eq!(port.enabled(), SerialIrq::TXC);

        port.raise(SerialIrq::TXBL | SerialIrq::TXC);
        assert_eq!(port.take_interrupts(), SerialIrq::TXC);
        // Masked flag stays pending until enabled
        port.enable_interrupts(SerialIrq::TXBL);
        assert_eq!(port.take_interrupts(), SerialIrq::TXBL);
    }

    #[test]
    fn test_mock_serial_baud_rate() {
        let mut port = MockSerial::new();
        assert_eq!(port.baud_rate(), None);
        port.configure(&UartConfig::default()).unwrap();
        assert_eq!(port.baud_rate(), Some(9600));
    }
}
