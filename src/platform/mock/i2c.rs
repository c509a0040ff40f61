//! Mock I2C peripheral for testing

use crate::platform::{
    error::{I2cError, PlatformError},
    traits::{I2cBus, I2cConfig, I2cIrq},
    Result,
};
use std::collections::VecDeque;
use std::vec::Vec;

/// One command issued to the peripheral, in order
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum I2cOp {
    Configure { frequency: u32 },
    ResetBus,
    Start,
    Write(u8),
    Read(u8),
    Ack,
    Nack,
    Stop,
}

/// Mock I2C peripheral
///
/// Records every command for test verification. Received bytes are queued
/// with [`MockI2cBus::queue_rx`]; interrupt flags are raised with
/// [`MockI2cBus::raise`] and collected by `take_interrupts`.
#[derive(Debug)]
pub struct MockI2cBus {
    ops: Vec<I2cOp>,
    rx: VecDeque<u8>,
    enabled: I2cIrq,
    pending: I2cIrq,
    busy_hardware: bool,
    fail_configure: bool,
}

impl MockI2cBus {
    pub fn new() -> Self {
        Self {
            ops: Vec::new(),
            rx: VecDeque::new(),
            enabled: I2cIrq::empty(),
            pending: I2cIrq::empty(),
            busy_hardware: false,
            fail_configure: false,
        }
    }

    /// Recorded commands
    pub fn ops(&self) -> &[I2cOp] {
        &self.ops
    }

    pub fn clear_ops(&mut self) {
        self.ops.clear();
    }

    /// Bytes written to the transmit buffer, in order
    pub fn written(&self) -> Vec<u8> {
        self.ops
            .iter()
            .filter_map(|op| match op {
                I2cOp::Write(byte) => Some(*byte),
                _ => None,
            })
            .collect()
    }

    /// Queue bytes the target device will return
    pub fn queue_rx(&mut self, bytes: &[u8]) {
        self.rx.extend(bytes.iter().copied());
    }

    /// Mark interrupt flags pending
    pub fn raise(&mut self, irq: I2cIrq) {
        self.pending |= irq;
    }

    /// Enabled interrupt sources
    pub fn enabled(&self) -> I2cIrq {
        self.enabled
    }

    /// Make the hardware state machine report busy
    pub fn set_hardware_busy(&mut self, busy: bool) {
        self.busy_hardware = busy;
    }

    /// Make the next `configure` fail
    pub fn fail_configure(&mut self) {
        self.fail_configure = true;
    }
}

impl Default for MockI2cBus {
    fn default() -> Self {
        Self::new()
    }
}

impl I2cBus for MockI2cBus {
    fn configure(&mut self, config: &I2cConfig) -> Result<()> {
        if self.fail_configure {
            return Err(PlatformError::I2c(I2cError::BusError));
        }
        self.ops.push(I2cOp::Configure {
            frequency: config.frequency,
        });
        Ok(())
    }

    fn reset_bus(&mut self) {
        self.ops.push(I2cOp::ResetBus);
        self.pending = I2cIrq::empty();
    }

    fn is_idle(&self) -> bool {
        !self.busy_hardware
    }

    fn enable_interrupts(&mut self, irq: I2cIrq) {
        self.pending &= !irq;
        self.enabled |= irq;
    }

    fn take_interrupts(&mut self) -> I2cIrq {
        let fired = self.pending & self.enabled;
        self.pending &= !fired;
        fired
    }

    fn start(&mut self) {
        self.ops.push(I2cOp::Start);
    }

    fn write(&mut self, byte: u8) {
        self.ops.push(I2cOp::Write(byte));
    }

    fn read(&mut self) -> u8 {
        let byte = self.rx.pop_front().unwrap_or(0xFF);
        self.ops.push(I2cOp::Read(byte));
        byte
    }

    fn ack(&mut self) {
        self.ops.push(I2cOp::Ack);
    }

    fn nack(&mut self) {
        self.ops.push(I2cOp::Nack);
    }

    fn stop(&mut self) {
        self.ops.push(I2cOp::Stop);
    }
}
