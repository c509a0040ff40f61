//! Interrupt-driven I2C master
//!
//! Runs one register read or write against a target device at a time. The
//! transaction advances on four hardware signals (ACK, NACK, received data,
//! STOP completed); each call to [`I2cMaster::on_interrupt`] decodes the
//! pending flags and steps the state machine.
//!
//! Read transaction:
//!
//! ```text
//!  start()   ──► START  addr+W                       StartCmd
//!  ACK       ──► register byte                       ReadCmd
//!  ACK       ──► repeated START  addr+R              WaitRead
//!  NACK      ──► repeated START  addr+R (retry)      WaitRead
//!  ACK       ──► (device ready)                      EndSense
//!  RXDATAV   ──► merge byte, ACK        (more bytes) EndSense
//!  RXDATAV   ──► merge byte, NACK, STOP (last byte)  Stop
//!  MSTOP     ──► release EM2, post completion        Idle
//! ```
//!
//! Write transaction, data bytes sent most significant first:
//! `StartCmd ─ACK─► WriteData ─ACK─► ... ─► Stop ─MSTOP─► Idle`.

use crate::core::scheduler::{EventId, EventRegister};
use crate::core::sleep::{EnergyMode, SleepArbiter};
use crate::platform::error::I2cError;
use crate::platform::traits::{I2cBus, I2cConfig, I2cIrq, I2C_READ, I2C_WRITE};
use crate::platform::Result;

/// Energy mode blocked while a transaction is in flight (I2C stops in EM2)
pub const I2C_EM_BLOCK: EnergyMode = EnergyMode::Em2;

/// Largest transfer the 32-bit data word holds
pub const MAX_TRANSFER_BYTES: u8 = 4;

/// Interrupt sources the driver consumes
const I2C_IRQS: I2cIrq = I2cIrq::ACK
    .union(I2cIrq::NACK)
    .union(I2cIrq::MSTOP)
    .union(I2cIrq::RXDATAV);

/// Transfer direction
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Direction {
    Read,
    Write,
}

/// Transaction progress
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum I2cState {
    /// No transaction in flight
    Idle,
    /// Address (write) sent, waiting for ACK
    StartCmd,
    /// Register byte sent, waiting for ACK
    ReadCmd,
    /// Read address sent, polling until the device ACKs
    WaitRead,
    /// Receiving data bytes
    EndSense,
    /// Sending data bytes
    WriteData,
    /// STOP issued, waiting for it to complete
    Stop,
}

/// Hardware signal delivered to the state machine
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum I2cSignal {
    Ack,
    Nack,
    RxData,
    StopComplete,
}

/// One register transaction
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Transfer {
    /// 7-bit device address
    pub target_addr: u8,
    /// Register or command byte
    pub target_reg: u8,
    pub direction: Direction,
    /// Value to send (writes only)
    pub value: u32,
    /// Number of data bytes, 1..=4, big-endian
    pub bytes: u8,
    /// Event posted when the STOP completes
    pub completion: EventId,
}

impl Transfer {
    /// Read `bytes` bytes from `target_reg`
    pub const fn read(target_addr: u8, target_reg: u8, bytes: u8, completion: EventId) -> Self {
        Self {
            target_addr,
            target_reg,
            direction: Direction::Read,
            value: 0,
            bytes,
            completion,
        }
    }

    /// Write the low `bytes` bytes of `value` to `target_reg`
    pub const fn write(
        target_addr: u8,
        target_reg: u8,
        value: u32,
        bytes: u8,
        completion: EventId,
    ) -> Self {
        Self {
            target_addr,
            target_reg,
            direction: Direction::Write,
            value,
            bytes,
            completion,
        }
    }
}

/// State of the single active transaction
#[derive(Debug, Clone, Copy)]
struct TransactionContext {
    state: I2cState,
    target_addr: u8,
    target_reg: u8,
    direction: Direction,
    data: u32,
    remaining: u8,
    busy: bool,
    completion: Option<EventId>,
}

impl TransactionContext {
    const IDLE: Self = Self {
        state: I2cState::Idle,
        target_addr: 0,
        target_reg: 0,
        direction: Direction::Read,
        data: 0,
        remaining: 0,
        busy: false,
        completion: None,
    };
}

const fn address_byte(target_addr: u8, rw: u8) -> u8 {
    (target_addr << 1) | rw
}

/// Interrupt-driven I2C master driver
pub struct I2cMaster<'a, B: I2cBus> {
    bus: B,
    events: &'a EventRegister,
    sleep: &'a SleepArbiter,
    ctx: TransactionContext,
}

impl<'a, B: I2cBus> I2cMaster<'a, B> {
    /// Configure the peripheral, reset the bus and enable the interrupts the
    /// state machine consumes
    ///
    /// # Errors
    ///
    /// Returns `PlatformError::I2c` if the configuration is invalid or the bus
    /// does not come back idle after the reset sequence.
    pub fn open(
        mut bus: B,
        config: I2cConfig,
        events: &'a EventRegister,
        sleep: &'a SleepArbiter,
    ) -> Result<Self> {
        config.validate()?;
        bus.configure(&config)?;
        bus.reset_bus();
        if !bus.is_idle() {
            crate::log_warn!("i2c: bus not idle after reset");
            return Err(I2cError::BusError.into());
        }
        bus.enable_interrupts(I2C_IRQS);

        crate::log_debug!("i2c: open at {} Hz", config.frequency);
        Ok(Self {
            bus,
            events,
            sleep,
            ctx: TransactionContext::IDLE,
        })
    }

    /// Begin a transaction
    ///
    /// # Panics
    ///
    /// Fatal if the hardware is not idle, a transaction is already in flight,
    /// or `transfer.bytes` is outside `1..=MAX_TRANSFER_BYTES`.
    pub fn start(&mut self, transfer: Transfer) {
        if !self.bus.is_idle() {
            crate::fatal!("i2c: start while hardware busy");
        }
        if self.ctx.busy {
            crate::fatal!("i2c: start while {:?} in flight", self.ctx.state);
        }
        if transfer.bytes == 0 || transfer.bytes > MAX_TRANSFER_BYTES {
            crate::fatal!("i2c: unsupported transfer length {}", transfer.bytes);
        }

        self.sleep.vote_busy(I2C_EM_BLOCK);

        self.ctx = TransactionContext {
            state: I2cState::StartCmd,
            target_addr: transfer.target_addr,
            target_reg: transfer.target_reg,
            direction: transfer.direction,
            data: match transfer.direction {
                Direction::Read => 0,
                Direction::Write => transfer.value,
            },
            remaining: transfer.bytes,
            busy: true,
            completion: Some(transfer.completion),
        };

        crate::log_debug!(
            "i2c: {:?} {:#x} reg {:#x}, {} bytes",
            transfer.direction,
            transfer.target_addr,
            transfer.target_reg,
            transfer.bytes
        );

        self.bus.start();
        self.bus.write(address_byte(transfer.target_addr, I2C_WRITE));
    }

    /// Interrupt entry: decode pending flags and step the state machine
    pub fn on_interrupt(&mut self) {
        let flags = self.bus.take_interrupts();

        if flags.contains(I2cIrq::ACK) {
            self.on_ack();
        }
        if flags.contains(I2cIrq::NACK) {
            self.on_nack();
        }
        if flags.contains(I2cIrq::MSTOP) {
            self.on_stop();
        }
        if flags.contains(I2cIrq::RXDATAV) {
            self.on_rx_data();
        }
    }

    /// Step the state machine with one signal
    pub fn handle(&mut self, signal: I2cSignal) {
        match signal {
            I2cSignal::Ack => self.on_ack(),
            I2cSignal::Nack => self.on_nack(),
            I2cSignal::RxData => self.on_rx_data(),
            I2cSignal::StopComplete => self.on_stop(),
        }
    }

    /// Acknowledge received
    pub fn on_ack(&mut self) {
        match self.ctx.state {
            I2cState::StartCmd => {
                self.bus.write(self.ctx.target_reg);
                self.set_state(match self.ctx.direction {
                    Direction::Read => I2cState::ReadCmd,
                    Direction::Write => I2cState::WriteData,
                });
            }
            I2cState::ReadCmd => {
                self.bus.start();
                self.bus.write(address_byte(self.ctx.target_addr, I2C_READ));
                self.set_state(I2cState::WaitRead);
            }
            I2cState::WaitRead => {
                self.set_state(I2cState::EndSense);
            }
            I2cState::WriteData => {
                if self.ctx.remaining > 0 {
                    self.ctx.remaining -= 1;
                    let byte = (self.ctx.data >> (8 * u32::from(self.ctx.remaining))) as u8;
                    self.bus.write(byte);
                } else {
                    self.bus.stop();
                    self.set_state(I2cState::Stop);
                }
            }
            _ => self.unexpected(I2cSignal::Ack),
        }
    }

    /// Not-acknowledge received
    ///
    /// Only expected while polling the device for read readiness; the read
    /// address is re-sent until the device acknowledges.
    pub fn on_nack(&mut self) {
        match self.ctx.state {
            I2cState::WaitRead => {
                crate::log_trace!("i2c: device busy, retrying read address");
                self.bus.start();
                self.bus.write(address_byte(self.ctx.target_addr, I2C_READ));
            }
            _ => self.unexpected(I2cSignal::Nack),
        }
    }

    /// Data byte received
    ///
    /// Bytes arrive most significant first and are OR-ed into the data word at
    /// their position, so any length up to four bytes assembles correctly.
    pub fn on_rx_data(&mut self) {
        match self.ctx.state {
            I2cState::EndSense => {
                let byte = self.bus.read();
                self.ctx.remaining -= 1;
                self.ctx.data |= u32::from(byte) << (8 * u32::from(self.ctx.remaining));

                if self.ctx.remaining > 0 {
                    self.bus.ack();
                } else {
                    self.bus.nack();
                    self.bus.stop();
                    self.set_state(I2cState::Stop);
                }
            }
            _ => self.unexpected(I2cSignal::RxData),
        }
    }

    /// STOP condition completed
    pub fn on_stop(&mut self) {
        match (self.ctx.state, self.ctx.completion) {
            (I2cState::Stop, Some(completion)) => {
                self.sleep.vote_idle(I2C_EM_BLOCK);
                self.events.post(completion);
                self.ctx.busy = false;
                self.set_state(I2cState::Idle);
            }
            _ => self.unexpected(I2cSignal::StopComplete),
        }
    }

    /// A transaction is in flight
    pub fn is_busy(&self) -> bool {
        self.ctx.busy
    }

    pub fn state(&self) -> I2cState {
        self.ctx.state
    }

    /// Data word of the last transaction (assembled for reads, sent for writes)
    pub fn data(&self) -> u32 {
        self.ctx.data
    }

    pub fn bus(&self) -> &B {
        &self.bus
    }

    pub fn bus_mut(&mut self) -> &mut B {
        &mut self.bus
    }

    fn set_state(&mut self, next: I2cState) {
        crate::log_trace!("i2c: {:?} -> {:?}", self.ctx.state, next);
        self.ctx.state = next;
    }

    fn unexpected(&self, signal: I2cSignal) -> ! {
        crate::fatal!("i2c: unexpected {:?} in state {:?}", signal, self.ctx.state)
    }
}
