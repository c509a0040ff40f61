//! Interrupt-driven peripheral drivers
//!
//! Each driver owns its hardware handle, advances a state machine from its
//! interrupt vector, blocks the energy mode that would stop its peripheral
//! while work is in flight, and posts a deferred event when that work is done.

pub mod i2c;
pub mod letimer;
pub mod leuart;

pub use i2c::{
    Direction, I2cMaster, I2cSignal, I2cState, Transfer, I2C_EM_BLOCK, MAX_TRANSFER_BYTES,
};
pub use letimer::{Letimer, TimerConfig, LETIMER_EM};
pub use leuart::{LeuartTx, TxState, LEUART_TX_EM, TX_CAPACITY};
