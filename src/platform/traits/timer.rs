//! Low-energy timer trait
//!
//! The LETIMER counts down from COMP0 (top) and drives its output while the
//! counter is above COMP1, which gives a PWM with period `COMP0` and active
//! time `COMP0 - COMP1` counts.

use bitflags::bitflags;

use crate::platform::{error::TimerError, Result};

bitflags! {
    /// LETIMER interrupt sources (IF/IEN bit positions)
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct TimerIrq: u32 {
        /// Counter matched COMP0
        const COMP0 = 1 << 0;
        /// Counter matched COMP1
        const COMP1 = 1 << 1;
        /// Counter underflow (once per period)
        const UF = 1 << 2;
    }
}

/// Counter values for one PWM period
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct TimerCounts {
    /// Reload value (period)
    pub top: u16,
    /// Compare value ending the active phase
    pub compare: u16,
}

impl TimerCounts {
    /// Convert a period and active time in milliseconds to counts at `clock_hz`
    pub fn from_millis(period_ms: u32, active_ms: u32, clock_hz: u32) -> Result<Self> {
        if period_ms == 0 || clock_hz == 0 || active_ms > period_ms {
            return Err(TimerError::InvalidDuration.into());
        }
        let top = u64::from(period_ms) * u64::from(clock_hz) / 1000;
        let active = u64::from(active_ms) * u64::from(clock_hz) / 1000;
        let top = u16::try_from(top).map_err(|_| TimerError::Overflow)?;
        // active <= top, so this fits as well
        let active = active as u16;
        if top == 0 {
            return Err(TimerError::InvalidDuration.into());
        }
        Ok(Self {
            top,
            compare: top - active,
        })
    }
}

/// Low-energy timer
///
/// # Safety Invariants
///
/// - Peripheral clock enabled before `configure`
/// - Only one owner per LETIMER instance
pub trait LowEnergyTimer {
    /// Program top and compare values, free-running mode, counter stopped
    fn configure(&mut self, counts: TimerCounts) -> Result<()>;

    /// Start or stop the counter
    fn set_running(&mut self, running: bool);

    /// Enable interrupt sources (clears their stale flags first)
    fn enable_interrupts(&mut self, irq: TimerIrq);

    /// Read the pending and enabled interrupt flags and clear them
    fn take_interrupts(&mut self) -> TimerIrq;
}
