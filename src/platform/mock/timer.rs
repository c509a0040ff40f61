//! Mock LETIMER for testing

use crate::platform::{
    traits::{LowEnergyTimer, TimerCounts, TimerIrq},
    Result,
};

/// Mock low-energy timer
///
/// Nothing counts on its own: tests raise `COMP0`/`COMP1`/`UF` flags by hand.
#[derive(Debug)]
pub struct MockTimer {
    counts: Option<TimerCounts>,
    running: bool,
    enabled: TimerIrq,
    pending: TimerIrq,
}

impl MockTimer {
    pub fn new() -> Self {
        Self {
            counts: None,
            running: false,
            enabled: TimerIrq::empty(),
            pending: TimerIrq::empty(),
        }
    }

    /// Programmed counter values
    pub fn counts(&self) -> Option<TimerCounts> {
        self.counts
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    pub fn enabled(&self) -> TimerIrq {
        self.enabled
    }

    /// Mark interrupt flags pending
    pub fn raise(&mut self, irq: TimerIrq) {
        self.pending |= irq;
    }

    /// Simulate one full period: COMP1 match then underflow
    pub fn elapse_period(&mut self) {
        self.raise(TimerIrq::COMP1 | TimerIrq::UF);
    }
}

impl Default for MockTimer {
    fn default() -> Self {
        Self::new()
    }
}

impl LowEnergyTimer for MockTimer {
    fn configure(&mut self, counts: TimerCounts) -> Result<()> {
        self.counts = Some(counts);
        self.running = false;
        Ok(())
    }

    fn set_running(&mut self, running: bool) {
        self.running = running;
    }

    fn enable_interrupts(&mut self, irq: TimerIrq) {
        self.pending &= !irq;
        self.enabled |= irq;
    }

    fn take_interrupts(&mut self) -> TimerIrq {
        let fired = self.pending & self.enabled;
        self.pending = TimerIrq::empty();
        fired
    }
}
