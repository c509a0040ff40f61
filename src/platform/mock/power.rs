//! Mock power controller for testing

use crate::platform::traits::{EnergyMode, PowerControl};
use std::vec::Vec;

/// Mock power controller
///
/// Returns immediately from every sleep request and records the mode, as if
/// a wake-up interrupt were always already pending.
#[derive(Debug, Default)]
pub struct MockPower {
    entered: Vec<EnergyMode>,
}

impl MockPower {
    pub fn new() -> Self {
        Self::default()
    }

    /// Modes entered so far, in order
    pub fn entered(&self) -> &[EnergyMode] {
        &self.entered
    }
}

impl PowerControl for MockPower {
    fn enter(&mut self, mode: EnergyMode) {
        self.entered.push(mode);
    }
}
