//! Cortex-M energy-mode entry

use cortex_m::peripheral::SCB;

use crate::platform::traits::{EnergyMode, PowerControl};

/// Energy-mode entry through SCR.SLEEPDEEP and WFI
///
/// EM1 is plain sleep; EM2 and EM3 are deep sleep. On EFM32 parts the
/// difference between EM2 and EM3 is which low-frequency oscillators are left
/// running, which belongs to the clock configuration, not to this backend.
///
/// WFI wakes on any pending interrupt even with PRIMASK set, which is what
/// makes calling this from inside a critical section safe.
pub struct CortexMPower {
    scb: SCB,
}

impl CortexMPower {
    pub fn new(scb: SCB) -> Self {
        Self { scb }
    }

    /// Give the system control block back
    pub fn free(self) -> SCB {
        self.scb
    }
}

impl PowerControl for CortexMPower {
    fn enter(&mut self, mode: EnergyMode) {
        match mode {
            EnergyMode::Em0 => {}
            EnergyMode::Em1 => {
                self.scb.clear_sleepdeep();
                cortex_m::asm::dsb();
                cortex_m::asm::wfi();
            }
            EnergyMode::Em2 | EnergyMode::Em3 => {
                self.scb.set_sleepdeep();
                cortex_m::asm::dsb();
                cortex_m::asm::wfi();
                self.scb.clear_sleepdeep();
            }
            EnergyMode::Em4 => {
                crate::fatal!("power: EM4 requested from the sleep loop");
            }
        }
    }
}
