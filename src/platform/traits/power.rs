//! Energy modes and low-power entry
//!
//! Energy modes are ordered shallow to deep. Deeper modes save more power but
//! switch off more peripherals:
//!
//! | Mode | Core     | Still running                               |
//! |------|----------|---------------------------------------------|
//! | EM0  | active   | everything                                  |
//! | EM1  | sleeping | high-frequency peripherals (I2C, DMA)       |
//! | EM2  | deep     | low-frequency peripherals (LEUART, LETIMER) |
//! | EM3  | stop     | ULFRCO-clocked peripherals (LETIMER)        |
//! | EM4  | shutoff  | wake-up pins only, leaves by reset          |

/// Processor energy mode, shallow (`Em0`) to deep (`Em4`)
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum EnergyMode {
    Em0,
    Em1,
    Em2,
    Em3,
    Em4,
}

impl EnergyMode {
    /// Number of supported modes
    pub const COUNT: usize = 5;

    /// All modes, shallow to deep
    pub const ALL: [EnergyMode; Self::COUNT] = [
        EnergyMode::Em0,
        EnergyMode::Em1,
        EnergyMode::Em2,
        EnergyMode::Em3,
        EnergyMode::Em4,
    ];

    /// Deepest supported mode
    pub const DEEPEST: EnergyMode = EnergyMode::Em4;

    /// Position in [`EnergyMode::ALL`]
    pub const fn index(self) -> usize {
        self as usize
    }
}

/// Low-power entry
///
/// `enter` is called with interrupts masked and must return once an interrupt
/// is pending, including one that became pending before the call.
pub trait PowerControl {
    /// Enter `mode` and block until the next wake-up source.
    ///
    /// `EnergyMode::Em0` is never requested.
    fn enter(&mut self, mode: EnergyMode);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_modes_order_shallow_to_deep() {
        assert!(EnergyMode::Em0 < EnergyMode::Em1);
        assert!(EnergyMode::Em3 < EnergyMode::DEEPEST);
        for (i, mode) in EnergyMode::ALL.iter().enumerate() {
            assert_eq!(mode.index(), i);
        }
        assert_eq!(EnergyMode::ALL[EnergyMode::COUNT - 1], EnergyMode::DEEPEST);
    }
}
