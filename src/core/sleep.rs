//! Energy-mode arbitration
//!
//! Each driver blocks the energy mode that would switch off its peripheral
//! while it has work in flight (`vote_busy`) and releases it when that work
//! completes (`vote_idle`). The main loop sleeps in the deepest mode that is
//! still shallower than every blocked one.
//!
//! ```text
//!   votes:   EM0  EM1  EM2  EM3  EM4
//!             0    0    1    0    1      deepest_allowed() = EM2
//!                                        enter_best_sleep()  -> EM1
//! ```

use core::cell::RefCell;

use crate::platform::traits::PowerControl;
pub use crate::platform::traits::EnergyMode;

/// Upper bound on simultaneous holders of one mode
///
/// Each driver holds at most one vote per mode, so reaching this bound means a
/// `vote_busy` without its matching `vote_idle`.
pub const MAX_VOTES_PER_MODE: u8 = 4;

/// Reason a vote was rejected
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum VoteFault {
    Overflow,
    Unbalanced,
}

/// Process-wide table of per-mode keep-awake counters
pub struct SleepArbiter {
    votes: critical_section::Mutex<RefCell<[u8; EnergyMode::COUNT]>>,
}

impl SleepArbiter {
    pub const fn new() -> Self {
        Self {
            votes: critical_section::Mutex::new(RefCell::new([0; EnergyMode::COUNT])),
        }
    }

    /// Zero every counter (boot only)
    pub fn reset(&self) {
        critical_section::with(|cs| {
            *self.votes.borrow_ref_mut(cs) = [0; EnergyMode::COUNT];
        });
    }

    /// Forbid entering `mode` or anything deeper until the matching `vote_idle`
    ///
    /// # Panics
    ///
    /// Fatal if the mode already has `MAX_VOTES_PER_MODE` holders.
    pub fn vote_busy(&self, mode: EnergyMode) {
        let result = critical_section::with(|cs| {
            let mut votes = self.votes.borrow_ref_mut(cs);
            let slot = &mut votes[mode.index()];
            if *slot >= MAX_VOTES_PER_MODE {
                return Err(VoteFault::Overflow);
            }
            *slot += 1;
            Ok(*slot)
        });

        match result {
            Ok(count) => crate::log_trace!("block {:?} ({})", mode, count),
            Err(_) => crate::fatal!("sleep: too many holders blocking {:?}", mode),
        }
    }

    /// Release one hold on `mode`
    ///
    /// # Panics
    ///
    /// Fatal if `mode` has no holder (unbalanced release).
    pub fn vote_idle(&self, mode: EnergyMode) {
        let result = critical_section::with(|cs| {
            let mut votes = self.votes.borrow_ref_mut(cs);
            let slot = &mut votes[mode.index()];
            if *slot == 0 {
                return Err(VoteFault::Unbalanced);
            }
            *slot -= 1;
            Ok(*slot)
        });

        match result {
            Ok(count) => crate::log_trace!("unblock {:?} ({})", mode, count),
            Err(_) => crate::fatal!("sleep: unbalanced release of {:?}", mode),
        }
    }

    /// Current number of holders of `mode`
    pub fn votes(&self, mode: EnergyMode) -> u8 {
        critical_section::with(|cs| self.votes.borrow_ref(cs)[mode.index()])
    }

    /// Shallowest blocked mode, or the deepest supported mode if none is blocked
    pub fn deepest_allowed(&self) -> EnergyMode {
        critical_section::with(|cs| {
            let votes = self.votes.borrow_ref(cs);
            EnergyMode::ALL
                .into_iter()
                .find(|mode| votes[mode.index()] != 0)
                .unwrap_or(EnergyMode::DEEPEST)
        })
    }

    /// Sleep in the deepest mode every holder permits
    ///
    /// The decision and the sleep instruction run in one critical section. An
    /// interrupt that arrives in between stays pending and wakes the core
    /// immediately (WFI ignores PRIMASK for wake-up), and its handler runs once
    /// the section ends.
    ///
    /// Returns the mode that was entered, or `None` when a holder requires
    /// the core to stay in EM0.
    pub fn enter_best_sleep<P: PowerControl>(&self, power: &mut P) -> Option<EnergyMode> {
        critical_section::with(|_| {
            let target = sleep_target(self.deepest_allowed());
            if let Some(mode) = target {
                power.enter(mode);
            }
            target
        })
    }
}

impl Default for SleepArbiter {
    fn default() -> Self {
        Self::new()
    }
}

/// Mode to enter when `blocked` is the shallowest blocked mode
///
/// EM4 is never entered: leaving it takes a reset.
fn sleep_target(blocked: EnergyMode) -> Option<EnergyMode> {
    match blocked {
        EnergyMode::Em0 | EnergyMode::Em1 => None,
        EnergyMode::Em2 => Some(EnergyMode::Em1),
        EnergyMode::Em3 => Some(EnergyMode::Em2),
        EnergyMode::Em4 => Some(EnergyMode::Em3),
    }
}
