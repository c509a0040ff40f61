//! Low-energy periodic timer
//!
//! Free-running PWM timer clocked from the ultra-low-frequency oscillator.
//! Each interrupt source (COMP0, COMP1, underflow) can be routed to a deferred
//! event; sources without an event stay disabled.

use crate::core::scheduler::{EventId, EventRegister};
use crate::core::sleep::{EnergyMode, SleepArbiter};
use crate::platform::traits::{LowEnergyTimer, TimerCounts, TimerIrq};
use crate::platform::Result;

/// Energy mode blocked while the timer runs (LETIMER has no clock in EM4)
pub const LETIMER_EM: EnergyMode = EnergyMode::Em4;

/// Timer configuration
#[derive(Debug, Clone, Copy)]
pub struct TimerConfig {
    /// PWM period in milliseconds
    pub period_ms: u32,
    /// Active (output high) time in milliseconds
    pub active_ms: u32,
    /// Counter clock in Hz
    pub clock_hz: u32,
    /// Event posted on COMP0 match
    pub comp0: Option<EventId>,
    /// Event posted on COMP1 match
    pub comp1: Option<EventId>,
    /// Event posted on underflow
    pub underflow: Option<EventId>,
}

impl Default for TimerConfig {
    fn default() -> Self {
        Self {
            period_ms: 1800,
            active_ms: 250,
            clock_hz: 1000, // ULFRCO
            comp0: None,
            comp1: None,
            underflow: None,
        }
    }
}

impl TimerConfig {
    fn enabled_sources(&self) -> TimerIrq {
        let mut irq = TimerIrq::empty();
        irq.set(TimerIrq::COMP0, self.comp0.is_some());
        irq.set(TimerIrq::COMP1, self.comp1.is_some());
        irq.set(TimerIrq::UF, self.underflow.is_some());
        irq
    }
}

/// Low-energy timer driver
pub struct Letimer<'a, T: LowEnergyTimer> {
    timer: T,
    events: &'a EventRegister,
    sleep: &'a SleepArbiter,
    config: TimerConfig,
    running: bool,
}

impl<'a, T: LowEnergyTimer> Letimer<'a, T> {
    /// Program the period and enable the routed interrupt sources; the counter
    /// is left stopped
    ///
    /// # Errors
    ///
    /// Returns `PlatformError::Timer` if the period does not fit the 16-bit
    /// counter at `clock_hz` or the active time exceeds the period.
    pub fn open(
        mut timer: T,
        config: TimerConfig,
        events: &'a EventRegister,
        sleep: &'a SleepArbiter,
    ) -> Result<Self> {
        let counts = TimerCounts::from_millis(config.period_ms, config.active_ms, config.clock_hz)?;
        timer.configure(counts)?;
        timer.enable_interrupts(config.enabled_sources());

        crate::log_debug!("letimer: top {} compare {}", counts.top, counts.compare);
        Ok(Self {
            timer,
            events,
            sleep,
            config,
            running: false,
        })
    }

    /// Start counting; blocks EM4 while running
    pub fn start(&mut self) {
        if self.running {
            return;
        }
        self.sleep.vote_busy(LETIMER_EM);
        self.timer.set_running(true);
        self.running = true;
    }

    /// Stop counting and release EM4
    pub fn stop(&mut self) {
        if !self.running {
            return;
        }
        self.timer.set_running(false);
        self.sleep.vote_idle(LETIMER_EM);
        self.running = false;
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    /// Interrupt entry: post the event routed to each pending source
    ///
    /// # Panics
    ///
    /// Fatal if a source fires that has no event routed to it.
    pub fn on_interrupt(&mut self) {
        let flags = self.timer.take_interrupts();

        for (irq, route) in [
            (TimerIrq::COMP0, self.config.comp0),
            (TimerIrq::COMP1, self.config.comp1),
            (TimerIrq::UF, self.config.underflow),
        ] {
            if !flags.contains(irq) {
                continue;
            }
            match route {
                Some(id) => self.events.post(id),
                None => crate::fatal!("letimer: unrouted interrupt {:#x}", irq.bits()),
            }
        }
    }

    pub fn timer(&self) -> &T {
        &self.timer
    }

    pub fn timer_mut(&mut self) -> &mut T {
        &mut self.timer
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::scheduler::EventSet;
    use crate::platform::error::TimerError;
    use crate::platform::mock::MockTimer;
    use crate::platform::PlatformError;

    const COMP0: EventId = EventId::new(0);
    const COMP1: EventId = EventId::new(1);
    const UF: EventId = EventId::new(2);

    fn config() -> TimerConfig {
        TimerConfig {
            comp0: Some(COMP0),
            comp1: Some(COMP1),
            underflow: Some(UF),
            ..TimerConfig::default()
        }
    }

    #[test]
    fn test_open_programs_counts_and_routed_sources() {
        let events = EventRegister::new();
        let sleep = SleepArbiter::new();
        let config = TimerConfig {
            underflow: Some(UF),
            ..TimerConfig::default()
        };
        let letimer = Letimer::open(MockTimer::new(), config, &events, &sleep).unwrap();

        assert_eq!(
            letimer.timer().counts(),
            Some(TimerCounts {
                top: 1800,
                compare: 1550
            })
        );
        assert_eq!(letimer.timer().enabled(), TimerIrq::UF);
        assert!(!letimer.is_running());
        assert_eq!(sleep.votes(LETIMER_EM), 0);
    }

    #[test]
    fn test_open_rejects_period_overflow() {
        let events = EventRegister::new();
        let sleep = SleepArbiter::new();
        let config = TimerConfig {
            period_ms: 3000,
            clock_hz: 32_768,
            ..config()
        };
        let result = Letimer::open(MockTimer::new(), config, &events, &sleep);
        assert!(matches!(
            result,
            Err(PlatformError::Timer(TimerError::Overflow))
        ));
    }

    #[test]
    fn test_start_and_stop_vote_once() {
        let events = EventRegister::new();
        let sleep = SleepArbiter::new();
        let mut letimer = Letimer::open(MockTimer::new(), config(), &events, &sleep).unwrap();

        letimer.start();
        letimer.start();
        assert!(letimer.timer().is_running());
        assert_eq!(sleep.votes(LETIMER_EM), 1);
        assert_eq!(sleep.deepest_allowed(), EnergyMode::Em4);

        letimer.stop();
        letimer.stop();
        assert!(!letimer.timer().is_running());
        assert_eq!(sleep.votes(LETIMER_EM), 0);
    }

    #[test]
    fn test_period_posts_comp1_then_underflow() {
        let events = EventRegister::new();
        let sleep = SleepArbiter::new();
        let mut letimer = Letimer::open(MockTimer::new(), config(), &events, &sleep).unwrap();
        letimer.start();

        letimer.timer_mut().elapse_period();
        letimer.on_interrupt();
        assert_eq!(events.pending(), EventSet::from_iter([COMP1, UF]));

        letimer.timer_mut().raise(TimerIrq::COMP0);
        letimer.on_interrupt();
        assert!(events.is_pending(COMP0));
    }

    #[test]
    fn test_disabled_source_is_never_delivered() {
        let events = EventRegister::new();
        let sleep = SleepArbiter::new();
        let config = TimerConfig {
            underflow: Some(UF),
            ..TimerConfig::default()
        };
        let mut letimer = Letimer::open(MockTimer::new(), config, &events, &sleep).unwrap();

        letimer.timer_mut().elapse_period();
        letimer.on_interrupt();
        assert_eq!(events.pending(), EventSet::from_iter([UF]));
    }

    #[test]
    #[should_panic(expected = "unrouted interrupt")]
    fn test_unrouted_source_is_fatal() {
        let events = EventRegister::new();
        let sleep = SleepArbiter::new();
        let config = TimerConfig {
            underflow: Some(UF),
            ..TimerConfig::default()
        };
        let mut letimer = Letimer::open(MockTimer::new(), config, &events, &sleep).unwrap();

        // A source enabled behind the driver's back
        letimer.timer_mut().enable_interrupts(TimerIrq::COMP0);
        letimer.timer_mut().raise(TimerIrq::COMP0);
        letimer.on_interrupt();
    }
}
