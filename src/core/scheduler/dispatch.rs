//! Main dispatch loop
//!
//! Routes every pending event to its handler, lowest bit first, clearing the
//! bit before the handler runs so the handler may re-post it. When nothing is
//! pending the loop sleeps through [`SleepArbiter::enter_best_sleep`].
//!
//! Events are tested for membership, never for equality with the whole
//! pending mask: two events posted in the same pass are both dispatched.

use core::fmt;

use heapless::Vec;

use super::events::{EventId, EventRegister};
use crate::core::sleep::{EnergyMode, SleepArbiter};
use crate::platform::traits::PowerControl;

/// Default route table size (one route per event bit)
pub const MAX_ROUTES: usize = super::events::MAX_EVENTS as usize;

/// Handler invoked from the main loop with the application context
pub type Handler<C> = fn(&mut C);

/// Route registration errors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum DispatchError {
    /// The event already has a handler
    DuplicateRoute(EventId),
    /// The route table is full
    TableFull,
}

impl fmt::Display for DispatchError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DispatchError::DuplicateRoute(id) => write!(f, "{} already has a handler", id),
            DispatchError::TableFull => write!(f, "route table full"),
        }
    }
}

/// Outcome of one pass of the loop
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum LoopStep {
    /// Handlers ran for this many events
    Dispatched(usize),
    /// Nothing was pending; the core slept in this mode (`None` = stayed in EM0)
    Slept(Option<EnergyMode>),
}

/// Event-to-handler routing table
pub struct Dispatcher<C, const N: usize = MAX_ROUTES> {
    routes: Vec<(EventId, Handler<C>), N>,
}

impl<C, const N: usize> Dispatcher<C, N> {
    pub const fn new() -> Self {
        Self { routes: Vec::new() }
    }

    /// Route `id` to `handler`
    pub fn register(&mut self, id: EventId, handler: Handler<C>) -> Result<(), DispatchError> {
        if self.routes.iter().any(|(route, _)| *route == id) {
            return Err(DispatchError::DuplicateRoute(id));
        }
        self.routes
            .push((id, handler))
            .map_err(|_| DispatchError::TableFull)
    }

    fn handler(&self, id: EventId) -> Option<Handler<C>> {
        self.routes
            .iter()
            .find(|(route, _)| *route == id)
            .map(|(_, handler)| *handler)
    }

    /// Number of registered routes
    pub fn len(&self) -> usize {
        self.routes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.routes.is_empty()
    }

    /// Run one pass: dispatch everything pending, or sleep if nothing is
    ///
    /// # Panics
    ///
    /// Fatal if a pending event has no route; it would otherwise be
    /// re-dispatched forever and keep the core awake.
    pub fn run_once<P: PowerControl>(
        &self,
        ctx: &mut C,
        events: &EventRegister,
        sleep: &SleepArbiter,
        power: &mut P,
    ) -> LoopStep {
        let pending = events.pending();

        if pending.is_empty() {
            // Re-check under the same critical section as the sleep decision:
            // an event posted after the snapshot above must not be slept on.
            let slept = critical_section::with(|_| {
                if events.pending().is_empty() {
                    Some(sleep.enter_best_sleep(power))
                } else {
                    None
                }
            });
            return match slept {
                Some(mode) => LoopStep::Slept(mode),
                None => LoopStep::Dispatched(0),
            };
        }

        let mut count = 0;
        for id in pending {
            // An earlier handler in this pass may have consumed it
            if !events.is_pending(id) {
                continue;
            }
            let Some(handler) = self.handler(id) else {
                crate::fatal!("dispatch: no handler for {:?}", id);
            };
            events.clear(id);
            handler(ctx);
            count += 1;
        }
        LoopStep::Dispatched(count)
    }

    /// Run the loop forever
    pub fn run<P: PowerControl>(
        &self,
        ctx: &mut C,
        events: &EventRegister,
        sleep: &SleepArbiter,
        power: &mut P,
    ) -> ! {
        crate::log_info!("dispatch loop running with {} routes", self.routes.len());
        loop {
            self.run_once(ctx, events, sleep, power);
        }
    }
}

impl<C, const N: usize> Default for Dispatcher<C, N> {
    fn default() -> Self {
        Self::new()
    }
}
