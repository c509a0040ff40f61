//! Deferred-event scheduler
//!
//! Bridges interrupt and main-loop execution: interrupt handlers post
//! [`EventId`]s to the [`EventRegister`], the [`Dispatcher`] runs their
//! handlers from the main loop.

pub mod dispatch;
pub mod events;

pub use dispatch::{DispatchError, Dispatcher, Handler, LoopStep};
pub use events::{EventId, EventIter, EventRegister, EventSet, MAX_EVENTS};
