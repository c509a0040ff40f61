//! Core traits for platform-agnostic firmware functionality.
//!
//! ```text
//!   interrupt vector ──┐                 ┌── main dispatch loop
//!                      ▼                 ▼
//!              ┌───────────────────────────────┐
//!              │   SharedState<T>              │
//!              │   + with(f: Fn(&T) -> R)      │
//!              │   + with_mut(f: Fn(&mut T))   │
//!              └──────────────┬────────────────┘
//!                             ▼
//!              IrqState<T>  (critical_section::Mutex<RefCell<T>>)
//! ```

pub mod sync;

pub use sync::{IrqState, SharedState};
