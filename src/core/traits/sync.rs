//! Interrupt-safe slots for drivers shared by an interrupt vector and the
//! main loop.
//!
//! On target the critical section masks interrupts; on the host the
//! `critical-section` std implementation serializes access with a global lock,
//! so the same statics work in tests.

use core::cell::RefCell;

/// Closure-scoped access to state reachable from interrupt context
///
/// # Example
///
/// ```ignore
/// static I2C: IrqState<Option<I2cMaster<'static, Bus>>> = IrqState::new(None);
///
/// fn i2c0_irq() {
///     I2C.with_mut(|master| {
///         if let Some(master) = master {
///             master.on_interrupt();
///         }
///     });
/// }
/// ```
pub trait SharedState<T> {
    /// Access state immutably.
    fn with<F, R>(&self, f: F) -> R
    where
        F: FnOnce(&T) -> R;

    /// Access state mutably.
    fn with_mut<F, R>(&self, f: F) -> R
    where
        F: FnOnce(&mut T) -> R;
}

/// Interrupt-safe state using a critical-section Mutex.
///
/// Every access masks interrupts for the duration of the closure, so a driver
/// stored here cannot be re-entered by its own interrupt vector while the main
/// loop holds it. Keep closures short: the sleep decision must not miss an
/// interrupt.
pub struct IrqState<T> {
    inner: critical_section::Mutex<RefCell<T>>,
}

impl<T> IrqState<T> {
    /// Creates a new `IrqState` wrapping the given value.
    ///
    /// This is a const fn, allowing static initialization.
    pub const fn new(value: T) -> Self {
        Self {
            inner: critical_section::Mutex::new(RefCell::new(value)),
        }
    }

    /// Replace the wrapped value, returning the previous one.
    ///
    /// Used at boot to install drivers into their `static` slot.
    pub fn replace(&self, value: T) -> T {
        critical_section::with(|cs| self.inner.replace(cs, value))
    }
}

impl<T> SharedState<T> for IrqState<T> {
    fn with<F, R>(&self, f: F) -> R
    where
        F: FnOnce(&T) -> R,
    {
        critical_section::with(|cs| f(&self.inner.borrow_ref(cs)))
    }

    fn with_mut<F, R>(&self, f: F) -> R
    where
        F: FnOnce(&mut T) -> R,
    {
        critical_section::with(|cs| f(&mut self.inner.borrow_ref_mut(cs)))
    }
}
