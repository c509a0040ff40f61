//! Deferred event register
//!
//! Interrupt handlers post events here; the main loop reads the pending set,
//! runs the matching handler and clears the bit. Every read-modify-write runs
//! inside a critical section so a post from an interrupt cannot be lost
//! between the main loop's read and its clear.

use core::cell::Cell;
use core::fmt;

/// Number of distinct event identities
pub const MAX_EVENTS: u8 = 32;

/// Identity of one deferred unit of work (a bit index in [`EventSet`])
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct EventId(u8);

impl EventId {
    /// Create an event id from its bit index
    ///
    /// # Panics
    ///
    /// Panics (at compile time when used in a `const`) if `bit >= MAX_EVENTS`.
    pub const fn new(bit: u8) -> Self {
        assert!(bit < MAX_EVENTS, "event bit out of range");
        Self(bit)
    }

    /// Bit index of this event
    pub const fn bit(self) -> u8 {
        self.0
    }

    /// Single-bit mask of this event
    pub const fn mask(self) -> u32 {
        1 << self.0
    }
}

impl fmt::Display for EventId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "event#{}", self.0)
    }
}

/// Fixed-width set of pending events
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct EventSet(u32);

impl EventSet {
    /// The empty set
    pub const fn empty() -> Self {
        Self(0)
    }

    /// Build a set from a raw mask
    pub const fn from_bits(bits: u32) -> Self {
        Self(bits)
    }

    /// Raw mask
    pub const fn bits(self) -> u32 {
        self.0
    }

    pub const fn is_empty(self) -> bool {
        self.0 == 0
    }

    pub const fn contains(self, id: EventId) -> bool {
        self.0 & id.mask() != 0
    }

    /// Number of pending events
    pub const fn len(self) -> u32 {
        self.0.count_ones()
    }

    /// Add `id`; adding an already-present id is a no-op
    pub fn insert(&mut self, id: EventId) {
        self.0 |= id.mask();
    }

    pub fn remove(&mut self, id: EventId) {
        self.0 &= !id.mask();
    }

    /// Iterate pending ids, lowest bit first (the fixed dispatch order)
    pub fn iter(self) -> EventIter {
        EventIter { remaining: self.0 }
    }
}

impl IntoIterator for EventSet {
    type Item = EventId;
    type IntoIter = EventIter;

    fn into_iter(self) -> EventIter {
        self.iter()
    }
}

impl FromIterator<EventId> for EventSet {
    fn from_iter<I: IntoIterator<Item = EventId>>(iter: I) -> Self {
        let mut set = EventSet::empty();
        for id in iter {
            set.insert(id);
        }
        set
    }
}

/// Iterator over the ids of an [`EventSet`]
#[derive(Debug, Clone)]
pub struct EventIter {
    remaining: u32,
}

impl Iterator for EventIter {
    type Item = EventId;

    fn next(&mut self) -> Option<EventId> {
        if self.remaining == 0 {
            return None;
        }
        let bit = self.remaining.trailing_zeros() as u8;
        self.remaining &= self.remaining - 1;
        Some(EventId(bit))
    }
}

/// Process-wide register of pending deferred events
///
/// `const`-constructible so firmware can keep it in a `static` shared by all
/// interrupt handlers and the main loop.
pub struct EventRegister {
    pending: critical_section::Mutex<Cell<EventSet>>,
}

impl EventRegister {
    pub const fn new() -> Self {
        Self {
            pending: critical_section::Mutex::new(Cell::new(EventSet::empty())),
        }
    }

    /// Clear every pending event (boot only)
    pub fn reset(&self) {
        critical_section::with(|cs| self.pending.borrow(cs).set(EventSet::empty()));
    }

    /// Mark `id` pending. Safe from interrupt or main context.
    pub fn post(&self, id: EventId) {
        critical_section::with(|cs| {
            let cell = self.pending.borrow(cs);
            let mut set = cell.get();
            set.insert(id);
            cell.set(set);
        });
        crate::log_trace!("posted {}", id);
    }

    /// Clear `id`. The handler consuming an event must call this (or let the
    /// dispatcher do it) or the event is dispatched again on every pass.
    pub fn clear(&self, id: EventId) {
        critical_section::with(|cs| {
            let cell = self.pending.borrow(cs);
            let mut set = cell.get();
            set.remove(id);
            cell.set(set);
        });
    }

    /// Snapshot of the pending set
    pub fn pending(&self) -> EventSet {
        critical_section::with(|cs| self.pending.borrow(cs).get())
    }

    pub fn is_pending(&self, id: EventId) -> bool {
        self.pending().contains(id)
    }
}

impl Default for EventRegister {
    fn default() -> Self {
        Self::new()
    }
}
