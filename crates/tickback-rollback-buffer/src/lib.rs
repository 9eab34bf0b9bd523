//! Tickback Rollback Buffer - fixed-capacity ring buffer keyed by tick
//!
//! This crate provides the bounded history used for both the input stream and
//! the state stream of a predicted entity.
//!
//! # Features
//!
//! - **Bounded memory**: `capacity` slots, no growth over the run
//! - **O(1) access**: a tick lives in slot `tick mod capacity`
//! - **Tagged slots**: each slot remembers its tick, so a stale slot reads as
//!   the default value instead of returning another tick's data
//! - **Total reads**: missing ticks yield the configured default, never an error
//!
//! # Example
//!
//! ```rust
//! use tickback_core::{State, TickHistory};
//! use tickback_rollback_buffer::HistoryBuffer;
//!
//! // 64 ticks of history, anchored at tick 0, seeded with the spawn state
//! let spawn = State::at(5.0, 0.0, 0.0);
//! let mut states = HistoryBuffer::new(64, spawn, 0);
//!
//! states.set(State::at(6.0, 0.0, 0.0), 1);
//! assert_eq!(states.get(1), State::at(6.0, 0.0, 0.0));
//!
//! // Nothing was written for tick 1000, so the default comes back
//! assert_eq!(states.get(1000), spawn);
//!
//! // Tick 65 shares slot 1 and evicts it
//! states.set(State::at(7.0, 0.0, 0.0), 65);
//! assert_eq!(states.get(1), spawn);
//! ```

use tickback_core::{Tick, TickHistory};

/// Default history length in ticks
pub const DEFAULT_CAPACITY: usize = 64;

/// A ring buffer of `(tick, value)` slots
///
/// Writing a tick unconditionally overwrites whatever tick previously held
/// its slot. Callers that need a value kept must not write any tick within
/// `capacity` of it that maps to the same slot.
#[derive(Debug, Clone)]
pub struct HistoryBuffer<T> {
    /// Ring buffer storage: (tick, value); None means never written
    slots: Vec<Option<(Tick, T)>>,
    /// Returned for ticks the buffer does not hold
    default: T,
    /// Tick at which this history was established
    anchor: Tick,
}

impl<T: Clone> HistoryBuffer<T> {
    /// Create a new buffer
    ///
    /// # Arguments
    ///
    /// * `capacity` - Number of distinct ticks held at once; must exceed the
    ///   worst expected round trip in ticks
    /// * `default` - Value returned for ticks without data
    /// * `anchor` - Tick at which the owning entity came into existence
    ///
    /// # Panics
    ///
    /// Panics if `capacity` is zero.
    pub fn new(capacity: usize, default: T, anchor: Tick) -> Self {
        assert!(capacity > 0, "Capacity must be greater than 0");
        Self {
            slots: (0..capacity).map(|_| None).collect(),
            default,
            anchor,
        }
    }

    /// Create a buffer whose anchor tick already holds `value`, with `value`
    /// also serving as the default.
    pub fn seeded(capacity: usize, value: T, anchor: Tick) -> Self {
        let mut buffer = Self::new(capacity, value.clone(), anchor);
        buffer.set(value, anchor);
        buffer
    }

    fn slot_index(&self, tick: Tick) -> usize {
        // rem_euclid keeps negative ticks (tick - 1 at tick zero) in range
        tick.rem_euclid(self.slots.len() as Tick) as usize
    }

    /// Borrow the value stored for exactly `tick`
    pub fn get_ref(&self, tick: Tick) -> Option<&T> {
        self.slots[self.slot_index(tick)]
            .as_ref()
            .filter(|(t, _)| *t == tick)
            .map(|(_, v)| v)
    }

    /// Oldest tick that can still be held once `current` has been written
    pub fn window_start(&self, current: Tick) -> Tick {
        current - self.slots.len() as Tick + 1
    }

    /// Tick the buffer was anchored at
    pub fn anchor(&self) -> Tick {
        self.anchor
    }

    /// Clear every slot and re-anchor with a new default
    pub fn reset(&mut self, default: T, anchor: Tick) {
        for slot in &mut self.slots {
            *slot = None;
        }
        self.default = default;
        self.anchor = anchor;
    }

    /// Stored entries, oldest tick first
    pub fn iter(&self) -> impl Iterator<Item = (Tick, &T)> {
        let mut entries: Vec<_> = self
            .slots
            .iter()
            .filter_map(|s| s.as_ref().map(|(t, v)| (*t, v)))
            .collect();
        entries.sort_by_key(|(t, _)| *t);
        entries.into_iter()
    }

    /// Number of occupied slots
    pub fn len(&self) -> usize {
        self.slots.iter().filter(|s| s.is_some()).count()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.iter().all(|s| s.is_none())
    }

    /// Get statistics about the buffer
    pub fn stats(&self) -> BufferStats {
        let mut count = 0;
        let mut oldest = Tick::MAX;
        let mut newest = Tick::MIN;
        for (t, _) in self.slots.iter().flatten() {
            count += 1;
            oldest = oldest.min(*t);
            newest = newest.max(*t);
        }
        BufferStats {
            capacity: self.slots.len(),
            count,
            oldest_tick: (count > 0).then_some(oldest),
            newest_tick: (count > 0).then_some(newest),
        }
    }
}

impl<T: Clone> TickHistory<T> for HistoryBuffer<T> {
    fn set(&mut self, value: T, tick: Tick) {
        let index = self.slot_index(tick);
        self.slots[index] = Some((tick, value));
    }

    fn get(&self, tick: Tick) -> T {
        self.get_ref(tick).unwrap_or(&self.default).clone()
    }

    fn contains(&self, tick: Tick) -> bool {
        self.get_ref(tick).is_some()
    }

    fn default_value(&self) -> &T {
        &self.default
    }

    fn set_default_value(&mut self, value: T) {
        self.default = value;
    }

    fn capacity(&self) -> Option<usize> {
        Some(self.slots.len())
    }
}

impl<T: Clone + Default> Default for HistoryBuffer<T> {
    fn default() -> Self {
        Self::new(DEFAULT_CAPACITY, T::default(), 0)
    }
}

/// Statistics about a history buffer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BufferStats {
    /// Number of slots
    pub capacity: usize,
    /// Occupied slots
    pub count: usize,
    /// Oldest held tick
    pub oldest_tick: Option<Tick>,
    /// Newest held tick
    pub newest_tick: Option<Tick>,
}

impl BufferStats {
    /// Ticks spanned by the held entries (newest - oldest)
    pub fn tick_span(&self) -> Tick {
        match (self.oldest_tick, self.newest_tick) {
            (Some(oldest), Some(newest)) => newest - oldest,
            _ => 0,
        }
    }

    /// Get the fill percentage (0.0 to 1.0)
    pub fn fill_ratio(&self) -> f32 {
        self.count as f32 / self.capacity as f32
    }
}
