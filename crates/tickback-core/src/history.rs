//! Tick-keyed history contract
//!
//! This trait is used by:
//! - `tickback-rollback-buffer` for the bounded ring buffer implementation
//! - `tickback-netcode` for resimulation over the input and state streams
//!
//! Reads are total: a tick with no stored value yields the default value
//! rather than an error, which models "no data for that tick yet".

use crate::Tick;

/// Storage mapping tick numbers to values of `T`.
pub trait TickHistory<T> {
    /// Store `value` for `tick`, replacing whatever the implementation
    /// evicts to make room.
    fn set(&mut self, value: T, tick: Tick);

    /// The value stored for exactly `tick`, or the default value.
    fn get(&self, tick: Tick) -> T;

    /// Whether a value is stored for exactly `tick`.
    fn contains(&self, tick: Tick) -> bool;

    /// Fallback returned by [`get`](Self::get) for missing ticks.
    fn default_value(&self) -> &T;

    /// Replace the fallback value.
    fn set_default_value(&mut self, value: T);

    /// Number of distinct ticks the history can hold at once.
    ///
    /// Returns `None` for unbounded histories.
    fn capacity(&self) -> Option<usize>;
}
