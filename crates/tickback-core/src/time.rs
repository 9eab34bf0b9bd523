//! Time system for tick-based simulation
//!
//! Provides discrete time management for networked prediction:
//! - `Tick` - Logical time unit, signed so `tick - 1` at tick zero is well defined
//! - `TickContext` - What a per-tick callback sees
//! - `NetworkClock` - The clock collaborator consumed by the netcode layer
//! - `FixedClock` - A manually advanced fixed-rate clock with tick callbacks

use serde::{Deserialize, Serialize};
use std::fmt;

/// A discrete tick identifier (logical time unit)
pub type Tick = i64;

/// Snapshot of the clock handed to every per-tick callback
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TickContext {
    /// Current tick number
    pub tick: Tick,
    /// Current clock time in seconds
    pub time: f64,
    /// Fixed time step in seconds
    pub delta_time: f64,
}

/// The fixed-rate network clock collaborator.
///
/// The netcode layer only needs "give me current tick/time" from the clock;
/// per-tick notification is exposed by concrete clocks such as [`FixedClock`].
pub trait NetworkClock {
    /// Current tick number
    fn current_tick(&self) -> Tick;

    /// Current time in seconds
    fn current_time(&self) -> f64;

    /// Fixed delta time in seconds
    fn delta_time(&self) -> f64;

    /// Bundle the three readings into a [`TickContext`]
    fn context(&self) -> TickContext {
        TickContext {
            tick: self.current_tick(),
            time: self.current_time(),
            delta_time: self.delta_time(),
        }
    }
}

/// Handle returned by [`FixedClock::register`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CallbackId(u64);

impl fmt::Display for CallbackId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "callback#{}", self.0)
    }
}

type TickCallback = Box<dyn FnMut(&TickContext)>;

/// Fixed-rate clock advanced explicitly by the host.
///
/// Time is derived from the tick count (`start_time + tick * delta_time`) so
/// two clocks created with the same parameters always agree.
pub struct FixedClock {
    tick: Tick,
    start_time: f64,
    delta_time: f64,
    callbacks: Vec<(CallbackId, TickCallback)>,
    next_callback: u64,
}

impl FixedClock {
    /// Create a clock at tick zero with the given fixed step.
    ///
    /// Returns `Err` if the step is not positive and finite.
    pub fn new(delta_time: f64) -> crate::Result<Self> {
        Self::starting_at(0, 0.0, delta_time)
    }

    /// Create a clock anchored at an arbitrary tick and time
    pub fn starting_at(tick: Tick, start_time: f64, delta_time: f64) -> crate::Result<Self> {
        if !delta_time.is_finite() || delta_time <= 0.0 {
            return Err(crate::Error::InvalidDeltaTime(delta_time));
        }
        Ok(Self {
            tick,
            start_time: start_time - tick as f64 * delta_time,
            delta_time,
            callbacks: Vec::new(),
            next_callback: 0,
        })
    }

    /// Register a callback invoked once per tick, after the tick advances
    pub fn register<F>(&mut self, callback: F) -> CallbackId
    where
        F: FnMut(&TickContext) + 'static,
    {
        let id = CallbackId(self.next_callback);
        self.next_callback += 1;
        self.callbacks.push((id, Box::new(callback)));
        id
    }

    /// Remove a previously registered callback
    pub fn unregister(&mut self, id: CallbackId) -> crate::Result<()> {
        let before = self.callbacks.len();
        self.callbacks.retain(|(cid, _)| *cid != id);
        if self.callbacks.len() == before {
            return Err(crate::Error::UnknownCallback(id.0));
        }
        Ok(())
    }

    /// Advance to the next tick and notify every registered callback in
    /// registration order.
    pub fn advance(&mut self) -> TickContext {
        self.tick += 1;
        let ctx = self.context();
        for (_, callback) in self.callbacks.iter_mut() {
            callback(&ctx);
        }
        ctx
    }

    /// Number of registered callbacks
    pub fn callback_count(&self) -> usize {
        self.callbacks.len()
    }
}

impl NetworkClock for FixedClock {
    fn current_tick(&self) -> Tick {
        self.tick
    }

    fn current_time(&self) -> f64 {
        self.start_time + self.tick as f64 * self.delta_time
    }

    fn delta_time(&self) -> f64 {
        self.delta_time
    }
}

impl fmt::Debug for FixedClock {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FixedClock")
            .field("tick", &self.tick)
            .field("delta_time", &self.delta_time)
            .field("callbacks", &self.callbacks.len())
            .finish()
    }
}
