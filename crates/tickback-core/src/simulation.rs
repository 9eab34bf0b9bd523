//! Deterministic simulation step
//!
//! Resimulation replays this step over recorded inputs, so implementations
//! must be referentially transparent: identical arguments always produce a
//! bit-identical result.

use crate::{Input, State};
use serde::{Deserialize, Serialize};

/// A pure `(input, previous, delta_time) -> next` step
pub trait Simulation {
    fn simulate(&self, input: &Input, previous: &State, delta_time: f32) -> State;
}

/// Straight-line movement: `position + movement * speed * delta_time`
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Movement {
    /// Distance units per second for a unit movement vector
    pub speed: f32,
}

impl Movement {
    pub fn new(speed: f32) -> Self {
        Self { speed }
    }
}

impl Default for Movement {
    fn default() -> Self {
        Self::new(2.0)
    }
}

impl Simulation for Movement {
    fn simulate(&self, input: &Input, previous: &State, delta_time: f32) -> State {
        State::new(previous.position + input.movement * (self.speed * delta_time))
    }
}

impl<F> Simulation for F
where
    F: Fn(&Input, &State, f32) -> State,
{
    fn simulate(&self, input: &Input, previous: &State, delta_time: f32) -> State {
        self(input, previous, delta_time)
    }
}
