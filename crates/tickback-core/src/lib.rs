//! Tickback Core - primitives for tick-driven prediction and reconciliation
//!
//! This crate provides the leaf types shared by the rest of the workspace:
//! - `Tick` and the `NetworkClock` collaborator (`FixedClock` for hosts and tests)
//! - `Vec3`, `Input` and `State` with tolerance-based comparison
//! - `Role`, derived from the (local, authority) pair
//! - `Simulation`, the deterministic step replayed during resimulation
//! - `TickHistory`, the tick-keyed storage contract
//! - `InputSource`, polled once per tick for the locally controlled entity

mod error;
mod history;
mod input;
mod role;
mod simulation;
mod state;
pub mod time;

pub use error::{Error, Result};
pub use history::TickHistory;
pub use input::{InputSource, ScriptedInput};
pub use role::Role;
pub use simulation::{Movement, Simulation};
pub use state::{Input, State, Vec3, DEFAULT_TOLERANCE};
pub use time::{CallbackId, FixedClock, NetworkClock, Tick, TickContext};
