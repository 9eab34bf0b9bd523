//! Tickback Netcode - client-side prediction with server reconciliation
//!
//! This crate keeps one authoritative simulation consistent across a server
//! and its clients while hiding latency from the controlling player:
//!
//! - **History**: per-entity input and state ring buffers keyed by tick
//! - **Resimulation**: deterministic replay of a tick range after a correction
//! - **Tick controller**: role-driven state machine run once per network tick
//! - **Protocol**: `InputCommit` (client to authority) and `StateCommit`
//!   (authority to clients), tolerant of late and reordered delivery
//! - **Interpolation**: render-rate blending between two settled states
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────── Client ────────────────┐        ┌──────────── Authority ───────────┐
//! │ InputSource ─▶ TickController          │ Input  │ TickController                   │
//! │                 │  inputs / states ────┼───────▶│  inputs / states                 │
//! │                 │  markers             │ Commit │  markers ─▶ resimulate           │
//! │                 ▼                      │        │              │                   │
//! │           resimulate ◀─────────────────┼────────┼── StateCommit┘                   │
//! │                 │                      │        └──────────────────────────────────┘
//! │                 ▼                      │
//! │           Interpolator ─▶ render       │
//! └────────────────────────────────────────┘
//! ```
//!
//! # Example
//!
//! ```rust
//! use tickback_core::{Input, State, Tick, TickContext, Vec3};
//! use tickback_netcode::{NetcodeConfig, TickController};
//!
//! let config = NetcodeConfig::default();
//! let mut host = TickController::new(config, true, true, State::default(), 0).unwrap();
//!
//! let mut walk_right = |_: Tick| Input::new(Vec3::new(1.0, 0.0, 0.0));
//! for tick in 1..=10 {
//!     let ctx = TickContext { tick, time: tick as f64 * 0.1, delta_time: 0.1 };
//!     host.tick(&ctx, &mut walk_right);
//!     for message in host.drain_outbox() {
//!         // hand `message.encode()` to the transport
//!         let _ = message;
//!     }
//! }
//!
//! // The display trails the simulation by two ticks
//! assert_eq!(host.endpoints().to_state, host.state_at(8));
//! let _position = host.render(1.05);
//! ```

mod config;
mod controller;
mod error;
mod interpolation;
mod markers;
mod protocol;
mod resimulation;
mod transport;

pub use config::NetcodeConfig;
pub use controller::{ReconcileStats, TickController};
pub use error::{Error, Result};
pub use interpolation::{Endpoints, Interpolator};
pub use markers::DivergenceMarkers;
pub use protocol::{CommitOutcome, InputCommit, NetMessage, Outbox, StateCommit};
pub use resimulation::{resimulate, ResimRange};
pub use transport::{
    recv_message, send_message, Address, DelayedLink, LinkEndpoint, LinkError, Transport,
};

// Re-export the history types for convenience
pub use tickback_core::TickHistory;
pub use tickback_rollback_buffer::HistoryBuffer;
