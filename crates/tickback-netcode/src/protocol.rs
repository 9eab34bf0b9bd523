//! Reconciliation protocol messages
//!
//! Two tick-stamped messages cross the wire:
//! - [`InputCommit`]: client to authority, at most one per tick
//! - [`StateCommit`]: authority to every client, one per resimulated tick
//!
//! Delivery is assumed reliable but unordered; the divergence markers on the
//! receiving side absorb late and reordered arrivals.

use serde::{Deserialize, Serialize};
use std::collections::VecDeque;
use tickback_core::{Input, State, Tick};

/// Input recorded by the controlling client for one tick
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct InputCommit {
    pub input: Input,
    pub tick: Tick,
}

/// Authoritative state for one tick
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct StateCommit {
    pub state: State,
    pub tick: Tick,
}

/// Any protocol message
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum NetMessage {
    InputCommit(InputCommit),
    StateCommit(StateCommit),
}

impl NetMessage {
    /// Tick the message is stamped with
    pub fn tick(&self) -> Tick {
        match self {
            NetMessage::InputCommit(c) => c.tick,
            NetMessage::StateCommit(c) => c.tick,
        }
    }

    /// Serialize for the wire
    pub fn encode(&self) -> crate::Result<Vec<u8>> {
        bincode::serialize(self).map_err(|e| crate::Error::Serialization(e.to_string()))
    }

    /// Deserialize from the wire
    pub fn decode(bytes: &[u8]) -> crate::Result<Self> {
        bincode::deserialize(bytes).map_err(|e| crate::Error::Serialization(e.to_string()))
    }
}

impl From<InputCommit> for NetMessage {
    fn from(commit: InputCommit) -> Self {
        NetMessage::InputCommit(commit)
    }
}

impl From<StateCommit> for NetMessage {
    fn from(commit: StateCommit) -> Self {
        NetMessage::StateCommit(commit)
    }
}

/// What a message handler did with a commit
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommitOutcome {
    /// History was updated and resimulation scheduled
    Applied,
    /// The commit matched local history; nothing changed
    Unchanged,
    /// The commit is not meant for this role
    Ignored,
}

/// Outbound messages produced during a tick, drained by the host
#[derive(Debug, Default)]
pub struct Outbox {
    messages: VecDeque<NetMessage>,
}

impl Outbox {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, message: impl Into<NetMessage>) {
        self.messages.push_back(message.into());
    }

    /// Take every queued message, oldest first
    pub fn drain(&mut self) -> impl Iterator<Item = NetMessage> + '_ {
        self.messages.drain(..)
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }
}
