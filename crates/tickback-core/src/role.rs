//! Role of an entity instance in the prediction protocol

use serde::{Deserialize, Serialize};
use std::fmt;

/// Role derived from whether this instance is locally controlled and
/// whether it runs on the authoritative side.
///
/// Computed once per tick and dispatched with a single `match`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Role {
    /// Authority simulating an entity controlled by a remote client
    AuthorityRemote,
    /// Non-authoritative instance predicting its own entity
    ClientLocal,
    /// Authority simulating its own entity, no latency to hide
    AuthorityLocal,
    /// Neither local nor authority; displays committed state only
    Spectator,
}

impl Role {
    pub fn from_flags(is_local: bool, is_authority: bool) -> Self {
        match (is_local, is_authority) {
            (false, true) => Role::AuthorityRemote,
            (true, false) => Role::ClientLocal,
            (true, true) => Role::AuthorityLocal,
            (false, false) => Role::Spectator,
        }
    }

    pub fn is_authority(self) -> bool {
        matches!(self, Role::AuthorityRemote | Role::AuthorityLocal)
    }

    /// Whether this role runs the simulation step at all
    pub fn simulates(self) -> bool {
        !matches!(self, Role::Spectator)
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Role::AuthorityRemote => "authority-remote",
            Role::ClientLocal => "client-local",
            Role::AuthorityLocal => "authority-local",
            Role::Spectator => "spectator",
        };
        f.write_str(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_flags() {
        assert_eq!(Role::from_flags(false, true), Role::AuthorityRemote);
        assert_eq!(Role::from_flags(true, false), Role::ClientLocal);
        assert_eq!(Role::from_flags(true, true), Role::AuthorityLocal);
        assert_eq!(Role::from_flags(false, false), Role::Spectator);
    }

    #[test]
    fn test_authority_and_simulation() {
        for local in [false, true] {
            for authority in [false, true] {
                assert_eq!(Role::from_flags(local, authority).is_authority(), authority);
            }
        }
        assert!(!Role::Spectator.simulates());
        assert!(Role::ClientLocal.simulates());
    }
}
