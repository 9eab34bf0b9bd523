//! Transport traits for network communication
//!
//! The netcode layer never talks to a socket itself. Hosts implement
//! [`Transport`] for their network stack and move encoded [`NetMessage`]s
//! through it with [`send_message`] / [`recv_message`].
//!
//! [`DelayedLink`] is an in-memory transport that delivers every message
//! after a configurable number of ticks. A jitter pattern varies the delay
//! per message, which reorders delivery the way a real network can.

use crate::NetMessage;
use std::collections::HashSet;
use std::net::SocketAddr;
use std::sync::{Arc, Mutex, MutexGuard};
use thiserror::Error;
use tickback_core::Tick;

/// Network address type
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Address {
    /// Socket address (IP + port)
    Socket(SocketAddr),
    /// Custom address (in-memory peers, WebSocket, etc.)
    Custom(String),
}

impl From<SocketAddr> for Address {
    fn from(addr: SocketAddr) -> Self {
        Address::Socket(addr)
    }
}

impl From<String> for Address {
    fn from(addr: String) -> Self {
        Address::Custom(addr)
    }
}

impl From<&str> for Address {
    fn from(addr: &str) -> Self {
        Address::Custom(addr.to_string())
    }
}

/// Connectionless transport trait
///
/// Delivery must be reliable; ordering between messages is not required.
pub trait Transport: Send + Sync {
    /// Error type for this transport
    type Error: std::error::Error + Send + Sync + 'static;

    /// Send data to a target address
    fn send(&self, data: &[u8], target: &Address) -> Result<(), Self::Error>;

    /// Receive data (non-blocking)
    ///
    /// Returns `Ok(None)` if no data is available.
    /// Returns `Ok(Some((data, source)))` if data was received.
    fn recv(&self) -> Result<Option<(Vec<u8>, Address)>, Self::Error>;

    /// Get the local address this transport is bound to
    fn local_addr(&self) -> Option<Address>;
}

/// Encode and send one message
pub fn send_message<T: Transport>(
    transport: &T,
    message: &NetMessage,
    target: &Address,
) -> crate::Result<()> {
    let bytes = message.encode()?;
    transport
        .send(&bytes, target)
        .map_err(|e| crate::Error::Transport(e.to_string()))
}

/// Receive and decode one message, if any is available
pub fn recv_message<T: Transport>(transport: &T) -> crate::Result<Option<(NetMessage, Address)>> {
    match transport
        .recv()
        .map_err(|e| crate::Error::Transport(e.to_string()))?
    {
        Some((bytes, source)) => Ok(Some((NetMessage::decode(&bytes)?, source))),
        None => Ok(None),
    }
}

/// Errors raised by [`DelayedLink`] endpoints
#[derive(Debug, Error)]
pub enum LinkError {
    #[error("no endpoint bound to {0:?}")]
    UnknownAddress(Address),

    #[error("link state poisoned")]
    Poisoned,
}

#[derive(Debug)]
struct InFlight {
    deliver_at: Tick,
    seq: u64,
    source: Address,
    target: Address,
    data: Vec<u8>,
}

#[derive(Debug)]
struct LinkState {
    now: Tick,
    latency: Tick,
    jitter: Vec<Tick>,
    next_seq: u64,
    bound: HashSet<Address>,
    in_flight: Vec<InFlight>,
}

/// In-memory network shared by any number of endpoints
#[derive(Debug, Clone)]
pub struct DelayedLink {
    state: Arc<Mutex<LinkState>>,
}

impl DelayedLink {
    /// Create a link where every message takes `latency` ticks
    pub fn new(latency: Tick) -> Self {
        Self::with_jitter(latency, Vec::new())
    }

    /// Create a link whose n-th message takes `latency + jitter[n % len]`
    /// ticks.
    pub fn with_jitter(latency: Tick, jitter: Vec<Tick>) -> Self {
        Self {
            state: Arc::new(Mutex::new(LinkState {
                now: 0,
                latency: latency.max(0),
                jitter: jitter.into_iter().map(|j| j.max(0)).collect(),
                next_seq: 0,
                bound: HashSet::new(),
                in_flight: Vec::new(),
            })),
        }
    }

    fn lock(&self) -> Result<MutexGuard<'_, LinkState>, LinkError> {
        self.state.lock().map_err(|_| LinkError::Poisoned)
    }

    /// Bind a new endpoint at `address`
    pub fn endpoint(&self, address: impl Into<Address>) -> Result<LinkEndpoint, LinkError> {
        let address = address.into();
        self.lock()?.bound.insert(address.clone());
        Ok(LinkEndpoint {
            link: self.clone(),
            address,
        })
    }

    /// Move link time forward; messages due at or before `now` become
    /// receivable.
    pub fn set_now(&self, now: Tick) -> Result<(), LinkError> {
        self.lock()?.now = now;
        Ok(())
    }

    /// Messages sent but not yet received
    pub fn in_flight(&self) -> Result<usize, LinkError> {
        Ok(self.lock()?.in_flight.len())
    }
}

/// One addressable end of a [`DelayedLink`]
#[derive(Debug, Clone)]
pub struct LinkEndpoint {
    link: DelayedLink,
    address: Address,
}

impl Transport for LinkEndpoint {
    type Error = LinkError;

    fn send(&self, data: &[u8], target: &Address) -> Result<(), LinkError> {
        let mut state = self.link.lock()?;
        if !state.bound.contains(target) {
            return Err(LinkError::UnknownAddress(target.clone()));
        }
        let seq = state.next_seq;
        state.next_seq += 1;
        let extra = if state.jitter.is_empty() {
            0
        } else {
            state.jitter[(seq % state.jitter.len() as u64) as usize]
        };
        let deliver_at = state.now + state.latency + extra;
        state.in_flight.push(InFlight {
            deliver_at,
            seq,
            source: self.address.clone(),
            target: target.clone(),
            data: data.to_vec(),
        });
        Ok(())
    }

    fn recv(&self) -> Result<Option<(Vec<u8>, Address)>, LinkError> {
        let mut state = self.link.lock()?;
        let now = state.now;
        let next = state
            .in_flight
            .iter()
            .enumerate()
            .filter(|(_, m)| m.target == self.address && m.deliver_at <= now)
            .min_by_key(|(_, m)| (m.deliver_at, m.seq))
            .map(|(i, _)| i);
        Ok(next.map(|i| {
            let message = state.in_flight.swap_remove(i);
            (message.data, message.source)
        }))
    }

    fn local_addr(&self) -> Option<Address> {
        Some(self.address.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::StateCommit;
    use tickback_core::State;

    #[test]
    fn test_address_from() {
        let socket: Address = "127.0.0.1:8080".parse::<SocketAddr>().unwrap().into();
        assert!(matches!(socket, Address::Socket(_)));

        let custom: Address = "mem://server".into();
        assert!(matches!(custom, Address::Custom(_)));
    }

    #[test]
    fn test_delivery_waits_for_latency() {
        let link = DelayedLink::new(2);
        let a = link.endpoint("a").unwrap();
        let b = link.endpoint("b").unwrap();

        a.send(b"hello", &"b".into()).unwrap();
        assert!(b.recv().unwrap().is_none());

        link.set_now(1).unwrap();
        assert!(b.recv().unwrap().is_none());

        link.set_now(2).unwrap();
        let (data, source) = b.recv().unwrap().unwrap();
        assert_eq!(data, b"hello");
        assert_eq!(source, Address::from("a"));
        assert_eq!(link.in_flight().unwrap(), 0);
    }

    #[test]
    fn test_jitter_reorders() {
        let link = DelayedLink::with_jitter(1, vec![2, 0]);
        let a = link.endpoint("a").unwrap();
        let b = link.endpoint("b").unwrap();

        a.send(b"first", &"b".into()).unwrap();
        a.send(b"second", &"b".into()).unwrap();

        link.set_now(1).unwrap();
        assert_eq!(b.recv().unwrap().unwrap().0, b"second");
        assert!(b.recv().unwrap().is_none());

        link.set_now(3).unwrap();
        assert_eq!(b.recv().unwrap().unwrap().0, b"first");
    }

    #[test]
    fn test_unknown_target() {
        let link = DelayedLink::new(0);
        let a = link.endpoint("a").unwrap();
        assert!(matches!(
            a.send(b"x", &"nobody".into()),
            Err(LinkError::UnknownAddress(_))
        ));
    }

    #[test]
    fn test_message_helpers() {
        let link = DelayedLink::new(0);
        let server = link.endpoint("server").unwrap();
        let client = link.endpoint("client").unwrap();

        let message = NetMessage::from(StateCommit {
            state: State::at(1.0, 2.0, 3.0),
            tick: 9,
        });
        send_message(&server, &message, &"client".into()).unwrap();

        let (received, source) = recv_message(&client).unwrap().unwrap();
        assert_eq!(received, message);
        assert_eq!(source, Address::from("server"));
        assert!(recv_message(&client).unwrap().is_none());
    }
}
