//! QUIC transport layer for QTGP.
//!
//! Wraps `quinn` behind the narrow capability surface the rest of the
//! stack consumes: listen, dial, accept/open bidirectional streams,
//! close. TLS material is generated on the fly (self-signed, bound to
//! the QTGP application protocol via ALPN) — suitable for the demo
//! context only, where clients are configured to accept the untrusted
//! certificate.
//!
//! The layers above never see quinn types except the raw stream halves,
//! which implement `AsyncRead`/`AsyncWrite` and feed straight into the
//! protocol crate's framing.

mod error;
mod quic;
mod tls;

pub use error::TransportError;
pub use quic::{connect, QuicConnection, QuicListener};

// Stream halves handed to the framing layer; re-exported so callers
// need no quinn dependency of their own.
pub use quinn::{RecvStream, SendStream};

use std::fmt;

/// Opaque, process-unique identifier for an accepted or dialed
/// connection. Used only for log correlation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ConnectionId(u64);

impl ConnectionId {
    /// Creates a new `ConnectionId` from a raw `u64`.
    pub fn new(id: u64) -> Self {
        Self(id)
    }

    /// Returns the underlying `u64` value.
    pub fn into_inner(self) -> u64 {
        self.0
    }
}

impl fmt::Display for ConnectionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "conn-{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_connection_id_new_and_into_inner() {
        let id = ConnectionId::new(42);
        assert_eq!(id.into_inner(), 42);
    }

    #[test]
    fn test_connection_id_display() {
        let id = ConnectionId::new(7);
        assert_eq!(id.to_string(), "conn-7");
    }

    #[test]
    fn test_connection_id_hash_works_as_map_key() {
        use std::collections::HashMap;
        let mut map = HashMap::new();
        map.insert(ConnectionId::new(1), "alice");
        map.insert(ConnectionId::new(2), "bob");
        assert_eq!(map[&ConnectionId::new(1)], "alice");
    }
}
