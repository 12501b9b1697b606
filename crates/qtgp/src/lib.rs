//! QTGP: a minimal two-party turn-based game protocol over QUIC.
//!
//! Layer map:
//!
//! ```text
//!   demos/game-demo          interactive driver
//!        │
//!   qtgp (this crate)        GameServer / GameClient / config
//!        │
//!   qtgp-session             per-connection dispatch (server side)
//!        │
//!   qtgp-protocol            messages, framing, state machine
//!        │
//!   qtgp-transport           quinn endpoints + demo TLS
//! ```
//!
//! Every request/reply exchange runs on its own bidirectional stream:
//! open, send one frame, read one frame, finish. Connection state lives
//! in the protocol state machine, never in the streams.

mod client;
mod config;
mod error;
mod server;

pub use client::GameClient;
pub use config::{load_config, ClientConfig};
pub use error::QtgpError;
pub use server::GameServer;

pub use qtgp_protocol::{Message, MessageType, ProtocolState, PROTOCOL_VERSION};

/// Application protocol identifier negotiated via ALPN.
pub const ALPN: &str = "qtgp-demo";

/// Well-known port the demo server listens on.
pub const DEFAULT_PORT: u16 = 4433;
