//! Wire protocol for QTGP (QUIC turn-based game protocol).
//!
//! This crate defines the "language" that the game client and server speak:
//!
//! - **Schema** ([`Message`], [`MessageType`]) — the single structured
//!   message that travels on the wire, with exact JSON field names.
//! - **Framing** ([`read_frame`], [`write_frame`]) — the length-prefixed
//!   byte layout carrying one encoded message per frame.
//! - **State machine** ([`ProtocolState`]) — which protocol phases exist
//!   and which transitions between them are legal.
//! - **Errors** ([`ProtocolError`], [`StateError`]) — what can go wrong
//!   at each of those layers.
//!
//! # Architecture
//!
//! The protocol layer sits between transport (raw QUIC streams) and
//! session (per-connection dispatch). It knows nothing about connections
//! or streams beyond `AsyncRead`/`AsyncWrite` — framing works identically
//! over a quinn stream and an in-memory test pipe.
//!
//! ```text
//! Transport (streams) → Protocol (Message + DFA) → Session (dispatch)
//! ```

mod error;
mod frame;
mod message;
mod state;

pub use error::{ProtocolError, StateError};
pub use frame::{read_frame, write_frame, MAX_FRAME_LEN};
pub use message::{Message, MessageType, PROTOCOL_VERSION};
pub use state::ProtocolState;
