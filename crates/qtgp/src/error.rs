//! Top-level error type tying the layer errors together.

use qtgp_protocol::{MessageType, ProtocolError};
use qtgp_session::SessionError;
use qtgp_transport::TransportError;

/// Errors surfaced by the server and client entry points.
#[derive(Debug, thiserror::Error)]
pub enum QtgpError {
    /// Framing or codec failure on a stream.
    #[error(transparent)]
    Protocol(#[from] ProtocolError),

    /// QUIC endpoint or connection failure.
    #[error(transparent)]
    Transport(#[from] TransportError),

    /// Message dispatch rejected by the protocol state machine.
    #[error(transparent)]
    Session(#[from] SessionError),

    /// Loading or parsing the client configuration failed.
    #[error("config error: {0}")]
    Config(String),

    /// The peer answered with a different message type than the
    /// exchange calls for.
    #[error("unexpected reply: expected {expected}, got {got}")]
    UnexpectedReply {
        expected: MessageType,
        got: MessageType,
    },

    /// The peer did not reply within the configured deadline.
    #[error("timed out waiting for reply")]
    ReplyTimeout,
}
