//! Error types for the protocol layer.
//!
//! Two separate enums because the failure modes live at different layers:
//! [`ProtocolError`] covers framing and payload codec failures (fatal to
//! one exchange, never to the connection), while [`StateError`] covers
//! DFA violations (a rejected transition, or an attempt to leave a state
//! that has no outgoing transitions at all).

use crate::state::ProtocolState;

/// Errors that can occur while framing or encoding/decoding a message.
#[derive(Debug, thiserror::Error)]
pub enum ProtocolError {
    /// The stream ended before a complete frame (header or body) was
    /// read. Treated as an orderly peer close by callers.
    #[error("stream ended before a complete frame was read")]
    IncompleteFrame,

    /// A full frame was read but its payload is not a well-formed
    /// message. The offending stream is abandoned.
    #[error("malformed payload: {0}")]
    MalformedPayload(#[source] serde_json::Error),

    /// Serializing an outgoing message failed.
    #[error("encode failed: {0}")]
    Encode(#[source] serde_json::Error),

    /// The frame header declares a length above [`MAX_FRAME_LEN`]
    /// (guards allocations against corrupt or hostile peers).
    ///
    /// [`MAX_FRAME_LEN`]: crate::MAX_FRAME_LEN
    #[error("frame of {len} bytes exceeds limit of {max}")]
    FrameTooLarge { len: usize, max: usize },

    /// An I/O error other than end-of-stream while reading or writing
    /// frame bytes.
    #[error("frame io failed: {0}")]
    Io(#[source] std::io::Error),
}

/// Errors produced by the protocol state machine.
///
/// A failed transition never partially applies: the current state is
/// left exactly as it was.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum StateError {
    /// The requested next state is not in the allowed set for the
    /// current state.
    #[error("invalid transition: {from} -> {to}")]
    InvalidTransition {
        from: ProtocolState,
        to: ProtocolState,
    },

    /// The current state has no outgoing transitions defined at all
    /// (`Closed` is terminal). Hitting this is a programming-invariant
    /// violation, not a recoverable protocol condition.
    #[error("no transitions defined for state {from}")]
    UndefinedState { from: ProtocolState },
}
