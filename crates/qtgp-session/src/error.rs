//! Error types for session-level message dispatch.

use qtgp_protocol::{MessageType, ProtocolState, StateError};

/// Errors produced while dispatching a message against a session's
/// protocol state.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum SessionError {
    /// The message type is known but not permitted in the session's
    /// current state.
    #[error("{msg_type} not allowed in state {state}")]
    InvalidState {
        msg_type: MessageType,
        state: ProtocolState,
    },

    /// A state transition required by dispatch was rejected.
    #[error(transparent)]
    State(#[from] StateError),
}
