//! One connection's protocol session and its message dispatch table.

use qtgp_protocol::{Message, MessageType, ProtocolState};
use tokio::sync::Mutex;

use crate::SessionError;

/// Server-side session for a single connection.
///
/// Owns the connection's protocol state behind an async mutex. All
/// stream tasks of the connection dispatch through one session, and
/// each dispatch (precondition check plus every transition it implies)
/// runs while holding the lock, so concurrent messages serialize and
/// the state is never observed mid-exchange.
pub struct ConnectionSession {
    state: Mutex<ProtocolState>,
}

impl ConnectionSession {
    /// Creates a session in the initial `Start` state.
    pub fn new() -> Self {
        Self {
            state: Mutex::new(ProtocolState::Start),
        }
    }

    /// Snapshot of the current protocol state.
    pub async fn state(&self) -> ProtocolState {
        *self.state.lock().await
    }

    /// Moves the session to `Closed` if the current state allows it.
    /// Called on connection teardown; a session that is already closed
    /// (or mid-defect) is left as-is.
    pub async fn close(&self) {
        let mut state = self.state.lock().await;
        if state.can_transition_to(ProtocolState::Closed) {
            // Transition is checked above, so this cannot fail.
            let _ = state.transition_to(ProtocolState::Closed);
        }
    }

    /// Dispatches one inbound message against the session state.
    ///
    /// Returns the reply to send (if the exchange calls for one).
    /// `Err(SessionError::InvalidState)` means the peer sent a message
    /// the current state does not permit — the stream is abandoned but
    /// the connection survives. `Err(SessionError::State(_))` means the
    /// dispatch table itself attempted an undefined transition, which
    /// is unrecoverable for the connection.
    pub async fn handle_message(
        &self,
        msg: &Message,
    ) -> Result<Option<Message>, SessionError> {
        let mut state = self.state.lock().await;

        match msg.kind {
            MessageType::JoinGameRequest => {
                // A join on a fresh session implicitly opens it.
                if *state == ProtocolState::Start {
                    state.transition_to(ProtocolState::WaitingForJoin)?;
                }
                if *state != ProtocolState::WaitingForJoin {
                    tracing::warn!(
                        msg_type = %msg.kind,
                        state = %*state,
                        "join request rejected"
                    );
                    return Err(SessionError::InvalidState {
                        msg_type: msg.kind,
                        state: *state,
                    });
                }
                state.transition_to(ProtocolState::Joining)?;
                let ack = Message::game_setup_ack(
                    msg.protocol_version,
                    0,
                    msg.turn_options,
                );
                state.transition_to(ProtocolState::InGame)?;
                tracing::info!(
                    player_id = %msg.player_id,
                    game_id = %msg.game_id,
                    "player joined game"
                );
                Ok(Some(ack))
            }

            MessageType::StateUpdate => {
                if *state != ProtocolState::InGame {
                    tracing::warn!(
                        msg_type = %msg.kind,
                        state = %*state,
                        "state update rejected"
                    );
                    return Err(SessionError::InvalidState {
                        msg_type: msg.kind,
                        state: *state,
                    });
                }
                tracing::info!(
                    player_id = %msg.player_id,
                    game_state = %msg.game_state,
                    "state update received"
                );
                Ok(Some(Message::state_ack(msg.protocol_version)))
            }

            MessageType::StateResyncRequest => {
                if *state != ProtocolState::InGame {
                    tracing::warn!(
                        msg_type = %msg.kind,
                        state = %*state,
                        "resync request rejected"
                    );
                    return Err(SessionError::InvalidState {
                        msg_type: msg.kind,
                        state: *state,
                    });
                }
                state.transition_to(ProtocolState::Resyncing)?;
                let ack = Message::state_ack(msg.protocol_version);
                state.transition_to(ProtocolState::InGame)?;
                tracing::info!(
                    player_id = %msg.player_id,
                    "state resync served"
                );
                Ok(Some(ack))
            }

            // No dispatch entry: replies never arrive inbound on a
            // server session, and unrecognized tags decode to Unknown.
            // Both are logged and dropped without touching the state.
            MessageType::Unknown
            | MessageType::GameSetupAck
            | MessageType::StateAck => {
                tracing::warn!(
                    msg_type = %msg.kind,
                    "unknown message type, ignoring"
                );
                Ok(None)
            }
        }
    }
}

impl Default for ConnectionSession {
    fn default() -> Self {
        Self::new()
    }
}
