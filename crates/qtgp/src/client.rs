//! Client session driver: sequential request/reply operations over a
//! dialed connection.

use std::net::SocketAddr;
use std::time::Duration;

use qtgp_protocol::{
    read_frame, write_frame, Message, MessageType, ProtocolState,
};
use qtgp_session::SessionError;
use qtgp_transport::{connect, QuicConnection};

use crate::{QtgpError, ALPN};

/// Client-side driver for one game connection.
///
/// The driver is sequential: one operation at a time on `&mut self`,
/// so the protocol state is a plain field. A failed operation can
/// leave the state partially advanced; the connection should then be
/// dropped and redialed rather than resumed.
pub struct GameClient {
    conn: QuicConnection,
    state: ProtocolState,
    reply_timeout: Option<Duration>,
}

impl GameClient {
    /// Dials the server at `addr`, accepting its self-signed demo
    /// certificate.
    pub async fn connect(addr: SocketAddr) -> Result<Self, QtgpError> {
        let conn = connect(addr, "localhost", ALPN).await?;
        tracing::info!(id = %conn.id(), %addr, "connected to game server");
        Ok(Self {
            conn,
            state: ProtocolState::Start,
            reply_timeout: None,
        })
    }

    /// Current local protocol state.
    pub fn state(&self) -> ProtocolState {
        self.state
    }

    /// Bounds reply reads. `None` (the default) waits indefinitely.
    pub fn set_reply_timeout(&mut self, timeout: Option<Duration>) {
        self.reply_timeout = timeout;
    }

    /// Joins a game, negotiating turn options with the server.
    /// Only valid on a fresh connection.
    pub async fn join_game(
        &mut self,
        player_id: impl Into<String>,
        game_id: impl Into<String>,
        turn_options: u8,
    ) -> Result<Message, QtgpError> {
        self.expect_state(MessageType::JoinGameRequest, ProtocolState::Start)?;
        self.transition(ProtocolState::WaitingForJoin)?;

        let request =
            Message::join_game_request(player_id, game_id, turn_options);
        self.transition(ProtocolState::Joining)?;
        let reply = self.exchange(&request).await?;

        // Only a setup ack completes the join; anything else leaves the
        // session stuck in Joining for the caller to abandon.
        self.expect_reply(&reply, MessageType::GameSetupAck)?;
        self.transition(ProtocolState::InGame)?;
        tracing::info!(
            status = reply.status,
            agreed_options = reply.agreed_options,
            "joined game"
        );
        Ok(reply)
    }

    /// Sends a turn's game state and waits for the acknowledgement.
    pub async fn make_move(
        &mut self,
        game_state: impl Into<String>,
    ) -> Result<Message, QtgpError> {
        self.expect_state(MessageType::StateUpdate, ProtocolState::InGame)?;

        let request = Message::state_update(game_state);
        let reply = self.exchange(&request).await?;
        tracing::info!("move acknowledged");
        Ok(reply)
    }

    /// Requests a state resync from the server.
    pub async fn resync(&mut self) -> Result<Message, QtgpError> {
        self.expect_state(
            MessageType::StateResyncRequest,
            ProtocolState::InGame,
        )?;
        self.transition(ProtocolState::Resyncing)?;

        let request = Message::state_resync_request();
        let reply = self.exchange(&request).await?;

        self.expect_reply(&reply, MessageType::StateAck)?;
        self.transition(ProtocolState::InGame)?;
        tracing::info!("resync acknowledged");
        Ok(reply)
    }

    /// Issues an orderly connection close.
    pub fn close(&self) {
        self.conn.close(0, b"client done");
    }

    // --------------------------------------------------------------
    // internals
    // --------------------------------------------------------------

    fn expect_state(
        &self,
        msg_type: MessageType,
        expected: ProtocolState,
    ) -> Result<(), QtgpError> {
        if self.state != expected {
            tracing::warn!(
                %msg_type,
                state = %self.state,
                "operation not allowed in current state"
            );
            return Err(SessionError::InvalidState {
                msg_type,
                state: self.state,
            }
            .into());
        }
        Ok(())
    }

    fn expect_reply(
        &self,
        reply: &Message,
        expected: MessageType,
    ) -> Result<(), QtgpError> {
        if reply.kind != expected {
            tracing::warn!(
                expected = %expected,
                got = %reply.kind,
                "unexpected reply type"
            );
            return Err(QtgpError::UnexpectedReply {
                expected,
                got: reply.kind,
            });
        }
        Ok(())
    }

    fn transition(&mut self, next: ProtocolState) -> Result<(), QtgpError> {
        self.state
            .transition_to(next)
            .map_err(|e| QtgpError::Session(e.into()))
    }

    /// One request/reply exchange on a fresh stream.
    async fn exchange(
        &self,
        request: &Message,
    ) -> Result<Message, QtgpError> {
        let (mut send, mut recv) = self.conn.open_stream().await?;
        write_frame(&mut send, request).await?;
        // finish() only fails if the stream was already reset, in
        // which case the reply read below reports the real error.
        let _ = send.finish();

        let reply = match self.reply_timeout {
            Some(deadline) => {
                tokio::time::timeout(deadline, read_frame(&mut recv))
                    .await
                    .map_err(|_| QtgpError::ReplyTimeout)??
            }
            None => read_frame(&mut recv).await?,
        };
        tracing::debug!(msg_type = %reply.kind, "reply received");
        Ok(reply)
    }
}
