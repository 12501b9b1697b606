//! Game server: accept loop, per-connection sessions, per-stream
//! dispatch.

use std::net::SocketAddr;
use std::sync::Arc;

use qtgp_protocol::{read_frame, write_frame, ProtocolError};
use qtgp_session::{ConnectionSession, SessionError};
use qtgp_transport::{QuicConnection, QuicListener, RecvStream, SendStream};

use crate::{QtgpError, ALPN};

/// QUIC game server.
///
/// Each accepted connection gets its own [`ConnectionSession`] and its
/// own task tree; a faulty connection never takes the accept loop or
/// sibling connections down with it.
pub struct GameServer {
    listener: QuicListener,
}

impl GameServer {
    /// Binds the server endpoint on `addr`.
    pub fn bind(addr: SocketAddr) -> Result<Self, QtgpError> {
        let listener = QuicListener::bind(addr, ALPN)?;
        Ok(Self { listener })
    }

    /// The bound address (useful when binding port 0 in tests).
    pub fn local_addr(&self) -> Result<SocketAddr, QtgpError> {
        Ok(self.listener.local_addr()?)
    }

    /// Runs the accept loop until the endpoint is closed.
    ///
    /// Handshake failures are logged and the loop keeps accepting.
    pub async fn run(&self) -> Result<(), QtgpError> {
        tracing::info!("game server running");
        while let Some(accepted) = self.listener.accept().await {
            match accepted {
                Ok(conn) => {
                    tokio::spawn(handle_connection(conn));
                }
                Err(e) => {
                    tracing::warn!(error = %e, "incoming connection failed");
                }
            }
        }
        tracing::info!("game server stopped");
        Ok(())
    }

    /// Closes the endpoint; `run()` returns once in-flight accepts
    /// drain.
    pub fn close(&self) {
        self.listener.close();
    }
}

/// Drives one connection: accepts streams until the peer goes away,
/// dispatching each through the shared session.
async fn handle_connection(conn: QuicConnection) {
    let id = conn.id();
    let session = Arc::new(ConnectionSession::new());
    tracing::info!(%id, remote = %conn.remote_address(), "connection up");

    loop {
        match conn.accept_stream().await {
            Ok(Some((send, recv))) => {
                let session = Arc::clone(&session);
                let conn = conn.clone();
                tokio::spawn(async move {
                    handle_stream(conn, session, send, recv).await;
                });
            }
            Ok(None) => break,
            Err(e) => {
                tracing::warn!(%id, error = %e, "connection lost");
                break;
            }
        }
    }

    session.close().await;
    tracing::info!(%id, "connection down");
}

/// One request/reply exchange on a single stream.
async fn handle_stream(
    conn: QuicConnection,
    session: Arc<ConnectionSession>,
    mut send: SendStream,
    mut recv: RecvStream,
) {
    let id = conn.id();

    let msg = match read_frame(&mut recv).await {
        Ok(msg) => msg,
        // Peer opened a stream and closed it without a full frame.
        Err(ProtocolError::IncompleteFrame) => return,
        Err(e) => {
            tracing::warn!(%id, error = %e, "bad frame, abandoning stream");
            return;
        }
    };
    tracing::debug!(%id, msg_type = %msg.kind, "message received");

    match session.handle_message(&msg).await {
        Ok(Some(reply)) => {
            if let Err(e) = write_frame(&mut send, &reply).await {
                tracing::warn!(%id, error = %e, "reply write failed");
                return;
            }
            if let Err(e) = send.finish() {
                tracing::warn!(%id, error = %e, "stream finish failed");
            }
        }
        // Diagnostics were already logged by dispatch.
        Ok(None) | Err(SessionError::InvalidState { .. }) => {}
        Err(SessionError::State(e)) => {
            tracing::error!(%id, error = %e, "protocol defect, closing connection");
            conn.close(1, b"protocol defect");
        }
    }
}
