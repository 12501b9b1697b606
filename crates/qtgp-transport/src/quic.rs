//! Quinn-backed listener, dialer, and connection wrapper.

use std::net::SocketAddr;
use std::sync::atomic::{AtomicU64, Ordering};

use quinn::{Endpoint, RecvStream, SendStream};

use crate::{tls, ConnectionId, TransportError};

/// Counter for generating unique connection IDs.
static NEXT_CONNECTION_ID: AtomicU64 = AtomicU64::new(1);

fn next_connection_id() -> ConnectionId {
    ConnectionId::new(NEXT_CONNECTION_ID.fetch_add(1, Ordering::Relaxed))
}

/// A bound QUIC server endpoint accepting incoming connections.
pub struct QuicListener {
    endpoint: Endpoint,
}

impl QuicListener {
    /// Binds a server endpoint on `addr` with freshly generated
    /// self-signed TLS material, negotiating `alpn`.
    pub fn bind(
        addr: SocketAddr,
        alpn: &str,
    ) -> Result<Self, TransportError> {
        tls::install_crypto_provider();
        let server_config = tls::server_config(alpn)?;
        let endpoint = Endpoint::server(server_config, addr)
            .map_err(TransportError::Bind)?;
        tracing::info!(addr = %endpoint.local_addr().map_err(TransportError::Bind)?, %alpn, "QUIC listener bound");
        Ok(Self { endpoint })
    }

    /// The address the endpoint actually bound to (relevant when the
    /// requested port was 0).
    pub fn local_addr(&self) -> Result<SocketAddr, TransportError> {
        self.endpoint.local_addr().map_err(TransportError::Bind)
    }

    /// Waits for the next incoming connection and completes its
    /// handshake.
    ///
    /// Returns `None` once the endpoint has been closed; handshake
    /// failures surface as `Some(Err(_))` and leave the listener
    /// accepting.
    pub async fn accept(
        &self,
    ) -> Option<Result<QuicConnection, TransportError>> {
        let incoming = self.endpoint.accept().await?;
        match incoming.await {
            Ok(conn) => {
                let id = next_connection_id();
                tracing::debug!(%id, remote = %conn.remote_address(), "accepted connection");
                Some(Ok(QuicConnection { conn, id }))
            }
            Err(e) => Some(Err(TransportError::Connection(e))),
        }
    }

    /// Closes the endpoint, refusing new connections and signalling
    /// existing ones to shut down.
    pub fn close(&self) {
        self.endpoint.close(0u32.into(), b"shutdown");
    }
}

/// Dials `addr`, negotiating `alpn` and accepting the server's
/// untrusted self-signed certificate (demo trust model).
pub async fn connect(
    addr: SocketAddr,
    server_name: &str,
    alpn: &str,
) -> Result<QuicConnection, TransportError> {
    tls::install_crypto_provider();

    let bind: SocketAddr = if addr.is_ipv6() {
        "[::]:0".parse().expect("literal addr")
    } else {
        "0.0.0.0:0".parse().expect("literal addr")
    };
    let mut endpoint = Endpoint::client(bind).map_err(TransportError::Dial)?;
    endpoint.set_default_client_config(tls::client_config(alpn)?);

    let conn = endpoint.connect(addr, server_name)?.await?;
    let id = next_connection_id();
    tracing::debug!(%id, remote = %conn.remote_address(), "connected");
    Ok(QuicConnection { conn, id })
}

/// One established QUIC connection.
///
/// Cloning is cheap and refers to the same underlying connection, so a
/// stream-handling task can hold a handle for teardown decisions.
#[derive(Clone)]
pub struct QuicConnection {
    conn: quinn::Connection,
    id: ConnectionId,
}

impl QuicConnection {
    /// Opens a fresh bidirectional stream for one request/response
    /// exchange.
    pub async fn open_stream(
        &self,
    ) -> Result<(SendStream, RecvStream), TransportError> {
        self.conn
            .open_bi()
            .await
            .map_err(TransportError::Connection)
    }

    /// Accepts the next bidirectional stream opened by the peer.
    ///
    /// Returns `Ok(None)` when the connection has closed in an orderly
    /// fashion (peer close, local close, or idle timeout); hard
    /// failures surface as `Err`.
    pub async fn accept_stream(
        &self,
    ) -> Result<Option<(SendStream, RecvStream)>, TransportError> {
        match self.conn.accept_bi().await {
            Ok(pair) => Ok(Some(pair)),
            Err(e) if is_connection_closed(&e) => Ok(None),
            Err(e) => Err(TransportError::Connection(e)),
        }
    }

    /// Closes the connection with an application error code and reason.
    /// Pending stream accepts on the peer unblock with a closed signal.
    pub fn close(&self, code: u32, reason: &[u8]) {
        self.conn.close(code.into(), reason);
    }

    /// Returns the unique identifier for this connection.
    pub fn id(&self) -> ConnectionId {
        self.id
    }

    /// The peer's socket address.
    pub fn remote_address(&self) -> SocketAddr {
        self.conn.remote_address()
    }
}

/// Whether a connection error represents an orderly end rather than a
/// fault worth reporting.
fn is_connection_closed(error: &quinn::ConnectionError) -> bool {
    matches!(
        error,
        quinn::ConnectionError::LocallyClosed
            | quinn::ConnectionError::ApplicationClosed { .. }
            | quinn::ConnectionError::ConnectionClosed(_)
            | quinn::ConnectionError::TimedOut
    )
}
