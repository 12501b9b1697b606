//! Error types for the transport layer.

/// Errors that can occur while establishing or using the QUIC
/// transport.
///
/// Stream-level failures are contained to the affected exchange;
/// connection-level failures terminate only that connection's tasks.
#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    /// Binding the server endpoint failed.
    #[error("bind failed: {0}")]
    Bind(#[source] std::io::Error),

    /// Creating the client endpoint or resolving the target failed.
    #[error("dial setup failed: {0}")]
    Dial(#[source] std::io::Error),

    /// The dial attempt was rejected before a connection existed.
    #[error("connect failed: {0}")]
    Connect(#[from] quinn::ConnectError),

    /// An established connection was lost or refused.
    #[error("connection error: {0}")]
    Connection(#[from] quinn::ConnectionError),

    /// Building the TLS configuration failed.
    #[error("tls setup failed: {0}")]
    Tls(String),
}
