//! TLS material for the demo transport.
//!
//! The server generates a fresh self-signed certificate on every start
//! (nothing is persisted); the client accepts it without chain
//! validation. Both sides pin the QTGP application protocol via ALPN so
//! the QUIC handshake negotiates the right protocol. Signature checks
//! on the TLS transcript are still performed client-side — only the
//! trust decision about the certificate itself is skipped, and only
//! because this transport exists for locally-run demo sessions.

use std::sync::{Arc, Once};

use rustls::client::danger::{
    HandshakeSignatureValid, ServerCertVerified, ServerCertVerifier,
};
use rustls::crypto::CryptoProvider;
use rustls::pki_types::{
    CertificateDer, PrivatePkcs8KeyDer, ServerName, UnixTime,
};
use rustls::DigitallySignedStruct;

use crate::TransportError;

/// Installs the process-wide rustls crypto provider exactly once.
/// Safe to call from every bind/dial; later calls are no-ops.
pub(crate) fn install_crypto_provider() {
    static INIT: Once = Once::new();
    INIT.call_once(|| {
        let _ = rustls::crypto::aws_lc_rs::default_provider()
            .install_default();
    });
}

/// Builds the quinn server config: self-signed certificate for
/// `localhost`, ALPN bound to `alpn`.
pub(crate) fn server_config(
    alpn: &str,
) -> Result<quinn::ServerConfig, TransportError> {
    let certified = rcgen::generate_simple_self_signed(vec![
        "localhost".to_string()
    ])
    .map_err(|e| TransportError::Tls(format!("generate cert: {e}")))?;
    let rcgen::CertifiedKey { cert, signing_key } = certified;
    let cert_der = CertificateDer::from(cert);
    let key_der = PrivatePkcs8KeyDer::from(signing_key.serialize_der());

    let mut crypto = rustls::ServerConfig::builder()
        .with_no_client_auth()
        .with_single_cert(vec![cert_der], key_der.into())
        .map_err(|e| TransportError::Tls(format!("server config: {e}")))?;
    crypto.alpn_protocols = vec![alpn.as_bytes().to_vec()];

    let quic = quinn::crypto::rustls::QuicServerConfig::try_from(Arc::new(
        crypto,
    ))
    .map_err(|e| TransportError::Tls(format!("quic server crypto: {e}")))?;

    Ok(quinn::ServerConfig::with_crypto(Arc::new(quic)))
}

/// Builds the quinn client config: accepts the server's untrusted
/// self-signed certificate, ALPN bound to `alpn`.
pub(crate) fn client_config(
    alpn: &str,
) -> Result<quinn::ClientConfig, TransportError> {
    let mut crypto = rustls::ClientConfig::builder()
        .dangerous()
        .with_custom_certificate_verifier(AcceptSelfSigned::new())
        .with_no_client_auth();
    crypto.alpn_protocols = vec![alpn.as_bytes().to_vec()];

    let quic = quinn::crypto::rustls::QuicClientConfig::try_from(Arc::new(
        crypto,
    ))
    .map_err(|e| TransportError::Tls(format!("quic client crypto: {e}")))?;

    Ok(quinn::ClientConfig::new(Arc::new(quic)))
}

/// Certificate verifier that accepts any server certificate.
///
/// Transcript signatures are still verified against the presented
/// certificate; only chain/identity validation is skipped.
#[derive(Debug)]
struct AcceptSelfSigned(Arc<CryptoProvider>);

impl AcceptSelfSigned {
    fn new() -> Arc<Self> {
        Arc::new(Self(Arc::new(
            rustls::crypto::aws_lc_rs::default_provider(),
        )))
    }
}

impl ServerCertVerifier for AcceptSelfSigned {
    fn verify_server_cert(
        &self,
        _end_entity: &CertificateDer<'_>,
        _intermediates: &[CertificateDer<'_>],
        _server_name: &ServerName<'_>,
        _ocsp_response: &[u8],
        _now: UnixTime,
    ) -> Result<ServerCertVerified, rustls::Error> {
        Ok(ServerCertVerified::assertion())
    }

    fn verify_tls12_signature(
        &self,
        message: &[u8],
        cert: &CertificateDer<'_>,
        dss: &DigitallySignedStruct,
    ) -> Result<HandshakeSignatureValid, rustls::Error> {
        rustls::crypto::verify_tls12_signature(
            message,
            cert,
            dss,
            &self.0.signature_verification_algorithms,
        )
    }

    fn verify_tls13_signature(
        &self,
        message: &[u8],
        cert: &CertificateDer<'_>,
        dss: &DigitallySignedStruct,
    ) -> Result<HandshakeSignatureValid, rustls::Error> {
        rustls::crypto::verify_tls13_signature(
            message,
            cert,
            dss,
            &self.0.signature_verification_algorithms,
        )
    }

    fn supported_verify_schemes(&self) -> Vec<rustls::SignatureScheme> {
        self.0
            .signature_verification_algorithms
            .supported_schemes()
    }
}
