//! Length-prefixed framing: the single source of truth for the wire
//! layout.
//!
//! Every frame is:
//!
//! ```text
//! ┌──────────────────────┬──────────────────────────────┐
//! │ length: u32 (BE, 4B) │ payload: length bytes (JSON) │
//! └──────────────────────┴──────────────────────────────┘
//! ```
//!
//! The functions are generic over `AsyncRead`/`AsyncWrite` so the same
//! code runs over a quinn stream in production and a
//! `tokio::io::duplex` pipe in tests.

use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};

use crate::{Message, ProtocolError};

/// Upper bound on the declared payload length of an incoming frame.
/// QTGP messages are tiny; anything near this is corrupt or hostile.
pub const MAX_FRAME_LEN: usize = 64 * 1024;

/// Encodes `msg` and writes one frame to `writer`.
///
/// # Errors
/// - [`ProtocolError::Encode`] if serialization fails.
/// - [`ProtocolError::Io`] if writing the header or body fails.
pub async fn write_frame<W>(
    writer: &mut W,
    msg: &Message,
) -> Result<(), ProtocolError>
where
    W: AsyncWrite + Unpin,
{
    let payload = serde_json::to_vec(msg).map_err(ProtocolError::Encode)?;

    let header = (payload.len() as u32).to_be_bytes();
    writer
        .write_all(&header)
        .await
        .map_err(ProtocolError::Io)?;
    writer
        .write_all(&payload)
        .await
        .map_err(ProtocolError::Io)?;
    writer.flush().await.map_err(ProtocolError::Io)?;
    Ok(())
}

/// Reads exactly one frame from `reader` and decodes its payload.
///
/// Partial reads are retried until the expected byte count arrives or
/// the stream ends.
///
/// # Errors
/// - [`ProtocolError::IncompleteFrame`] if the stream ends before the
///   4-byte header or the declared body is fully read.
/// - [`ProtocolError::FrameTooLarge`] if the header declares more than
///   [`MAX_FRAME_LEN`] bytes.
/// - [`ProtocolError::MalformedPayload`] if the body is not a
///   well-formed message.
/// - [`ProtocolError::Io`] for any other read failure.
pub async fn read_frame<R>(reader: &mut R) -> Result<Message, ProtocolError>
where
    R: AsyncRead + Unpin,
{
    let mut header = [0u8; 4];
    read_exact_or_incomplete(reader, &mut header).await?;

    let len = u32::from_be_bytes(header) as usize;
    if len > MAX_FRAME_LEN {
        return Err(ProtocolError::FrameTooLarge {
            len,
            max: MAX_FRAME_LEN,
        });
    }

    let mut payload = vec![0u8; len];
    read_exact_or_incomplete(reader, &mut payload).await?;

    serde_json::from_slice(&payload).map_err(ProtocolError::MalformedPayload)
}

/// `read_exact`, with end-of-stream mapped to `IncompleteFrame`.
async fn read_exact_or_incomplete<R>(
    reader: &mut R,
    buf: &mut [u8],
) -> Result<(), ProtocolError>
where
    R: AsyncRead + Unpin,
{
    reader.read_exact(buf).await.map(|_| ()).map_err(|e| {
        if e.kind() == std::io::ErrorKind::UnexpectedEof {
            ProtocolError::IncompleteFrame
        } else {
            ProtocolError::Io(e)
        }
    })
}

// =========================================================================
// Tests
// =========================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::MessageType;

    /// A generously sized in-memory pipe; both halves implement
    /// AsyncRead + AsyncWrite so they stand in for stream endpoints.
    fn pipe() -> (tokio::io::DuplexStream, tokio::io::DuplexStream) {
        tokio::io::duplex(64 * 1024)
    }

    #[tokio::test]
    async fn test_round_trip_preserves_every_field() {
        let (mut client, mut server) = pipe();
        let msg = Message::join_game_request("p1", "g1", 0b0000_0001);

        write_frame(&mut client, &msg).await.unwrap();
        let decoded = read_frame(&mut server).await.unwrap();

        assert_eq!(decoded, msg);
    }

    #[tokio::test]
    async fn test_round_trip_back_to_back_frames() {
        // Two frames on one stream must decode independently — the
        // length prefix is what delimits them.
        let (mut client, mut server) = pipe();
        let first = Message::state_update("TURN_1:MOVE_A");
        let second = Message::state_update("TURN_2:MOVE_B");

        write_frame(&mut client, &first).await.unwrap();
        write_frame(&mut client, &second).await.unwrap();

        assert_eq!(read_frame(&mut server).await.unwrap(), first);
        assert_eq!(read_frame(&mut server).await.unwrap(), second);
    }

    #[tokio::test]
    async fn test_header_is_big_endian_length_prefix() {
        let (mut client, mut server) = pipe();
        let msg = Message::state_resync_request();
        write_frame(&mut client, &msg).await.unwrap();
        drop(client);

        let mut raw = Vec::new();
        tokio::io::AsyncReadExt::read_to_end(&mut server, &mut raw)
            .await
            .unwrap();

        let declared =
            u32::from_be_bytes([raw[0], raw[1], raw[2], raw[3]]) as usize;
        assert_eq!(declared, raw.len() - 4);
        // The payload is the JSON document, nothing more.
        let value: serde_json::Value =
            serde_json::from_slice(&raw[4..]).unwrap();
        assert_eq!(value["type"], "STATE_RESYNC_REQUEST");
    }

    #[tokio::test]
    async fn test_read_frame_eof_before_header_is_incomplete() {
        let (client, mut server) = pipe();
        drop(client); // peer closes without sending anything

        let result = read_frame(&mut server).await;
        assert!(matches!(result, Err(ProtocolError::IncompleteFrame)));
    }

    #[tokio::test]
    async fn test_read_frame_truncated_body_is_incomplete() {
        // Scenario: the header declares more bytes than ever arrive.
        let (mut client, mut server) = pipe();
        client
            .write_all(&100u32.to_be_bytes())
            .await
            .unwrap();
        client.write_all(b"short").await.unwrap();
        drop(client);

        let result = read_frame(&mut server).await;
        assert!(matches!(result, Err(ProtocolError::IncompleteFrame)));
    }

    #[tokio::test]
    async fn test_read_frame_truncated_header_is_incomplete() {
        let (mut client, mut server) = pipe();
        client.write_all(&[0u8, 0]).await.unwrap(); // 2 of 4 bytes
        drop(client);

        let result = read_frame(&mut server).await;
        assert!(matches!(result, Err(ProtocolError::IncompleteFrame)));
    }

    #[tokio::test]
    async fn test_read_frame_garbage_payload_is_malformed() {
        let (mut client, mut server) = pipe();
        let garbage = b"definitely not json";
        client
            .write_all(&(garbage.len() as u32).to_be_bytes())
            .await
            .unwrap();
        client.write_all(garbage).await.unwrap();

        let result = read_frame(&mut server).await;
        assert!(matches!(result, Err(ProtocolError::MalformedPayload(_))));
    }

    #[tokio::test]
    async fn test_read_frame_oversized_declared_length_rejected() {
        let (mut client, mut server) = pipe();
        let huge = (MAX_FRAME_LEN as u32 + 1).to_be_bytes();
        client.write_all(&huge).await.unwrap();

        let result = read_frame(&mut server).await;
        assert!(matches!(
            result,
            Err(ProtocolError::FrameTooLarge { .. })
        ));
    }

    #[tokio::test]
    async fn test_read_frame_unknown_type_still_decodes() {
        // Unknown message types are a dispatch concern, not a framing
        // failure.
        let (mut client, mut server) = pipe();
        let payload = br#"{"protocol_version":1,"type":"NEW_FANGLED"}"#;
        client
            .write_all(&(payload.len() as u32).to_be_bytes())
            .await
            .unwrap();
        client.write_all(payload).await.unwrap();

        let msg = read_frame(&mut server).await.unwrap();
        assert_eq!(msg.kind, MessageType::Unknown);
    }
}
