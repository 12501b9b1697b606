//! The message schema: the one structured value exchanged on the wire.
//!
//! Every request and response in QTGP is a [`Message`]. Which fields are
//! meaningful depends on [`MessageType`]; the rest stay at their zero
//! values and are omitted from the serialized form entirely, so the JSON
//! on the wire carries only what the exchange actually uses.

use serde::{Deserialize, Serialize};
use std::fmt;

/// The only protocol schema version defined so far.
pub const PROTOCOL_VERSION: u32 = 1;

/// The tag identifying what a [`Message`] means.
///
/// The wire representation is the SCREAMING_SNAKE_CASE string shown on
/// each variant; these strings are the interoperability contract and
/// must be preserved byte-for-byte. Any unrecognized tag decodes to
/// [`MessageType::Unknown`] instead of failing the whole frame, so a
/// newer peer can send types we don't handle without breaking decode.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize,
)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum MessageType {
    /// Client → Server: "let me join this game."
    JoinGameRequest,
    /// Server → Client: join accepted, here are the agreed options.
    GameSetupAck,
    /// Client → Server: a move (opaque game-state payload).
    StateUpdate,
    /// Server → Client: update or resync acknowledged.
    StateAck,
    /// Client → Server: "send me the authoritative game state."
    StateResyncRequest,
    /// Catch-all for tags this build doesn't know. Never sent.
    #[serde(other)]
    Unknown,
}

impl Default for MessageType {
    fn default() -> Self {
        MessageType::Unknown
    }
}

impl fmt::Display for MessageType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            MessageType::JoinGameRequest => "JOIN_GAME_REQUEST",
            MessageType::GameSetupAck => "GAME_SETUP_ACK",
            MessageType::StateUpdate => "STATE_UPDATE",
            MessageType::StateAck => "STATE_ACK",
            MessageType::StateResyncRequest => "STATE_RESYNC_REQUEST",
            MessageType::Unknown => "UNKNOWN",
        };
        f.write_str(s)
    }
}

/// One protocol exchange unit.
///
/// A `Message` is an immutable value: constructed once, then moved or
/// cloned, never shared mutably across tasks. Only `protocol_version`
/// and `type` are always present on the wire; every other field is
/// omitted when it holds its zero value (empty string / 0), matching
/// the original wire format's optional-field behavior.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    /// Schema version; only [`PROTOCOL_VERSION`] is defined.
    pub protocol_version: u32,

    /// What this message means (drives the dispatch table).
    #[serde(rename = "type")]
    pub kind: MessageType,

    /// Identifies the joining player. Present on join requests.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub player_id: String,

    /// Identifies the game being joined. Present on join requests.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub game_id: String,

    /// 8-bit flags the joining client requests.
    #[serde(default, skip_serializing_if = "is_zero")]
    pub turn_options: u8,

    /// 8-bit result code set by the acknowledger; 0 = success.
    #[serde(default, skip_serializing_if = "is_zero")]
    pub status: u8,

    /// 8-bit flags actually granted (may differ from requested).
    #[serde(default, skip_serializing_if = "is_zero")]
    pub agreed_options: u8,

    /// Opaque string payload carrying a move or a state snapshot.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub game_state: String,
}

fn is_zero(v: &u8) -> bool {
    *v == 0
}

impl Message {
    /// Builds a `JOIN_GAME_REQUEST` for the given player and game.
    pub fn join_game_request(
        player_id: impl Into<String>,
        game_id: impl Into<String>,
        turn_options: u8,
    ) -> Self {
        Self {
            protocol_version: PROTOCOL_VERSION,
            kind: MessageType::JoinGameRequest,
            player_id: player_id.into(),
            game_id: game_id.into(),
            turn_options,
            ..Self::default()
        }
    }

    /// Builds a `GAME_SETUP_ACK` echoing the requester's version.
    pub fn game_setup_ack(
        protocol_version: u32,
        status: u8,
        agreed_options: u8,
    ) -> Self {
        Self {
            protocol_version,
            kind: MessageType::GameSetupAck,
            status,
            agreed_options,
            ..Self::default()
        }
    }

    /// Builds a `STATE_UPDATE` carrying one move payload.
    pub fn state_update(game_state: impl Into<String>) -> Self {
        Self {
            protocol_version: PROTOCOL_VERSION,
            kind: MessageType::StateUpdate,
            game_state: game_state.into(),
            ..Self::default()
        }
    }

    /// Builds a `STATE_ACK` echoing the requester's version.
    pub fn state_ack(protocol_version: u32) -> Self {
        Self {
            protocol_version,
            kind: MessageType::StateAck,
            ..Self::default()
        }
    }

    /// Builds a `STATE_RESYNC_REQUEST`.
    pub fn state_resync_request() -> Self {
        Self {
            protocol_version: PROTOCOL_VERSION,
            kind: MessageType::StateResyncRequest,
            ..Self::default()
        }
    }
}

// =========================================================================
// Tests
// =========================================================================

#[cfg(test)]
mod tests {
    //! The wire format defines exact JSON field names and which fields
    //! may be omitted. These tests pin that shape down, because a
    //! mismatch silently breaks interoperability with other builds.

    use super::*;

    #[test]
    fn test_message_type_serializes_as_screaming_snake_case() {
        let json =
            serde_json::to_string(&MessageType::JoinGameRequest).unwrap();
        assert_eq!(json, "\"JOIN_GAME_REQUEST\"");

        let json =
            serde_json::to_string(&MessageType::StateResyncRequest).unwrap();
        assert_eq!(json, "\"STATE_RESYNC_REQUEST\"");
    }

    #[test]
    fn test_message_type_unknown_tag_decodes_to_unknown() {
        // An unrecognized tag must not fail the frame.
        let kind: MessageType =
            serde_json::from_str("\"FLY_TO_MOON\"").unwrap();
        assert_eq!(kind, MessageType::Unknown);
    }

    #[test]
    fn test_message_type_display_matches_wire_tag() {
        assert_eq!(
            MessageType::GameSetupAck.to_string(),
            "GAME_SETUP_ACK"
        );
        assert_eq!(MessageType::StateAck.to_string(), "STATE_ACK");
    }

    #[test]
    fn test_join_request_json_field_names() {
        let msg = Message::join_game_request("ashley123", "civ", 0b0000_0001);
        let json: serde_json::Value = serde_json::to_value(&msg).unwrap();

        assert_eq!(json["protocol_version"], 1);
        assert_eq!(json["type"], "JOIN_GAME_REQUEST");
        assert_eq!(json["player_id"], "ashley123");
        assert_eq!(json["game_id"], "civ");
        assert_eq!(json["turn_options"], 1);
    }

    #[test]
    fn test_zero_valued_optional_fields_are_absent() {
        // A STATE_ACK sets nothing beyond version and type; the other
        // fields must not appear on the wire at all.
        let msg = Message::state_ack(1);
        let json: serde_json::Value = serde_json::to_value(&msg).unwrap();
        let obj = json.as_object().unwrap();

        assert!(obj.contains_key("protocol_version"));
        assert!(obj.contains_key("type"));
        assert!(!obj.contains_key("player_id"));
        assert!(!obj.contains_key("game_id"));
        assert!(!obj.contains_key("turn_options"));
        assert!(!obj.contains_key("status"));
        assert!(!obj.contains_key("agreed_options"));
        assert!(!obj.contains_key("game_state"));
    }

    #[test]
    fn test_game_setup_ack_success_status_omitted() {
        // Status 0 means success and is zero-valued, so it is omitted —
        // the receiver's default fills it back in as 0.
        let msg = Message::game_setup_ack(1, 0, 0b0000_0001);
        let json: serde_json::Value = serde_json::to_value(&msg).unwrap();

        assert!(json.get("status").is_none());
        assert_eq!(json["agreed_options"], 1);
    }

    #[test]
    fn test_message_missing_optional_fields_decode_to_defaults() {
        let json = r#"{"protocol_version":1,"type":"STATE_ACK"}"#;
        let msg: Message = serde_json::from_str(json).unwrap();

        assert_eq!(msg.kind, MessageType::StateAck);
        assert_eq!(msg.player_id, "");
        assert_eq!(msg.turn_options, 0);
        assert_eq!(msg.status, 0);
    }

    #[test]
    fn test_message_round_trip_every_constructor() {
        let messages = [
            Message::join_game_request("p1", "g1", 3),
            Message::game_setup_ack(1, 0, 3),
            Message::state_update("TURN_1:PLAYER_P1_MOVE"),
            Message::state_ack(1),
            Message::state_resync_request(),
        ];
        for msg in messages {
            let bytes = serde_json::to_vec(&msg).unwrap();
            let decoded: Message = serde_json::from_slice(&bytes).unwrap();
            assert_eq!(msg, decoded);
        }
    }

    #[test]
    fn test_message_decode_garbage_returns_error() {
        let result: Result<Message, _> =
            serde_json::from_slice(b"not json at all");
        assert!(result.is_err());
    }
}
