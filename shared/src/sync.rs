use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::config::Vec2;

/// Frames pushed by the socket server.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ServerMessage {
    Sync {
        #[serde(default)]
        players: BTreeMap<String, PlayerUpdate>,
    },
}

/// Per-player state in a sync frame. Either half may be omitted when unchanged.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PlayerUpdate {
    #[serde(default)]
    pub position: Option<Vec2>,
    #[serde(default)]
    pub speed: Option<Vec2>,
}

/// Frames sent by the client.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ClientMessage {
    /// Ask the server for the next sync frame.
    Sync,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_sync_with_partial_players() {
        let msg: ServerMessage = serde_json::from_str(
            r#"{
                "type": "sync",
                "players": {
                    "1": { "position": { "x": 10, "y": 20 } },
                    "2": { "speed": { "x": -1.5, "y": 0 } }
                }
            }"#,
        )
        .unwrap();

        let ServerMessage::Sync { players } = msg;
        assert_eq!(players["1"].position, Some(Vec2::new(10.0, 20.0)));
        assert_eq!(players["1"].speed, None);
        assert_eq!(players["2"].position, None);
        assert_eq!(players["2"].speed, Some(Vec2::new(-1.5, 0.0)));
    }

    #[test]
    fn sync_without_players_is_empty() {
        let msg: ServerMessage = serde_json::from_str(r#"{"type":"sync"}"#).unwrap();
        let ServerMessage::Sync { players } = msg;
        assert!(players.is_empty());
    }

    #[test]
    fn client_sync_request_shape() {
        let json = serde_json::to_string(&ClientMessage::Sync).unwrap();
        assert_eq!(json, r#"{"type":"sync"}"#);
    }

    #[test]
    fn rejects_unknown_message_type() {
        assert!(serde_json::from_str::<ServerMessage>(r#"{"type":"bogus"}"#).is_err());
    }
}
