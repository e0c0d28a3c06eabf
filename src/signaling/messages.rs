use crate::connection::PresenceMessage;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Signaling frames are flat objects tagged by `type`. SDP blobs and ICE
/// candidates are opaque and passed through untouched.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", rename_all = "camelCase", rename_all_fields = "camelCase")]
pub enum ClientMessage {
    Register {
        peer_id: String,
    },
    CreateOffer {
        sdp: Value,
        target_peer_id: String,
    },
    CreateAnswer {
        sdp: Value,
        target_peer_id: String,
    },
    IceCandidate {
        candidate: Value,
        target_peer_id: String,
    },
    /// The sender is leaving the video call; the socket itself stays open
    Disconnect {
        target_peer_id: String,
        #[serde(default)]
        player_color: Option<String>,
    },
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", rename_all = "camelCase", rename_all_fields = "camelCase")]
pub enum ServerMessage {
    CreateOffer {
        sdp: Value,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        sender_peer_id: Option<String>,
    },
    CreateAnswer {
        sdp: Value,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        sender_peer_id: Option<String>,
    },
    IceCandidate {
        candidate: Value,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        sender_peer_id: Option<String>,
    },
    Disconnect {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        player_color: Option<String>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        sender_peer_id: Option<String>,
    },
    #[serde(rename = "presence_count")]
    PresenceCount {
        count: usize,
    },
}

impl PresenceMessage for ServerMessage {
    fn presence_count(count: usize) -> Self {
        ServerMessage::PresenceCount { count }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn deserialize_register() {
        let json = r#"{"type": "register", "peerId": "white-abc"}"#;
        let msg: ClientMessage = serde_json::from_str(json).unwrap();
        assert_eq!(
            msg,
            ClientMessage::Register {
                peer_id: "white-abc".to_string()
            }
        );
    }

    #[test]
    fn deserialize_ice_candidate_keeps_candidate_opaque() {
        let json = r#"{
            "type": "iceCandidate",
            "targetPeerId": "black-abc",
            "candidate": {"candidate": "candidate:1 1 udp 2122260223 10.0.0.2 54400 typ host", "sdpMid": "0", "sdpMLineIndex": 0}
        }"#;
        let msg: ClientMessage = serde_json::from_str(json).unwrap();
        let ClientMessage::IceCandidate {
            candidate,
            target_peer_id,
        } = msg
        else {
            panic!("Expected IceCandidate");
        };
        assert_eq!(target_peer_id, "black-abc");
        assert_eq!(candidate["sdpMLineIndex"], 0);
    }

    #[test]
    fn deserialize_disconnect_without_color() {
        let json = r#"{"type": "disconnect", "targetPeerId": "black-abc"}"#;
        let msg: ClientMessage = serde_json::from_str(json).unwrap();
        assert_eq!(
            msg,
            ClientMessage::Disconnect {
                target_peer_id: "black-abc".to_string(),
                player_color: None,
            }
        );
    }

    #[test]
    fn offer_without_target_is_rejected() {
        let json = r#"{"type": "createOffer", "sdp": {"type": "offer", "sdp": "v=0"}}"#;
        assert!(serde_json::from_str::<ClientMessage>(json).is_err());
    }

    #[test]
    fn serialize_relayed_offer() {
        let msg = ServerMessage::CreateOffer {
            sdp: json!({"type": "offer", "sdp": "v=0"}),
            sender_peer_id: Some("white-abc".to_string()),
        };
        assert_eq!(
            serde_json::to_value(&msg).unwrap(),
            json!({
                "type": "createOffer",
                "sdp": {"type": "offer", "sdp": "v=0"},
                "senderPeerId": "white-abc"
            })
        );
    }

    #[test]
    fn serialize_disconnect_notice() {
        let msg = ServerMessage::Disconnect {
            player_color: Some("white".to_string()),
            sender_peer_id: None,
        };
        assert_eq!(
            serde_json::to_string(&msg).unwrap(),
            r#"{"type":"disconnect","playerColor":"white"}"#
        );
    }

    #[test]
    fn serialize_presence_count() {
        let json = serde_json::to_string(&ServerMessage::presence_count(2)).unwrap();
        assert_eq!(json, r#"{"type":"presence_count","count":2}"#);
    }
}
