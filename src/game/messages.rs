use crate::connection::PresenceMessage;
use serde::{Deserialize, Serialize};

/// Side assigned to a player at pairing time
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum Color {
    White,
    Black,
}

impl Color {
    pub fn opposite(self) -> Self {
        match self {
            Color::White => Color::Black,
            Color::Black => Color::White,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(
    tag = "type",
    content = "payload",
    rename_all = "snake_case",
    rename_all_fields = "camelCase"
)]
pub enum ClientMessage {
    InitGame {
        time_control: String,
        rating: i32,
    },
    /// The move is opaque to the server and relayed untouched
    Move {
        r#move: serde_json::Value,
    },
    Chat {
        #[serde(default)]
        game_id: String,
        #[serde(default)]
        player_color: Option<Color>,
        data: String,
    },
    GameOver {
        winner: String,
        #[serde(default)]
        game_id: String,
    },
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(
    tag = "type",
    content = "payload",
    rename_all = "snake_case",
    rename_all_fields = "camelCase"
)]
pub enum ServerMessage {
    GameStart {
        color: Color,
        opponent_rating: i32,
        time_control: String,
        game_id: String,
    },
    Move(serde_json::Value),
    Chat {
        sender: Color,
        data: String,
        /// Milliseconds since the Unix epoch, as a string
        time_stamp: String,
    },
    GameOver {
        winner: String,
        game_id: String,
    },
    PresenceCount {
        count: usize,
    },
    OpponentDisconnected,
}

impl PresenceMessage for ServerMessage {
    fn presence_count(count: usize) -> Self {
        ServerMessage::PresenceCount { count }
    }
}
