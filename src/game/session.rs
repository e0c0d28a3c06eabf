use super::messages::{Color, ServerMessage};
use crate::connection::{Connection, ConnectionId};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Active,
    /// Game over was reported or a participant left. Nothing is relayed anymore.
    Ended,
}

/// One chat line as the server recorded it
#[derive(Debug, Clone, PartialEq)]
pub struct ChatEntry {
    pub sender: Color,
    pub text: String,
    /// Server receipt time, milliseconds since the Unix epoch
    pub timestamp: u64,
}

impl ChatEntry {
    fn to_message(&self) -> ServerMessage {
        ServerMessage::Chat {
            sender: self.sender,
            data: self.text.clone(),
            time_stamp: self.timestamp.to_string(),
        }
    }
}

/// A game between two connections. Moves and results are trusted as the
/// clients report them; the server only routes them.
pub struct GameSession {
    id: String,
    white: Connection<ServerMessage>,
    black: Connection<ServerMessage>,
    chat_history: Vec<ChatEntry>,
    state: SessionState,
}

impl GameSession {
    pub fn new(
        id: impl Into<String>,
        white: Connection<ServerMessage>,
        black: Connection<ServerMessage>,
    ) -> Self {
        debug_assert_ne!(white.id(), black.id());
        Self {
            id: id.into(),
            white,
            black,
            chat_history: Vec::new(),
            state: SessionState::Active,
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn is_active(&self) -> bool {
        self.state == SessionState::Active
    }

    pub fn chat_history(&self) -> &[ChatEntry] {
        &self.chat_history
    }

    pub fn participant(&self, color: Color) -> &Connection<ServerMessage> {
        match color {
            Color::White => &self.white,
            Color::Black => &self.black,
        }
    }

    pub fn color_of(&self, id: ConnectionId) -> Option<Color> {
        if id == self.white.id() {
            Some(Color::White)
        } else if id == self.black.id() {
            Some(Color::Black)
        } else {
            None
        }
    }

    pub fn opponent_of(&self, id: ConnectionId) -> Option<&Connection<ServerMessage>> {
        self.color_of(id).map(|color| self.participant(color.opposite()))
    }

    /// Forward a move to the other player. Returns whether it was handed off.
    pub fn relay_move(&self, from: ConnectionId, mv: serde_json::Value) -> bool {
        if !self.is_active() {
            return false;
        }
        let Some(opponent) = self.opponent_of(from) else {
            return false;
        };
        opponent.send(ServerMessage::Move(mv))
    }

    /// Record a chat line and send the stamped copy to both players,
    /// the sender included.
    pub fn relay_chat(&mut self, from: ConnectionId, text: String, timestamp: u64) -> Option<ChatEntry> {
        if !self.is_active() {
            return None;
        }
        let sender = self.color_of(from)?;

        let entry = ChatEntry {
            sender,
            text,
            timestamp,
        };
        self.chat_history.push(entry.clone());

        let msg = entry.to_message();
        self.white.send(msg.clone());
        self.black.send(msg);

        Some(entry)
    }

    /// Pass the reported result on to the other player and end the session
    pub fn report_game_over(&mut self, from: ConnectionId, winner: String) -> bool {
        if !self.is_active() {
            return false;
        }
        let Some(opponent) = self.opponent_of(from) else {
            return false;
        };

        opponent.send(ServerMessage::GameOver {
            winner,
            game_id: self.id.clone(),
        });
        self.state = SessionState::Ended;
        true
    }

    pub fn end(&mut self) {
        self.state = SessionState::Ended;
    }
}
