use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Identifies one live transport connection.
pub type ConnectionId = Uuid;

/// Player ids are allocated from a monotonically increasing counter.
pub type PlayerId = u64;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, Default)]
pub struct Position {
    pub x: f64,
    pub y: f64,
    // 2D clients omit z.
    #[serde(default)]
    pub z: f64,
}

impl Position {
    pub fn new(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Player {
    pub id: PlayerId,
    pub username: String,
    #[serde(flatten)]
    pub pos: Position,
}

impl Player {
    pub fn new(id: PlayerId, username: String, pos: Position) -> Self {
        Self { id, username, pos }
    }
}

/// Stage of the round state machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Phase {
    #[default]
    Waiting,
    Preparing,
    Playing,
}
