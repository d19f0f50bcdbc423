//! Wire protocol of the room.
//!
//! Every frame is an adjacently tagged JSON envelope:
//! `{"event": "<name>", "data": { ... }}`. Field names are camelCase and must
//! stay stable, existing clients depend on them field-for-field.
//!
//! Client events without a payload (`typing`, `stopTyping`) accept a missing,
//! `null` or object `data` member alike.

use actix::prelude::*;
use serde::de::{self, DeserializeOwned, Deserializer};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::game::types::{Player, PlayerId, Position};

/// Client -> server.
#[derive(Serialize, Clone, Debug, PartialEq)]
#[serde(
    tag = "event",
    content = "data",
    rename_all = "camelCase",
    rename_all_fields = "camelCase"
)]
pub enum ClientEvent {
    Join {
        username: String,
        #[serde(default)]
        position: Option<Position>,
    },
    Chat {
        message: String,
    },
    Typing,
    StopTyping,
    Move(Position),
}

impl ClientEvent {
    pub fn name(&self) -> &'static str {
        match self {
            ClientEvent::Join { .. } => "join",
            ClientEvent::Chat { .. } => "chat",
            ClientEvent::Typing => "typing",
            ClientEvent::StopTyping => "stopTyping",
            ClientEvent::Move(_) => "move",
        }
    }
}

const CLIENT_EVENTS: &[&str] = &["join", "chat", "typing", "stopTyping", "move"];

#[derive(Deserialize)]
struct RawClientEvent {
    event: String,
    #[serde(default)]
    data: Value,
}

#[derive(Deserialize)]
struct JoinData {
    username: String,
    #[serde(default)]
    position: Option<Position>,
}

#[derive(Deserialize)]
struct ChatData {
    message: String,
}

fn payload<T: DeserializeOwned, E: de::Error>(data: Value) -> Result<T, E> {
    T::deserialize(data).map_err(E::custom)
}

impl<'de> Deserialize<'de> for ClientEvent {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let RawClientEvent { event, data } = RawClientEvent::deserialize(deserializer)?;
        match event.as_str() {
            "join" => {
                let JoinData { username, position } = payload(data)?;
                Ok(ClientEvent::Join { username, position })
            }
            "chat" => {
                let ChatData { message } = payload(data)?;
                Ok(ClientEvent::Chat { message })
            }
            "typing" => Ok(ClientEvent::Typing),
            "stopTyping" => Ok(ClientEvent::StopTyping),
            "move" => payload(data).map(ClientEvent::Move),
            other => Err(de::Error::unknown_variant(other, CLIENT_EVENTS)),
        }
    }
}

/// Server -> client.
#[derive(Message, Serialize, Deserialize, Clone, Debug, PartialEq)]
#[rtype(result = "()")]
#[serde(
    tag = "event",
    content = "data",
    rename_all = "camelCase",
    rename_all_fields = "camelCase"
)]
pub enum ServerEvent {
    Login {
        num_users: usize,
        your_id: PlayerId,
        players: Vec<Player>,
    },
    UserJoined {
        username: String,
        num_users: usize,
        player: Player,
    },
    Chat {
        player_id: PlayerId,
        username: String,
        message: String,
    },
    Typing {
        username: String,
    },
    StopTyping {
        username: String,
    },
    UserLeft {
        username: String,
        num_users: usize,
        left_player_id: PlayerId,
    },
    Moved {
        player_id: PlayerId,
        x: f64,
        y: f64,
        z: f64,
    },
    /// `start_at` is epoch milliseconds.
    GamePrepare {
        start_at: i64,
    },
    /// `end_at` is epoch milliseconds.
    GameReady {
        end_at: i64,
        question_id: u32,
        round_index: u32,
        max_rounds: u32,
    },
    GameEnd {
        result: String,
    },
}

impl ServerEvent {
    pub fn name(&self) -> &'static str {
        match self {
            ServerEvent::Login { .. } => "login",
            ServerEvent::UserJoined { .. } => "userJoined",
            ServerEvent::Chat { .. } => "chat",
            ServerEvent::Typing { .. } => "typing",
            ServerEvent::StopTyping { .. } => "stopTyping",
            ServerEvent::UserLeft { .. } => "userLeft",
            ServerEvent::Moved { .. } => "moved",
            ServerEvent::GamePrepare { .. } => "gamePrepare",
            ServerEvent::GameReady { .. } => "gameReady",
            ServerEvent::GameEnd { .. } => "gameEnd",
        }
    }
}
