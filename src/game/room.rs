//! The room: registry, session state and the per-connection protocol.
//!
//! `Room` is transport-free. It never sleeps or spawns; operations that need
//! a delayed follow-up return `Scheduled` transitions for the owner (the
//! room actor) to run later. See `machine.rs` for the round transitions.

use log::{debug, info};
use rand::Rng;
use serde::Serialize;

use crate::config::room::{QUESTION_POOL, RoomConfig, SPAWN_MAX, SPAWN_MIN};
use crate::game::broadcast::{BroadcastHub, Outbound};
use crate::game::error::SessionError;
use crate::game::events::{ClientEvent, ServerEvent};
use crate::game::machine::{Scheduled, TransitionKind};
use crate::game::registry::ConnectionRegistry;
use crate::game::state::SessionState;
use crate::game::types::{ConnectionId, Phase, Player, PlayerId, Position};

pub struct Room<S> {
    pub(crate) config: RoomConfig,
    pub(crate) state: SessionState,
    pub(crate) registry: ConnectionRegistry<S>,
    next_player_id: PlayerId,
}

/// Point-in-time view of the room, for diagnostics and tests.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RoomSnapshot {
    pub phase: Phase,
    pub num_users: usize,
    pub round_index: u32,
    pub max_rounds: u32,
    pub connections: usize,
    pub players: Vec<Player>,
}

impl<S: Outbound> Room<S> {
    pub fn new(config: RoomConfig) -> Self {
        Self {
            state: SessionState::new(&config),
            config,
            registry: ConnectionRegistry::new(),
            next_player_id: 0,
        }
    }

    #[cfg(test)]
    pub fn state(&self) -> &SessionState {
        &self.state
    }

    #[cfg(test)]
    pub fn registry(&self) -> &ConnectionRegistry<S> {
        &self.registry
    }

    pub fn hub(&self) -> BroadcastHub<'_, S> {
        BroadcastHub::new(&self.registry)
    }

    pub fn snapshot(&self) -> RoomSnapshot {
        RoomSnapshot {
            phase: self.state.phase,
            num_users: self.state.num_users,
            round_index: self.state.round_index,
            max_rounds: self.state.max_rounds,
            connections: self.registry.len(),
            players: self.registry.list_players(),
        }
    }

    /// A transport connection opened. It stays anonymous until it joins.
    pub fn connect(&mut self, connection: ConnectionId, sink: S) {
        self.registry.register(connection, sink);
        debug!("[Room] Connection {} registered", connection);
    }

    /// Dispatch one inbound client event.
    pub fn handle(&mut self, connection: ConnectionId, event: ClientEvent) -> Vec<Scheduled> {
        match event {
            ClientEvent::Join { username, position } => self.join(connection, username, position),
            ClientEvent::Chat { message } => {
                self.chat(connection, message);
                Vec::new()
            }
            ClientEvent::Typing => {
                self.typing(connection, true);
                Vec::new()
            }
            ClientEvent::StopTyping => {
                self.typing(connection, false);
                Vec::new()
            }
            ClientEvent::Move(pos) => {
                self.move_player(connection, pos);
                Vec::new()
            }
        }
    }

    pub fn join(
        &mut self,
        connection: ConnectionId,
        username: String,
        position: Option<Position>,
    ) -> Vec<Scheduled> {
        if let Some(existing) = self.registry.player(&connection) {
            let err = SessionError::AlreadyJoined {
                connection,
                player_id: existing.id,
            };
            debug!("[Room] Ignored join: {}", err);
            return Vec::new();
        }

        let pos = position.unwrap_or_else(random_spawn);
        let player = Player::new(self.next_player_id, username, pos);
        if let Err(err) = self.registry.attach_player(connection, player.clone()) {
            debug!("[Room] Ignored join: {}", err);
            return Vec::new();
        }
        self.next_player_id += 1;
        self.state.increment_users();
        debug_assert_eq!(self.state.num_users, self.registry.joined_count());

        let hub = self.hub();
        hub.emit_to(
            &connection,
            ServerEvent::Login {
                num_users: self.state.num_users,
                your_id: player.id,
                players: self.registry.list_players(),
            },
        );
        info!(
            "[Room] Player {} ({}) joined, users={}",
            player.id, player.username, self.state.num_users
        );
        hub.broadcast_except(
            &connection,
            ServerEvent::UserJoined {
                username: player.username.clone(),
                num_users: self.state.num_users,
                player,
            },
        );

        if self.state.enough_players() {
            vec![self.propose(TransitionKind::BeginPrepare, self.config.join_grace)]
        } else {
            Vec::new()
        }
    }

    pub fn chat(&self, connection: ConnectionId, message: String) {
        let Some(player) = self.joined_player(connection, "chat") else {
            return;
        };
        self.hub().broadcast_except(
            &connection,
            ServerEvent::Chat {
                player_id: player.id,
                username: player.username.clone(),
                message,
            },
        );
    }

    pub fn typing(&self, connection: ConnectionId, started: bool) {
        let action = if started { "typing" } else { "stopTyping" };
        let Some(player) = self.joined_player(connection, action) else {
            return;
        };
        let username = player.username.clone();
        let event = if started {
            ServerEvent::Typing { username }
        } else {
            ServerEvent::StopTyping { username }
        };
        self.hub().broadcast_except(&connection, event);
    }

    /// Positions are trusted as sent. The echo goes to everyone, sender included.
    pub fn move_player(&mut self, connection: ConnectionId, pos: Position) {
        let Some(player) = self.registry.player_mut(&connection) else {
            let err = SessionError::UnjoinedAction {
                connection,
                action: "move",
            };
            debug!("[Room] Ignored: {}", err);
            return;
        };
        player.pos = pos;
        let player_id = player.id;
        self.hub().broadcast_all(ServerEvent::Moved {
            player_id,
            x: pos.x,
            y: pos.y,
            z: pos.z,
        });
    }

    /// The transport connection closed.
    pub fn disconnect(&mut self, connection: ConnectionId) {
        let Some(player) = self.registry.unregister(&connection) else {
            debug!("[Room] Connection {} left without joining", connection);
            return;
        };
        self.state.decrement_users();
        debug_assert_eq!(self.state.num_users, self.registry.joined_count());

        info!(
            "[Room] Player {} ({}) left, users={}",
            player.id, player.username, self.state.num_users
        );
        self.hub().broadcast_except(
            &connection,
            ServerEvent::UserLeft {
                username: player.username,
                num_users: self.state.num_users,
                left_player_id: player.id,
            },
        );

        if self.state.num_users == 0 {
            self.force_reset();
        }
    }

    fn joined_player(&self, connection: ConnectionId, action: &'static str) -> Option<&Player> {
        let player = self.registry.player(&connection);
        if player.is_none() {
            debug!(
                "[Room] Ignored: {}",
                SessionError::UnjoinedAction { connection, action }
            );
        }
        player
    }

    pub(crate) fn next_question_id(&self) -> u32 {
        rand::rng().random_range(0..QUESTION_POOL)
    }
}

fn random_spawn() -> Position {
    let mut rng = rand::rng();
    Position::new(
        rng.random_range(SPAWN_MIN..SPAWN_MAX),
        rng.random_range(SPAWN_MIN..SPAWN_MAX),
        0.0,
    )
}
