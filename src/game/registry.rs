//! Live connections and the player attached to each of them.

use std::collections::HashMap;

use crate::game::error::SessionError;
use crate::game::types::{ConnectionId, Player};

/// One registered connection: its outbound sink and, after join, its player.
pub struct ConnectionEntry<S> {
    pub sink: S,
    pub player: Option<Player>,
}

pub struct ConnectionRegistry<S> {
    connections: HashMap<ConnectionId, ConnectionEntry<S>>,
}

impl<S> ConnectionRegistry<S> {
    pub fn new() -> Self {
        Self {
            connections: HashMap::new(),
        }
    }

    /// Register a connection with no player attached. Re-registering an id
    /// replaces its sink but keeps an already attached player.
    pub fn register(&mut self, connection: ConnectionId, sink: S) {
        match self.connections.get_mut(&connection) {
            Some(entry) => entry.sink = sink,
            None => {
                self.connections
                    .insert(connection, ConnectionEntry { sink, player: None });
            }
        }
    }

    pub fn attach_player(
        &mut self,
        connection: ConnectionId,
        player: Player,
    ) -> Result<(), SessionError> {
        let Some(entry) = self.connections.get_mut(&connection) else {
            return Err(SessionError::UnjoinedAction {
                connection,
                action: "join",
            });
        };
        if let Some(existing) = &entry.player {
            return Err(SessionError::AlreadyJoined {
                connection,
                player_id: existing.id,
            });
        }
        entry.player = Some(player);
        Ok(())
    }

    /// Remove a connection, returning the player it carried. Unknown ids are a no-op.
    pub fn unregister(&mut self, connection: &ConnectionId) -> Option<Player> {
        self.connections
            .remove(connection)
            .and_then(|entry| entry.player)
    }

    pub fn player(&self, connection: &ConnectionId) -> Option<&Player> {
        self.connections
            .get(connection)
            .and_then(|entry| entry.player.as_ref())
    }

    pub fn player_mut(&mut self, connection: &ConnectionId) -> Option<&mut Player> {
        self.connections
            .get_mut(connection)
            .and_then(|entry| entry.player.as_mut())
    }

    /// Snapshot of every attached player, ordered by id.
    pub fn list_players(&self) -> Vec<Player> {
        let mut players: Vec<Player> = self
            .connections
            .values()
            .filter_map(|entry| entry.player.clone())
            .collect();
        players.sort_by_key(|p| p.id);
        players
    }

    pub fn joined_count(&self) -> usize {
        self.connections
            .values()
            .filter(|entry| entry.player.is_some())
            .count()
    }

    pub fn len(&self) -> usize {
        self.connections.len()
    }

    pub(crate) fn entry(&self, connection: &ConnectionId) -> Option<&ConnectionEntry<S>> {
        self.connections.get(connection)
    }

    pub(crate) fn entries(&self) -> impl Iterator<Item = (&ConnectionId, &ConnectionEntry<S>)> {
        self.connections.iter()
    }
}

impl<S> Default for ConnectionRegistry<S> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::types::Position;
    use uuid::Uuid;

    fn player(id: u64, name: &str) -> Player {
        Player::new(id, name.to_string(), Position::default())
    }

    #[test]
    fn attach_twice_is_rejected() {
        let mut registry = ConnectionRegistry::new();
        let conn = Uuid::new_v4();
        registry.register(conn, ());

        assert!(registry.attach_player(conn, player(0, "ana")).is_ok());
        let err = registry.attach_player(conn, player(1, "ana")).unwrap_err();
        assert_eq!(
            err,
            SessionError::AlreadyJoined {
                connection: conn,
                player_id: 0
            }
        );
        assert_eq!(registry.player(&conn).map(|p| p.id), Some(0));
    }

    #[test]
    fn unregister_unknown_is_noop() {
        let mut registry: ConnectionRegistry<()> = ConnectionRegistry::new();
        assert!(registry.unregister(&Uuid::new_v4()).is_none());
        assert_eq!(registry.len(), 0);
    }

    #[test]
    fn list_players_skips_unjoined_connections() {
        let mut registry = ConnectionRegistry::new();
        let (a, b, c) = (Uuid::new_v4(), Uuid::new_v4(), Uuid::new_v4());
        for conn in [a, b, c] {
            registry.register(conn, ());
        }
        registry.attach_player(c, player(7, "cy")).unwrap();
        registry.attach_player(a, player(2, "al")).unwrap();

        let ids: Vec<u64> = registry.list_players().iter().map(|p| p.id).collect();
        assert_eq!(ids, vec![2, 7]);
        assert_eq!(registry.joined_count(), 2);
        assert_eq!(registry.len(), 3);

        let removed = registry.unregister(&a);
        assert_eq!(removed.map(|p| p.username), Some("al".to_string()));
        assert_eq!(registry.joined_count(), 1);
    }
}
