//! Fan-out of server events to registered connections.
//!
//! Every send is fire-and-forget: a failing recipient is logged and skipped,
//! the remaining recipients still get the event and the caller never sees
//! the error.

use actix::Recipient;
use log::warn;

use crate::game::error::SessionError;
use crate::game::events::ServerEvent;
use crate::game::registry::ConnectionRegistry;
use crate::game::types::ConnectionId;

/// Outbound half of a connection.
pub trait Outbound {
    fn deliver(&self, connection: ConnectionId, event: ServerEvent) -> Result<(), SessionError>;
}

/// Only a torn-down session counts as a failure; a busy mailbox still queues.
impl Outbound for Recipient<ServerEvent> {
    fn deliver(&self, connection: ConnectionId, event: ServerEvent) -> Result<(), SessionError> {
        if !self.connected() {
            return Err(SessionError::PeerDelivery {
                connection,
                detail: "session mailbox closed".to_string(),
            });
        }
        self.do_send(event);
        Ok(())
    }
}

/// Read-only view over the registry used to address events.
pub struct BroadcastHub<'a, S> {
    registry: &'a ConnectionRegistry<S>,
}

impl<'a, S: Outbound> BroadcastHub<'a, S> {
    pub fn new(registry: &'a ConnectionRegistry<S>) -> Self {
        Self { registry }
    }

    /// Unicast. Returns whether the event was handed to the sink.
    pub fn emit_to(&self, connection: &ConnectionId, event: ServerEvent) -> bool {
        match self.registry.entry(connection) {
            Some(entry) => send(*connection, &entry.sink, event),
            None => false,
        }
    }

    /// Every other connection with an attached player.
    pub fn broadcast_except(&self, connection: &ConnectionId, event: ServerEvent) -> usize {
        self.fan_out(event, |id, joined| id != connection && joined)
    }

    /// Every registered connection, joined or not.
    pub fn broadcast_all(&self, event: ServerEvent) -> usize {
        self.fan_out(event, |_, _| true)
    }

    fn fan_out(&self, event: ServerEvent, include: impl Fn(&ConnectionId, bool) -> bool) -> usize {
        let mut delivered = 0;
        for (id, entry) in self.registry.entries() {
            if include(id, entry.player.is_some()) && send(*id, &entry.sink, event.clone()) {
                delivered += 1;
            }
        }
        delivered
    }
}

fn send<S: Outbound>(connection: ConnectionId, sink: &S, event: ServerEvent) -> bool {
    let name = event.name();
    match sink.deliver(connection, event) {
        Ok(()) => true,
        Err(err) => {
            warn!("[Broadcast] Dropped `{}`: {}", name, err);
            false
        }
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::game::types::{Player, Position};
    use std::cell::RefCell;
    use std::rc::Rc;
    use uuid::Uuid;

    /// In-memory sink recording every delivered event; can be switched to fail.
    #[derive(Clone, Default)]
    pub(crate) struct RecordingSink {
        pub events: Rc<RefCell<Vec<ServerEvent>>>,
        pub broken: bool,
    }

    impl RecordingSink {
        pub(crate) fn broken() -> Self {
            Self {
                broken: true,
                ..Self::default()
            }
        }

        pub(crate) fn names(&self) -> Vec<&'static str> {
            self.events.borrow().iter().map(ServerEvent::name).collect()
        }

        pub(crate) fn clear(&self) {
            self.events.borrow_mut().clear();
        }
    }

    impl Outbound for RecordingSink {
        fn deliver(&self, connection: ConnectionId, event: ServerEvent) -> Result<(), SessionError> {
            if self.broken {
                return Err(SessionError::PeerDelivery {
                    connection,
                    detail: "closed".into(),
                });
            }
            self.events.borrow_mut().push(event);
            Ok(())
        }
    }

    fn typing() -> ServerEvent {
        ServerEvent::Typing {
            username: "ana".into(),
        }
    }

    #[test]
    fn broken_peer_does_not_abort_fan_out() {
        let mut registry = ConnectionRegistry::new();
        let (ok_a, bad, ok_b) = (Uuid::new_v4(), Uuid::new_v4(), Uuid::new_v4());
        let (sink_a, sink_b) = (RecordingSink::default(), RecordingSink::default());
        registry.register(ok_a, sink_a.clone());
        registry.register(bad, RecordingSink::broken());
        registry.register(ok_b, sink_b.clone());

        let delivered = BroadcastHub::new(&registry).broadcast_all(typing());

        assert_eq!(delivered, 2);
        assert_eq!(sink_a.names(), vec!["typing"]);
        assert_eq!(sink_b.names(), vec!["typing"]);
    }

    #[test]
    fn broadcast_except_skips_sender_and_unjoined() {
        let mut registry = ConnectionRegistry::new();
        let (sender, joined, lurker) = (Uuid::new_v4(), Uuid::new_v4(), Uuid::new_v4());
        let sinks = [
            RecordingSink::default(),
            RecordingSink::default(),
            RecordingSink::default(),
        ];
        for (id, sink) in [sender, joined, lurker].into_iter().zip(sinks.iter()) {
            registry.register(id, sink.clone());
        }
        registry
            .attach_player(sender, Player::new(0, "ana".into(), Position::default()))
            .unwrap();
        registry
            .attach_player(joined, Player::new(1, "bo".into(), Position::default()))
            .unwrap();

        let delivered = BroadcastHub::new(&registry).broadcast_except(&sender, typing());

        assert_eq!(delivered, 1);
        assert!(sinks[0].names().is_empty());
        assert_eq!(sinks[1].names(), vec!["typing"]);
        assert!(sinks[2].names().is_empty());
    }

    #[test]
    fn emit_to_unknown_connection_is_dropped() {
        let registry: ConnectionRegistry<RecordingSink> = ConnectionRegistry::new();
        assert!(!BroadcastHub::new(&registry).emit_to(&Uuid::new_v4(), typing()));
    }
}
