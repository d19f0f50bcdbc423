use thiserror::Error;

use crate::game::types::{ConnectionId, PlayerId};

/// Errors raised inside the room engine.
///
/// None of them is fatal to the shared session: each one is absorbed where it
/// arises and only logged.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SessionError {
    #[error("connection {connection} already joined as player {player_id}")]
    AlreadyJoined {
        connection: ConnectionId,
        player_id: PlayerId,
    },
    #[error("connection {connection} sent `{action}` before joining")]
    UnjoinedAction {
        connection: ConnectionId,
        action: &'static str,
    },
    #[error("delivery to connection {connection} failed: {detail}")]
    PeerDelivery {
        connection: ConnectionId,
        detail: String,
    },
}
