/// Room server actor.
///
/// Owns the single `Room` of the process. Every connection event and every
/// round timer is one handler invocation on this actor, so room mutations
/// never interleave.
use actix::prelude::*;
use chrono::Utc;
use log::debug;

use crate::config::room::RoomConfig;
use crate::game::events::{ClientEvent, ServerEvent};
use crate::game::machine::Scheduled;
use crate::game::room::{Room, RoomSnapshot};
use crate::game::types::ConnectionId;

pub struct RoomServer {
    room: Room<Recipient<ServerEvent>>,
}

impl RoomServer {
    pub fn new(config: RoomConfig) -> Self {
        Self {
            room: Room::new(config),
        }
    }

    /// Turn engine proposals into actor timers. Timers are fire-and-forget;
    /// the transition itself checks whether it is still current.
    fn schedule(&mut self, pending: Vec<Scheduled>, ctx: &mut Context<Self>) {
        for Scheduled { delay, transition } in pending {
            debug!("[Room] Scheduling {:?} in {:?}", transition.kind, delay);
            ctx.run_later(delay, move |act, ctx| {
                let next = act.room.fire(transition, Utc::now());
                act.schedule(next, ctx);
            });
        }
    }
}

impl Actor for RoomServer {
    type Context = Context<Self>;
}

/// Message: a transport connection opened.
#[derive(Message)]
#[rtype(result = "()")]
pub struct Connect {
    pub id: ConnectionId,
    pub addr: Recipient<ServerEvent>,
}

/// Message: a transport connection closed.
#[derive(Message)]
#[rtype(result = "()")]
pub struct Disconnect {
    pub id: ConnectionId,
}

/// Message: a parsed client event from a connection.
#[derive(Message)]
#[rtype(result = "()")]
pub struct ClientMessage {
    pub id: ConnectionId,
    pub event: ClientEvent,
}

/// Message: read the current room state.
#[derive(Message)]
#[rtype(result = "RoomSnapshot")]
pub struct GetSnapshot;

impl Handler<Connect> for RoomServer {
    type Result = ();

    fn handle(&mut self, msg: Connect, _ctx: &mut Self::Context) -> Self::Result {
        self.room.connect(msg.id, msg.addr);
    }
}

impl Handler<Disconnect> for RoomServer {
    type Result = ();

    fn handle(&mut self, msg: Disconnect, _ctx: &mut Self::Context) -> Self::Result {
        self.room.disconnect(msg.id);
    }
}

impl Handler<ClientMessage> for RoomServer {
    type Result = ();

    fn handle(&mut self, msg: ClientMessage, ctx: &mut Self::Context) -> Self::Result {
        let pending = self.room.handle(msg.id, msg.event);
        self.schedule(pending, ctx);
    }
}

impl Handler<GetSnapshot> for RoomServer {
    type Result = MessageResult<GetSnapshot>;

    fn handle(&mut self, _msg: GetSnapshot, _ctx: &mut Self::Context) -> Self::Result {
        MessageResult(self.room.snapshot())
    }
}
