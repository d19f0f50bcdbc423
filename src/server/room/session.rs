/// WebSocket session handler for the room.
///
/// One actor per client connection. It registers with the room server when
/// started, unregisters when stopped, forwards parsed client events and
/// serializes server events back to the client. Malformed frames are logged
/// and dropped; nothing is echoed back.
use std::time::Instant;

use actix::prelude::*;
use actix_web::{Error, HttpRequest, HttpResponse, web};
use actix_web_actors::ws;
use log::{debug, info, warn};
use uuid::Uuid;

use super::server::{ClientMessage, Connect, Disconnect, RoomServer};
use crate::config::server::{CLIENT_TIMEOUT, HEARTBEAT_INTERVAL};
use crate::game::events::{ClientEvent, ServerEvent};
use crate::game::types::ConnectionId;

pub struct RoomSession {
    pub id: ConnectionId,
    pub room_addr: Addr<RoomServer>,
    last_heartbeat: Instant,
}

impl RoomSession {
    pub fn new(room_addr: Addr<RoomServer>) -> Self {
        Self {
            id: Uuid::new_v4(),
            room_addr,
            last_heartbeat: Instant::now(),
        }
    }

    /// Ping the client periodically; close the connection if it went silent.
    fn start_heartbeat(&self, ctx: &mut ws::WebsocketContext<Self>) {
        ctx.run_interval(HEARTBEAT_INTERVAL, |act, ctx| {
            if Instant::now().duration_since(act.last_heartbeat) > CLIENT_TIMEOUT {
                warn!("[RoomSession] Connection {} heartbeat timed out", act.id);
                ctx.close(Some(ws::CloseReason::from(ws::CloseCode::Normal)));
                ctx.stop();
                return;
            }
            ctx.ping(b"");
        });
    }
}

impl Actor for RoomSession {
    type Context = ws::WebsocketContext<Self>;

    /// Registers the connection with the room server.
    fn started(&mut self, ctx: &mut Self::Context) {
        info!("[RoomSession] Connection {} opened", self.id);
        self.room_addr.do_send(Connect {
            id: self.id,
            addr: ctx.address().recipient(),
        });
        self.start_heartbeat(ctx);
    }

    /// Removes the connection (and its player, if any) from the room.
    fn stopped(&mut self, _ctx: &mut Self::Context) {
        info!("[RoomSession] Connection {} closed", self.id);
        self.room_addr.do_send(Disconnect { id: self.id });
    }
}

impl StreamHandler<Result<ws::Message, ws::ProtocolError>> for RoomSession {
    fn handle(&mut self, msg: Result<ws::Message, ws::ProtocolError>, ctx: &mut Self::Context) {
        match msg {
            Ok(ws::Message::Text(text)) => {
                self.last_heartbeat = Instant::now();
                if let Some(event) = parse_frame(self.id, &text) {
                    debug!("[RoomSession] Connection {} sent `{}`", self.id, event.name());
                    self.room_addr.do_send(ClientMessage { id: self.id, event });
                }
            }
            Ok(ws::Message::Ping(msg)) => {
                self.last_heartbeat = Instant::now();
                ctx.pong(&msg);
            }
            Ok(ws::Message::Pong(_)) => self.last_heartbeat = Instant::now(),
            Ok(ws::Message::Close(reason)) => {
                ctx.close(reason);
                ctx.stop();
            }
            Err(e) => {
                warn!("[RoomSession] Connection {} protocol error: {}", self.id, e);
                ctx.stop();
            }
            _ => (),
        }
    }
}

impl Handler<ServerEvent> for RoomSession {
    type Result = ();

    /// Writes a server event to the client.
    fn handle(&mut self, msg: ServerEvent, ctx: &mut Self::Context) {
        match serde_json::to_string(&msg) {
            Ok(text) => ctx.text(text),
            Err(e) => warn!("[RoomSession] Failed to serialize `{}`: {}", msg.name(), e),
        }
    }
}

/// Decode one text frame. Invalid JSON and unknown events yield `None`.
fn parse_frame(id: ConnectionId, text: &str) -> Option<ClientEvent> {
    match serde_json::from_str::<ClientEvent>(text) {
        Ok(event) => Some(event),
        Err(e) => {
            debug!("[RoomSession] Connection {} sent invalid frame: {}", id, e);
            None
        }
    }
}

/// WebSocket endpoint for the room.
pub async fn ws_room(
    req: HttpRequest,
    stream: web::Payload,
    data: web::Data<crate::server::state::AppState>,
) -> Result<HttpResponse, Error> {
    ws::start(RoomSession::new(data.room_addr.clone()), &req, stream)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::types::Position;

    fn parse(text: &str) -> Option<ClientEvent> {
        parse_frame(Uuid::new_v4(), text)
    }

    #[test]
    fn malformed_frames_are_dropped() {
        assert_eq!(parse("not json"), None);
        assert_eq!(parse(r#"{"data":{}}"#), None);
        assert_eq!(parse(r#"{"event":"fly","data":{}}"#), None);
        assert_eq!(parse(r#"{"event":"chat","data":{}}"#), None);
    }

    #[test]
    fn typing_frames_parse_with_or_without_data() {
        assert_eq!(parse(r#"{"event":"typing","data":{}}"#), Some(ClientEvent::Typing));
        assert_eq!(parse(r#"{"event":"stopTyping"}"#), Some(ClientEvent::StopTyping));
    }

    #[test]
    fn join_frame_carries_optional_position() {
        assert_eq!(
            parse(r#"{"event":"join","data":{"username":"ana","position":{"x":1,"y":2}}}"#),
            Some(ClientEvent::Join {
                username: "ana".into(),
                position: Some(Position::new(1.0, 2.0, 0.0)),
            })
        );
    }
}
