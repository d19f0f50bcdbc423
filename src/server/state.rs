// src/server/state.rs

//! Application state for the backend server.
//!
//! Holds the address of the room server actor, shared between the
//! WebSocket handlers and the actor system.

use actix::Addr;
use crate::server::room::RoomServer;

/// Shared application state, injected into HTTP/WebSocket handlers.
pub struct AppState {
    /// Address of the room server actor (presence, chat, round state machine).
    pub room_addr: Addr<RoomServer>,
}

impl AppState {
    pub fn new(room_addr: Addr<RoomServer>) -> Self {
        AppState { room_addr }
    }
}
