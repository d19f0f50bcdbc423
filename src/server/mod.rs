// src/server/mod.rs

//! Server layer root module.
//!
//! This module binds the room engine to the network:
//! - Application state management
//! - HTTP/WebSocket routing
//! - Room server actor (owns the room, runs round timers)
//! - Per-connection WebSocket session actors

pub mod state;
pub mod router;
pub mod room;
