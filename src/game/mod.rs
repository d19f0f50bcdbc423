//! Transport-free room engine.
//!
//! - `registry`: connections and their attached players
//! - `broadcast`: unicast / all-but-one / all fan-out
//! - `state`: phase, user count, round counter
//! - `machine`: guarded round transitions
//! - `room`: per-connection protocol (join, chat, typing, move, leave)

pub mod broadcast;
pub mod error;
pub mod events;
pub mod machine;
pub mod registry;
pub mod room;
pub mod state;
pub mod types;
