//! HTTP and WebSocket routing configuration.
//!
//! A single WebSocket endpoint; every connection gets its own session actor.

use actix_web::web;
use crate::server::room::session::ws_room;

/// Configure the application's HTTP/WebSocket routes.
pub fn config(cfg: &mut web::ServiceConfig) {
    cfg.service(web::resource("/ws").to(ws_room));
}
