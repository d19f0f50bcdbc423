//! Main entry point for the room server.
//!
//! Initializes logging and the room server actor, then launches the HTTP
//! server exposing the room's WebSocket endpoint.

use actix::Actor;
use actix_web::{App, HttpServer, web};
use log::info;

use config::room::RoomConfig;
use config::server::ServerConfig;
use server::room::RoomServer;

pub mod config;
mod game;
mod server;

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    // Initialize logger from environment variable (default to info level).
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let server_config = ServerConfig::from_env();
    let room_config = RoomConfig::from_env();
    info!("[Main] Room config: {:?}", room_config);

    // Start the RoomServer actor (owns the only room of this process).
    let room_addr = RoomServer::new(room_config).start();

    // Shared application state for WebSocket handlers.
    let state = web::Data::new(server::state::AppState::new(room_addr));

    info!("[Main] Server listening at {}", server_config.bind_addr());
    HttpServer::new(move || {
        App::new()
            .app_data(state.clone())
            .configure(crate::server::router::config)
    })
    .bind(server_config.bind_addr())?
    .run()
    .await
}
