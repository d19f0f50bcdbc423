/// Main configuration module.
///
/// Re-exports submodules for room (round timing, quorum) and server configuration.
pub mod room;
pub mod server;
