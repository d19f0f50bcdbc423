/// HTTP/WebSocket server configuration.
///
/// Bind address comes from `HOST` / `PORT`; heartbeat timings are fixed.
use std::time::Duration;

/// How often the server pings each WebSocket client.
pub const HEARTBEAT_INTERVAL: Duration = Duration::from_secs(20);

/// A client silent for longer than this is considered gone and disconnected.
pub const CLIENT_TIMEOUT: Duration = Duration::from_secs(40);

#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

impl ServerConfig {
    /// Load configuration from environment variables with defaults.
    pub fn from_env() -> Self {
        let defaults = Self::default();
        ServerConfig {
            host: std::env::var("HOST").unwrap_or(defaults.host),
            port: std::env::var("PORT")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.port),
        }
    }

    /// Socket address string for binding.
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        ServerConfig {
            host: "0.0.0.0".to_string(),
            port: 3000,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_bind_addr() {
        let config = ServerConfig::default();
        assert_eq!(config.bind_addr(), "0.0.0.0:3000");
    }
}
