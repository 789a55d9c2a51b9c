//! `[serve]` section configuration.
//!
//! Contains development server settings.
//!
//! # Example
//!
//! ```toml
//! [serve]
//! interface = "127.0.0.1"     # Network interface (127.0.0.1 = localhost only)
//! port = 8080                 # HTTP port; the push channel listens on port + 1
//! heartbeat_secs = 5          # Push channel liveness ping interval
//! debounce_ms = 300           # Quiet window before a burst of changes rebuilds
//! open = true                 # Launch the browser on start
//! ```
//!
//! Use `interface = "0.0.0.0"` to make the server accessible from LAN.

use std::net::{IpAddr, Ipv4Addr};
use std::time::Duration;

use serde::Deserialize;

/// Development server settings.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServeConfig {
    /// Network interface to bind.
    /// - `127.0.0.1` (default): localhost only
    /// - `0.0.0.0`: all interfaces (LAN accessible)
    pub interface: IpAddr,

    /// HTTP port number.
    pub port: u16,

    /// Seconds between heartbeat pings of push-channel sessions.
    pub heartbeat_secs: u64,

    /// Milliseconds of filesystem quiet before a rebuild starts.
    pub debounce_ms: u64,

    /// Open the served site in the default browser.
    pub open: bool,
}

impl Default for ServeConfig {
    fn default() -> Self {
        Self {
            interface: IpAddr::V4(Ipv4Addr::new(127, 0, 0, 1)),
            port: 8080,
            heartbeat_secs: 5,
            debounce_ms: 300,
            open: true,
        }
    }
}

impl ServeConfig {
    /// Port the push channel tries first.
    pub fn ws_port(&self) -> u16 {
        self.port.saturating_add(1)
    }

    pub fn heartbeat(&self) -> Duration {
        Duration::from_secs(self.heartbeat_secs)
    }

    pub fn debounce(&self) -> Duration {
        Duration::from_millis(self.debounce_ms)
    }
}

#[cfg(test)]
mod tests {
    use std::net::{IpAddr, Ipv4Addr, Ipv6Addr};
    use std::time::Duration;

    use crate::config::test_parse_config;

    #[test]
    fn test_serve_config() {
        let config = test_parse_config(
            "[serve]\ninterface = \"0.0.0.0\"\nport = 3000\nheartbeat_secs = 10",
        );

        assert_eq!(
            config.serve.interface,
            IpAddr::V4(Ipv4Addr::new(0, 0, 0, 0))
        );
        assert_eq!(config.serve.port, 3000);
        assert_eq!(config.serve.ws_port(), 3001);
        assert_eq!(config.serve.heartbeat(), Duration::from_secs(10));
    }

    #[test]
    fn test_serve_config_defaults() {
        let config = test_parse_config("");

        assert_eq!(
            config.serve.interface,
            IpAddr::V4(Ipv4Addr::new(127, 0, 0, 1))
        );
        assert_eq!(config.serve.port, 8080);
        assert_eq!(config.serve.ws_port(), 8081);
        assert_eq!(config.serve.heartbeat(), Duration::from_secs(5));
        assert_eq!(config.serve.debounce(), Duration::from_millis(300));
        assert!(config.serve.open);
    }

    #[test]
    fn test_serve_config_ipv6() {
        let config = test_parse_config("[serve]\ninterface = \"::1\"");
        assert_eq!(
            config.serve.interface,
            IpAddr::V6(Ipv6Addr::new(0, 0, 0, 0, 0, 0, 0, 1))
        );
    }
}
