//! Process configuration read from environment variables.

use std::str::FromStr;
use std::time::Duration;

use podium_lobby::{DeparturePolicy, LobbyConfig};

/// Default listening port.
pub const DEFAULT_PORT: u16 = 3000;

/// Default bind host: all interfaces.
pub const DEFAULT_BIND_HOST: &str = "0.0.0.0";

/// Settings for the `podium-server` binary.
///
/// | variable                    | effect                                   |
/// |-----------------------------|------------------------------------------|
/// | `PORT`                      | listening port (default 3000)            |
/// | `PODIUM_BIND_HOST`          | bind host (default `0.0.0.0`)            |
/// | `PODIUM_TURN_TIMEOUT_SECS`  | per-turn timeout, unset or 0 for none    |
/// | `PODIUM_ROUND_LIMIT`        | rounds per match                         |
/// | `PODIUM_LOBBY_CAPACITY`     | players per lobby                        |
/// | `PODIUM_LEGACY_TURN_REPAIR` | `1`/`true` selects the legacy advance    |
///
/// Unparsable values are logged and ignored.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerConfig {
    pub bind_host: String,
    pub port: u16,
    pub lobby: LobbyConfig,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_host: DEFAULT_BIND_HOST.to_owned(),
            port: DEFAULT_PORT,
            lobby: LobbyConfig::default(),
        }
    }
}

impl ServerConfig {
    /// Reads the process environment.
    pub fn from_env() -> Self {
        Self::from_vars(|key| std::env::var(key).ok())
    }

    /// Builds a config from any key lookup.
    pub fn from_vars(var: impl Fn(&str) -> Option<String>) -> Self {
        let mut config = Self::default();

        if let Some(host) = var("PODIUM_BIND_HOST").filter(|h| !h.trim().is_empty()) {
            config.bind_host = host.trim().to_owned();
        }
        if let Some(port) = parsed(&var, "PORT") {
            config.port = port;
        }
        if let Some(secs) = parsed(&var, "PODIUM_TURN_TIMEOUT_SECS") {
            config.lobby.turn_timeout =
                (secs > 0).then(|| Duration::from_secs(secs));
        }
        if let Some(rounds) = parsed(&var, "PODIUM_ROUND_LIMIT") {
            config.lobby.round_limit = rounds;
        }
        if let Some(capacity) = parsed(&var, "PODIUM_LOBBY_CAPACITY") {
            config.lobby.capacity = capacity;
        }
        if let Some(flag) = var("PODIUM_LEGACY_TURN_REPAIR") {
            if is_truthy(&flag) {
                config.lobby.departure_policy = DeparturePolicy::AdvanceTurn;
            }
        }

        config.lobby = config.lobby.validated();
        config
    }

    /// `host:port` for [`PodiumServerBuilder::bind`](crate::PodiumServerBuilder::bind).
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.bind_host, self.port)
    }
}

fn parsed<T: FromStr>(var: &impl Fn(&str) -> Option<String>, key: &str) -> Option<T> {
    let raw = var(key)?;
    match raw.trim().parse() {
        Ok(value) => Some(value),
        Err(_) => {
            tracing::warn!(key, value = %raw, "ignoring unparsable environment variable");
            None
        }
    }
}

fn is_truthy(raw: &str) -> bool {
    matches!(
        raw.trim().to_ascii_lowercase().as_str(),
        "1" | "true" | "yes" | "on"
    )
}
