//! Server configuration loaded from the environment.

/// Read an env var and parse it, falling back to a default on absence or parse
/// failure (with a warning, so typos don't silently change behavior).
fn env_parse<T: std::str::FromStr>(key: &str, default: T) -> T {
    match std::env::var(key) {
        Ok(raw) => raw.trim().parse().unwrap_or_else(|_| {
            tracing::warn!("Invalid value for {}: {:?}, using default", key, raw);
            default
        }),
        Err(_) => default,
    }
}

#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// TCP port for the HTTP listener.
    pub port: u16,
    /// Attempts at generating an unused room code before giving up.
    pub code_retry_cap: u32,
    /// Window within which a room code is considered taken.
    pub code_recency_hours: i64,
    /// Round limit applied to rooms that don't specify their own.
    pub default_round_limit: u32,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            // 7187 is ascii for "GW"
            port: 7187,
            code_retry_cap: 32,
            code_recency_hours: 24,
            default_round_limit: 8,
        }
    }
}

impl ServerConfig {
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            port: env_parse("GUESSWHO_PORT", defaults.port),
            code_retry_cap: env_parse("ROOM_CODE_RETRY_CAP", defaults.code_retry_cap),
            code_recency_hours: env_parse("ROOM_CODE_RECENCY_HOURS", defaults.code_recency_hours),
            default_round_limit: env_parse("DEFAULT_ROUND_LIMIT", defaults.default_round_limit),
        }
    }
}
