//! Environment configuration.

use guess_commit_core::{GameError, GuessRange};
use std::str::FromStr;
use std::time::Duration;
use tracing::warn;

const DEFAULT_PORT: u16 = 5000;
const DEFAULT_BUDGET: u32 = 10;
const DEFAULT_TTL_SECS: u64 = 3600;

/// Settings read once at start-up
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ServerConfig {
    pub port: u16,
    pub range: GuessRange,
    pub guess_budget: u32,
    /// Zero disables expiry
    pub session_ttl: Duration,
}

impl ServerConfig {
    /// Read `PORT`, `GUESS_MIN`, `GUESS_MAX`, `GUESS_BUDGET`, `SESSION_TTL_SECS`
    pub fn from_env() -> Result<Self, GameError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Same as `from_env` with a custom variable source
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, GameError> {
        let port = parse_or(&lookup, "PORT", DEFAULT_PORT);
        let defaults = GuessRange::default();
        let min = parse_or(&lookup, "GUESS_MIN", defaults.min());
        let max = parse_or(&lookup, "GUESS_MAX", defaults.max());
        let guess_budget = parse_or(&lookup, "GUESS_BUDGET", DEFAULT_BUDGET);
        let ttl_secs = parse_or(&lookup, "SESSION_TTL_SECS", DEFAULT_TTL_SECS);

        if guess_budget == 0 {
            return Err(GameError::InvalidConfig(
                "GUESS_BUDGET must be at least 1".to_string(),
            ));
        }

        Ok(Self {
            port,
            range: GuessRange::new(min, max)?,
            guess_budget,
            session_ttl: Duration::from_secs(ttl_secs),
        })
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            port: DEFAULT_PORT,
            range: GuessRange::default(),
            guess_budget: DEFAULT_BUDGET,
            session_ttl: Duration::from_secs(DEFAULT_TTL_SECS),
        }
    }
}

fn parse_or<T: FromStr>(lookup: &impl Fn(&str) -> Option<String>, key: &str, default: T) -> T {
    match lookup(key) {
        None => default,
        Some(raw) => raw.trim().parse().unwrap_or_else(|_| {
            warn!(key, value = %raw, "unparseable setting, using default");
            default
        }),
    }
}
