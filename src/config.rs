//! # Bot Configuration Module
//!
//! Runtime settings read from the environment (optionally through a `.env`
//! file loaded by `main`).

use std::time::Duration;
use thiserror::Error;

// Defaults for optional settings
pub const DEFAULT_SESSION_TTL_SECS: u64 = 24 * 60 * 60; // 1 day
pub const DEFAULT_SESSION_SWEEP_SECS: u64 = 10 * 60; // 10 minutes
pub const DEFAULT_DB_MAX_CONNECTIONS: u32 = 5;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{0} must be set")]
    Missing(&'static str),
    #[error("{name} has an invalid value: {value:?}")]
    Invalid { name: &'static str, value: String },
}

/// Session store settings
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionConfig {
    /// Sessions idle for longer than this are dropped
    pub ttl: Duration,
    /// How often the background sweeper runs
    pub sweep_interval: Duration,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            ttl: Duration::from_secs(DEFAULT_SESSION_TTL_SECS),
            sweep_interval: Duration::from_secs(DEFAULT_SESSION_SWEEP_SECS),
        }
    }
}

/// Configuration for the bot process
#[derive(Debug, Clone)]
pub struct BotConfig {
    /// Telegram bot token (`TELEGRAM_BOT_TOKEN`)
    pub telegram_bot_token: String,
    /// Postgres URL (`DATABASE_URL`); in-memory storage when absent
    pub database_url: Option<String>,
    /// Pool size for the Postgres connection pool
    pub db_max_connections: u32,
    pub session: SessionConfig,
}

impl BotConfig {
    /// Read the configuration from process environment variables
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Build the configuration from any variable lookup
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let non_empty = |name: &str| lookup(name).filter(|value| !value.trim().is_empty());

        let telegram_bot_token =
            non_empty("TELEGRAM_BOT_TOKEN").ok_or(ConfigError::Missing("TELEGRAM_BOT_TOKEN"))?;

        let parse_u64 = |name: &'static str, default: u64| -> Result<u64, ConfigError> {
            match non_empty(name) {
                Some(value) => value
                    .trim()
                    .parse()
                    .map_err(|_| ConfigError::Invalid { name, value }),
                None => Ok(default),
            }
        };

        let ttl = parse_u64("SESSION_TTL_SECS", DEFAULT_SESSION_TTL_SECS)?;
        let sweep = parse_u64("SESSION_SWEEP_SECS", DEFAULT_SESSION_SWEEP_SECS)?;
        if sweep == 0 {
            return Err(ConfigError::Invalid {
                name: "SESSION_SWEEP_SECS",
                value: "0".to_string(),
            });
        }

        let db_max_connections =
            parse_u64("DB_MAX_CONNECTIONS", u64::from(DEFAULT_DB_MAX_CONNECTIONS))?;
        let db_max_connections = u32::try_from(db_max_connections)
            .ok()
            .filter(|n| *n > 0)
            .ok_or_else(|| ConfigError::Invalid {
                name: "DB_MAX_CONNECTIONS",
                value: db_max_connections.to_string(),
            })?;

        Ok(Self {
            telegram_bot_token,
            database_url: non_empty("DATABASE_URL"),
            db_max_connections,
            session: SessionConfig {
                ttl: Duration::from_secs(ttl),
                sweep_interval: Duration::from_secs(sweep),
            },
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |name| vars.get(name).cloned()
    }

    #[test]
    fn test_defaults() {
        let config = BotConfig::from_lookup(lookup(&[("TELEGRAM_BOT_TOKEN", "123:abc")])).unwrap();
        assert_eq!(config.telegram_bot_token, "123:abc");
        assert_eq!(config.database_url, None);
        assert_eq!(config.db_max_connections, DEFAULT_DB_MAX_CONNECTIONS);
        assert_eq!(config.session, SessionConfig::default());
    }

    #[test]
    fn test_missing_token() {
        let err = BotConfig::from_lookup(lookup(&[("TELEGRAM_BOT_TOKEN", "  ")])).unwrap_err();
        assert_eq!(err, ConfigError::Missing("TELEGRAM_BOT_TOKEN"));
    }

    #[test]
    fn test_overrides() {
        let config = BotConfig::from_lookup(lookup(&[
            ("TELEGRAM_BOT_TOKEN", "t"),
            ("DATABASE_URL", "postgres://localhost/shopping"),
            ("SESSION_TTL_SECS", "120"),
            ("SESSION_SWEEP_SECS", "30"),
            ("DB_MAX_CONNECTIONS", "10"),
        ]))
        .unwrap();

        assert_eq!(config.database_url.as_deref(), Some("postgres://localhost/shopping"));
        assert_eq!(config.session.ttl, Duration::from_secs(120));
        assert_eq!(config.session.sweep_interval, Duration::from_secs(30));
        assert_eq!(config.db_max_connections, 10);
    }

    #[test]
    fn test_invalid_numbers() {
        let err = BotConfig::from_lookup(lookup(&[
            ("TELEGRAM_BOT_TOKEN", "t"),
            ("SESSION_TTL_SECS", "forever"),
        ]))
        .unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { name: "SESSION_TTL_SECS", .. }));

        let err = BotConfig::from_lookup(lookup(&[
            ("TELEGRAM_BOT_TOKEN", "t"),
            ("SESSION_SWEEP_SECS", "0"),
        ]))
        .unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { name: "SESSION_SWEEP_SECS", .. }));
    }
}
