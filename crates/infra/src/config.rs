//! Configuration loading and representation.
//!
//! Everything is read from environment variables; unset variables fall back
//! to local-development defaults.

use std::net::SocketAddr;
use std::time::Duration;

use thiserror::Error;

pub const DEFAULT_DATABASE_URL: &str = "postgres://postgres@127.0.0.1:5432/branches";
pub const DEFAULT_BIND_ADDR: &str = "127.0.0.1:8080";
pub const DEFAULT_MAX_CONNECTIONS: u32 = 10;
pub const DEFAULT_ACQUIRE_TIMEOUT: Duration = Duration::from_secs(5);

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("invalid value {value:?} for {key}: {reason}")]
    Invalid {
        key: &'static str,
        value: String,
        reason: String,
    },
}

/// Which storage backend the process runs against.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreBackend {
    Postgres,
    /// Non-persistent; for local development and tests.
    InMemory,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: u32,
    pub acquire_timeout: Duration,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            url: DEFAULT_DATABASE_URL.to_string(),
            max_connections: DEFAULT_MAX_CONNECTIONS,
            acquire_timeout: DEFAULT_ACQUIRE_TIMEOUT,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub bind_addr: SocketAddr,
    pub backend: StoreBackend,
    pub database: DatabaseConfig,
}

impl Config {
    /// Load configuration from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load configuration through an arbitrary variable lookup.
    ///
    /// | Variable | Default |
    /// |---|---|
    /// | `DATABASE_URL` | [`DEFAULT_DATABASE_URL`] |
    /// | `BIND_ADDR` | [`DEFAULT_BIND_ADDR`] |
    /// | `DB_MAX_CONNECTIONS` | [`DEFAULT_MAX_CONNECTIONS`] |
    /// | `DB_ACQUIRE_TIMEOUT_SECS` | 5 |
    /// | `USE_IN_MEMORY_STORE` | `false` |
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let bind_addr = parse_or(&lookup, "BIND_ADDR", DEFAULT_BIND_ADDR.parse().ok())?;

        let use_in_memory = parse_or(&lookup, "USE_IN_MEMORY_STORE", Some(false))?;
        let backend = if use_in_memory {
            StoreBackend::InMemory
        } else {
            StoreBackend::Postgres
        };

        let max_connections =
            parse_or(&lookup, "DB_MAX_CONNECTIONS", Some(DEFAULT_MAX_CONNECTIONS))?;
        if max_connections == 0 {
            return Err(ConfigError::Invalid {
                key: "DB_MAX_CONNECTIONS",
                value: "0".to_string(),
                reason: "pool needs at least one connection".to_string(),
            });
        }

        let acquire_timeout_secs = parse_or(
            &lookup,
            "DB_ACQUIRE_TIMEOUT_SECS",
            Some(DEFAULT_ACQUIRE_TIMEOUT.as_secs()),
        )?;

        let url = lookup("DATABASE_URL").unwrap_or_else(|| DEFAULT_DATABASE_URL.to_string());

        Ok(Self {
            bind_addr,
            backend,
            database: DatabaseConfig {
                url,
                max_connections,
                acquire_timeout: Duration::from_secs(acquire_timeout_secs),
            },
        })
    }
}

fn parse_or<F, T>(lookup: &F, key: &'static str, default: Option<T>) -> Result<T, ConfigError>
where
    F: Fn(&str) -> Option<String>,
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    match lookup(key) {
        Some(raw) => raw.trim().parse::<T>().map_err(|e| ConfigError::Invalid {
            key,
            value: raw.clone(),
            reason: e.to_string(),
        }),
        None => default.ok_or_else(|| ConfigError::Invalid {
            key,
            value: String::new(),
            reason: "no default available".to_string(),
        }),
    }
}
