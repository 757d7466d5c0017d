//! # Configuration State
//!
//! Server configuration loaded once at startup.
//!
//! ## Configuration Sources (Priority Order)
//! 1. Environment variables (`KIOSK_*`)
//! 2. Defaults (this file)
//!
//! | Variable                   | Default          |
//! |----------------------------|------------------|
//! | `KIOSK_DB_PATH`            | `./kiosk.db`     |
//! | `KIOSK_BIND_ADDR`          | `127.0.0.1:8080` |
//! | `KIOSK_ALLOWED_HOSTS`      | request `Host`   |
//! | `KIOSK_SECURE_COOKIES`     | `false`          |
//! | `KIOSK_SESSION_TTL_SECS`   | `7200`           |
//! | `KIOSK_DB_MAX_CONNECTIONS` | `5`              |
//!
//! ## Thread Safety
//! Configuration is read-only after initialization and shared as
//! `Arc<ConfigState>`.

use std::env;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use serde::Serialize;

/// Server configuration.
#[derive(Debug, Clone, Serialize)]
pub struct ConfigState {
    /// SQLite database file.
    pub db_path: PathBuf,

    /// Maximum pooled database connections.
    pub db_max_connections: u32,

    /// Address the HTTP listener binds to.
    pub bind_addr: SocketAddr,

    /// Hosts a mutating request's `Origin`/`Referer` may name.
    /// Empty means the request's own `Host`.
    pub allowed_hosts: Vec<String>,

    /// Mark the session cookie `Secure` (HTTPS deployments).
    pub secure_cookies: bool,

    /// Idle time after which a session and its cart expire.
    #[serde(with = "duration_secs")]
    pub session_ttl: Duration,
}

impl Default for ConfigState {
    fn default() -> Self {
        ConfigState {
            db_path: PathBuf::from("./kiosk.db"),
            db_max_connections: 5,
            bind_addr: SocketAddr::from(([127, 0, 0, 1], 8080)),
            allowed_hosts: Vec::new(),
            secure_cookies: false,
            session_ttl: Duration::from_secs(7200),
        }
    }
}

impl ConfigState {
    /// Loads configuration from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Loads configuration from any key lookup. Unset keys keep defaults.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = ConfigState::default();

        let config = ConfigState {
            db_path: lookup("KIOSK_DB_PATH")
                .map(PathBuf::from)
                .unwrap_or(defaults.db_path),

            db_max_connections: parse_or(&lookup, "KIOSK_DB_MAX_CONNECTIONS", defaults.db_max_connections)?,

            bind_addr: parse_or(&lookup, "KIOSK_BIND_ADDR", defaults.bind_addr)?,

            allowed_hosts: lookup("KIOSK_ALLOWED_HOSTS")
                .map(|raw| parse_hosts(&raw))
                .unwrap_or(defaults.allowed_hosts),

            secure_cookies: parse_or(&lookup, "KIOSK_SECURE_COOKIES", defaults.secure_cookies)?,

            session_ttl: Duration::from_secs(parse_or(
                &lookup,
                "KIOSK_SESSION_TTL_SECS",
                defaults.session_ttl.as_secs(),
            )?),
        };

        if config.db_max_connections == 0 {
            return Err(ConfigError::InvalidValue("KIOSK_DB_MAX_CONNECTIONS".to_string()));
        }
        if config.session_ttl.is_zero() {
            return Err(ConfigError::InvalidValue("KIOSK_SESSION_TTL_SECS".to_string()));
        }

        Ok(config)
    }
}

fn parse_or<F, T>(lookup: &F, key: &str, default: T) -> Result<T, ConfigError>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
{
    match lookup(key) {
        Some(raw) if !raw.trim().is_empty() => raw
            .trim()
            .parse()
            .map_err(|_| ConfigError::InvalidValue(key.to_string())),
        _ => Ok(default),
    }
}

/// Comma separated host names, trimmed and lower-cased.
fn parse_hosts(raw: &str) -> Vec<String> {
    let mut hosts: Vec<String> = raw
        .split(',')
        .map(|h| h.trim().to_ascii_lowercase())
        .filter(|h| !h.is_empty())
        .collect();
    hosts.dedup();
    hosts
}

mod duration_secs {
    use serde::Serializer;
    use std::time::Duration;

    pub fn serialize<S: Serializer>(value: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u64(value.as_secs())
    }
}

/// Configuration error types.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid value for {0}")]
    InvalidValue(String),
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key: &str| map.get(key).cloned()
    }

    #[test]
    fn test_defaults() {
        let config = ConfigState::from_lookup(lookup_from(&[])).unwrap();
        assert_eq!(config.db_path, PathBuf::from("./kiosk.db"));
        assert_eq!(config.bind_addr.port(), 8080);
        assert!(config.allowed_hosts.is_empty());
        assert!(!config.secure_cookies);
        assert_eq!(config.session_ttl, Duration::from_secs(7200));
        assert_eq!(config.db_max_connections, 5);
    }

    #[test]
    fn test_overrides() {
        let config = ConfigState::from_lookup(lookup_from(&[
            ("KIOSK_BIND_ADDR", "0.0.0.0:9000"),
            ("KIOSK_ALLOWED_HOSTS", " Kiosk.Example.com, ,localhost"),
            ("KIOSK_SECURE_COOKIES", "true"),
            ("KIOSK_SESSION_TTL_SECS", "60"),
        ]))
        .unwrap();

        assert_eq!(config.bind_addr.port(), 9000);
        assert_eq!(config.allowed_hosts, ["kiosk.example.com", "localhost"]);
        assert!(config.secure_cookies);
        assert_eq!(config.session_ttl, Duration::from_secs(60));
    }

    #[test]
    fn test_invalid_values() {
        let err = ConfigState::from_lookup(lookup_from(&[("KIOSK_BIND_ADDR", "nowhere")])).unwrap_err();
        assert!(err.to_string().contains("KIOSK_BIND_ADDR"));

        assert!(ConfigState::from_lookup(lookup_from(&[("KIOSK_DB_MAX_CONNECTIONS", "0")])).is_err());
        assert!(ConfigState::from_lookup(lookup_from(&[("KIOSK_SECURE_COOKIES", "yes")])).is_err());
    }
}
