// Rust guideline compliant 2026-10-18

//! Process configuration read from the environment.
//!
//! | Variable                 | Default                  |
//! |--------------------------|--------------------------|
//! | `TICKET_DESK_DB_URL`     | `sqlite:ticket_desk.db`  |
//! | `TICKET_DESK_ADDR`       | `127.0.0.1:8080`         |
//! | `TICKET_DESK_URL`        | `http://127.0.0.1:8080/` |
//! | `TICKET_DESK_TIMEOUT_MS` | `5000`                   |
//!
//! A `.env` file in the working directory is loaded first when present.

use anyhow::Context as _;
use std::net::SocketAddr;
use std::time::Duration;

/// Environment variable naming the `SQLite` database.
pub const DB_URL_VAR: &str = "TICKET_DESK_DB_URL";
/// Environment variable naming the server's listen address.
pub const ADDR_VAR: &str = "TICKET_DESK_ADDR";
/// Environment variable naming the desk URL a door terminal calls.
pub const URL_VAR: &str = "TICKET_DESK_URL";
/// Environment variable holding the per-call timeout in milliseconds.
pub const TIMEOUT_VAR: &str = "TICKET_DESK_TIMEOUT_MS";

/// A variable was set to something unusable.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConfigError {
    /// Value could not be parsed or is out of range.
    #[error("invalid {key}: {value:?} ({reason})")]
    Invalid {
        /// Variable name.
        key: &'static str,
        /// Offending value.
        value: String,
        /// Why it was rejected.
        reason: String,
    },
}

/// Settings shared by the `ticket_desk` and `ticket_scan` binaries.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeskConfig {
    /// `sqlx` connection URL of the ticket database.
    pub db_url: String,
    /// Address the server binds.
    pub listen_addr: SocketAddr,
    /// Endpoint a door terminal posts to.
    pub desk_url: reqwest::Url,
    /// Upper bound on one desk call, client side.
    pub call_timeout: Duration,
}

impl DeskConfig {
    /// Read from the process environment.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] for any unparsable value.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Read through `lookup`; unset variables take their defaults.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] for any unparsable value, or a zero
    /// timeout.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let db_url = lookup(DB_URL_VAR).unwrap_or_else(|| "sqlite:ticket_desk.db".to_owned());

        let listen_addr = match lookup(ADDR_VAR) {
            None => SocketAddr::from(([127, 0, 0, 1], 8080)),
            Some(value) => {
                value.parse::<SocketAddr>().map_err(|e| invalid(ADDR_VAR, &value, &e))?
            }
        };

        let desk_url = lookup(URL_VAR).unwrap_or_else(|| "http://127.0.0.1:8080/".to_owned());
        let desk_url = reqwest::Url::parse(&desk_url).map_err(|e| invalid(URL_VAR, &desk_url, &e))?;

        let call_timeout = match lookup(TIMEOUT_VAR) {
            None => Duration::from_millis(5000),
            Some(value) => match value.parse::<u64>() {
                Ok(ms) if ms > 0 => Duration::from_millis(ms),
                _ => return Err(invalid(TIMEOUT_VAR, &value, &"expected milliseconds > 0")),
            },
        };

        Ok(Self { db_url, listen_addr, desk_url, call_timeout })
    }
}

fn invalid(key: &'static str, value: &str, reason: &dyn std::fmt::Display) -> ConfigError {
    ConfigError::Invalid { key, value: value.to_owned(), reason: reason.to_string() }
}

/// Load `.env`, install the tracing subscriber, and read [`DeskConfig`].
///
/// # Errors
///
/// Fails if `.env` exists but cannot be read, or the environment is invalid.
pub fn bootstrap() -> anyhow::Result<DeskConfig> {
    // Before the subscriber, so RUST_LOG may come from .env.
    let dotenv = dotenvy::dotenv();
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();
    match dotenv {
        Ok(path) => tracing::info!(path = %path.display(), "config.dotenv.loaded"),
        Err(e) if e.not_found() => {}
        Err(e) => return Err(e).context("failed to read .env"),
    }
    let config = DeskConfig::from_env().context("invalid environment")?;
    tracing::info!(?config, "config.loaded");
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::{ADDR_VAR, ConfigError, DB_URL_VAR, DeskConfig, TIMEOUT_VAR, URL_VAR};
    use std::collections::HashMap;
    use std::time::Duration;

    fn from(pairs: &[(&str, &str)]) -> Result<DeskConfig, ConfigError> {
        let vars: HashMap<String, String> =
            pairs.iter().map(|(k, v)| ((*k).to_owned(), (*v).to_owned())).collect();
        DeskConfig::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn defaults_when_unset() {
        let config = from(&[]).unwrap();
        assert_eq!(config.db_url, "sqlite:ticket_desk.db");
        assert_eq!(config.listen_addr.to_string(), "127.0.0.1:8080");
        assert_eq!(config.desk_url.as_str(), "http://127.0.0.1:8080/");
        assert_eq!(config.call_timeout, Duration::from_secs(5));
    }

    #[test]
    fn overrides_are_parsed() {
        let config = from(&[
            (DB_URL_VAR, "sqlite::memory:"),
            (ADDR_VAR, "0.0.0.0:9000"),
            (URL_VAR, "http://desk.local:9000/"),
            (TIMEOUT_VAR, "1500"),
        ])
        .unwrap();
        assert_eq!(config.db_url, "sqlite::memory:");
        assert_eq!(config.listen_addr.port(), 9000);
        assert_eq!(config.desk_url.host_str(), Some("desk.local"));
        assert_eq!(config.call_timeout, Duration::from_millis(1500));
    }

    #[test]
    fn bad_values_name_the_variable() {
        let cases =
            [(ADDR_VAR, "localhost"), (URL_VAR, "desk"), (TIMEOUT_VAR, "0"), (TIMEOUT_VAR, "soon")];
        for (key, value) in cases {
            let Err(ConfigError::Invalid { key: got, .. }) = from(&[(key, value)]) else {
                panic!("{key}={value} should be rejected");
            };
            assert_eq!(got, key);
        }
    }
}
