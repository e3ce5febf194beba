use std::env;
use std::net::SocketAddr;

pub const API_KEY_VAR: &str = "LOOP_API_KEY";
pub const DB_PATH_VAR: &str = "LOOP_DB_PATH";
pub const LISTEN_ADDR_VAR: &str = "LOOP_LISTEN_ADDR";

const DEFAULT_DB_PATH: &str = "database.db";
const DEFAULT_LISTEN_ADDR: &str = "0.0.0.0:1515";

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid {var} '{value}': {source}")]
    InvalidAddr {
        var: &'static str,
        value: String,
        source: std::net::AddrParseError,
    },
}

/// Service configuration, read once at startup
#[derive(Debug, Clone)]
pub struct Config {
    /// Shared secret for mutating endpoints. `None` disables them.
    pub api_key: Option<String>,
    pub db_path: String,
    pub listen_addr: SocketAddr,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| env::var(name).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let api_key = lookup(API_KEY_VAR).filter(|key| !key.is_empty());
        let db_path = lookup(DB_PATH_VAR).unwrap_or_else(|| DEFAULT_DB_PATH.to_string());

        let addr = lookup(LISTEN_ADDR_VAR).unwrap_or_else(|| DEFAULT_LISTEN_ADDR.to_string());
        let listen_addr = addr
            .parse::<SocketAddr>()
            .map_err(|source| ConfigError::InvalidAddr {
                var: LISTEN_ADDR_VAR,
                value: addr.clone(),
                source,
            })?;

        Ok(Self {
            api_key,
            db_path,
            listen_addr,
        })
    }
}
