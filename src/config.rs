use std::{net::SocketAddr, time::Duration};

use log::LevelFilter;

pub const ADDR_VAR: &str = "FOOTPRINT_ADDR";
pub const DATABASE_VAR: &str = "FOOTPRINT_DATABASE";
pub const SESSION_TTL_VAR: &str = "FOOTPRINT_SESSION_TTL";
pub const LOG_VAR: &str = "FOOTPRINT_LOG";

const DEFAULT_ADDR: &str = "127.0.0.1:1035";
const DEFAULT_DATABASE: &str = "./footprint.sqlite3";
const DEFAULT_SESSION_TTL: &str = "24h";
const DEFAULT_LOG: &str = "debug";

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("{var} is not a valid socket address: {value}")]
    Addr { var: &'static str, value: String },
    #[error("{var} is not a valid duration ({value}): {source}")]
    Duration {
        var: &'static str,
        value: String,
        source: humantime::DurationError,
    },
    #[error("{var} must be longer than zero")]
    ZeroDuration { var: &'static str },
    #[error("{var} is not a log level: {value}")]
    LogLevel { var: &'static str, value: String },
}

#[derive(Clone, Debug)]
pub struct Config {
    pub addr: SocketAddr,
    /// Path to the sqlite file, or `:memory:`.
    pub database: String,
    pub session_ttl: Duration,
    pub log_level: LevelFilter,
}

impl Config {
    pub fn from_env() -> Result<Config, ConfigError> {
        Config::from_lookup(|var| std::env::var(var).ok())
    }

    /// Build a config from any key lookup, falling back to defaults for
    /// missing keys.
    pub fn from_lookup<F>(lookup: F) -> Result<Config, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |var: &str, default: &str| lookup(var).unwrap_or_else(|| default.to_string());

        let addr = get(ADDR_VAR, DEFAULT_ADDR);
        let addr = addr.parse::<SocketAddr>().map_err(|_| ConfigError::Addr {
            var: ADDR_VAR,
            value: addr.clone(),
        })?;

        let database = get(DATABASE_VAR, DEFAULT_DATABASE);

        let ttl = get(SESSION_TTL_VAR, DEFAULT_SESSION_TTL);
        let session_ttl =
            humantime::parse_duration(&ttl).map_err(|source| ConfigError::Duration {
                var: SESSION_TTL_VAR,
                value: ttl.clone(),
                source,
            })?;
        if session_ttl.is_zero() {
            return Err(ConfigError::ZeroDuration {
                var: SESSION_TTL_VAR,
            });
        }

        let level = get(LOG_VAR, DEFAULT_LOG);
        let log_level = level
            .parse::<LevelFilter>()
            .map_err(|_| ConfigError::LogLevel {
                var: LOG_VAR,
                value: level.clone(),
            })?;

        Ok(Config {
            addr,
            database,
            session_ttl,
            log_level,
        })
    }
}
