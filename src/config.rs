//! Environment configuration.
//!
//! `.env` is loaded first when present; real environment variables win.

use std::fmt;
use std::net::{IpAddr, SocketAddr};
use std::path::PathBuf;

use chrono::Duration;

#[derive(Debug)]
pub enum ConfigError {
    Missing(&'static str),
    Invalid(&'static str),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::Missing(key) => write!(f, "missing configuration: {key}"),
            ConfigError::Invalid(key) => write!(f, "invalid configuration: {key}"),
        }
    }
}

impl std::error::Error for ConfigError {}

#[derive(Clone, Debug)]
pub struct Config {
    pub addr: SocketAddr,
    /// Mixed into every password hash.
    pub salt: String,
    pub jwt_secret: String,
    pub jwt_ttl: Duration,
    pub upload_directory: PathBuf,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds the config from an arbitrary key lookup.
    pub fn from_lookup(get: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let host: IpAddr = get("HOST")
            .unwrap_or_else(|| "0.0.0.0".to_owned())
            .parse()
            .map_err(|_| ConfigError::Invalid("HOST"))?;

        let port: u16 = match get("PORT") {
            Some(v) => v.parse().map_err(|_| ConfigError::Invalid("PORT"))?,
            None => 4000,
        };

        let salt = get("SALT")
            .filter(|s| !s.is_empty())
            .ok_or(ConfigError::Missing("SALT"))?;

        let jwt_secret = get("JWT_SECRET")
            .filter(|s| !s.is_empty())
            .ok_or(ConfigError::Missing("JWT_SECRET"))?;

        let jwt_ttl_secs: i64 = match get("JWT_EXPIRATION_SECS") {
            Some(v) => v.parse().ok().filter(|n| *n > 0).ok_or(ConfigError::Invalid("JWT_EXPIRATION_SECS"))?,
            None => 2 * 24 * 60 * 60,
        };

        let upload_directory = get("UPLOAD_DIRECTORY")
            .filter(|s| !s.trim().is_empty())
            .unwrap_or_else(|| "upload".to_owned())
            .into();

        Ok(Self {
            addr: SocketAddr::new(host, port),
            salt,
            jwt_secret,
            jwt_ttl: Duration::seconds(jwt_ttl_secs),
            upload_directory,
        })
    }
}
