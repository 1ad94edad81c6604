//! services/api/src/config.rs
//!
//! Defines the application's configuration structure and loading logic.
//!
//! All configuration is loaded from environment variables at startup. The `.env`
//! file is used for local development.

use std::net::SocketAddr;
use std::path::PathBuf;
use tracing::Level;

/// A custom error type for configuration loading failures.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing the environment variable {0}")]
    MissingVar(String),
    #[error("Invalid value for the environment variable {0}: {1}")]
    InvalidValue(String, String),
}

/// Credentials of the shared demo account.
#[derive(Clone, Debug)]
pub struct DemoAccount {
    pub email: String,
    pub password: String,
}

/// Holds all configuration loaded from the environment at startup.
#[derive(Clone, Debug)]
pub struct Config {
    pub bind_address: SocketAddr,
    /// `None` runs the service on the in-memory store.
    pub database_url: Option<String>,
    pub log_level: Level,
    pub media_path: PathBuf,
    /// Base URL used to build the links recipients open.
    pub public_base_url: String,
    pub cors_origin: String,
    pub demo_account: Option<DemoAccount>,
    pub cookie_secure: bool,
}

impl Config {
    /// Loads configuration from environment variables.
    ///
    /// It will look for a `.env` file in the current directory for development,
    /// but this is skipped in test environments to ensure tests are hermetic.
    pub fn from_env() -> Result<Self, ConfigError> {
        if !cfg!(test) {
            dotenvy::dotenv().ok();
        }

        // --- Load Server and Database Settings ---
        let bind_address_str =
            std::env::var("BIND_ADDRESS").unwrap_or_else(|_| "0.0.0.0:3000".to_string());
        let bind_address = bind_address_str.parse::<SocketAddr>().map_err(|e| {
            ConfigError::InvalidValue("BIND_ADDRESS".to_string(), e.to_string())
        })?;

        let database_url = std::env::var("DATABASE_URL")
            .ok()
            .filter(|url| !url.trim().is_empty());

        let log_level_str = std::env::var("RUST_LOG").unwrap_or_else(|_| "INFO".to_string());
        let log_level = log_level_str.parse::<Level>().map_err(|_| {
            ConfigError::InvalidValue(
                "RUST_LOG".to_string(),
                format!("'{}' is not a valid log level", log_level_str),
            )
        })?;

        // --- Load Public Surface Settings ---
        let media_path = std::env::var("MEDIA_PATH")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("./media"));

        let public_base_url = std::env::var("PUBLIC_BASE_URL")
            .unwrap_or_else(|_| "http://localhost:3000".to_string())
            .trim_end_matches('/')
            .to_string();

        let cors_origin =
            std::env::var("CORS_ORIGIN").unwrap_or_else(|_| "http://localhost:5173".to_string());

        let cookie_secure = match std::env::var("COOKIE_SECURE") {
            Ok(value) => parse_bool("COOKIE_SECURE", &value)?,
            Err(_) => true,
        };

        // --- Load the Demo Account (both variables or neither) ---
        let demo_account = match (std::env::var("DEMO_EMAIL"), std::env::var("DEMO_PASSWORD")) {
            (Ok(email), Ok(password)) => Some(DemoAccount { email, password }),
            (Err(_), Err(_)) => None,
            (Ok(_), Err(_)) => return Err(ConfigError::MissingVar("DEMO_PASSWORD".to_string())),
            (Err(_), Ok(_)) => return Err(ConfigError::MissingVar("DEMO_EMAIL".to_string())),
        };

        Ok(Self {
            bind_address,
            database_url,
            log_level,
            media_path,
            public_base_url,
            cors_origin,
            demo_account,
            cookie_secure,
        })
    }
}

#[cfg(test)]
impl Config {
    /// Local defaults for unit tests that build an `AppState` by hand.
    pub fn for_tests() -> Self {
        Self {
            bind_address: SocketAddr::from(([127, 0, 0, 1], 0)),
            database_url: None,
            log_level: Level::DEBUG,
            media_path: PathBuf::from("unused-media"),
            public_base_url: "http://localhost:3000".to_string(),
            cors_origin: "http://localhost:5173".to_string(),
            demo_account: None,
            cookie_secure: false,
        }
    }
}

fn parse_bool(key: &str, value: &str) -> Result<bool, ConfigError> {
    match value.trim().to_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        other => Err(ConfigError::InvalidValue(
            key.to_string(),
            format!("'{}' is not a boolean", other),
        )),
    }
}
