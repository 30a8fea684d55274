//! services/api/src/config.rs
//!
//! Defines the application's configuration structure and loading logic.
//!
//! All configuration is loaded from environment variables at startup. The `.env`
//! file is used for local development.

use axum::http::HeaderValue;
use chrono::Duration;
use std::net::SocketAddr;
use tracing::Level;

/// A custom error type for configuration loading failures.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid value for the environment variable {0}: {1}")]
    InvalidValue(String, String),
}

/// Holds all configuration loaded from the environment at startup.
#[derive(Clone, Debug)]
pub struct Config {
    pub bind_address: SocketAddr,
    /// `None` runs the service on the in-memory store.
    pub database_url: Option<String>,
    pub log_level: Level,
    pub openai_api_key: Option<String>,
    pub assistant_model: String,
    pub auth_token_ttl: Duration,
    /// `None` allows any origin.
    pub cors_allowed_origin: Option<HeaderValue>,
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
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds the configuration from an arbitrary variable source.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        // --- Server and Database Settings ---
        let bind_address_str =
            lookup("BIND_ADDRESS").unwrap_or_else(|| "0.0.0.0:8001".to_string());
        let bind_address = bind_address_str.parse::<SocketAddr>().map_err(|e| {
            ConfigError::InvalidValue("BIND_ADDRESS".to_string(), e.to_string())
        })?;

        let database_url = lookup("DATABASE_URL").filter(|url| !url.trim().is_empty());

        let log_level_str = lookup("RUST_LOG").unwrap_or_else(|| "INFO".to_string());
        let log_level = log_level_str.parse::<Level>().map_err(|_| {
            ConfigError::InvalidValue(
                "RUST_LOG".to_string(),
                format!("'{}' is not a valid log level", log_level_str),
            )
        })?;

        // --- Assistant Settings ---
        let openai_api_key = lookup("OPENAI_API_KEY").filter(|key| !key.trim().is_empty());
        let assistant_model =
            lookup("ASSISTANT_MODEL").unwrap_or_else(|| "gpt-4o-mini".to_string());

        // --- Auth and CORS ---
        let ttl_str = lookup("AUTH_TOKEN_TTL_MINUTES").unwrap_or_else(|| "30".to_string());
        let ttl_minutes = ttl_str
            .parse::<i64>()
            .ok()
            .filter(|minutes| *minutes > 0)
            .ok_or_else(|| {
                ConfigError::InvalidValue(
                    "AUTH_TOKEN_TTL_MINUTES".to_string(),
                    format!("'{}' is not a positive number of minutes", ttl_str),
                )
            })?;

        let cors_allowed_origin = match lookup("CORS_ALLOWED_ORIGIN").as_deref() {
            None | Some("*") => None,
            Some(origin) => Some(HeaderValue::from_str(origin).map_err(|e| {
                ConfigError::InvalidValue("CORS_ALLOWED_ORIGIN".to_string(), e.to_string())
            })?),
        };

        Ok(Self {
            bind_address,
            database_url,
            log_level,
            openai_api_key,
            assistant_model,
            auth_token_ttl: Duration::minutes(ttl_minutes),
            cors_allowed_origin,
        })
    }
}
