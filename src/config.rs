//! Application configuration management.
//!
//! This module handles loading configuration from environment variables.
//! It uses the `envy` crate to automatically deserialize environment variables into a type-safe struct.

use serde::Deserialize;
use url::Url;

/// Application configuration loaded from environment variables.
///
/// # Environment Variables
///
/// - `SERVER_PORT` (optional): HTTP server port, defaults to 3000
/// - `UPSTREAM_URL` (optional): service queried by `/api/v1/upstream`,
///   defaults to `http://127.0.0.1:9000/status`
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    #[serde(default = "default_port")]
    pub server_port: u16,

    #[serde(default = "default_upstream_url")]
    pub upstream_url: String,
}

/// Configuration could not be loaded.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("environment: {0}")]
    Env(#[from] envy::Error),

    #[error("invalid UPSTREAM_URL: {0}")]
    UpstreamUrl(#[from] url::ParseError),

    #[error("UPSTREAM_URL must use HTTP or HTTPS, got `{0}`")]
    UnsupportedScheme(String),
}

/// Default port if SERVER_PORT environment variable is not set.
fn default_port() -> u16 {
    3000
}

fn default_upstream_url() -> String {
    "http://127.0.0.1:9000/status".to_string()
}

impl Config {
    /// Load configuration from environment variables.
    ///
    /// This method first attempts to load a `.env` file (which is optional),
    /// then reads environment variables and deserializes them into a Config struct.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - Environment variable values cannot be parsed into expected types
    /// - `UPSTREAM_URL` is not an HTTP(S) URL
    pub fn from_env() -> Result<Self, ConfigError> {
        // Try to load .env file if it exists (does nothing if not found)
        dotenvy::dotenv().ok();

        let config = envy::from_env::<Config>()?;
        config.upstream_url()?;
        Ok(config)
    }

    /// The parsed upstream URL.
    pub fn upstream_url(&self) -> Result<Url, ConfigError> {
        parse_upstream_url(&self.upstream_url)
    }
}

fn parse_upstream_url(raw: &str) -> Result<Url, ConfigError> {
    let url = Url::parse(raw)?;

    match url.scheme() {
        "http" | "https" => Ok(url),
        other => Err(ConfigError::UnsupportedScheme(other.to_string())),
    }
}
