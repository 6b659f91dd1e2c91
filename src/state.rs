//! Shared application state.

use std::time::Duration;

use url::Url;

use crate::config::{Config, ConfigError};

/// Handles shared by every request. Cheap to clone.
#[derive(Debug, Clone)]
pub struct AppState {
    pub client: reqwest::Client,
    pub upstream_url: Url,
}

/// Startup failed before the server could bind.
#[derive(Debug, thiserror::Error)]
pub enum StateError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("HTTP client error: {0}")]
    Client(#[from] reqwest::Error),
}

impl AppState {
    /// Build state from configuration.
    ///
    /// Upstream calls time out after 5 seconds.
    pub fn from_config(config: &Config) -> Result<Self, StateError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(5))
            .build()?;

        Ok(Self {
            client,
            upstream_url: config.upstream_url()?,
        })
    }

    pub fn new(client: reqwest::Client, upstream_url: Url) -> Self {
        Self {
            client,
            upstream_url,
        }
    }
}
