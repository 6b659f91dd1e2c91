//! Request Guard - Demo Service Entry Point
//!
//! A small JSON API that exercises the request guard middleware: required
//! header preconditions, method guards, and uniform error responses.
//!
//! # Architecture
//!
//! - **Web Framework**: Axum (async HTTP server)
//! - **Upstream Client**: reqwest
//! - **Format**: JSON requests/responses, JSON error envelope
//!
//! # Startup Flow
//!
//! 1. Initialize logging
//! 2. Load configuration from environment variables
//! 3. Build shared state (HTTP client, upstream URL)
//! 4. Build HTTP router with routes and middleware
//! 5. Start server on configured port

use request_guard::{
    config::Config, logging, middleware::ErrorNormalizer, routes, state::AppState,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    logging::init();

    // Load configuration
    let config = Config::from_env()?;
    tracing::info!("Configuration loaded");

    let state = AppState::from_config(&config)?;
    tracing::info!(upstream = %state.upstream_url, "Upstream client ready");

    // Failures are logged through tracing
    let app = routes::build_router(state, ErrorNormalizer::default())?;

    // Bind to network address and start server
    let addr = format!("0.0.0.0:{}", config.server_port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!("Server listening on {}", addr);

    axum::serve(listener, app).await?;

    Ok(())
}
