//! Router assembly.
//!
//! Stage order, inside out:
//!
//! ```text
//! handler ← header precondition (matched methods only)
//!         ← method guard (unmatched methods)
//!         ← error normalizer
//!         ← request tracing
//! ```

use axum::{
    Router,
    http::Method,
    middleware::from_fn_with_state,
    routing::{get, post},
};
use tower_http::trace::TraceLayer;

use crate::{
    error::InvalidRequirement,
    handlers,
    middleware::{ErrorNormalizer, allowed, enforce, normalize_errors, verify},
    state::AppState,
};

/// Build the application router.
///
/// # Routes
///
/// - `GET /health` (public, unguarded)
/// - `POST /api/v1/echo` (JSON content negotiation enforced)
/// - `GET /api/v1/upstream`
///
/// # Errors
///
/// Fails only if a configured header requirement is invalid.
pub fn build_router(
    state: AppState,
    normalizer: ErrorNormalizer,
) -> Result<Router, InvalidRequirement> {
    let json_only = verify(
        [Method::POST],
        [
            ("Content-Type", "application/json"),
            ("Accept", "application/json"),
        ],
    )?;

    let api = Router::new()
        .route(
            "/api/v1/echo",
            post(handlers::echo::echo)
                .route_layer(from_fn_with_state(json_only, enforce))
                .fallback(allowed([Method::POST])),
        )
        .route(
            "/api/v1/upstream",
            get(handlers::upstream::upstream_status).fallback(allowed([Method::GET])),
        );

    let app = Router::new()
        .route("/health", get(handlers::health::health_check))
        .merge(api)
        // Must wrap every other stage so no failure escapes unlogged
        .layer(from_fn_with_state(normalizer, normalize_errors))
        .layer(TraceLayer::new_for_http())
        .with_state(state);

    Ok(app)
}
