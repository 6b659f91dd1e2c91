//! Upstream status endpoint.

use axum::{Json, extract::State};
use serde_json::Value;

use crate::{error::Failure, services::upstream_service, state::AppState};

/// Relay the upstream status document.
///
/// # Endpoint
///
/// `GET /api/v1/upstream`
///
/// # Response
///
/// - **Success (200 OK)**: the upstream JSON document, unchanged
/// - **Error (502)**: upstream returned a non-success status. The error body
///   includes the upstream headers merged over the JSON defaults.
/// - **Error (405)**: any method other than GET
pub async fn upstream_status(State(state): State<AppState>) -> Result<Json<Value>, Failure> {
    let status = upstream_service::fetch_status(&state.client, &state.upstream_url).await?;

    Ok(Json(status))
}
