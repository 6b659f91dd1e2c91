//! Failure-to-response normalization.
//!
//! Every [`Failure`] leaves the service in the same envelope:
//!
//! ```json
//! {
//!   "error": {
//!     "name": "TypeError",
//!     "message": "Content-Type must be `application/json`.",
//!     "headers": { "Accept": "application/json", "Accept-Charset": "utf-8" }
//!   }
//! }
//! ```
//!
//! `headers` is only present for failures that came from an upstream HTTP
//! response. Status is the failure's own code, or 400.
//!
//! The [`normalize_errors`] layer must be the outermost of the crate's
//! stages. It picks up the failure attached by `Failure::into_response`,
//! hands the body to the [`LogSink`] at `ERROR` and issues the response.

use std::collections::BTreeMap;
use std::panic::{AssertUnwindSafe, catch_unwind};
use std::sync::Arc;

use axum::{
    Json,
    extract::{Request, State},
    http::StatusCode,
    middleware::Next,
    response::{IntoResponse, Response},
};
use serde::{Deserialize, Serialize};
use tracing::Level;

use crate::error::Failure;
use crate::logging::{LogSink, TracingSink};

/// Headers every upstream failure reports, unless the upstream overrides them.
pub const DEFAULT_HEADERS: [(&str, &str); 2] =
    [("Accept", "application/json"), ("Accept-Charset", "utf-8")];

/// Wire shape of an error response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NormalizedErrorBody {
    pub error: ErrorDetail,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorDetail {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub headers: Option<BTreeMap<String, String>>,
}

/// Status and body computed for one failure.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NormalizedError {
    pub status: StatusCode,
    pub body: NormalizedErrorBody,
}

impl IntoResponse for NormalizedError {
    fn into_response(self) -> Response {
        (self.status, Json(self.body)).into_response()
    }
}

/// Compute the response for a failure. Pure: no logging, no I/O.
pub fn normalize(failure: &Failure) -> NormalizedError {
    let headers = failure.response.as_ref().map(|upstream| {
        let mut merged: BTreeMap<String, String> = DEFAULT_HEADERS
            .iter()
            .map(|(name, value)| (name.to_string(), value.to_string()))
            .collect();
        merged.extend(upstream.headers.clone());
        merged
    });

    NormalizedError {
        status: status_for(failure.status_code),
        body: NormalizedErrorBody {
            error: ErrorDetail {
                name: failure.name.clone(),
                message: failure.message.clone(),
                headers,
            },
        },
    }
}

/// Zero, absent and out-of-range codes all fall back to 400.
fn status_for(code: Option<u16>) -> StatusCode {
    code.filter(|code| *code != 0)
        .and_then(|code| StatusCode::from_u16(code).ok())
        .unwrap_or(StatusCode::BAD_REQUEST)
}

/// Terminal failure-handling stage, carried as middleware state.
///
/// Cheap to clone; the sink is shared across all in-flight requests.
#[derive(Clone)]
pub struct ErrorNormalizer {
    sink: Arc<dyn LogSink>,
}

impl ErrorNormalizer {
    pub fn new(sink: impl LogSink + 'static) -> Self {
        Self {
            sink: Arc::new(sink),
        }
    }

    /// Consume a failure: log it, then turn it into the final response.
    pub fn handle(&self, failure: Failure) -> Response {
        let normalized = normalize(&failure);
        self.emit(&failure, &normalized.body);
        normalized.into_response()
    }

    /// Send the body to the sink. Nothing that happens here may stop the
    /// response from going out.
    fn emit(&self, failure: &Failure, body: &NormalizedErrorBody) {
        let payload = match serde_json::to_value(body) {
            Ok(payload) => payload,
            Err(e) => {
                tracing::warn!("failed to serialize error payload: {}", e);
                return;
            }
        };

        match catch_unwind(AssertUnwindSafe(|| self.sink.log(Level::ERROR, &payload))) {
            Ok(Ok(())) => {}
            Ok(Err(e)) => tracing::warn!(failure = %failure, "{}", e),
            Err(_) => tracing::warn!(failure = %failure, "log sink panicked"),
        }
    }
}

impl Default for ErrorNormalizer {
    fn default() -> Self {
        Self::new(TracingSink)
    }
}

impl std::fmt::Debug for ErrorNormalizer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ErrorNormalizer").finish_non_exhaustive()
    }
}

/// Error normalization middleware function.
///
/// Install last, with `Router::layer`:
///
/// ```rust,ignore
/// let app = Router::new()
///     .route("/", get(handler))
///     .layer(axum::middleware::from_fn_with_state(
///         ErrorNormalizer::default(),
///         error_normalizer::normalize_errors,
///     ));
/// ```
///
/// Responses that do not carry a [`Failure`] pass through untouched.
pub async fn normalize_errors(
    State(normalizer): State<ErrorNormalizer>,
    request: Request,
    next: Next,
) -> Response {
    let mut response = next.run(request).await;

    match response.extensions_mut().remove::<Failure>() {
        Some(failure) => normalizer.handle(failure),
        None => response,
    }
}
