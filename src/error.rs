//! Failure types and their HTTP response conversion.
//!
//! [`Failure`] is the single error value that interrupts a request pipeline.
//! Any stage or handler can return `Err(Failure)`. It is rendered into the
//! uniform JSON error envelope and handed to the
//! [`ErrorNormalizer`](crate::middleware::error_normalizer::ErrorNormalizer)
//! layer, which logs it exactly once.

use std::collections::BTreeMap;

use axum::{
    extract::rejection::JsonRejection,
    http::header::InvalidHeaderName,
    response::{IntoResponse, Response},
};

use crate::middleware::error_normalizer::normalize;

/// Category label used for header precondition failures.
pub const TYPE_ERROR: &str = "TypeError";

/// The unit of error propagation through the request pipeline.
///
/// # Fields
///
/// - `name`: category label (`TypeError`, `UpstreamError`, ...)
/// - `message`: human-readable description
/// - `status_code`: outgoing HTTP status. Absent or zero means 400.
/// - `response`: headers of an upstream HTTP response, when the failure
///   came from a call to another service
///
/// `name` and `message` are optional so that error values missing them are
/// still rendered. Missing fields are left out of the JSON body.
#[derive(Debug, Clone, Default, PartialEq, Eq, thiserror::Error)]
#[error(
    "{}: {}",
    .name.as_deref().unwrap_or("Error"),
    .message.as_deref().unwrap_or("")
)]
pub struct Failure {
    pub name: Option<String>,
    pub message: Option<String>,
    pub status_code: Option<u16>,
    pub response: Option<UpstreamResponse>,
}

impl Failure {
    /// Failure with a name and message and no status. It renders as 400.
    pub fn new(name: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
            message: Some(message.into()),
            ..Self::default()
        }
    }

    /// Validation failure: name `TypeError`, status 400.
    pub fn type_error(message: impl Into<String>) -> Self {
        Self::new(TYPE_ERROR, message).with_status(400)
    }

    /// Failure carrying neither name nor message.
    pub fn unnamed() -> Self {
        Self::default()
    }

    pub fn with_status(mut self, status_code: u16) -> Self {
        self.status_code = Some(status_code);
        self
    }

    pub fn with_response(mut self, response: UpstreamResponse) -> Self {
        self.response = Some(response);
        self
    }
}

/// Descriptor of the upstream HTTP response a [`Failure`] originated from.
///
/// Only the header map reaches the client. The status is kept for logs.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UpstreamResponse {
    pub status: Option<u16>,
    pub headers: BTreeMap<String, String>,
}

impl UpstreamResponse {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_status(mut self, status: u16) -> Self {
        self.status = Some(status);
        self
    }

    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(name.into(), value.into());
        self
    }

    /// Capture status and headers of a `reqwest` response.
    ///
    /// Header values that are not valid UTF-8 are skipped. Repeated headers
    /// keep their last value.
    pub fn from_reqwest(response: &reqwest::Response) -> Self {
        let headers = response
            .headers()
            .iter()
            .filter_map(|(name, value)| {
                value
                    .to_str()
                    .ok()
                    .map(|value| (name.as_str().to_owned(), value.to_owned()))
            })
            .collect();

        Self {
            status: Some(response.status().as_u16()),
            headers,
        }
    }
}

/// Render the failure as the normalized JSON error response.
///
/// The failure itself rides along in the response extensions so the
/// `ErrorNormalizer` layer can log it and issue the final response.
impl IntoResponse for Failure {
    fn into_response(self) -> Response {
        let mut response = normalize(&self).into_response();
        response.extensions_mut().insert(self);
        response
    }
}

/// Upstream call failed before or while reading a response.
///
/// Status comes from the error when it has one, otherwise 502.
impl From<reqwest::Error> for Failure {
    fn from(err: reqwest::Error) -> Self {
        let status = err.status().map(|s| s.as_u16()).unwrap_or(502);
        Failure::new("RequestError", err.to_string()).with_status(status)
    }
}

/// Malformed or mistyped JSON request body.
impl From<JsonRejection> for Failure {
    fn from(rejection: JsonRejection) -> Self {
        Failure::new("SyntaxError", rejection.body_text()).with_status(rejection.status().as_u16())
    }
}

/// Unclassified failure: status is left unset and renders as 400.
impl From<anyhow::Error> for Failure {
    fn from(err: anyhow::Error) -> Self {
        Failure::new("Error", err.to_string())
    }
}

/// Invalid header precondition configuration.
#[derive(Debug, thiserror::Error)]
pub enum InvalidRequirement {
    #[error("invalid header name `{name}`")]
    HeaderName {
        name: String,
        #[source]
        source: InvalidHeaderName,
    },
}
