//! Required request header middleware.
//!
//! This middleware runs before route handlers to:
//! 1. Skip requests whose method is not covered by the requirement set
//! 2. Look up each required header (case-insensitive name)
//! 3. Compare its value byte-for-byte with the required value
//! 4. Reject the first mismatch with a `TypeError` failure (HTTP 400)

use std::sync::Arc;

use axum::{
    extract::{Request, State},
    http::{HeaderMap, HeaderName, Method},
    middleware::Next,
    response::Response,
};

use crate::error::{Failure, InvalidRequirement};

/// One required header.
#[derive(Debug)]
struct Requirement {
    /// Name as configured, used in the failure message.
    label: String,
    name: HeaderName,
    value: String,
}

#[derive(Debug)]
struct Requirements {
    methods: Vec<Method>,
    headers: Vec<Requirement>,
}

/// An immutable set of required headers, scoped to a set of methods.
///
/// Built once with [`verify`] and shared by every request the route sees.
#[derive(Debug, Clone)]
pub struct HeaderPrecondition {
    inner: Arc<Requirements>,
}

/// Build a precondition requiring `headers` on requests whose method is in
/// `methods`.
///
/// Requirements are checked in the given order.
///
/// # Errors
///
/// Returns [`InvalidRequirement::HeaderName`] if a header name is not a
/// valid HTTP header name.
///
/// # Example
///
/// ```rust,ignore
/// let json_only = verify(
///     [Method::POST, Method::PUT],
///     [("Content-Type", "application/json")],
/// )?;
/// ```
pub fn verify<M, H, K, V>(methods: M, headers: H) -> Result<HeaderPrecondition, InvalidRequirement>
where
    M: IntoIterator<Item = Method>,
    H: IntoIterator<Item = (K, V)>,
    K: Into<String>,
    V: Into<String>,
{
    let headers = headers
        .into_iter()
        .map(|(label, value)| -> Result<Requirement, InvalidRequirement> {
            let label: String = label.into();
            let name = HeaderName::from_bytes(label.as_bytes()).map_err(|source| {
                InvalidRequirement::HeaderName {
                    name: label.clone(),
                    source,
                }
            })?;
            Ok(Requirement {
                label,
                name,
                value: value.into(),
            })
        })
        .collect::<Result<Vec<_>, _>>()?;

    Ok(HeaderPrecondition {
        inner: Arc::new(Requirements {
            methods: methods.into_iter().collect(),
            headers,
        }),
    })
}

impl HeaderPrecondition {
    /// Whether requests with this method are checked at all.
    pub fn applies_to(&self, method: &Method) -> bool {
        self.inner.methods.contains(method)
    }

    /// Check a request's method and headers against the requirement set.
    ///
    /// Stops at the first missing or mismatched header. When a header is
    /// repeated only its first value is compared.
    pub fn evaluate(&self, method: &Method, headers: &HeaderMap) -> Result<(), Failure> {
        if !self.applies_to(method) {
            return Ok(());
        }

        for requirement in &self.inner.headers {
            let matches = headers
                .get(&requirement.name)
                .is_some_and(|actual| actual.as_bytes() == requirement.value.as_bytes());

            if !matches {
                tracing::debug!(%method, header = %requirement.label, "header precondition failed");
                return Err(Failure::type_error(format!(
                    "{} must be `{}`.",
                    requirement.label, requirement.value
                )));
            }
        }

        tracing::debug!(%method, "header precondition passed");
        Ok(())
    }
}

/// Header precondition middleware function.
///
/// # Flow
///
/// 1. Evaluate the request's method and headers
/// 2. On success: call the next handler
/// 3. On failure: return the `TypeError` failure, the body is never read
///
/// Install with `route_layer` so only matched methods are checked:
///
/// ```rust,ignore
/// post(create).route_layer(axum::middleware::from_fn_with_state(
///     json_only,
///     header_precondition::enforce,
/// ))
/// ```
pub async fn enforce(
    State(precondition): State<HeaderPrecondition>,
    request: Request,
    next: Next,
) -> Result<Response, Failure> {
    precondition.evaluate(request.method(), request.headers())?;

    Ok(next.run(request).await)
}
