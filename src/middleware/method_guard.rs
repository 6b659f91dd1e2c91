//! Responder for methods a route does not permit.

use std::future::{Ready, ready};

use axum::{
    handler::Handler,
    http::{HeaderValue, Method, StatusCode, header},
    response::{IntoResponse, Response},
};

/// `405 Method Not Allowed` with an `Allow` header and no body.
#[derive(Debug, Clone)]
pub struct MethodGuard {
    allow: HeaderValue,
}

impl MethodGuard {
    /// Methods are listed in the given order, joined with `", "`.
    pub fn new<I>(methods: I) -> Self
    where
        I: IntoIterator<Item = Method>,
    {
        let joined = methods
            .into_iter()
            .map(|method| method.as_str().to_owned())
            .collect::<Vec<_>>()
            .join(", ");

        // method names are tokens, which are always valid header values
        let allow = HeaderValue::try_from(joined).unwrap_or(HeaderValue::from_static(""));

        Self { allow }
    }

    pub fn allow(&self) -> &HeaderValue {
        &self.allow
    }
}

impl IntoResponse for MethodGuard {
    fn into_response(self) -> Response {
        (StatusCode::METHOD_NOT_ALLOWED, [(header::ALLOW, self.allow)]).into_response()
    }
}

/// Handler that answers every request with [`MethodGuard`].
///
/// Use it as the method fallback of a route:
///
/// ```rust,ignore
/// Router::new().route(
///     "/api/v1/echo",
///     post(echo).fallback(allowed([Method::POST])),
/// );
/// ```
pub fn allowed<S, I>(methods: I) -> impl Handler<((),), S>
where
    S: Clone + Send + Sync + 'static,
    I: IntoIterator<Item = Method>,
{
    let guard = MethodGuard::new(methods);
    move || -> Ready<MethodGuard> { ready(guard.clone()) }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{Router, body::Body, routing::get};
    use tower::ServiceExt;

    #[test]
    fn allow_header_lists_methods_in_order() {
        let guard = MethodGuard::new([Method::GET, Method::POST, Method::DELETE]);

        assert_eq!(guard.allow(), "GET, POST, DELETE");
    }

    #[test]
    fn single_method() {
        assert_eq!(MethodGuard::new([Method::PUT]).allow(), "PUT");
    }

    #[tokio::test]
    async fn response_is_405_with_empty_body() {
        let response = MethodGuard::new([Method::GET, Method::HEAD]).into_response();

        assert_eq!(response.status(), StatusCode::METHOD_NOT_ALLOWED);
        assert_eq!(response.headers()[header::ALLOW], "GET, HEAD");

        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        assert!(body.is_empty());
    }

    #[tokio::test]
    async fn fallback_answers_unlisted_methods() {
        let app: Router = Router::new().route(
            "/things",
            get(|| async { "things" }).fallback(allowed([Method::GET])),
        );

        let request = axum::http::Request::builder()
            .method(Method::DELETE)
            .uri("/things")
            .body(Body::empty())
            .unwrap();
        let response = app.oneshot(request).await.unwrap();

        assert_eq!(response.status(), StatusCode::METHOD_NOT_ALLOWED);
        assert_eq!(response.headers()[header::ALLOW], "GET");
    }
}
