//! End-to-end behaviour of the full router: precondition, handler, method
//! guard and error normalization together.

use std::sync::{Arc, Mutex};

use axum::{
    Router,
    body::Body,
    http::{Method, Request, StatusCode, header},
    response::{IntoResponse, Response},
    routing::get,
};
use request_guard::{
    logging::{LogSink, SinkError},
    middleware::ErrorNormalizer,
    routes::build_router,
    state::AppState,
};
use serde_json::{Value, json};
use tower::ServiceExt;
use tracing::Level;
use url::Url;

#[derive(Clone, Default)]
struct RecordingSink {
    events: Arc<Mutex<Vec<(Level, Value)>>>,
}

impl RecordingSink {
    fn events(&self) -> Vec<(Level, Value)> {
        self.events.lock().unwrap().clone()
    }
}

impl LogSink for RecordingSink {
    fn log(&self, level: Level, payload: &Value) -> Result<(), SinkError> {
        self.events.lock().unwrap().push((level, payload.clone()));
        Ok(())
    }
}

fn app_with_upstream(upstream_url: Url) -> (Router, RecordingSink) {
    let sink = RecordingSink::default();
    let state = AppState::new(reqwest::Client::new(), upstream_url);
    let app = build_router(state, ErrorNormalizer::new(sink.clone())).unwrap();
    (app, sink)
}

fn app() -> (Router, RecordingSink) {
    app_with_upstream(Url::parse("http://127.0.0.1:9/status").unwrap())
}

async fn body_bytes(response: Response) -> Vec<u8> {
    axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap()
        .to_vec()
}

async fn body_json(response: Response) -> Value {
    serde_json::from_slice(&body_bytes(response).await).unwrap()
}

/// Serve `router` on an ephemeral local port.
async fn spawn_upstream(router: Router) -> Url {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, router).await.unwrap();
    });
    Url::parse(&format!("http://{addr}/status")).unwrap()
}

#[tokio::test]
async fn echo_passes_with_required_headers() {
    let (app, sink) = app();

    let request = Request::builder()
        .method(Method::POST)
        .uri("/api/v1/echo")
        .header("content-type", "application/json")
        .header("accept", "application/json")
        .body(Body::from(r#"{"hello":"world"}"#))
        .unwrap();
    let response = app.oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        body_json(response).await,
        json!({ "received": { "hello": "world" } })
    );
    assert!(sink.events().is_empty());
}

#[tokio::test]
async fn wrong_content_type_is_normalized_and_logged() {
    let (app, sink) = app();

    let request = Request::builder()
        .method(Method::POST)
        .uri("/api/v1/echo")
        .header("content-type", "text/plain")
        .header("accept", "application/json")
        .body(Body::from("hello"))
        .unwrap();
    let response = app.oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(response.headers()[header::CONTENT_TYPE], "application/json");

    let body = body_json(response).await;
    assert_eq!(
        body,
        json!({
            "error": {
                "name": "TypeError",
                "message": "Content-Type must be `application/json`."
            }
        })
    );

    let events = sink.events();
    assert_eq!(events.len(), 1);
    assert_eq!(events[0], (Level::ERROR, body));
}

#[tokio::test]
async fn missing_accept_header_is_reported() {
    let (app, _) = app();

    let request = Request::builder()
        .method(Method::POST)
        .uri("/api/v1/echo")
        .header("Content-Type", "application/json")
        .body(Body::from("{}"))
        .unwrap();
    let response = app.oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(
        body_json(response).await["error"]["message"],
        "Accept must be `application/json`."
    );
}

#[tokio::test]
async fn malformed_json_becomes_syntax_error() {
    let (app, sink) = app();

    let request = Request::builder()
        .method(Method::POST)
        .uri("/api/v1/echo")
        .header("content-type", "application/json")
        .header("accept", "application/json")
        .body(Body::from("{not json"))
        .unwrap();
    let response = app.oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = body_json(response).await;
    assert_eq!(body["error"]["name"], "SyntaxError");
    assert!(body["error"].get("headers").is_none());
    assert_eq!(sink.events().len(), 1);
}

#[tokio::test]
async fn disallowed_method_bypasses_precondition_and_normalizer() {
    let (app, sink) = app();

    let request = Request::builder()
        .method(Method::PUT)
        .uri("/api/v1/echo")
        .body(Body::empty())
        .unwrap();
    let response = app.oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::METHOD_NOT_ALLOWED);
    assert_eq!(response.headers()[header::ALLOW], "POST");
    assert!(body_bytes(response).await.is_empty());
    assert!(sink.events().is_empty());
}

#[tokio::test]
async fn unguarded_method_on_upstream_route_gets_allow_get() {
    let (app, _) = app();

    let request = Request::builder()
        .method(Method::POST)
        .uri("/api/v1/upstream")
        .body(Body::empty())
        .unwrap();
    let response = app.oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::METHOD_NOT_ALLOWED);
    assert_eq!(response.headers()[header::ALLOW], "GET");
}

#[tokio::test]
async fn health_is_not_guarded() {
    let (app, _) = app();

    let request = Request::builder()
        .uri("/health")
        .body(Body::empty())
        .unwrap();
    let response = app.oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await["status"], "healthy");
}

#[tokio::test]
async fn upstream_success_is_relayed() {
    let upstream = Router::new().route(
        "/status",
        get(|| async { axum::Json(json!({ "status": "green" })) }),
    );
    let (app, sink) = app_with_upstream(spawn_upstream(upstream).await);

    let request = Request::builder()
        .uri("/api/v1/upstream")
        .body(Body::empty())
        .unwrap();
    let response = app.oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await, json!({ "status": "green" }));
    assert!(sink.events().is_empty());
}

#[tokio::test]
async fn upstream_failure_surfaces_its_headers() {
    let upstream = Router::new().route(
        "/status",
        get(|| async {
            (
                StatusCode::SERVICE_UNAVAILABLE,
                [("x-upstream-id", "abc123"), ("retry-after", "30")],
                "down",
            )
                .into_response()
        }),
    );
    let (app, sink) = app_with_upstream(spawn_upstream(upstream).await);

    let request = Request::builder()
        .uri("/api/v1/upstream")
        .body(Body::empty())
        .unwrap();
    let response = app.oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::BAD_GATEWAY);

    let body = body_json(response).await;
    assert_eq!(body["error"]["name"], "UpstreamError");
    assert_eq!(
        body["error"]["message"],
        "Upstream responded with 503 Service Unavailable."
    );

    let headers = &body["error"]["headers"];
    assert_eq!(headers["Accept"], "application/json");
    assert_eq!(headers["Accept-Charset"], "utf-8");
    assert_eq!(headers["x-upstream-id"], "abc123");
    assert_eq!(headers["retry-after"], "30");

    assert_eq!(sink.events().len(), 1);
}

#[tokio::test]
async fn unreachable_upstream_is_a_bad_gateway() {
    // Bind then drop a listener to get a port nothing is serving on.
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let (app, _) = app_with_upstream(Url::parse(&format!("http://{addr}/status")).unwrap());

    let request = Request::builder()
        .uri("/api/v1/upstream")
        .body(Body::empty())
        .unwrap();
    let response = app.oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
    assert_eq!(body_json(response).await["error"]["name"], "RequestError");
}
