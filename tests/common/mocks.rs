//! Wiremock fixtures for the query and health endpoints.

use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// 200 response carrying an event-stream body.
pub fn sse_response(body: String) -> ResponseTemplate {
    ResponseTemplate::new(200).set_body_raw(body.into_bytes(), "text/event-stream")
}

/// Serve `body` for every `POST /query/stream`.
pub async fn mount_stream(server: &MockServer, body: String) {
    Mock::given(method("POST"))
        .and(path("/query/stream"))
        .respond_with(sse_response(body))
        .mount(server)
        .await;
}

/// Serve `GET /health` with the given status.
pub async fn mount_health(server: &MockServer, status: u16) {
    Mock::given(method("GET"))
        .and(path("/health"))
        .respond_with(
            ResponseTemplate::new(status).set_body_json(serde_json::json!({"status": "ok"})),
        )
        .mount(server)
        .await;
}

/// An address nothing listens on.
pub const UNREACHABLE_URL: &str = "http://127.0.0.1:59999";
