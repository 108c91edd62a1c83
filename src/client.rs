//! HTTP client for the question-answering API.

use std::sync::Arc;

use crate::error::{ClientError, HttpError};
use crate::models::{QueryRequest, QueryResponse};
use crate::sse::{decode_stream, PayloadStream};
use crate::traits::{Headers, HttpClient};

/// Default API base URL.
pub const DEFAULT_BASE_URL: &str = "http://localhost:8000";

/// Client for the query, streaming query and health endpoints.
///
/// Generic over the [`HttpClient`] transport so tests can run against
/// [`MockHttpClient`](crate::adapters::MockHttpClient).
#[derive(Debug)]
pub struct QueryClient<C: HttpClient> {
    http: Arc<C>,
    base_url: String,
}

impl<C: HttpClient> Clone for QueryClient<C> {
    fn clone(&self) -> Self {
        Self {
            http: Arc::clone(&self.http),
            base_url: self.base_url.clone(),
        }
    }
}

impl<C: HttpClient> QueryClient<C> {
    /// Create a client rooted at `base_url`. A trailing `/` is ignored.
    pub fn new(http: C, base_url: impl Into<String>) -> Self {
        Self::with_shared(Arc::new(http), base_url)
    }

    /// Create a client over an already shared transport.
    pub fn with_shared(http: Arc<C>, base_url: impl Into<String>) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self { http, base_url }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    fn json_headers() -> Headers {
        let mut headers = Headers::new();
        headers.insert("Content-Type".to_string(), "application/json".to_string());
        headers
    }

    /// Open a streamed exchange against `/query/stream`.
    ///
    /// Fails only if the request cannot be sent or the server refuses it
    /// before the body starts. Everything after that arrives through the
    /// returned payload stream.
    pub async fn stream_query(&self, request: &QueryRequest) -> Result<PayloadStream, HttpError> {
        let url = self.url("/query/stream");
        let body = serde_json::to_string(request).map_err(|e| HttpError::Other(e.to_string()))?;

        let mut headers = Self::json_headers();
        headers.insert("Accept".to_string(), "text/event-stream".to_string());

        tracing::debug!(
            url = %url,
            has_conversation = request.conversation_id.is_some(),
            "Opening query stream"
        );

        let bytes = self.http.post_stream(&url, &body, &headers).await?;
        Ok(decode_stream(bytes))
    }

    /// Ask a question and wait for the complete answer from `/query`.
    pub async fn query(&self, request: &QueryRequest) -> Result<QueryResponse, ClientError> {
        let url = self.url("/query");
        let body = serde_json::to_string(request)?;

        let response = self.http.post(&url, &body, &Self::json_headers()).await?;
        if !response.is_success() {
            return Err(ClientError::from_status(response.status, &response.text()));
        }

        Ok(response.json()?)
    }

    /// Probe `/health`. Any 2xx is healthy; the body is ignored.
    pub async fn health_check(&self) -> bool {
        match self.http.get(&self.url("/health"), &Headers::new()).await {
            Ok(response) => response.is_success(),
            Err(e) => {
                tracing::debug!("Health check failed: {}", e);
                false
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::mock::{MockHttpClient, MockResponse};
    use futures_util::StreamExt;

    const BASE: &str = "http://api.test";

    fn client(mock: &MockHttpClient) -> QueryClient<MockHttpClient> {
        QueryClient::new(mock.clone(), format!("{}/", BASE))
    }

    #[test]
    fn test_trailing_slash_trimmed() {
        let mock = MockHttpClient::new();
        assert_eq!(client(&mock).base_url(), BASE);
    }

    #[tokio::test]
    async fn test_stream_query_sends_request_and_decodes() {
        let mock = MockHttpClient::new();
        mock.set_response(
            "http://api.test/query/stream",
            MockResponse::stream_of([
                "data: {\"type\":\"chunk\",\"content\":\"a\"}\n",
                "\ndata: {\"type\":\"chunk\",\"content\":\"b\"}\n\n",
            ]),
        );

        let request = QueryRequest::with_conversation("Why?", Some("c1".to_string()));
        let payloads: Vec<_> = client(&mock)
            .stream_query(&request)
            .await
            .unwrap()
            .collect()
            .await;
        assert_eq!(payloads.len(), 2);

        let recorded = &mock.get_requests()[0];
        assert_eq!(recorded.method, "POST");
        assert_eq!(
            recorded.headers.get("Accept").map(String::as_str),
            Some("text/event-stream")
        );
        let body = recorded.json_body().unwrap();
        assert_eq!(body["question"], "Why?");
        assert_eq!(body["conversation_id"], "c1");
    }

    #[tokio::test]
    async fn test_stream_query_open_failure() {
        let mock = MockHttpClient::new();
        mock.set_response(
            "http://api.test/query/stream",
            MockResponse::Error(HttpError::ConnectionFailed("refused".to_string())),
        );

        let result = client(&mock).stream_query(&QueryRequest::new("q")).await;
        assert!(matches!(result, Err(HttpError::ConnectionFailed(_))));
    }

    #[tokio::test]
    async fn test_query_parses_response() {
        let mock = MockHttpClient::new();
        let body = serde_json::json!({
            "answer": "42",
            "metadata": {"cache_hit": true},
            "sources": [],
            "conversation_id": "c9",
        });
        mock.set_response(
            "http://api.test/query",
            MockResponse::status(200, &body.to_string()),
        );

        let response = client(&mock).query(&QueryRequest::new("q")).await.unwrap();
        assert_eq!(response.answer, "42");
        assert_eq!(response.conversation_id, "c9");
        assert!(response.metadata.cache_hit);
    }

    #[tokio::test]
    async fn test_query_error_status() {
        let mock = MockHttpClient::new();
        mock.set_response("http://api.test/query", MockResponse::status(502, ""));

        match client(&mock).query(&QueryRequest::new("q")).await {
            Err(ClientError::ServerError { status, message }) => {
                assert_eq!(status, 502);
                assert_eq!(message, "HTTP 502");
            }
            other => panic!("Expected server error, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_query_undecodable_body() {
        let mock = MockHttpClient::new();
        mock.set_response("http://api.test/query", MockResponse::status(200, "not json"));

        let result = client(&mock).query(&QueryRequest::new("q")).await;
        assert!(matches!(result, Err(ClientError::Json(_))));
    }

    #[tokio::test]
    async fn test_health_check() {
        let mock = MockHttpClient::new();
        let client = client(&mock);

        mock.push_response("http://api.test/health", MockResponse::status(204, ""));
        mock.push_response("http://api.test/health", MockResponse::status(500, ""));
        mock.push_response(
            "http://api.test/health",
            MockResponse::Error(HttpError::Timeout("slow".to_string())),
        );

        assert!(client.health_check().await);
        assert!(!client.health_check().await);
        assert!(!client.health_check().await);
        assert_eq!(mock.request_count("http://api.test/health"), 3);
    }
}
