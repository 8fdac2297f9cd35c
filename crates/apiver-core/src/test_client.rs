//! TestClient for integration testing without network binding
//!
//! Sends simulated requests through routing, the middleware stack and the
//! handler registry.
//!
//! ```rust,ignore
//! #[tokio::test]
//! async fn test_versioned_route() {
//!     let client = TestClient::new(app);
//!
//!     let response = client
//!         .get_with_accept("/foo", "application/vnd.api-v2.1+json")
//!         .await;
//!     response.assert_status(StatusCode::OK);
//!     assert_eq!(response.text(), "2.1");
//! }
//! ```

use crate::app::App;
use bytes::Bytes;
use http::{header, HeaderMap, HeaderValue, Method, StatusCode};
use http_body_util::BodyExt;
use serde::de::DeserializeOwned;

/// Test client wrapping an [`App`]
pub struct TestClient {
    app: App,
}

impl TestClient {
    /// Create a new test client from an app
    pub fn new(app: App) -> Self {
        Self { app }
    }

    /// Send a GET request
    pub async fn get(&self, path: &str) -> TestResponse {
        self.request(TestRequest::get(path)).await
    }

    /// Send a GET request with the given `Accept` header
    pub async fn get_with_accept(&self, path: &str, accept: &str) -> TestResponse {
        self.request(TestRequest::get(path).header("accept", accept))
            .await
    }

    /// Send a request with full control
    pub async fn request(&self, req: TestRequest) -> TestResponse {
        let uri: http::Uri = req.path.parse().unwrap_or_else(|_| http::Uri::from_static("/"));
        let mut http_req = http::Request::new(Bytes::new());
        *http_req.method_mut() = req.method;
        *http_req.uri_mut() = uri;
        *http_req.headers_mut() = req.headers;

        let response = self.app.call(http_req).await;
        TestResponse::from_response(response).await
    }
}

/// Test request builder
#[derive(Debug, Clone)]
pub struct TestRequest {
    method: Method,
    path: String,
    headers: HeaderMap,
}

impl TestRequest {
    fn new(method: Method, path: &str) -> Self {
        Self {
            method,
            path: path.to_string(),
            headers: HeaderMap::new(),
        }
    }

    /// Create a GET request
    pub fn get(path: &str) -> Self {
        Self::new(Method::GET, path)
    }

    /// Add a header to the request; invalid names or values are ignored
    ///
    /// Values may carry non-ASCII bytes, as a real client can send them.
    pub fn header(mut self, key: &str, value: &str) -> Self {
        if let (Ok(name), Ok(val)) = (
            key.parse::<http::header::HeaderName>(),
            HeaderValue::from_bytes(value.as_bytes()),
        ) {
            self.headers.insert(name, val);
        }
        self
    }
}

/// Test response with assertion helpers
#[derive(Debug)]
pub struct TestResponse {
    status: StatusCode,
    headers: HeaderMap,
    body: Bytes,
}

impl TestResponse {
    async fn from_response(response: crate::response::Response) -> Self {
        let (parts, body) = response.into_parts();
        let body = body
            .collect()
            .await
            .map(|b| b.to_bytes())
            .unwrap_or_default();

        Self {
            status: parts.status,
            headers: parts.headers,
            body,
        }
    }

    pub fn status(&self) -> StatusCode {
        self.status
    }

    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    pub fn body(&self) -> &Bytes {
        &self.body
    }

    /// Body as a string, lossy on invalid UTF-8
    pub fn text(&self) -> String {
        String::from_utf8_lossy(&self.body).to_string()
    }

    /// Parse the body as JSON
    pub fn json<T: DeserializeOwned>(&self) -> Result<T, serde_json::Error> {
        serde_json::from_slice(&self.body)
    }

    /// Assert the status code
    ///
    /// # Panics
    ///
    /// Panics if the status code doesn't match.
    pub fn assert_status<S: Into<StatusCode>>(&self, expected: S) -> &Self {
        let expected = expected.into();
        assert_eq!(
            self.status,
            expected,
            "Expected status {}, got {}. Body: {}",
            expected,
            self.status,
            self.text()
        );
        self
    }

    /// Assert a header value
    ///
    /// # Panics
    ///
    /// Panics if the header is missing or doesn't match.
    pub fn assert_header(&self, key: &str, expected: &str) -> &Self {
        let actual = self
            .headers
            .get(key)
            .and_then(|v| v.to_str().ok())
            .unwrap_or("");

        assert_eq!(
            actual, expected,
            "Expected header '{}' to be '{}', got '{}'",
            key, expected, actual
        );
        self
    }

    /// Assert that the response is JSON (`content-type: application/json`)
    pub fn assert_json_content(&self) -> &Self {
        self.assert_header(header::CONTENT_TYPE.as_str(), "application/json")
    }
}
