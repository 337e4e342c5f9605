//! Common test utilities for API testing with a mock gateway.
//!
//! This module provides a test fixture that creates an in-process router
//! backed by `MockGateway`, so every endpoint can be exercised without a
//! running daemon.

#![allow(dead_code)]

use std::sync::Arc;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::Router;
use http_body_util::BodyExt;
use serde_json::Value;
use tower::ServiceExt;

use tapdash_core::{testing::MockGateway, Config, Gateway};
use tapdash_server::state::AppState;

/// Re-export fixtures for test convenience
pub use tapdash_core::testing::fixtures;

/// Test fixture for API testing with a mock gateway.
///
/// # Example
///
/// ```rust,ignore
/// #[tokio::test]
/// async fn test_submit() {
///     let fixture = TestFixture::new();
///
///     let response = fixture.post("/api/v1/mint/submit", json!({
///         "asset_type": "NORMAL", "name": "Gold", "amount": "100"
///     })).await;
///
///     assert_eq!(response.status, 200);
/// }
/// ```
pub struct TestFixture {
    /// The Axum router for testing
    pub router: Router,
    /// Mock gateway - configure batches, assets and failures
    pub gateway: Arc<MockGateway>,
    /// Shared state, for direct orchestrator access
    pub state: Arc<AppState>,
}

/// Response from a test request
#[derive(Debug)]
pub struct TestResponse {
    pub status: StatusCode,
    pub body: Value,
}

impl TestFixture {
    /// Create a new test fixture. The orchestrator is not started, so neither
    /// the poll nor delayed refreshes interfere with call counts.
    pub fn new() -> Self {
        let gateway = Arc::new(MockGateway::new());
        let config = Config::default();

        let state = Arc::new(AppState::new(
            config,
            Arc::clone(&gateway) as Arc<dyn Gateway>,
        ));
        let router = tapdash_server::api::create_router(Arc::clone(&state));

        Self {
            router,
            gateway,
            state,
        }
    }

    /// Create a fixture whose wizard has already submitted one asset.
    pub async fn in_finalize_stage() -> Self {
        let fixture = Self::new();
        let response = fixture
            .post(
                "/api/v1/mint/submit",
                serde_json::json!({ "asset_type": "NORMAL", "name": "Gold", "amount": "100" }),
            )
            .await;
        assert_eq!(response.status, StatusCode::OK, "submit failed: {:?}", response.body);
        fixture
    }

    /// Send a GET request to the test server.
    pub async fn get(&self, path: &str) -> TestResponse {
        self.request("GET", path, None).await
    }

    /// Send a POST request with JSON body.
    pub async fn post(&self, path: &str, body: Value) -> TestResponse {
        self.request("POST", path, Some(body)).await
    }

    /// Send a POST request with no body.
    pub async fn post_empty(&self, path: &str) -> TestResponse {
        self.request("POST", path, None).await
    }

    /// Send a GET request and return the raw text body.
    pub async fn get_text(&self, path: &str) -> (StatusCode, String) {
        let request = Request::builder()
            .method("GET")
            .uri(path)
            .body(Body::empty())
            .unwrap();

        let response = self
            .router
            .clone()
            .oneshot(request)
            .await
            .expect("Failed to send request");

        let status = response.status();
        let body_bytes = response
            .into_body()
            .collect()
            .await
            .expect("Failed to collect body")
            .to_bytes();

        (status, String::from_utf8_lossy(&body_bytes).into_owned())
    }

    /// Send a request to the test server.
    async fn request(&self, method: &str, path: &str, body: Option<Value>) -> TestResponse {
        let mut request_builder = Request::builder().method(method).uri(path);

        let body = if let Some(json_body) = body {
            request_builder = request_builder.header("Content-Type", "application/json");
            Body::from(serde_json::to_vec(&json_body).unwrap())
        } else {
            Body::empty()
        };

        let request = request_builder.body(body).unwrap();

        let response = self
            .router
            .clone()
            .oneshot(request)
            .await
            .expect("Failed to send request");

        let status = response.status();
        let body_bytes = response
            .into_body()
            .collect()
            .await
            .expect("Failed to collect body")
            .to_bytes();

        let body: Value = if body_bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&body_bytes).unwrap_or(Value::Null)
        };

        TestResponse { status, body }
    }
}
