//! Shared test helpers for integration tests.

#![allow(dead_code)]

use std::sync::Arc;

use axum::Router;
use axum::body::Body;
use axum::http::{Request, StatusCode};
use http_body_util::BodyExt;
use serde_json::Value;
use tower::ServiceExt;

use picvault_api::AppState;
use picvault_auth::JwtEncoder;
use picvault_core::config::AppConfig;
use picvault_database::NodeStore;
use picvault_storage::{MediaManager, MemoryMediaStore};

const BOUNDARY: &str = "picvault-test-boundary";

/// Test application context
pub struct TestApp {
    /// The Axum router for making test requests
    pub router: Router,
    /// Media store behind the router, for asserting on stored assets
    pub media: Arc<MemoryMediaStore>,
    /// Issues tokens the router accepts
    pub encoder: JwtEncoder,
    /// Application config
    pub config: AppConfig,
}

impl TestApp {
    /// Create a new test application over in-memory backends
    pub fn new() -> Self {
        let mut config = AppConfig::default();
        config.database.provider = "memory".to_string();
        config.storage.provider = "memory".to_string();
        config.auth.jwt_secret = "integration-test-secret".to_string();

        let media = Arc::new(MemoryMediaStore::default());
        let manager = MediaManager::from_provider(media.clone());
        let state = AppState::new(config.clone(), NodeStore::in_memory(), manager);

        Self {
            router: picvault_api::build_app(state),
            media,
            encoder: JwtEncoder::new(&config.auth),
            config,
        }
    }

    /// Bearer token for `user_id`
    pub fn token(&self, user_id: &str) -> String {
        self.encoder
            .issue(user_id, Some("Test User"))
            .expect("Failed to issue token")
    }

    /// Make a JSON request to the test app
    pub async fn request(
        &self,
        method: &str,
        path: &str,
        body: Option<Value>,
        token: Option<&str>,
    ) -> TestResponse {
        let body_str = body
            .map(|b| serde_json::to_string(&b).expect("Failed to serialize body"))
            .unwrap_or_default();

        let mut req = Request::builder()
            .method(method)
            .uri(path)
            .header("Content-Type", "application/json");

        if let Some(token) = token {
            req = req.header("Authorization", format!("Bearer {}", token));
        }

        let req = req
            .body(Body::from(body_str))
            .expect("Failed to build request");

        self.send(req).await
    }

    /// Upload `data` as the `file` part, plus any extra text fields
    pub async fn upload(
        &self,
        token: &str,
        file_name: &str,
        content_type: &str,
        data: &[u8],
        fields: &[(&str, &str)],
    ) -> TestResponse {
        let mut body = Vec::new();
        for (name, value) in fields {
            body.extend_from_slice(
                format!(
                    "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"{name}\"\r\n\r\n{value}\r\n"
                )
                .as_bytes(),
            );
        }
        body.extend_from_slice(
            format!(
                "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"file\"; filename=\"{file_name}\"\r\nContent-Type: {content_type}\r\n\r\n"
            )
            .as_bytes(),
        );
        body.extend_from_slice(data);
        body.extend_from_slice(format!("\r\n--{BOUNDARY}--\r\n").as_bytes());

        self.multipart(token, body).await
    }

    /// Send a raw multipart body
    pub async fn multipart(&self, token: &str, body: Vec<u8>) -> TestResponse {
        let req = Request::builder()
            .method("POST")
            .uri("/api/files/upload")
            .header(
                "Content-Type",
                format!("multipart/form-data; boundary={BOUNDARY}"),
            )
            .header("Authorization", format!("Bearer {}", token))
            .body(Body::from(body))
            .expect("Failed to build request");

        self.send(req).await
    }

    /// Create a folder and return its id
    pub async fn create_folder(&self, token: &str, name: &str, parent_id: Option<&str>) -> String {
        let response = self
            .request(
                "POST",
                "/api/folders/create",
                Some(serde_json::json!({ "name": name, "parentId": parent_id })),
                Some(token),
            )
            .await;
        assert_eq!(
            response.status,
            StatusCode::CREATED,
            "Create folder failed: {:?}",
            response.body
        );
        response.id()
    }

    async fn send(&self, req: Request<Body>) -> TestResponse {
        let response = self
            .router
            .clone()
            .oneshot(req)
            .await
            .expect("Failed to send request");

        let status = response.status();
        let body_bytes = response
            .into_body()
            .collect()
            .await
            .expect("Failed to read body")
            .to_bytes();

        let body: Value = serde_json::from_slice(&body_bytes).unwrap_or(Value::Null);

        TestResponse { status, body }
    }
}

/// Response from a test request
#[derive(Debug)]
pub struct TestResponse {
    /// HTTP status code
    pub status: StatusCode,
    /// Parsed JSON body
    pub body: Value,
}

impl TestResponse {
    /// The `data` member of a success envelope
    pub fn data(&self) -> &Value {
        &self.body["data"]
    }

    /// `data.id` as a string
    pub fn id(&self) -> String {
        self.data()["id"]
            .as_str()
            .expect("No id in response")
            .to_string()
    }

    /// `data` as an array of node names
    pub fn names(&self) -> Vec<String> {
        self.data()
            .as_array()
            .expect("data is not an array")
            .iter()
            .map(|n| n["name"].as_str().unwrap_or_default().to_string())
            .collect()
    }

    /// The stable error code of an error body
    pub fn error_code(&self) -> &str {
        self.body["error"].as_str().unwrap_or_default()
    }
}
