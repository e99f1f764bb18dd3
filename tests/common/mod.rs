//! Common Test Utilities
//!
//! Shared helpers, fixtures, and test infrastructure.

use axum::{
    body::Body,
    http::{Request, StatusCode},
    response::Response,
    routing::{get, post},
    Json, Router,
};
use serde_json::{json, Value};
use std::net::SocketAddr;
use tokio::net::TcpListener;
use tower::ServiceExt;

use chat_backend::config::Settings;
use chat_backend::presentation::http::routes::build_router;
use chat_backend::presentation::http::{with_validation, ValidatedJson};
use chat_backend::shared::error::AppError;
use chat_backend::shared::validation::JsonSchema;
use chat_backend::startup::AppState;

/// Body limit used by the test router
pub const TEST_BODY_LIMIT: usize = 256;

/// Test application builder
pub struct TestApp {
    pub router: Router,
    pub state: AppState,
}

impl TestApp {
    /// Create a single-node application with the test routes merged in
    pub fn new() -> Self {
        let settings = Settings::from_toml(&format!(
            "[http]\nmax_body_bytes = {}",
            TEST_BODY_LIMIT
        ))
        .expect("test settings");

        let state = AppState::new(settings);

        Self {
            router: build_router(state.clone(), test_routes()),
            state,
        }
    }

    /// Serve the router on an ephemeral local port
    pub async fn spawn(&self) -> SocketAddr {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let router = self.router.clone();

        tokio::spawn(async move {
            axum::serve(listener, router).await.unwrap();
        });

        addr
    }

    /// Make a GET request to the application
    pub async fn get(&self, uri: &str) -> Response {
        self.router
            .clone()
            .oneshot(
                Request::builder()
                    .method("GET")
                    .uri(uri)
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap()
    }

    /// Make a POST request with JSON body
    pub async fn post_json(&self, uri: &str, body: &str) -> Response {
        self.router
            .clone()
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri(uri)
                    .header("Content-Type", "application/json")
                    .body(Body::from(body.to_string()))
                    .unwrap(),
            )
            .await
            .unwrap()
    }
}

/// Split a response into status and JSON body
pub async fn read_json(response: Response) -> (StatusCode, Value) {
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let body = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, body)
}

/// Schema requiring an `email` string
pub fn email_schema_document() -> Value {
    json!({
        "type": "object",
        "required": ["email"],
        "properties": { "email": { "type": "string" } }
    })
}

/// Schema accepting `{text: string}`
pub fn text_schema_document() -> Value {
    json!({
        "type": "object",
        "required": ["text"],
        "properties": { "text": { "type": "string" } }
    })
}

#[derive(Debug, serde::Deserialize, validator::Validate)]
pub struct Subscribe {
    #[validate(email(message = "Invalid email format"))]
    pub email: String,
}

/// Routes standing in for application handlers
fn test_routes() -> Router<AppState> {
    let email_schema = JsonSchema::compile(&email_schema_document()).unwrap();
    let text_schema = JsonSchema::compile(&text_schema_document()).unwrap();

    Router::new()
        .route(
            "/test/subscribe",
            post(with_validation(email_schema, |Json(body): Json<Value>| async move {
                Json(json!({ "subscribed": body["email"] }))
            })),
        )
        .route(
            "/test/echo",
            post(with_validation(text_schema, |Json(body): Json<Value>| async move {
                Json(body)
            })),
        )
        .route(
            "/test/typed",
            post(|ValidatedJson(body): ValidatedJson<Subscribe>| async move {
                Json(json!({ "subscribed": body.email }))
            }),
        )
        .route(
            "/test/users/{id}",
            get(|| async { Err::<(), _>(AppError::NotFound("user not found".into())) }),
        )
        .route(
            "/test/unauthorized",
            get(|| async { Err::<(), _>(AppError::Unauthorized("Missing token".into())) }),
        )
        .route(
            "/test/internal",
            get(|| async { Err::<(), _>(AppError::Internal("pool exhausted".into())) }),
        )
        .route("/test/panic", get(explode))
}

async fn explode() -> StatusCode {
    panic!("handler exploded")
}
