#![allow(dead_code)]

use std::sync::{Arc, Mutex};
use std::time::Duration;

use axum::body::Body;
use axum::http::{header, Method, Request, StatusCode};
use axum::Router;
use http_body_util::BodyExt;
use logit_mail::{EmailDispatcher, EmailError, EmailSender, OutgoingEmail};
use serde_json::Value;
use sqlx::PgPool;
use tower::ServiceExt;

use logit_api::auth::jwt::JwtConfig;
use logit_api::config::ServerConfig;
use logit_api::router::build_app_router;
use logit_api::state::AppState;

/// Password that satisfies the account password policy.
pub const PASSWORD: &str = "Secret-Pass1";

/// Build a test `ServerConfig` with safe defaults.
pub fn test_config() -> ServerConfig {
    ServerConfig {
        host: "127.0.0.1".to_string(),
        port: 0,
        cors_origins: vec!["http://localhost:5173".to_string()],
        request_timeout_secs: 30,
        database_url: String::new(),
        app_base_url: "http://localhost:3000".to_string(),
        frontend_url: "http://localhost:5173".to_string(),
        jwt: JwtConfig {
            secret: "test-secret-that-is-long-enough-for-hmac".to_string(),
            access_token_expiry_mins: 60,
            refresh_token_expiry_days: 7,
            confirmation_token_expiry_mins: 60,
            reset_token_expiry_mins: 60,
        },
        email: None,
    }
}

// ---------------------------------------------------------------------------
// Recording email sender
// ---------------------------------------------------------------------------

/// Captures every dispatched email instead of sending it.
#[derive(Default)]
pub struct RecordingSender {
    sent: Mutex<Vec<OutgoingEmail>>,
}

#[async_trait::async_trait]
impl EmailSender for RecordingSender {
    async fn send(&self, to: &str, subject: &str, body: &str) -> Result<(), EmailError> {
        self.sent.lock().unwrap().push(OutgoingEmail {
            to: to.to_string(),
            subject: subject.to_string(),
            body: body.to_string(),
        });
        Ok(())
    }
}

impl RecordingSender {
    pub fn sent_to(&self, to: &str) -> Vec<OutgoingEmail> {
        self.sent
            .lock()
            .unwrap()
            .iter()
            .filter(|e| e.to == to)
            .cloned()
            .collect()
    }

    /// Wait for the `nth` (0-based) email to `to`; dispatch runs on a spawned task.
    pub async fn wait_for(&self, to: &str, nth: usize) -> OutgoingEmail {
        for _ in 0..200 {
            if let Some(email) = self.sent_to(to).get(nth) {
                return email.clone();
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
        panic!("no email #{nth} was sent to {to}");
    }
}

/// Pull the `token=` query value out of an email body.
pub fn token_from(email: &OutgoingEmail) -> String {
    let start = email
        .body
        .find("token=")
        .expect("email should contain a token link")
        + "token=".len();
    email.body[start..]
        .split_whitespace()
        .next()
        .unwrap()
        .to_string()
}

// ---------------------------------------------------------------------------
// App
// ---------------------------------------------------------------------------

pub struct TestApp {
    pub router: Router,
    pub outbox: Arc<RecordingSender>,
    pub pool: PgPool,
}

/// Build the full application router with all middleware layers, using the
/// given database pool and a recording email sender.
pub fn build_test_app(pool: PgPool) -> TestApp {
    let outbox = Arc::new(RecordingSender::default());
    let state = AppState {
        pool: pool.clone(),
        config: Arc::new(test_config()),
        mailer: EmailDispatcher::new(outbox.clone()),
    };

    TestApp {
        router: build_app_router(state),
        outbox,
        pool,
    }
}

// ---------------------------------------------------------------------------
// Request helpers
// ---------------------------------------------------------------------------

async fn send(app: &Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let json = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap_or_else(|_| {
            Value::String(String::from_utf8_lossy(&bytes).into_owned())
        })
    };
    (status, json)
}

fn with_auth(builder: axum::http::request::Builder, token: Option<&str>) -> axum::http::request::Builder {
    match token {
        Some(token) => builder.header(header::AUTHORIZATION, format!("Bearer {token}")),
        None => builder,
    }
}

pub async fn get(app: &Router, uri: &str) -> (StatusCode, Value) {
    get_auth(app, uri, None).await
}

pub async fn get_auth(app: &Router, uri: &str, token: Option<&str>) -> (StatusCode, Value) {
    let request = with_auth(Request::builder().method(Method::GET).uri(uri), token)
        .body(Body::empty())
        .unwrap();
    send(app, request).await
}

pub async fn post_json(app: &Router, uri: &str, body: Value) -> (StatusCode, Value) {
    post_json_auth(app, uri, body, None).await
}

pub async fn post_json_auth(
    app: &Router,
    uri: &str,
    body: Value,
    token: Option<&str>,
) -> (StatusCode, Value) {
    let request = with_auth(Request::builder().method(Method::POST).uri(uri), token)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap();
    send(app, request).await
}

pub async fn post_form(app: &Router, uri: &str, form: &str) -> (StatusCode, Value) {
    let request = Request::builder()
        .method(Method::POST)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
        .body(Body::from(form.to_string()))
        .unwrap();
    send(app, request).await
}

pub async fn delete_auth(app: &Router, uri: &str, token: Option<&str>) -> (StatusCode, Value) {
    let request = with_auth(Request::builder().method(Method::DELETE).uri(uri), token)
        .body(Body::empty())
        .unwrap();
    send(app, request).await
}

// ---------------------------------------------------------------------------
// Account helpers
// ---------------------------------------------------------------------------

pub async fn register(app: &TestApp, email: &str) -> (StatusCode, Value) {
    post_json(
        &app.router,
        "/api/v1/auth/register",
        serde_json::json!({
            "first_name": "Ada",
            "last_name": "Lovelace",
            "email": email,
            "password": PASSWORD,
        }),
    )
    .await
}

pub async fn login(app: &TestApp, email: &str, password: &str) -> (StatusCode, Value) {
    post_form(
        &app.router,
        "/api/v1/auth/login",
        &format!("username={email}&password={password}"),
    )
    .await
}

/// Register, confirm via the emailed link and log in. Returns the access token.
pub async fn signed_in_user(app: &TestApp, email: &str) -> String {
    let (status, _) = register(app, email).await;
    assert_eq!(status, StatusCode::CREATED);

    let token = token_from(&app.outbox.wait_for(email, 0).await);
    let (status, _) = get(
        &app.router,
        &format!("/api/v1/auth/confirm-email?token={token}"),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (status, body) = login(app, email, PASSWORD).await;
    assert_eq!(status, StatusCode::OK);
    body["data"]["access_token"].as_str().unwrap().to_string()
}
