//! Application router: the `/health` probe, the `/api/v1` tree and the
//! middleware every request passes through.
//!
//! The binary and the integration tests both call [`build_app_router`], so
//! tests exercise the production middleware.

use std::any::Any;
use std::time::Duration;

use axum::http::header::{AUTHORIZATION, CONTENT_TYPE};
use axum::http::{HeaderName, HeaderValue, Method, StatusCode};
use axum::middleware::map_response;
use axum::response::{IntoResponse, Response};
use axum::Router;
use tower_http::catch_panic::CatchPanicLayer;
use tower_http::cors::CorsLayer;
use tower_http::request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer};
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer};
use tracing::Level;

use crate::config::ServerConfig;
use crate::response::ApiResponse;
use crate::routes;
use crate::state::AppState;

const REQUEST_ID_HEADER: &str = "x-request-id";

/// Build the application [`Router`].
///
/// Layers are listed innermost first; a request passes CORS, request id
/// assignment, tracing, request id echo, the timeout and panic recovery in
/// that order. Unmatched paths, timeouts and panics all answer with the
/// standard failure envelope.
pub fn build_app_router(state: AppState) -> Router {
    let cors = build_cors_layer(&state.config);
    let timeout = Duration::from_secs(state.config.request_timeout_secs);
    let request_id = HeaderName::from_static(REQUEST_ID_HEADER);

    Router::new()
        .merge(routes::health::router())
        .nest("/api/v1", routes::api_routes())
        .fallback(route_not_found)
        .layer(CatchPanicLayer::custom(panic_response))
        .layer(TimeoutLayer::with_status_code(
            StatusCode::REQUEST_TIMEOUT,
            timeout,
        ))
        .layer(map_response(timeout_envelope))
        .layer(PropagateRequestIdLayer::new(request_id.clone()))
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO)),
        )
        .layer(SetRequestIdLayer::new(request_id, MakeRequestUuid))
        .layer(cors)
        .with_state(state)
}

async fn route_not_found() -> ApiResponse<()> {
    ApiResponse::failure(StatusCode::NOT_FOUND, "Route not found")
}

/// Replaces the bare 500 that a panicking handler would produce.
fn panic_response(panic: Box<dyn Any + Send + 'static>) -> Response {
    let detail = panic
        .downcast_ref::<&str>()
        .map(|s| s.to_string())
        .or_else(|| panic.downcast_ref::<String>().cloned())
        .unwrap_or_else(|| "unknown panic payload".to_string());
    tracing::error!(panic = %detail, "Handler panicked");

    ApiResponse::failure(StatusCode::INTERNAL_SERVER_ERROR, "An internal error occurred")
        .into_response()
}

/// Wraps the empty 408 emitted by the timeout layer in the envelope.
/// Handlers never answer 408 themselves.
async fn timeout_envelope(response: Response) -> Response {
    if response.status() == StatusCode::REQUEST_TIMEOUT {
        return ApiResponse::failure(StatusCode::REQUEST_TIMEOUT, "Request timed out")
            .into_response();
    }
    response
}

/// CORS for the configured frontend origins. Entries that are not valid
/// header values are logged and skipped.
pub fn build_cors_layer(config: &ServerConfig) -> CorsLayer {
    let origins: Vec<HeaderValue> = config
        .cors_origins
        .iter()
        .filter_map(|o| match o.parse() {
            Ok(origin) => Some(origin),
            Err(e) => {
                tracing::warn!(origin = %o, error = %e, "Ignoring invalid CORS origin");
                None
            }
        })
        .collect();

    CorsLayer::new()
        .allow_origin(origins)
        .allow_methods([Method::GET, Method::POST, Method::DELETE])
        .allow_headers([CONTENT_TYPE, AUTHORIZATION])
        .allow_credentials(true)
        .max_age(Duration::from_secs(3600))
}

#[cfg(test)]
mod tests {
    use axum::body::Body;
    use axum::http::Request;
    use axum::routing::get;
    use http_body_util::BodyExt;
    use serde_json::Value;
    use tower::ServiceExt;

    use super::*;

    fn config_with_origins(origins: &[&str]) -> ServerConfig {
        let lookup = |var: &str| match var {
            "DATABASE_URL" => Some("postgres://localhost/logit".to_string()),
            "JWT_SECRET" => Some("secret".to_string()),
            "CORS_ORIGINS" => Some(origins.join(",")),
            _ => None,
        };
        ServerConfig::from_lookup(lookup).unwrap()
    }

    async fn call(router: Router, uri: &str) -> (StatusCode, Value) {
        let request = Request::builder().uri(uri).body(Body::empty()).unwrap();
        let response = router.oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[test]
    fn cors_layer_skips_invalid_origins() {
        let config = config_with_origins(&["http://localhost:5173", "bad\norigin"]);
        // Builds without panicking; the bad entry is dropped.
        let _layer = build_cors_layer(&config);
    }

    #[tokio::test]
    async fn panics_become_enveloped_500() {
        let router = Router::new()
            .route("/boom", get(|| async { panic!("boom") as () }))
            .layer(CatchPanicLayer::custom(panic_response));

        let (status, body) = call(router, "/boom").await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body["isSuccess"], false);
        assert_eq!(body["status_code"], 500);
        assert_eq!(body["errors"][0], "An internal error occurred");
    }

    #[tokio::test]
    async fn timeouts_become_enveloped_408() {
        let router = Router::new()
            .route(
                "/slow",
                get(|| async {
                    tokio::time::sleep(Duration::from_secs(5)).await;
                    "late"
                }),
            )
            .layer(TimeoutLayer::with_status_code(
                StatusCode::REQUEST_TIMEOUT,
                Duration::from_millis(20),
            ))
            .layer(map_response(timeout_envelope));

        let (status, body) = call(router, "/slow").await;
        assert_eq!(status, StatusCode::REQUEST_TIMEOUT);
        assert_eq!(body["isSuccess"], false);
        assert_eq!(body["errors"][0], "Request timed out");
    }
}
