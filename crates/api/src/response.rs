//! Shared response envelope for API handlers.
//!
//! Every response, success or failure, is serialized as
//! `{ "isSuccess", "messages", "errors", "data", "status_code" }` and sent with
//! an HTTP status equal to `status_code`. Use [`ApiResponse`] instead of ad-hoc
//! `serde_json::json!` bodies.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;

/// Standard response envelope.
#[derive(Debug, Serialize)]
pub struct ApiResponse<T: Serialize> {
    #[serde(rename = "isSuccess")]
    pub is_success: bool,
    pub messages: Vec<String>,
    pub errors: Vec<String>,
    pub data: Option<T>,
    pub status_code: u16,
}

impl<T: Serialize> ApiResponse<T> {
    /// 200 OK carrying `data` and a single message.
    pub fn ok(data: T, message: impl Into<String>) -> Self {
        Self::success(StatusCode::OK, data, message)
    }

    /// 201 Created carrying `data` and a single message.
    pub fn created(data: T, message: impl Into<String>) -> Self {
        Self::success(StatusCode::CREATED, data, message)
    }

    pub fn success(status: StatusCode, data: T, message: impl Into<String>) -> Self {
        Self {
            is_success: true,
            messages: vec![message.into()],
            errors: Vec::new(),
            data: Some(data),
            status_code: status.as_u16(),
        }
    }
}

impl ApiResponse<()> {
    /// Failure envelope with no data.
    pub fn failure(status: StatusCode, error: impl Into<String>) -> Self {
        Self {
            is_success: false,
            messages: Vec::new(),
            errors: vec![error.into()],
            data: None,
            status_code: status.as_u16(),
        }
    }
}

impl<T: Serialize> IntoResponse for ApiResponse<T> {
    fn into_response(self) -> Response {
        let status =
            StatusCode::from_u16(self.status_code).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        (status, Json(self)).into_response()
    }
}
