use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;

/// Every failure leaves the API as `{ "error": ..., "details": ... }`.
#[derive(Debug)]
pub struct ApiError {
    pub status: StatusCode,
    pub error: String,
    pub details: String,
}

impl ApiError {
    pub fn bad_request(details: impl Into<String>) -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            error: "Invalid request".to_string(),
            details: details.into(),
        }
    }
}

impl From<ectd_service::Error> for ApiError {
    fn from(err: ectd_service::Error) -> Self {
        let (status, error) = if err.is_invalid_request() {
            (StatusCode::BAD_REQUEST, "Invalid request")
        } else if err.is_conflict() {
            (StatusCode::CONFLICT, "Sequence conflict")
        } else {
            (StatusCode::INTERNAL_SERVER_ERROR, "Internal server error")
        };

        if status == StatusCode::INTERNAL_SERVER_ERROR {
            tracing::error!(error = ?err, "request failed");
        } else {
            tracing::warn!(%err, "request rejected");
        }

        Self {
            status,
            error: error.to_string(),
            details: err.to_string(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = Json(json!({ "error": self.error, "details": self.details }));
        (self.status, body).into_response()
    }
}
