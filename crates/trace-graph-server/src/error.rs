//! HTTP error responses.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;
use tracing::error;

use trace_graph_core::TraceGraphError;

/// Error wrapper turning core failures into HTTP responses.
///
/// Caller errors (malformed records, rejected link types) map to 400;
/// everything else (backend, embedding, chat failures) is a 500 with the
/// triggering message. No endpoint fabricates a partial success.
#[derive(Debug)]
pub struct ApiError(pub TraceGraphError);

#[derive(Serialize)]
struct ErrorBody {
    error: String,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = if self.0.is_caller_error() {
            StatusCode::BAD_REQUEST
        } else {
            StatusCode::INTERNAL_SERVER_ERROR
        };
        let message = self.0.to_string();
        error!(%status, %message, "request failed");
        (status, Json(ErrorBody { error: message })).into_response()
    }
}

impl From<TraceGraphError> for ApiError {
    fn from(err: TraceGraphError) -> Self {
        Self(err)
    }
}
