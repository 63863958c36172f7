/**
 * Error Conversion
 *
 * `BackendError` implements `IntoResponse` so HTTP handlers (the WebSocket
 * upgrade refusing a connection, the health endpoint) can return it directly.
 *
 * # Response Format
 *
 * ```json
 * {
 *   "error": "server is full (100 sessions)",
 *   "status": 503
 * }
 * ```
 */

use axum::{
    response::{IntoResponse, Response},
    Json,
};

use crate::backend::error::types::BackendError;

impl IntoResponse for BackendError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        if status.is_server_error() {
            tracing::warn!(status = status.as_u16(), error = %self, "Request failed");
        }

        let body = serde_json::json!({
            "error": self.message(),
            "status": status.as_u16(),
        });

        (status, Json(body)).into_response()
    }
}
