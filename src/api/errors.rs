use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};

use crate::error::{AppError, ChatError};

/// Convert AppError into the `{success: false, message, [error]}` envelope.
impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, message, detail) = match &self {
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, msg.clone(), None),
            AppError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg.clone(), None),
            AppError::Database(msg) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "Server error".to_string(),
                Some(msg.clone()),
            ),
            AppError::Internal(msg) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "Server error".to_string(),
                Some(msg.clone()),
            ),
        };

        let mut body = serde_json::json!({
            "success": false,
            "message": message,
        });
        if let Some(detail) = detail {
            body["error"] = serde_json::Value::String(detail);
        }

        (status, axum::Json(body)).into_response()
    }
}

/// Chat failures keep the original service's response shape:
/// `{success: false, error, details}`.
impl IntoResponse for ChatError {
    fn into_response(self) -> Response {
        let (error, details) = match &self {
            ChatError::ModelConfig(msg) => (
                "Invalid API configuration",
                format!(
                    "The model configuration is incorrect. Please check the model name and API version. ({msg})"
                ),
            ),
            ChatError::ApiKey(msg) => (
                "API key error",
                format!(
                    "There was an issue with the API key. Please check your configuration. ({msg})"
                ),
            ),
            ChatError::Upstream(msg) => ("Failed to get AI response", msg.clone()),
        };

        let body = serde_json::json!({
            "success": false,
            "error": error,
            "details": details,
        });

        (StatusCode::INTERNAL_SERVER_ERROR, axum::Json(body)).into_response()
    }
}
