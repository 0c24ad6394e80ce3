use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::{Deserialize, Serialize};

use crate::app::AppState;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatRequest {
    pub message: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatResponse {
    pub success: bool,
    pub response: String,
}

/// `POST /api/chat`. Forwards the message to the generative-AI provider.
pub async fn chat_handler(
    State(state): State<AppState>,
    Json(request): Json<ChatRequest>,
) -> Response {
    let Some(message) = request.message.filter(|m| !m.trim().is_empty()) else {
        let body = serde_json::json!({
            "success": false,
            "error": "Message is required",
        });
        return (StatusCode::BAD_REQUEST, Json(body)).into_response();
    };

    tracing::debug!(len = message.len(), "forwarding chat message");

    match state.chat.generate(&message).await {
        Ok(text) => Json(ChatResponse {
            success: true,
            response: text,
        })
        .into_response(),
        Err(err) => {
            tracing::warn!("chat provider error: {err}");
            err.into_response()
        }
    }
}
