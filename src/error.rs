use thiserror::Error;

/// Application-wide error types.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Database error: {0}")]
    Database(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

/// Failures from the generative-AI provider, categorized so the chat route
/// can answer with a more specific diagnostic than a blanket 500.
#[derive(Debug, Error)]
pub enum ChatError {
    #[error("Invalid API configuration: {0}")]
    ModelConfig(String),

    #[error("API key error: {0}")]
    ApiKey(String),

    #[error("Failed to get AI response: {0}")]
    Upstream(String),
}

impl ChatError {
    /// Classify a raw provider error message the way the original service
    /// did: substring matching on the upstream error text.
    pub fn classify(message: impl Into<String>) -> Self {
        let message = message.into();
        if message.contains("not found for API version") {
            ChatError::ModelConfig(message)
        } else if message.contains("API key") {
            ChatError::ApiKey(message)
        } else {
            ChatError::Upstream(message)
        }
    }
}

/// Helper conversion from anyhow::Error
impl From<anyhow::Error> for AppError {
    fn from(err: anyhow::Error) -> Self {
        AppError::Internal(err.to_string())
    }
}

impl From<mongodb::error::Error> for AppError {
    fn from(err: mongodb::error::Error) -> Self {
        AppError::Database(err.to_string())
    }
}
