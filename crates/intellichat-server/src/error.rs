//! Error types for the chat server.

use intellichat_core::ChatError;
use thiserror::Error;

/// Result type alias for server operations.
pub type Result<T> = std::result::Result<T, ServerError>;

#[derive(Error, Debug)]
pub enum ServerError {
    #[error("chat error: {0}")]
    Chat(#[from] ChatError),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("HTTP server error: {0}")]
    Http(#[from] hyper::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("unknown session: {0}")]
    UnknownSession(String),

    #[error("invalid request: {0}")]
    InvalidRequest(String),

    #[error("configuration error: {0}")]
    Config(String),

    #[error("internal server error: {0}")]
    Internal(String),
}

impl ServerError {
    pub fn invalid_request(msg: impl Into<String>) -> Self {
        Self::InvalidRequest(msg.into())
    }

    pub fn config_error(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    pub fn internal(msg: impl Into<String>) -> Self {
        Self::Internal(msg.into())
    }

    pub fn status_code(&self) -> u16 {
        match self {
            ServerError::UnknownSession(_) => 404,
            ServerError::InvalidRequest(_) | ServerError::Json(_) => 400,
            ServerError::Chat(e) => match e {
                ChatError::Config(_) | ChatError::Io(_) => 500,
                _ => 422,
            },
            ServerError::Http(_)
            | ServerError::Io(_)
            | ServerError::Config(_)
            | ServerError::Internal(_) => 500,
        }
    }

    pub fn error_type(&self) -> &'static str {
        match self {
            ServerError::Chat(_) => "chat_error",
            ServerError::Json(_) => "json_error",
            ServerError::Http(_) => "http_error",
            ServerError::Io(_) => "io_error",
            ServerError::UnknownSession(_) => "unknown_session",
            ServerError::InvalidRequest(_) => "invalid_request",
            ServerError::Config(_) => "config_error",
            ServerError::Internal(_) => "internal_error",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_codes() {
        assert_eq!(ServerError::UnknownSession("x".into()).status_code(), 404);
        assert_eq!(ServerError::invalid_request("bad").status_code(), 400);
        assert_eq!(ServerError::internal("boom").status_code(), 500);
        assert_eq!(
            ServerError::Chat(ChatError::Pdf("broken".into())).status_code(),
            422
        );
        assert_eq!(
            ServerError::Chat(ChatError::Config("no key".into())).status_code(),
            500
        );
    }
}
