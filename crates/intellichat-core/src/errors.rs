//! Error types for the assistant core.
//!
//! One unified hierarchy covers every failure mode the system has. There is
//! deliberately no retry or recovery machinery behind these variants: a
//! failed model call, a malformed document, or a missing credential is
//! surfaced to the caller as-is.

use thiserror::Error;

#[derive(Error, Debug, Clone)]
pub enum ChatError {
    #[error("model call failed: {0}")]
    Model(String),
    #[error("embedding call failed: {0}")]
    Embedding(String),
    #[error("PDF extraction failed: {0}")]
    Pdf(String),
    #[error("document error: {0}")]
    Document(String),
    #[error("configuration error: {0}")]
    Config(String),
    #[error("parsing error: {0}")]
    Parsing(String),
    #[error("transcript error: {0}")]
    Transcript(String),
    #[error("I/O error: {0}")]
    Io(String),
}

impl From<std::io::Error> for ChatError {
    fn from(err: std::io::Error) -> Self {
        ChatError::Io(err.to_string())
    }
}

impl From<reqwest::Error> for ChatError {
    fn from(err: reqwest::Error) -> Self {
        ChatError::Model(err.to_string())
    }
}
