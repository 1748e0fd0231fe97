//! Language model provider abstraction and the OpenAI-style client.
//!
//! The assistant makes exactly one completion call per chat turn, sending
//! the full accumulated transcript each time. Failures are surfaced to the
//! caller without retry.

pub mod openai;

pub use openai::OpenAiChatClient;

use crate::core_types::{Completion, Message};
use crate::errors::ChatError;
use async_trait::async_trait;

#[async_trait]
pub trait LanguageModel: Send + Sync {
    async fn complete(&self, messages: &[Message]) -> Result<Completion, ChatError>;
}
