//! Offline model doubles shared across the unit tests.

use std::sync::Mutex;

use async_trait::async_trait;

use crate::core_types::{Completion, Message, Role};
use crate::errors::ChatError;
use crate::llm::LanguageModel;

/// Replies with `echo: <last user content>`.
pub struct EchoModel;

#[async_trait]
impl LanguageModel for EchoModel {
    async fn complete(&self, messages: &[Message]) -> Result<Completion, ChatError> {
        let last_user = messages
            .iter()
            .rev()
            .find(|message| message.role == Role::User)
            .map(|message| message.content.clone())
            .unwrap_or_default();

        Ok(Completion {
            content: format!("echo: {}", last_user),
            finish_reason: Some("stop".to_string()),
            usage: None,
        })
    }
}

/// Always fails, for the no-recovery paths.
pub struct FailingModel;

#[async_trait]
impl LanguageModel for FailingModel {
    async fn complete(&self, _messages: &[Message]) -> Result<Completion, ChatError> {
        Err(ChatError::Model("synthetic failure".to_string()))
    }
}

/// Records every outbound message sequence and returns a fixed reply.
pub struct CapturingModel {
    reply: String,
    calls: Mutex<Vec<Vec<Message>>>,
}

impl CapturingModel {
    pub fn new(reply: impl Into<String>) -> Self {
        Self {
            reply: reply.into(),
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn calls(&self) -> Vec<Vec<Message>> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl LanguageModel for CapturingModel {
    async fn complete(&self, messages: &[Message]) -> Result<Completion, ChatError> {
        self.calls.lock().unwrap().push(messages.to_vec());
        Ok(Completion {
            content: self.reply.clone(),
            finish_reason: Some("stop".to_string()),
            usage: None,
        })
    }
}
