use std::sync::Arc;

use async_trait::async_trait;
use reqwest::Client;
use serde_json::{json, Value};

use crate::config::LlmConfig;
use crate::core_types::{Completion, Message, Usage};
use crate::errors::ChatError;
use crate::llm::LanguageModel;

#[derive(Debug, Clone)]
pub struct OpenAiChatClient {
    client: Client,
    api_key: String,
    api_base: String,
    model: String,
    temperature: f32,
    max_tokens: Option<u32>,
}

impl OpenAiChatClient {
    /// Temperature defaults to zero so replies are deterministic.
    pub fn new(api_key: String, model: String) -> Self {
        Self {
            client: Client::new(),
            api_key,
            api_base: "https://api.openai.com/v1".to_string(),
            model,
            temperature: 0.0,
            max_tokens: None,
        }
    }

    pub fn with_api_base(mut self, api_base: String) -> Self {
        self.api_base = api_base.trim_end_matches('/').to_string();
        self
    }

    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = temperature;
        self
    }

    pub fn with_max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = Some(max_tokens);
        self
    }

    fn build_request_body(&self, messages: &[Message]) -> Value {
        let mut body = json!({
            "model": self.model,
            "messages": messages,
            "temperature": self.temperature,
        });

        if let Some(max_tokens) = self.max_tokens {
            body["max_tokens"] = max_tokens.into();
        }

        body
    }

    fn parse_response(&self, response: Value) -> Result<Completion, ChatError> {
        let choices = response["choices"]
            .as_array()
            .ok_or_else(|| ChatError::Parsing("no choices in response".to_string()))?;

        let choice = choices
            .first()
            .ok_or_else(|| ChatError::Parsing("empty choices array".to_string()))?;

        let content = choice["message"]["content"]
            .as_str()
            .ok_or_else(|| ChatError::Parsing("response has no message content".to_string()))?
            .to_string();

        let finish_reason = choice["finish_reason"].as_str().map(|s| s.to_string());
        let usage = serde_json::from_value::<Usage>(response["usage"].clone()).ok();

        Ok(Completion {
            content,
            finish_reason,
            usage,
        })
    }
}

#[async_trait]
impl LanguageModel for OpenAiChatClient {
    async fn complete(&self, messages: &[Message]) -> Result<Completion, ChatError> {
        let url = format!("{}/chat/completions", self.api_base);
        let body = self.build_request_body(messages);

        log::debug!(
            "chat completion request to {} with {} messages",
            url,
            messages.len()
        );

        let response = self
            .client
            .post(&url)
            .header("Authorization", format!("Bearer {}", self.api_key))
            .header("Content-Type", "application/json")
            .json(&body)
            .send()
            .await
            .map_err(|e| ChatError::Model(format!("HTTP request failed: {}", e)))?;

        let status = response.status();
        let response_text = response
            .text()
            .await
            .map_err(|e| ChatError::Model(format!("failed to read response: {}", e)))?;

        if !status.is_success() {
            return Err(ChatError::Model(format!(
                "API request failed with status {}: {}",
                status, response_text
            )));
        }

        let response_json: Value = serde_json::from_str(&response_text)
            .map_err(|e| ChatError::Parsing(format!("invalid JSON response: {}", e)))?;

        self.parse_response(response_json)
    }
}

/// Builds the completion client from configuration. A missing credential is
/// an error here, before any request is made.
pub fn create_client(config: &LlmConfig) -> Result<Arc<dyn LanguageModel>, ChatError> {
    let api_key = config.auth.resolve()?;

    let mut client =
        OpenAiChatClient::new(api_key, config.model.clone()).with_temperature(config.parameters.temperature);
    if let Some(max_tokens) = config.parameters.max_tokens {
        client = client.with_max_tokens(max_tokens);
    }

    Ok(Arc::new(client))
}
