//! Configuration for the assistant.
//!
//! Everything has a serde default so a minimal YAML file (or none at all)
//! is enough to run. Each auth section may carry an inline key or name an
//! environment variable, falling back to `OPENAI_API_KEY`; resolution
//! failure is surfaced at startup.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::errors::ChatError;
use crate::pdf;
use crate::session::{DocumentMode, SessionOptions};

/// Environment variable consulted when no other credential source is given.
pub const DEFAULT_API_KEY_ENV: &str = "OPENAI_API_KEY";

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct ChatConfig {
    #[serde(default)]
    pub assistant: AssistantConfig,
    #[serde(default)]
    pub llm: LlmConfig,
    #[serde(default)]
    pub embeddings: EmbeddingConfig,
    #[serde(default)]
    pub retrieval: RetrievalConfig,
}

impl ChatConfig {
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ChatError> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path)
            .map_err(|e| ChatError::Config(format!("failed to read {}: {}", path.display(), e)))?;
        let config: ChatConfig = serde_yaml::from_str(&raw)
            .map_err(|e| ChatError::Config(format!("failed to parse {}: {}", path.display(), e)))?;
        Ok(config)
    }

    pub fn session_options(&self) -> SessionOptions {
        SessionOptions {
            system_prompt: self.assistant.system_prompt.clone(),
            document_mode: self.assistant.document_mode,
            summary_pages: self.assistant.summary_pages,
            retrieval: self.retrieval.clone(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AssistantConfig {
    #[serde(default = "default_assistant_name")]
    pub name: String,
    #[serde(default)]
    pub system_prompt: Option<String>,
    #[serde(default = "default_document_mode")]
    pub document_mode: DocumentMode,
    #[serde(default = "default_summary_pages")]
    pub summary_pages: usize,
}

impl Default for AssistantConfig {
    fn default() -> Self {
        Self {
            name: default_assistant_name(),
            system_prompt: None,
            document_mode: default_document_mode(),
            summary_pages: default_summary_pages(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LlmConfig {
    #[serde(default = "default_chat_model")]
    pub model: String,
    #[serde(default)]
    pub parameters: ModelParameters,
    #[serde(default)]
    pub auth: Auth,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            model: default_chat_model(),
            parameters: ModelParameters::default(),
            auth: Auth::default(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct ModelParameters {
    /// Zero keeps replies deterministic.
    #[serde(default)]
    pub temperature: f32,
    #[serde(default)]
    pub max_tokens: Option<u32>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmbeddingConfig {
    #[serde(default = "default_embedding_model")]
    pub model: String,
    #[serde(default = "default_embedding_dimension")]
    pub dimension: usize,
    #[serde(default)]
    pub auth: Auth,
}

impl Default for EmbeddingConfig {
    fn default() -> Self {
        Self {
            model: default_embedding_model(),
            dimension: default_embedding_dimension(),
            auth: Auth::default(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Auth {
    #[serde(default)]
    pub api_key: Option<String>,
    #[serde(default)]
    pub api_key_env: Option<String>,
}

impl Auth {
    /// Inline key, then the named environment variable, then
    /// `OPENAI_API_KEY`.
    pub fn resolve(&self) -> Result<String, ChatError> {
        if let Some(key) = &self.api_key {
            if !key.is_empty() {
                return Ok(key.clone());
            }
        }

        let env_var = self.api_key_env.as_deref().unwrap_or(DEFAULT_API_KEY_ENV);
        match std::env::var(env_var) {
            Ok(key) if !key.is_empty() => Ok(key),
            _ => Err(ChatError::Config(format!("{} is not set", env_var))),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RetrievalConfig {
    #[serde(default = "default_chunk_size")]
    pub chunk_size: usize,
    #[serde(default = "default_chunk_overlap")]
    pub chunk_overlap: usize,
    #[serde(default = "default_top_k")]
    pub top_k: usize,
    #[serde(default)]
    pub similarity_threshold: f32,
}

impl Default for RetrievalConfig {
    fn default() -> Self {
        Self {
            chunk_size: default_chunk_size(),
            chunk_overlap: default_chunk_overlap(),
            top_k: default_top_k(),
            similarity_threshold: 0.0,
        }
    }
}

fn default_assistant_name() -> String {
    "IntelliChat".to_string()
}

fn default_document_mode() -> DocumentMode {
    DocumentMode::Retrieval
}

fn default_summary_pages() -> usize {
    pdf::SUMMARY_PAGE_COUNT
}

fn default_chat_model() -> String {
    "gpt-4.1-mini".to_string()
}

fn default_embedding_model() -> String {
    "text-embedding-3-small".to_string()
}

fn default_embedding_dimension() -> usize {
    1536
}

fn default_chunk_size() -> usize {
    1000
}

fn default_chunk_overlap() -> usize {
    200
}

fn default_top_k() -> usize {
    4
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = ChatConfig::default();
        assert_eq!(config.assistant.name, "IntelliChat");
        assert_eq!(config.assistant.document_mode, DocumentMode::Retrieval);
        assert_eq!(config.assistant.summary_pages, 3);
        assert_eq!(config.llm.model, "gpt-4.1-mini");
        assert_eq!(config.llm.parameters.temperature, 0.0);
        assert_eq!(config.retrieval.chunk_size, 1000);
        assert_eq!(config.retrieval.chunk_overlap, 200);
    }

    #[test]
    fn test_partial_yaml_fills_in_defaults() {
        let yaml = r#"
assistant:
  system_prompt: "You are a concise assistant."
  document_mode: context
llm:
  model: gpt-4.1
"#;
        let config: ChatConfig = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(
            config.assistant.system_prompt.as_deref(),
            Some("You are a concise assistant.")
        );
        assert_eq!(config.assistant.document_mode, DocumentMode::Context);
        assert_eq!(config.llm.model, "gpt-4.1");
        assert_eq!(config.embeddings.model, "text-embedding-3-small");
        assert_eq!(config.retrieval.top_k, 4);
    }

    #[test]
    fn test_auth_prefers_the_inline_key() {
        let auth = Auth {
            api_key: Some("inline-key".to_string()),
            api_key_env: Some("INTELLICHAT_TEST_UNSET_VAR".to_string()),
        };
        assert_eq!(auth.resolve().unwrap(), "inline-key");
    }

    #[test]
    fn test_auth_reads_the_named_environment_variable() {
        std::env::set_var("INTELLICHAT_TEST_KEY_VAR", "env-key");
        let auth = Auth {
            api_key: None,
            api_key_env: Some("INTELLICHAT_TEST_KEY_VAR".to_string()),
        };
        assert_eq!(auth.resolve().unwrap(), "env-key");
    }

    #[test]
    fn test_missing_credential_is_a_config_error() {
        let auth = Auth {
            api_key: None,
            api_key_env: Some("INTELLICHAT_TEST_MISSING_VAR".to_string()),
        };
        let result = auth.resolve();
        assert!(matches!(result, Err(ChatError::Config(_))));
        assert!(result
            .unwrap_err()
            .to_string()
            .contains("INTELLICHAT_TEST_MISSING_VAR is not set"));
    }

    #[test]
    fn test_session_options_follow_the_config() {
        let yaml = r#"
assistant:
  document_mode: summary
  summary_pages: 5
retrieval:
  chunk_size: 256
  top_k: 2
"#;
        let config: ChatConfig = serde_yaml::from_str(yaml).unwrap();
        let options = config.session_options();
        assert_eq!(options.document_mode, DocumentMode::Summary);
        assert_eq!(options.summary_pages, 5);
        assert_eq!(options.retrieval.chunk_size, 256);
        assert_eq!(options.retrieval.top_k, 2);
    }
}
