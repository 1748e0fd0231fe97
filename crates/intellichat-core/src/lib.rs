//! Core library for the IntelliChat assistant.
//!
//! This crate holds everything the chat surface needs that is not HTTP:
//! the conversation transcript and its ordering rules, routing of raw user
//! input into navigation side-commands or chat turns, clients for the hosted
//! completion and embedding endpoints, PDF text extraction, and the
//! retrieval pipeline used for question answering over an uploaded document.
//!
//! # Architecture Overview
//!
//! - **Transcript**: the per-session, append-only sequence of chat turns
//! - **Directives**: string routing of one submitted input line
//! - **Language model integration**: provider trait plus the OpenAI-style
//!   chat-completions client
//! - **Document ingestion**: PDF text extraction and the first-pages summary
//! - **Retrieval**: chunking, embeddings, and in-memory similarity search
//! - **Session**: the glue cycle tying the above together, one input at a time
//! - **Configuration**: YAML files with environment-resolved credentials

pub mod config;
pub mod core_types;
pub mod directives;
pub mod errors;
pub mod llm;
pub mod pdf;
pub mod rag;
pub mod session;
pub mod transcript;

pub use config::ChatConfig;
pub use core_types::{Completion, Message, Role, Usage};
pub use directives::Directive;
pub use errors::ChatError;
pub use llm::{LanguageModel, OpenAiChatClient};
pub use rag::{Embedder, KnowledgeBase, OpenAiEmbedder};
pub use session::{ChatSession, DocumentDigest, DocumentMode, SessionOptions, TurnReply};
pub use transcript::Transcript;

#[cfg(test)]
pub mod test_utils;
