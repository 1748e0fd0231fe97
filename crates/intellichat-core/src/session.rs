//! The per-session interaction cycle.
//!
//! One `ChatSession` backs one browser session: read a submitted line,
//! branch on its shape, call the hosted model if it is a chat turn, append
//! the result, and hand the reply back to the surface. Sessions never share
//! conversation state and process their inputs strictly sequentially.

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::config::RetrievalConfig;
use crate::core_types::{Message, Role};
use crate::directives::{self, Directive};
use crate::errors::ChatError;
use crate::llm::LanguageModel;
use crate::pdf;
use crate::rag::{Embedder, KnowledgeBase};
use crate::transcript::Transcript;

/// What happens to an uploaded document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DocumentMode {
    /// Only the first-pages summary is produced.
    Summary,
    /// The extracted text is prepended to the outgoing user message.
    Context,
    /// The text is chunked and indexed for question answering.
    Retrieval,
}

#[derive(Debug, Clone)]
pub struct SessionOptions {
    pub system_prompt: Option<String>,
    pub document_mode: DocumentMode,
    pub summary_pages: usize,
    pub retrieval: RetrievalConfig,
}

impl Default for SessionOptions {
    fn default() -> Self {
        Self {
            system_prompt: None,
            document_mode: DocumentMode::Retrieval,
            summary_pages: pdf::SUMMARY_PAGE_COUNT,
            retrieval: RetrievalConfig::default(),
        }
    }
}

/// Outcome of one handled input line.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum TurnReply {
    /// The client should navigate to `url`; the transcript is untouched.
    Redirect { url: String },
    /// The model's reply, already appended as the latest assistant turn.
    Assistant { text: String },
}

/// What the surface shows after a document upload.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DocumentDigest {
    pub name: String,
    pub summary: Option<String>,
    pub chunks_indexed: usize,
}

struct AttachedDocument {
    name: String,
    text: String,
    knowledge: Option<KnowledgeBase>,
}

pub struct ChatSession {
    transcript: Transcript,
    model: Arc<dyn LanguageModel>,
    embedder: Arc<dyn Embedder>,
    options: SessionOptions,
    document: Option<AttachedDocument>,
}

impl ChatSession {
    pub fn new(
        model: Arc<dyn LanguageModel>,
        embedder: Arc<dyn Embedder>,
        options: SessionOptions,
    ) -> Self {
        let transcript = match &options.system_prompt {
            Some(prompt) => Transcript::with_system(prompt.clone()),
            None => Transcript::new(),
        };

        Self {
            transcript,
            model,
            embedder,
            options,
            document: None,
        }
    }

    /// Routes one submitted line. Navigation directives reply without
    /// touching the transcript; a chat line appends exactly one user turn
    /// and, once the model returns, exactly one assistant turn.
    pub async fn handle_input(&mut self, input: &str) -> Result<Option<TurnReply>, ChatError> {
        let directive = match directives::parse(input) {
            Some(directive) => directive,
            None => return Ok(None),
        };

        match directive {
            Directive::Navigate { url } => {
                log::info!("redirecting to {}", url);
                Ok(Some(TurnReply::Redirect { url }))
            }
            Directive::NavigateDomain { label, url } => {
                log::info!("redirecting to {} (label '{}')", url, label);
                Ok(Some(TurnReply::Redirect { url }))
            }
            Directive::Chat { text } => {
                self.transcript.push_user(&text)?;
                let outbound = self.outbound_messages();

                match self.model.complete(&outbound).await {
                    Ok(completion) => {
                        self.transcript.push_assistant(&completion.content)?;
                        Ok(Some(TurnReply::Assistant {
                            text: completion.content,
                        }))
                    }
                    Err(e) => {
                        // No retry: undo the user turn so the next
                        // submission starts clean.
                        self.transcript.rollback_user();
                        Err(e)
                    }
                }
            }
        }
    }

    /// The transcript as sent to the model. In context mode the attached
    /// document text rides along with the latest user message; the
    /// transcript itself keeps the user's literal input.
    fn outbound_messages(&self) -> Vec<Message> {
        let mut messages: Vec<Message> = self.transcript.messages().to_vec();

        if self.options.document_mode == DocumentMode::Context {
            if let Some(document) = &self.document {
                if let Some(last) = messages.last_mut() {
                    if last.role == Role::User {
                        last.content = format!("{}\n\n{}", document.text, last.content);
                    }
                }
            }
        }

        messages
    }

    /// Ingests an uploaded PDF according to the configured document mode.
    pub async fn attach_document(
        &mut self,
        bytes: &[u8],
        name: &str,
    ) -> Result<DocumentDigest, ChatError> {
        let summary = pdf::summarize(bytes, self.options.summary_pages);

        match self.options.document_mode {
            DocumentMode::Summary => {
                // The summary is the whole feature here; an unreadable
                // document is reported as a null summary, not an error.
                self.document = None;
                Ok(DocumentDigest {
                    name: name.to_string(),
                    summary,
                    chunks_indexed: 0,
                })
            }
            DocumentMode::Context => {
                let text = pdf::extract_text(bytes)?;
                self.document = Some(AttachedDocument {
                    name: name.to_string(),
                    text,
                    knowledge: None,
                });
                Ok(DocumentDigest {
                    name: name.to_string(),
                    summary,
                    chunks_indexed: 0,
                })
            }
            DocumentMode::Retrieval => {
                let text = pdf::extract_text(bytes)?;
                let mut knowledge =
                    KnowledgeBase::new(self.embedder.clone(), self.options.retrieval.clone());
                let chunks_indexed = knowledge.index_text(&text, name).await?;
                self.document = Some(AttachedDocument {
                    name: name.to_string(),
                    text,
                    knowledge: Some(knowledge),
                });
                Ok(DocumentDigest {
                    name: name.to_string(),
                    summary,
                    chunks_indexed,
                })
            }
        }
    }

    /// Question answering over the attached document. Separate from the
    /// conversation: neither the question nor the answer becomes a turn.
    pub async fn ask_document(&self, question: &str) -> Result<String, ChatError> {
        let document = self
            .document
            .as_ref()
            .ok_or_else(|| ChatError::Document("no document attached".to_string()))?;

        let knowledge = document.knowledge.as_ref().ok_or_else(|| {
            ChatError::Document("document is not indexed for question answering".to_string())
        })?;

        knowledge.answer(question, self.model.as_ref()).await
    }

    pub fn visible_turns(&self) -> &[Message] {
        self.transcript.visible_turns()
    }

    pub fn transcript(&self) -> &Transcript {
        &self.transcript
    }

    pub fn has_document(&self) -> bool {
        self.document.is_some()
    }

    pub fn document_name(&self) -> Option<&str> {
        self.document.as_ref().map(|document| document.name.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rag::HashEmbedder;
    use crate::test_utils::{CapturingModel, EchoModel, FailingModel};

    fn echo_session(options: SessionOptions) -> ChatSession {
        ChatSession::new(Arc::new(EchoModel), Arc::new(HashEmbedder::new()), options)
    }

    #[tokio::test]
    async fn test_chat_appends_one_user_and_one_assistant_turn() {
        let mut session = echo_session(SessionOptions::default());

        let reply = session.handle_input("hello").await.unwrap().unwrap();
        match reply {
            TurnReply::Assistant { text } => assert_eq!(text, "echo: hello"),
            other => panic!("unexpected reply: {:?}", other),
        }

        let turns = session.visible_turns();
        assert_eq!(turns.len(), 2);
        assert_eq!(turns[0].role, Role::User);
        assert_eq!(turns[0].content, "hello");
        assert_eq!(turns[1].role, Role::Assistant);

        session.handle_input("second question").await.unwrap();
        let turns = session.visible_turns();
        assert_eq!(turns.len(), 4);
        assert_eq!(turns[2].content, "second question");
    }

    #[tokio::test]
    async fn test_url_input_redirects_without_turns() {
        let mut session = echo_session(SessionOptions::default());

        let reply = session
            .handle_input("https://example.org/page?q=1")
            .await
            .unwrap()
            .unwrap();
        match reply {
            TurnReply::Redirect { url } => assert_eq!(url, "https://example.org/page?q=1"),
            other => panic!("unexpected reply: {:?}", other),
        }

        assert!(session.visible_turns().is_empty());
    }

    #[tokio::test]
    async fn test_redirect_phrase_builds_domain_url() {
        let mut session = echo_session(SessionOptions::default());

        let reply = session
            .handle_input("Redirect me to  GitHub ")
            .await
            .unwrap()
            .unwrap();
        match reply {
            TurnReply::Redirect { url } => assert_eq!(url, "https://github.com"),
            other => panic!("unexpected reply: {:?}", other),
        }

        assert!(session.visible_turns().is_empty());
    }

    #[tokio::test]
    async fn test_blank_input_is_ignored() {
        let mut session = echo_session(SessionOptions::default());
        assert!(session.handle_input("   ").await.unwrap().is_none());
        assert!(session.visible_turns().is_empty());
    }

    #[tokio::test]
    async fn test_system_prompt_is_sent_but_not_displayed() {
        let options = SessionOptions {
            system_prompt: Some("You are a helpful assistant.".to_string()),
            ..SessionOptions::default()
        };
        let mut session = echo_session(options);

        session.handle_input("hi").await.unwrap();
        assert_eq!(session.transcript().len(), 3);
        assert_eq!(session.visible_turns().len(), 2);
        assert_eq!(session.transcript().messages()[0].role, Role::System);
    }

    #[tokio::test]
    async fn test_failed_model_call_rolls_back_the_user_turn() {
        let mut session = ChatSession::new(
            Arc::new(FailingModel),
            Arc::new(HashEmbedder::new()),
            SessionOptions::default(),
        );

        assert!(session.handle_input("hello").await.is_err());
        assert!(session.visible_turns().is_empty());
    }

    #[tokio::test]
    async fn test_context_mode_prepends_document_to_the_outgoing_message() {
        let model = Arc::new(CapturingModel::new("noted"));
        let options = SessionOptions {
            document_mode: DocumentMode::Context,
            ..SessionOptions::default()
        };
        let mut session = ChatSession::new(
            model.clone(),
            Arc::new(HashEmbedder::new()),
            options,
        );
        session.document = Some(AttachedDocument {
            name: "notes.pdf".to_string(),
            text: "DOCUMENT BODY".to_string(),
            knowledge: None,
        });

        session.handle_input("what does it say?").await.unwrap();

        let calls = model.calls();
        let outbound = calls[0].last().unwrap().content.clone();
        assert!(outbound.starts_with("DOCUMENT BODY"));
        assert!(outbound.ends_with("what does it say?"));

        // The transcript keeps the literal input.
        assert_eq!(session.visible_turns()[0].content, "what does it say?");
    }

    #[tokio::test]
    async fn test_summary_mode_reports_unreadable_documents_as_null() {
        let options = SessionOptions {
            document_mode: DocumentMode::Summary,
            ..SessionOptions::default()
        };
        let mut session = echo_session(options);

        let digest = session
            .attach_document(b"not a pdf", "broken.pdf")
            .await
            .unwrap();
        assert_eq!(digest.summary, None);
        assert_eq!(digest.chunks_indexed, 0);
        assert!(!session.has_document());
    }

    #[tokio::test]
    async fn test_retrieval_mode_rejects_unreadable_documents() {
        let mut session = echo_session(SessionOptions::default());
        let result = session.attach_document(b"not a pdf", "broken.pdf").await;
        assert!(matches!(result, Err(ChatError::Pdf(_))));
    }

    #[tokio::test]
    async fn test_question_without_document_is_rejected() {
        let session = echo_session(SessionOptions::default());
        let result = session.ask_document("anything?").await;
        assert!(matches!(result, Err(ChatError::Document(_))));
    }
}
