//! Document retrieval for question answering over an uploaded PDF.
//!
//! The pipeline is deliberately small: split the extracted text into
//! overlapping chunks, embed each chunk, hold the vectors in memory, and at
//! question time rank chunks by cosine similarity and stuff the best ones
//! into a single prompt. There is no custom indexing, eviction, reranking,
//! or persistence.

pub mod embeddings;
pub mod index;
pub mod splitter;

pub use embeddings::{cosine_similarity, create_embedder, Embedder, HashEmbedder, OpenAiEmbedder};
pub use index::{Hit, VectorIndex};
pub use splitter::TextSplitter;

use std::sync::Arc;

use crate::config::RetrievalConfig;
use crate::core_types::Message;
use crate::errors::ChatError;
use crate::llm::LanguageModel;

#[derive(Debug, Clone)]
pub struct Chunk {
    pub text: String,
    pub source: String,
    pub ordinal: usize,
}

#[derive(Debug, Clone)]
pub struct ScoredChunk {
    pub chunk: Chunk,
    pub score: f32,
}

/// Similarity search over one document's chunks.
pub struct KnowledgeBase {
    splitter: TextSplitter,
    embedder: Arc<dyn Embedder>,
    index: VectorIndex,
    chunks: Vec<Chunk>,
    config: RetrievalConfig,
}

impl KnowledgeBase {
    pub fn new(embedder: Arc<dyn Embedder>, config: RetrievalConfig) -> Self {
        let splitter = TextSplitter::new(config.chunk_size, config.chunk_overlap);
        Self {
            splitter,
            embedder,
            index: VectorIndex::new(),
            chunks: Vec::new(),
            config,
        }
    }

    /// Splits, embeds, and stores the text. Returns the number of chunks
    /// added.
    pub async fn index_text(&mut self, text: &str, source: &str) -> Result<usize, ChatError> {
        let pieces: Vec<String> = self
            .splitter
            .split_text(text)
            .into_iter()
            .filter(|piece| !piece.trim().is_empty())
            .collect();

        if pieces.is_empty() {
            return Err(ChatError::Document(format!(
                "no indexable text in {}",
                source
            )));
        }

        let embeddings = self.embedder.embed_batch(&pieces).await?;

        let added = pieces.len();
        for (piece, embedding) in pieces.into_iter().zip(embeddings) {
            let id = self.chunks.len();
            self.index.insert(id, embedding)?;
            self.chunks.push(Chunk {
                text: piece,
                source: source.to_string(),
                ordinal: id,
            });
        }

        log::info!("indexed {} chunks from {}", added, source);
        Ok(added)
    }

    /// Embeds the question and returns the best-matching chunks, highest
    /// similarity first.
    pub async fn search(
        &self,
        question: &str,
        top_k: Option<usize>,
    ) -> Result<Vec<ScoredChunk>, ChatError> {
        let k = top_k.unwrap_or(self.config.top_k);
        let query = self.embedder.embed(question).await?;
        let hits = self.index.search(&query, k)?;

        Ok(hits
            .into_iter()
            .filter(|hit| hit.score >= self.config.similarity_threshold)
            .filter_map(|hit| {
                self.chunks.get(hit.id).map(|chunk| ScoredChunk {
                    chunk: chunk.clone(),
                    score: hit.score,
                })
            })
            .collect())
    }

    /// One model call over the stuffed prompt: retrieved excerpts followed
    /// by the question.
    pub async fn answer(
        &self,
        question: &str,
        model: &dyn LanguageModel,
    ) -> Result<String, ChatError> {
        let matches = self.search(question, None).await?;
        let context = format_context(&matches);

        let messages = vec![
            Message::system(
                "You answer questions about a document the user uploaded. \
                 Use only the provided excerpts; say so when they do not contain the answer.",
            ),
            Message::user(format!("{}\n\nQuestion: {}", context, question)),
        ];

        let completion = model.complete(&messages).await?;
        Ok(completion.content)
    }

    pub fn chunk_count(&self) -> usize {
        self.chunks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.chunks.is_empty()
    }
}

fn format_context(matches: &[ScoredChunk]) -> String {
    if matches.is_empty() {
        return "No relevant excerpts were found in the document.".to_string();
    }

    let mut formatted = String::from("Document excerpts:\n\n");
    for (i, scored) in matches.iter().enumerate() {
        formatted.push_str(&format!("Excerpt {}:\n{}\n\n", i + 1, scored.chunk.text));
    }
    formatted
}
