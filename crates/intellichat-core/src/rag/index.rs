use std::collections::HashMap;

use crate::errors::ChatError;
use crate::rag::embeddings::cosine_similarity;

#[derive(Debug, Clone)]
pub struct Hit {
    pub id: usize,
    pub score: f32,
}

/// In-memory vector index over chunk embeddings. Lives and dies with the
/// session that built it; nothing is persisted or evicted.
#[derive(Debug, Clone, Default)]
pub struct VectorIndex {
    embeddings: HashMap<usize, Vec<f32>>,
    dimension: Option<usize>,
}

impl VectorIndex {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, id: usize, embedding: Vec<f32>) -> Result<(), ChatError> {
        if let Some(expected) = self.dimension {
            if embedding.len() != expected {
                return Err(ChatError::Embedding(format!(
                    "embedding dimension mismatch: expected {}, got {}",
                    expected,
                    embedding.len()
                )));
            }
        } else {
            self.dimension = Some(embedding.len());
        }

        self.embeddings.insert(id, embedding);
        Ok(())
    }

    /// Ranks every stored embedding against the query by cosine similarity,
    /// highest first.
    pub fn search(&self, query: &[f32], top_k: usize) -> Result<Vec<Hit>, ChatError> {
        if self.embeddings.is_empty() {
            return Ok(Vec::new());
        }

        if let Some(expected) = self.dimension {
            if query.len() != expected {
                return Err(ChatError::Embedding(format!(
                    "query embedding dimension mismatch: expected {}, got {}",
                    expected,
                    query.len()
                )));
            }
        }

        let mut hits: Vec<Hit> = self
            .embeddings
            .iter()
            .map(|(id, embedding)| Hit {
                id: *id,
                score: cosine_similarity(query, embedding),
            })
            .collect();

        hits.sort_by(|a, b| {
            b.score
                .partial_cmp(&a.score)
                .unwrap_or(std::cmp::Ordering::Equal)
        });

        hits.truncate(top_k);
        Ok(hits)
    }

    pub fn len(&self) -> usize {
        self.embeddings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.embeddings.is_empty()
    }

    pub fn dimension(&self) -> Option<usize> {
        self.dimension
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_search_ranks_by_similarity() {
        let mut index = VectorIndex::new();
        index.insert(0, vec![1.0, 0.0, 0.0]).unwrap();
        index.insert(1, vec![0.5, 0.5, 0.0]).unwrap();
        index.insert(2, vec![0.0, 1.0, 0.0]).unwrap();

        let hits = index.search(&[1.0, 0.0, 0.0], 3).unwrap();
        assert_eq!(hits.len(), 3);
        assert_eq!(hits[0].id, 0);
        assert!(hits[0].score > hits[1].score);
        assert!(hits[1].score > hits[2].score);
    }

    #[test]
    fn test_top_k_truncates() {
        let mut index = VectorIndex::new();
        for id in 0..5 {
            index.insert(id, vec![id as f32, 1.0]).unwrap();
        }

        let hits = index.search(&[1.0, 0.0], 2).unwrap();
        assert_eq!(hits.len(), 2);
    }

    #[test]
    fn test_dimension_mismatch_is_rejected() {
        let mut index = VectorIndex::new();
        index.insert(0, vec![1.0, 0.0, 0.0]).unwrap();

        assert!(index.insert(1, vec![1.0, 0.0]).is_err());
        assert!(index.search(&[1.0, 0.0], 1).is_err());
        assert_eq!(index.dimension(), Some(3));
    }

    #[test]
    fn test_empty_index_returns_no_hits() {
        let index = VectorIndex::new();
        let hits = index.search(&[1.0, 0.0], 5).unwrap();
        assert!(hits.is_empty());
    }
}
