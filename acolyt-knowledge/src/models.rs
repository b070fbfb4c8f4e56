use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::errors::{KnowledgeError, KnowledgeResult};

/// One retrievable unit of note text plus its embedding.
///
/// Serialized as a `{content, embedding}` record in the chunk file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KnowledgeChunk {
    pub content: String,
    pub embedding: Vec<f32>,
}

impl KnowledgeChunk {
    pub fn new(content: impl Into<String>, embedding: Vec<f32>) -> Self {
        Self {
            content: content.into(),
            embedding,
        }
    }
}

/// Immutable, internally consistent set of chunks used for ranking.
///
/// Every chunk shares one embedding dimensionality. A set is never
/// modified in place; refreshes build a new one and swap it in.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ChunkSet {
    chunks: Vec<KnowledgeChunk>,
    refreshed_at: Option<DateTime<Utc>>,
}

impl ChunkSet {
    pub fn new(
        chunks: Vec<KnowledgeChunk>,
        refreshed_at: Option<DateTime<Utc>>,
    ) -> KnowledgeResult<Self> {
        if let Some(first) = chunks.first() {
            let expected = first.embedding.len();
            if let Some(bad) = chunks.iter().find(|c| c.embedding.len() != expected) {
                return Err(KnowledgeError::EmbeddingDimMismatch {
                    expected,
                    actual: bad.embedding.len(),
                });
            }
        }
        Ok(Self {
            chunks,
            refreshed_at,
        })
    }

    pub fn empty() -> Self {
        Self::default()
    }

    pub fn chunks(&self) -> &[KnowledgeChunk] {
        &self.chunks
    }

    pub fn len(&self) -> usize {
        self.chunks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.chunks.is_empty()
    }

    /// Shared embedding dimensionality, `None` for an empty set.
    pub fn dimension(&self) -> Option<usize> {
        self.chunks.first().map(|c| c.embedding.len())
    }

    pub fn refreshed_at(&self) -> Option<DateTime<Utc>> {
        self.refreshed_at
    }

    /// Fail when the set does not match a configured dimensionality.
    pub fn check_dimension(&self, expected: Option<usize>) -> KnowledgeResult<()> {
        match (expected, self.dimension()) {
            (Some(expected), Some(actual)) if expected != actual => {
                Err(KnowledgeError::EmbeddingDimMismatch { expected, actual })
            }
            _ => Ok(()),
        }
    }
}

/// Summary shown by the status command.
#[derive(Debug, Clone, PartialEq)]
pub struct KnowledgeStatus {
    pub chunk_count: usize,
    pub note_count: usize,
    pub refreshed_at: Option<DateTime<Utc>>,
    /// First body line of the most recent notes, oldest first.
    pub recent_notes: Vec<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_mixed_dimensions() {
        let result = ChunkSet::new(
            vec![
                KnowledgeChunk::new("a", vec![1.0, 0.0]),
                KnowledgeChunk::new("b", vec![1.0, 0.0, 0.0]),
            ],
            None,
        );
        assert!(matches!(
            result,
            Err(KnowledgeError::EmbeddingDimMismatch {
                expected: 2,
                actual: 3
            })
        ));
    }

    #[test]
    fn checks_configured_dimension() {
        let set = ChunkSet::new(vec![KnowledgeChunk::new("a", vec![0.5; 4])], None).unwrap();
        assert_eq!(set.dimension(), Some(4));
        assert!(set.check_dimension(None).is_ok());
        assert!(set.check_dimension(Some(4)).is_ok());
        assert!(set.check_dimension(Some(8)).is_err());
        assert!(ChunkSet::empty().check_dimension(Some(8)).is_ok());
    }
}
