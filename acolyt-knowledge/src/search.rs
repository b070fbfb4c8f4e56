//! Brute-force cosine ranking over a chunk snapshot.
//!
//! Every query scores every chunk, O(N·D). That is fine for a few thousand
//! chunks; beyond that an approximate index would be needed.

use crate::models::KnowledgeChunk;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RankedMatch<'a> {
    pub content: &'a str,
    pub score: f32,
}

/// Cosine similarity of two vectors.
///
/// Sums are accumulated in `f64` so large components cannot overflow.
/// Returns 0.0 for empty vectors, mismatched lengths, a zero norm, or a
/// non-finite result.
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    if a.is_empty() || a.len() != b.len() {
        return 0.0;
    }

    let mut dot = 0.0f64;
    let mut norm_a = 0.0f64;
    let mut norm_b = 0.0f64;
    for (&x, &y) in a.iter().zip(b) {
        let (x, y) = (f64::from(x), f64::from(y));
        dot += x * y;
        norm_a += x * x;
        norm_b += y * y;
    }

    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }
    let score = (dot / (norm_a.sqrt() * norm_b.sqrt())) as f32;
    if score.is_finite() { score } else { 0.0 }
}

/// Score all chunks against `query`, best first. Ties keep chunk order.
pub fn rank<'a>(query: &[f32], chunks: &'a [KnowledgeChunk]) -> Vec<RankedMatch<'a>> {
    let mut matches: Vec<RankedMatch<'a>> = chunks
        .iter()
        .map(|chunk| RankedMatch {
            content: &chunk.content,
            score: cosine_similarity(query, &chunk.embedding),
        })
        .collect();
    matches.sort_by(|a, b| b.score.total_cmp(&a.score));
    matches
}

pub fn top_k<'a>(query: &[f32], chunks: &'a [KnowledgeChunk], k: usize) -> Vec<RankedMatch<'a>> {
    let mut matches = rank(query, chunks);
    matches.truncate(k);
    matches
}

#[cfg(test)]
mod tests {
    use super::*;

    fn chunk(content: &str, embedding: &[f32]) -> KnowledgeChunk {
        KnowledgeChunk::new(content, embedding.to_vec())
    }

    #[test]
    fn similarity_is_reflexive_and_symmetric() {
        let a = [0.3, -1.2, 4.0];
        let b = [2.0, 0.5, -0.7];
        assert!((cosine_similarity(&a, &a) - 1.0).abs() < 1e-6);
        assert_eq!(cosine_similarity(&a, &b), cosine_similarity(&b, &a));
    }

    #[test]
    fn degenerate_inputs_score_zero() {
        assert_eq!(cosine_similarity(&[], &[]), 0.0);
        assert_eq!(cosine_similarity(&[1.0, 0.0], &[1.0]), 0.0);
        assert_eq!(cosine_similarity(&[0.0, 0.0], &[1.0, 1.0]), 0.0);
    }

    #[test]
    fn large_components_do_not_overflow() {
        let big = [3e19f32, 3e19];
        assert_eq!(cosine_similarity(&big, &big), 1.0);
        assert_eq!(cosine_similarity(&big, &[1.0, 1.0]), 1.0);
        let diagonal = cosine_similarity(&[f32::MAX, 0.0], &[f32::MAX, f32::MAX]);
        assert!((diagonal - std::f32::consts::FRAC_1_SQRT_2).abs() < 1e-6);
    }

    #[test]
    fn non_finite_inputs_score_zero_and_rank_last() {
        assert_eq!(cosine_similarity(&[f32::NAN, 1.0], &[1.0, 1.0]), 0.0);
        assert_eq!(cosine_similarity(&[f32::INFINITY, 1.0], &[1.0, 1.0]), 0.0);

        let chunks = vec![
            chunk("broken", &[f32::NAN, 0.0]),
            chunk("match", &[1.0, 0.0]),
            chunk("opposite", &[-1.0, 0.0]),
        ];
        let order: Vec<&str> = rank(&[1.0, 0.0], &chunks)
            .into_iter()
            .map(|m| m.content)
            .collect();
        assert_eq!(order, vec!["match", "broken", "opposite"]);
    }

    #[test]
    fn ranks_orthogonal_chunks() {
        let chunks = vec![chunk("B", &[0.0, 1.0]), chunk("A", &[1.0, 0.0])];
        let ranked = rank(&[1.0, 0.0], &chunks);
        assert_eq!(ranked[0], RankedMatch { content: "A", score: 1.0 });
        assert_eq!(ranked[1], RankedMatch { content: "B", score: 0.0 });
    }

    #[test]
    fn ties_keep_insertion_order() {
        let chunks = vec![
            chunk("first", &[1.0, 1.0]),
            chunk("low", &[-1.0, 0.0]),
            chunk("second", &[2.0, 2.0]),
            chunk("third", &[0.5, 0.5]),
        ];
        let order: Vec<&str> = rank(&[1.0, 1.0], &chunks)
            .into_iter()
            .map(|m| m.content)
            .collect();
        assert_eq!(order, vec!["first", "second", "third", "low"]);
    }

    #[test]
    fn top_k_truncates_and_handles_empty() {
        let chunks = vec![
            chunk("a", &[1.0, 0.0]),
            chunk("b", &[0.9, 0.1]),
            chunk("c", &[0.0, 1.0]),
        ];
        let top = top_k(&[1.0, 0.0], &chunks, 2);
        assert_eq!(top.len(), 2);
        assert_eq!(top[0].content, "a");
        assert_eq!(top[1].content, "b");
        assert!(top_k(&[1.0, 0.0], &[], 2).is_empty());
    }
}
