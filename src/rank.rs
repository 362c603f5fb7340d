//! Cosine similarity and stable top-k ranking over chunk vectors.

use crate::models::Chunk;

/// A candidate chunk paired with its similarity to the query.
#[derive(Debug)]
pub struct ScoredChunk<'a> {
    pub chunk: &'a Chunk,
    pub similarity: f32,
}

/// Compute cosine similarity between two embedding vectors.
///
/// Returns a value in `[-1.0, 1.0]`. Returns exactly `0.0` — never NaN,
/// never an error — for empty vectors, vectors of different lengths, or
/// when either vector has zero magnitude, so a no-signal query ranks
/// alongside other zero-signal candidates instead of crashing search.
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    if a.len() != b.len() || a.is_empty() {
        return 0.0;
    }

    let mut dot = 0.0f32;
    let mut norm_a = 0.0f32;
    let mut norm_b = 0.0f32;

    for (x, y) in a.iter().zip(b.iter()) {
        dot += x * y;
        norm_a += x * x;
        norm_b += y * y;
    }

    let denom = norm_a.sqrt() * norm_b.sqrt();
    if denom < f32::EPSILON {
        return 0.0;
    }

    dot / denom
}

/// Score every candidate against the query vector and return the top
/// `limit`, highest similarity first.
///
/// The sort is stable, so candidates with equal scores keep their insertion
/// order. An empty candidate slice returns an empty result.
pub fn rank<'a>(query: &[f32], candidates: &'a [Chunk], limit: usize) -> Vec<ScoredChunk<'a>> {
    let mut scored: Vec<ScoredChunk<'a>> = candidates
        .iter()
        .map(|chunk| ScoredChunk {
            chunk,
            similarity: cosine_similarity(query, &chunk.vector),
        })
        .collect();

    scored.sort_by(|a, b| {
        b.similarity
            .partial_cmp(&a.similarity)
            .unwrap_or(std::cmp::Ordering::Equal)
    });
    scored.truncate(limit);
    scored
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn chunk(id: &str, vector: Vec<f32>) -> Chunk {
        Chunk {
            id: id.to_string(),
            filename: "test.txt".to_string(),
            text: id.to_string(),
            vector,
            chunk_index: 0,
            total_chunks: 1,
            upload_time: Utc::now(),
            metadata: None,
        }
    }

    #[test]
    fn test_cosine_identical() {
        let v = vec![1.0, 2.0, 3.0];
        assert!((cosine_similarity(&v, &v) - 1.0).abs() < 1e-6);
    }

    #[test]
    fn test_cosine_orthogonal() {
        let a = vec![1.0, 0.0, 0.0];
        let b = vec![0.0, 1.0, 0.0];
        assert!(cosine_similarity(&a, &b).abs() < 1e-6);
    }

    #[test]
    fn test_cosine_opposite() {
        let a = vec![1.0, 0.0];
        let b = vec![-1.0, 0.0];
        assert!((cosine_similarity(&a, &b) + 1.0).abs() < 1e-6);
    }

    #[test]
    fn test_cosine_bounds() {
        let cases = [
            (vec![0.3, -0.7, 2.0], vec![1.1, 0.0, -5.0]),
            (vec![1e-3, 1e-3], vec![1e3, 1e3]),
        ];
        for (a, b) in &cases {
            let sim = cosine_similarity(a, b);
            assert!((-1.0..=1.0).contains(&sim), "out of bounds: {}", sim);
        }
    }

    #[test]
    fn test_cosine_zero_vector_is_zero() {
        let zero = vec![0.0, 0.0, 0.0];
        let v = vec![1.0, 2.0, 3.0];
        assert_eq!(cosine_similarity(&zero, &v), 0.0);
        assert_eq!(cosine_similarity(&v, &zero), 0.0);
        assert_eq!(cosine_similarity(&zero, &zero), 0.0);
    }

    #[test]
    fn test_cosine_empty_and_mismatched_lengths() {
        assert_eq!(cosine_similarity(&[], &[]), 0.0);
        assert_eq!(cosine_similarity(&[1.0, 2.0], &[1.0]), 0.0);
    }

    #[test]
    fn test_rank_orders_descending_and_truncates() {
        let candidates = vec![
            chunk("weak", vec![0.1, 1.0]),
            chunk("strong", vec![1.0, 0.0]),
            chunk("medium", vec![1.0, 1.0]),
        ];
        let ranked = rank(&[1.0, 0.0], &candidates, 2);
        assert_eq!(ranked.len(), 2);
        assert_eq!(ranked[0].chunk.id, "strong");
        assert_eq!(ranked[1].chunk.id, "medium");
        assert!(ranked[0].similarity >= ranked[1].similarity);
    }

    #[test]
    fn test_rank_ties_keep_insertion_order() {
        // All candidates are zero vectors, so every score is exactly 0.0.
        let candidates = vec![
            chunk("first", vec![0.0, 0.0]),
            chunk("second", vec![0.0, 0.0]),
            chunk("third", vec![0.0, 0.0]),
        ];
        let ranked = rank(&[1.0, 1.0], &candidates, 3);
        let ids: Vec<&str> = ranked.iter().map(|s| s.chunk.id.as_str()).collect();
        assert_eq!(ids, vec!["first", "second", "third"]);
    }

    #[test]
    fn test_rank_empty_candidates() {
        assert!(rank(&[1.0, 0.0], &[], 5).is_empty());
    }

    #[test]
    fn test_rank_limit_larger_than_candidates() {
        let candidates = vec![chunk("only", vec![1.0, 0.0])];
        assert_eq!(rank(&[1.0, 0.0], &candidates, 10).len(), 1);
    }
}
