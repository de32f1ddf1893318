use std::collections::HashMap;

use tracing::debug;

use crate::{embedder::Embedder, error::Result, index::EmbeddingIndex};

/// An assessment surfaced by retrieval, carrying the best similarity seen
/// across all passes that found it.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Candidate {
    /// Catalog index of the assessment.
    pub index: usize,
    pub context_similarity: f32,
}

/// Candidate set keyed by catalog index with an explicit max-update merge.
///
/// At most one candidate per assessment; rediscovery keeps the higher
/// similarity. First-discovery order is preserved, which is what the ranker
/// uses to break score ties.
#[derive(Debug, Default)]
pub struct CandidateSet {
    positions: HashMap<usize, usize>,
    items: Vec<Candidate>,
}

impl CandidateSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&Candidate> {
        self.positions.get(&index).map(|&pos| &self.items[pos])
    }

    /// Record a retrieval hit, keeping the maximum similarity per index.
    pub fn observe(&mut self, index: usize, similarity: f32) {
        match self.positions.get(&index) {
            Some(&pos) => {
                let candidate = &mut self.items[pos];
                if similarity > candidate.context_similarity {
                    candidate.context_similarity = similarity;
                }
            }
            None => {
                self.positions.insert(index, self.items.len());
                self.items.push(Candidate {
                    index,
                    context_similarity: similarity,
                });
            }
        }
    }

    /// Candidates in first-discovery order.
    pub fn into_candidates(self) -> Vec<Candidate> {
        self.items
    }
}

/// Per-sub-query retrieval budget: never below 10, and a little over an even
/// split of `top_k` so overlapping sub-queries still fill the pool.
pub fn k_per_query(top_k: usize, num_subqueries: usize) -> usize {
    (top_k / num_subqueries.max(1) + 2).max(10)
}

/// Multi-query retrieval: one nearest-neighbor pass per sub-query plus one
/// pass over the raw query, merged score-max into a single candidate set.
///
/// The raw-query pass exists to recover soft-skill/behavioral assessments
/// that a purely tech-decomposed query would miss.
pub fn retrieve(
    embedder: &mut dyn Embedder,
    index: &EmbeddingIndex,
    sub_queries: &[String],
    raw_query: &str,
    top_k: usize,
) -> Result<Vec<Candidate>> {
    let mut candidates = CandidateSet::new();
    let per_query = k_per_query(top_k, sub_queries.len());
    debug!(
        sub_queries = sub_queries.len(),
        per_query, "running retrieval passes"
    );

    for sub_query in sub_queries {
        let query_vector = embedder.encode_one(sub_query)?;
        for (idx, similarity) in index.top_k(&query_vector, per_query)? {
            candidates.observe(idx, similarity);
        }
    }

    let full_vector = embedder.encode_one(raw_query)?;
    for (idx, similarity) in index.top_k(&full_vector, top_k)? {
        candidates.observe(idx, similarity);
    }

    debug!(unique = candidates.len(), "merged retrieval passes");
    Ok(candidates.into_candidates())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::embedder::HashEmbedder;

    #[test]
    fn k_per_query_floors_at_ten() {
        assert_eq!(k_per_query(12, 4), 10);
        assert_eq!(k_per_query(6, 1), 10);
    }

    #[test]
    fn k_per_query_splits_budget_with_slack() {
        assert_eq!(k_per_query(40, 3), 15);
        assert_eq!(k_per_query(40, 1), 42);
    }

    #[test]
    fn observe_inserts_then_max_updates() {
        let mut set = CandidateSet::new();
        set.observe(5, 0.30);
        set.observe(5, 0.70);
        set.observe(5, 0.10);

        assert_eq!(set.len(), 1);
        assert_eq!(set.get(5).unwrap().context_similarity, 0.70);
    }

    #[test]
    fn candidates_keep_first_discovery_order() {
        let mut set = CandidateSet::new();
        set.observe(9, 0.5);
        set.observe(2, 0.4);
        set.observe(9, 0.9);
        set.observe(7, 0.3);

        let order: Vec<usize> = set.into_candidates().iter().map(|c| c.index).collect();
        assert_eq!(order, vec![9, 2, 7]);
    }

    #[test]
    fn retrieve_unions_all_passes() {
        // Rows built so each sub-query has one obvious nearest neighbor.
        let mut embedder = HashEmbedder::new(256);
        let texts = [
            "Python programming test".to_string(),
            "SQL database queries test".to_string(),
            "JavaScript frontend test".to_string(),
            "personality questionnaire".to_string(),
        ];
        let rows = embedder.encode(&texts).unwrap();
        let index = EmbeddingIndex::from_rows(rows).unwrap();

        let sub_queries = vec!["Python".to_string(), "SQL".to_string()];
        let candidates = retrieve(
            &mut embedder,
            &index,
            &sub_queries,
            "Python and SQL with teamwork personality",
            4,
        )
        .unwrap();

        // Small corpus: every row is reachable by some pass.
        assert_eq!(candidates.len(), 4);
    }

    #[test]
    fn retrieve_rejects_mismatched_corpus() {
        let mut embedder = HashEmbedder::new(16);
        let index = EmbeddingIndex::from_rows(vec![vec![1.0, 0.0]]).unwrap();

        let err = retrieve(
            &mut embedder,
            &index,
            &["query".to_string()],
            "query",
            5,
        )
        .unwrap_err();
        assert!(matches!(
            err,
            crate::error::Error::DimensionMismatch { .. }
        ));
    }
}
