use rayon::prelude::*;

use crate::error::{Error, Result};

/// Immutable, process-lifetime store of one embedding vector per catalog
/// assessment, laid out as a flat row-major matrix.
///
/// Row index == catalog index. Shared read-only across requests.
#[derive(Debug, Clone)]
pub struct EmbeddingIndex {
    data: Vec<f32>,
    dimension: usize,
    rows: usize,
}

impl EmbeddingIndex {
    /// Build the index from one vector per assessment.
    ///
    /// Fails when the corpus is empty or any row deviates from the first
    /// row's dimension.
    pub fn from_rows(rows: Vec<Vec<f32>>) -> Result<Self> {
        let Some(first) = rows.first() else {
            return Err(Error::Config(
                "embedding index requires at least one row".to_string(),
            ));
        };
        let dimension = first.len();
        if dimension == 0 {
            return Err(Error::Config(
                "embedding rows must be non-empty".to_string(),
            ));
        }

        let mut data = Vec::with_capacity(rows.len() * dimension);
        for row in &rows {
            if row.len() != dimension {
                return Err(Error::DimensionMismatch {
                    expected: dimension,
                    actual: row.len(),
                });
            }
            data.extend_from_slice(row);
        }

        Ok(Self {
            data,
            dimension,
            rows: rows.len(),
        })
    }

    pub fn len(&self) -> usize {
        self.rows
    }

    pub fn is_empty(&self) -> bool {
        self.rows == 0
    }

    pub fn dimension(&self) -> usize {
        self.dimension
    }

    pub fn vector(&self, index: usize) -> &[f32] {
        let start = index * self.dimension;
        &self.data[start..start + self.dimension]
    }

    /// Reject query vectors whose dimension differs from the corpus.
    pub fn check_dimension(&self, query: &[f32]) -> Result<()> {
        if query.len() != self.dimension {
            return Err(Error::DimensionMismatch {
                expected: self.dimension,
                actual: query.len(),
            });
        }
        Ok(())
    }

    /// Cosine similarity between the query and one corpus row.
    pub fn similarity_to(&self, index: usize, query: &[f32]) -> Result<f32> {
        self.check_dimension(query)?;
        Ok(cosine_similarity(self.vector(index), query))
    }

    /// The `k` most similar corpus rows, similarity descending, ties broken
    /// by ascending catalog index for determinism.
    pub fn top_k(&self, query: &[f32], k: usize) -> Result<Vec<(usize, f32)>> {
        self.check_dimension(query)?;

        let mut scored: Vec<(usize, f32)> = (0..self.rows)
            .into_par_iter()
            .map(|i| (i, cosine_similarity(self.vector(i), query)))
            .collect();

        scored.sort_unstable_by(|a, b| {
            b.1.partial_cmp(&a.1)
                .unwrap_or(std::cmp::Ordering::Equal)
                .then(a.0.cmp(&b.0))
        });
        scored.truncate(k);
        Ok(scored)
    }
}

/// Normalized dot product in [-1, 1]; zero when either vector has no norm.
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    let mut dot = 0.0f32;
    let mut norm_a = 0.0f32;
    let mut norm_b = 0.0f32;
    for (x, y) in a.iter().zip(b) {
        dot += x * y;
        norm_a += x * x;
        norm_b += y * y;
    }
    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }
    dot / (norm_a.sqrt() * norm_b.sqrt())
}
