use std::{
    sync::Mutex,
    time::{Duration, Instant},
};

use serde::Serialize;
use tracing::{debug, info, warn};

use crate::{
    catalog::Assessment,
    embedder::Embedder,
    error::{Error, Result},
    features::FeatureExtractor,
    fetch::TextFetcher,
    index::EmbeddingIndex,
    planner::QueryPlanner,
    ranker, retriever,
    rules::RuleConfig,
    store::EmbeddingStore,
};

/// Overall retrieval budget used when the caller has no preference.
pub const DEFAULT_TOP_K: usize = 40;
/// Number of returned recommendations used when the caller has no preference.
pub const DEFAULT_FINAL_K: usize = 5;

/// A ranked short-list plus the reasoning trace.
///
/// Internal scores are stripped; the records carry assessment fields only.
#[derive(Debug, Clone, Serialize)]
pub struct Recommendation {
    pub recommendations: Vec<Assessment>,
    pub reasoning: String,
}

/// The recommendation pipeline: feature extraction, query planning,
/// multi-query retrieval, and multi-signal ranking over an immutable
/// catalog and embedding index.
///
/// All dependencies are injected at construction and read-only afterwards;
/// per-request state never escapes the request, so a `Recommender` can be
/// shared across threads. The embedder sits behind a mutex, which also
/// bounds in-flight embedding calls.
pub struct Recommender {
    catalog: Vec<Assessment>,
    index: EmbeddingIndex,
    embedder: Mutex<Box<dyn Embedder + Send>>,
    extractor: FeatureExtractor,
    planner: QueryPlanner,
    time_budget: Option<Duration>,
}

impl Recommender {
    /// Build the pipeline. Fails when the embedding matrix and catalog
    /// disagree on row count (the invariant is checked here, once, so it
    /// can never become a per-request error).
    pub fn new(
        catalog: Vec<Assessment>,
        embedding_rows: Vec<Vec<f32>>,
        embedder: Box<dyn Embedder + Send>,
        rules: RuleConfig,
    ) -> Result<Self> {
        if catalog.is_empty() {
            return Err(Error::Config("catalog is empty".to_string()));
        }
        if embedding_rows.len() != catalog.len() {
            return Err(Error::CorpusMismatch {
                assessments: catalog.len(),
                embeddings: embedding_rows.len(),
            });
        }

        let index = EmbeddingIndex::from_rows(embedding_rows)?;
        let extractor = FeatureExtractor::new(rules)?;
        let planner = QueryPlanner::new()?;
        info!(
            assessments = catalog.len(),
            dimension = index.dimension(),
            "recommender ready"
        );

        Ok(Self {
            catalog,
            index,
            embedder: Mutex::new(embedder),
            extractor,
            planner,
            time_budget: None,
        })
    }

    /// Abort any request whose wall-clock time exceeds `budget` instead of
    /// letting it hang on a slow embedding backend.
    pub fn with_time_budget(mut self, budget: Duration) -> Self {
        self.time_budget = Some(budget);
        self
    }

    pub fn catalog(&self) -> &[Assessment] {
        &self.catalog
    }

    pub fn dimension(&self) -> usize {
        self.index.dimension()
    }

    /// Run the full pipeline for a free-text query.
    ///
    /// Deterministic given an unchanged catalog, embedding matrix and
    /// embedding function. Fails with `InvalidQuery` on blank input; an
    /// empty survivor set is not an error and yields an empty list with an
    /// explanatory reasoning string.
    pub fn recommend(
        &self,
        query: &str,
        top_k: usize,
        final_k: usize,
    ) -> Result<Recommendation> {
        if query.trim().is_empty() {
            return Err(Error::InvalidQuery);
        }
        let started = Instant::now();

        // Stage 1: feature extraction and query cleaning.
        let (features, cleaned_tech_query) = self.extractor.extract(query);
        debug!(?features, cleaned = %cleaned_tech_query, "extracted features");

        // Stage 2: multi-query semantic retrieval.
        let sub_queries = self.planner.plan(&cleaned_tech_query);
        let mut embedder = self
            .embedder
            .lock()
            .map_err(|_| Error::Retrieval("embedder lock poisoned".to_string()))?;
        let candidates = retriever::retrieve(
            embedder.as_mut(),
            &self.index,
            &sub_queries,
            query,
            top_k,
        )?;
        self.check_deadline(started)?;

        // Stage 3/4: re-scoring and ranking.
        let outcome = ranker::rank(
            embedder.as_mut(),
            &self.index,
            &self.catalog,
            self.extractor.rules(),
            &features,
            &candidates,
            &cleaned_tech_query,
            final_k,
        )?;
        drop(embedder);
        self.check_deadline(started)?;

        let recommendations = outcome
            .ranked
            .iter()
            .map(|&idx| self.catalog[idx].clone())
            .collect();
        Ok(Recommendation {
            recommendations,
            reasoning: outcome.reasoning,
        })
    }

    /// Identical contract to [`recommend`](Self::recommend), but a source
    /// that yielded no text produces an empty result with an explanatory
    /// reasoning string rather than an error.
    pub fn recommend_from_text_source(
        &self,
        text: Option<&str>,
        top_k: usize,
        final_k: usize,
    ) -> Result<Recommendation> {
        match text {
            Some(t) if !t.trim().is_empty() => self.recommend(t, top_k, final_k),
            _ => Ok(Recommendation {
                recommendations: Vec::new(),
                reasoning: "Failed to fetch text from the source; no recommendations produced."
                    .to_string(),
            }),
        }
    }

    /// Fetch a job description from a URL and run the pipeline on it.
    /// Fetch failures take the empty-result path; this never raises for
    /// them.
    pub fn recommend_from_url(
        &self,
        fetcher: &dyn TextFetcher,
        url: &str,
        top_k: usize,
        final_k: usize,
    ) -> Result<Recommendation> {
        let text = match fetcher.fetch(url) {
            Ok(text) => text,
            Err(e) => {
                warn!(url, error = %e, "text fetch failed");
                None
            }
        };
        self.recommend_from_text_source(text.as_deref(), top_k, final_k)
    }

    fn check_deadline(&self, started: Instant) -> Result<()> {
        if let Some(budget) = self.time_budget
            && started.elapsed() > budget
        {
            return Err(Error::Timeout);
        }
        Ok(())
    }
}

impl std::fmt::Debug for Recommender {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Recommender")
            .field("catalog_len", &self.catalog.len())
            .field("dimension", &self.index.dimension())
            .field("time_budget", &self.time_budget)
            .finish_non_exhaustive()
    }
}

/// Load the persisted embedding matrix, deriving and persisting it from the
/// catalog when the store is empty. A populated store that disagrees with
/// the catalog row count is a fatal startup error.
pub fn ensure_embeddings(
    catalog: &[Assessment],
    store: &EmbeddingStore,
    embedder: &mut dyn Embedder,
) -> Result<Vec<Vec<f32>>> {
    if let Some(rows) = store.load_rows(catalog.len())? {
        debug!(rows = rows.len(), "loaded persisted embeddings");
        return Ok(rows);
    }

    info!(
        assessments = catalog.len(),
        "no persisted embeddings, deriving from catalog"
    );
    let texts: Vec<String> = catalog.iter().map(|a| a.embedding_text()).collect();
    let rows = embedder.encode(&texts)?;
    if rows.len() != catalog.len() {
        return Err(Error::CorpusMismatch {
            assessments: catalog.len(),
            embeddings: rows.len(),
        });
    }
    store.store_all(&rows)?;
    Ok(rows)
}
