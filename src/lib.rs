//! assessrec - a semantic recommendation engine for skill assessment catalogs.
//!
//! assessrec turns a free-text job description into a ranked short-list of
//! assessments from a fixed catalog. It extracts structural hiring signals
//! (soft-skill emphasis, role seniority, a duration cap) with transparent
//! rules, decomposes the cleaned query into per-skill sub-queries, retrieves
//! candidates by cosine similarity over [ColBERT](https://github.com/stanford-futuredata/ColBERT)
//! embeddings, and re-ranks the merged pool with a weighted multi-signal
//! score.
//!
//! # Quick start
//!
//! ```no_run
//! use assessrec::{DataDir, EmbeddingStore, ModelManager, Recommender};
//! use assessrec::pipeline::{self, DEFAULT_FINAL_K, DEFAULT_TOP_K};
//! use assessrec::rules::RuleConfig;
//!
//! let data_dir = DataDir::resolve(None).unwrap();
//! let catalog = assessrec::catalog::load_catalog(&data_dir.catalog_file()).unwrap();
//! let store = EmbeddingStore::open(&data_dir.embeddings_db()).unwrap();
//! let mut model = ModelManager::new();
//!
//! let rows = pipeline::ensure_embeddings(&catalog, &store, &mut model).unwrap();
//! let recommender =
//!     Recommender::new(catalog, rows, Box::new(model), RuleConfig::default()).unwrap();
//!
//! let result = recommender
//!     .recommend(
//!         "Java developer with good collaboration skills, under 40 minutes",
//!         DEFAULT_TOP_K,
//!         DEFAULT_FINAL_K,
//!     )
//!     .unwrap();
//! for (i, rec) in result.recommendations.iter().enumerate() {
//!     println!("{}. {} ({})", i + 1, rec.name, rec.url);
//! }
//! println!("{}", result.reasoning);
//! ```

pub mod catalog;
pub mod cli;
pub mod data_dir;
pub mod embedder;
pub mod error;
pub mod features;
pub mod fetch;
pub mod index;
pub mod pipeline;
pub mod planner;
pub mod ranker;
pub mod retriever;
pub mod rules;
pub mod store;

pub use catalog::Assessment;
pub use data_dir::DataDir;
pub use embedder::{Embedder, HashEmbedder, ModelManager};
pub use error::{Error, Result};
pub use pipeline::{Recommendation, Recommender};
pub use store::EmbeddingStore;
