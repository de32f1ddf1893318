use std::path::PathBuf;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("query must be a non-empty string")]
    InvalidQuery,

    #[error("embedding dimension mismatch: index has {expected}, query produced {actual}")]
    DimensionMismatch { expected: usize, actual: usize },

    #[error(
        "catalog/embedding row count mismatch: {assessments} assessments vs {embeddings} embeddings"
    )]
    CorpusMismatch {
        assessments: usize,
        embeddings: usize,
    },

    #[error("retrieval failed: {0}")]
    Retrieval(String),

    #[error("request exceeded its time budget")]
    Timeout,

    #[error("fetch error: {0}")]
    Fetch(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("database error: {0}")]
    Redb(#[from] redb::Error),

    #[error("database error: {0}")]
    RedbDatabase(#[from] redb::DatabaseError),

    #[error("database storage error: {0}")]
    RedbStorage(#[from] redb::StorageError),

    #[error("database transaction error: {0}")]
    RedbTransaction(#[from] redb::TransactionError),

    #[error("database table error: {0}")]
    RedbTable(#[from] redb::TableError),

    #[error("database commit error: {0}")]
    RedbCommit(#[from] redb::CommitError),

    #[error("catalog parse error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("configuration error: {0}")]
    Config(String),

    #[error("data directory does not exist and could not be created: {0}")]
    DataDir(PathBuf),
}
