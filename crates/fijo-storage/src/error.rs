use thiserror::Error;

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("object not found: {key}")]
    NotFound { key: String },

    #[error("precondition failed for key: {key}")]
    PreconditionFailed { key: String },

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("GetObject error: {0}")]
    GetObject(String),

    #[error("PutObject error: {0}")]
    PutObject(String),

    #[error("ListObjects error: {0}")]
    ListObjects(String),
}
