use thiserror::Error;

#[derive(Debug, Error)]
pub enum CoreError {
    #[error("missing required field: {0}")]
    MissingField(String),

    #[error("Invalid lesson start time: {0}")]
    InvalidTime(String),

    #[error("invalid lesson duration: {0}")]
    InvalidDuration(String),

    #[error("invalid document id: {0:?}")]
    InvalidDocumentId(String),

    #[error("invalid status transition: {from} -> {to}")]
    InvalidTransition { from: String, to: String },
}
