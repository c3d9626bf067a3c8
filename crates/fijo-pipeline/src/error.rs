use std::time::Duration;

use thiserror::Error;
use uuid::Uuid;

use fijo_core::error::CoreError;
use fijo_export::ExportError;
use fijo_storage::error::StorageError;

/// Failures anywhere in the pipeline. The `Display` text of a failure that
/// ends a run is what the request's `errorMessage` shows.
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("Missing lessonInstanceId")]
    MissingLessonReference,

    #[error("Lesson instance not found for ID: {0}")]
    LessonNotFound(String),

    #[error("Invalid lesson time or duration data.")]
    MissingLessonTime,

    #[error(transparent)]
    Core(#[from] CoreError),

    #[error(transparent)]
    Render(#[from] ExportError),

    #[error("upload failed: {0}")]
    Upload(#[source] StorageError),

    #[error("storage error: {0}")]
    Storage(#[from] StorageError),

    #[error("certificate generation timed out after {}s", .0.as_secs())]
    DeadlineExceeded(Duration),

    #[error("certificate request not found: {0}")]
    RequestNotFound(Uuid),

    #[error("configuration error: {0}")]
    Config(String),
}
