use crate::backend::{RequestStore, StoredRequest};
use crate::error::PipelineError;

/// How a run ended, as written back to the request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    Completed { download_url: String },
    Failed { message: String },
}

/// Write the terminal status for a request.
///
/// Returns `false` if the stored request changed since it was read; the
/// newer document is left alone.
pub async fn notify(
    store: &dyn RequestStore,
    stored: StoredRequest,
    outcome: &Outcome,
) -> Result<bool, PipelineError> {
    let StoredRequest {
        mut request,
        version,
    } = stored;

    match outcome {
        Outcome::Completed { download_url } => request.complete(download_url.as_str())?,
        Outcome::Failed { message } => request.fail(message.as_str())?,
    }

    let written = store.finalize(&request, &version).await?;
    if written {
        tracing::info!(request_id = %request.id, status = %request.status, "request finalized");
    } else {
        tracing::warn!(
            request_id = %request.id,
            status = %request.status,
            "request changed while processing, terminal write dropped"
        );
    }
    Ok(written)
}
