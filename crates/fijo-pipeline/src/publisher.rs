use uuid::Uuid;

use fijo_core::storage_keys;

use crate::backend::ArtifactStore;
use crate::error::PipelineError;

pub const PDF_CONTENT_TYPE: &str = "application/pdf";

/// Upload a finished certificate document and return its permanent public URL.
///
/// The key depends only on the request id, so publishing again for the same
/// request replaces the previous object.
pub async fn publish(
    store: &dyn ArtifactStore,
    request_id: Uuid,
    pdf: Vec<u8>,
) -> Result<String, PipelineError> {
    let key = storage_keys::certificate_pdf(request_id);
    let size = pdf.len();

    store.put_public(&key, pdf, PDF_CONTENT_TYPE).await?;

    let url = store.public_url(&key);
    tracing::info!(request_id = %request_id, key = %key, bytes = size, "certificate published");
    Ok(url)
}
