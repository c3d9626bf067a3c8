use std::sync::Arc;
use std::time::Duration;

use uuid::Uuid;

use fijo_core::models::request::CertificateRequest;
use fijo_core::models::status::RequestStatus;
use fijo_export::{CertificateInput, CertificateRenderer};

use crate::backend::{ArtifactStore, RecordLookup, RequestStore, StoredRequest};
use crate::error::PipelineError;
use crate::notifier::{self, Outcome};
use crate::{publisher, resolver};

pub const DEFAULT_DEADLINE: Duration = Duration::from_secs(120);

/// What one invocation did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RunOutcome {
    /// The request was not pending; nothing was read or written.
    Skipped { status: RequestStatus },
    /// The request changed under us and the terminal write was dropped.
    Superseded,
    Completed { download_url: String },
    Failed { message: String },
}

/// Lookup, render, publish, notify. One request at a time, strictly in
/// that order.
pub struct Pipeline {
    requests: Arc<dyn RequestStore>,
    lookup: Arc<dyn RecordLookup>,
    artifacts: Arc<dyn ArtifactStore>,
    renderer: Arc<CertificateRenderer>,
    deadline: Duration,
}

impl Pipeline {
    pub fn new(
        requests: Arc<dyn RequestStore>,
        lookup: Arc<dyn RecordLookup>,
        artifacts: Arc<dyn ArtifactStore>,
        renderer: Arc<CertificateRenderer>,
    ) -> Self {
        Self {
            requests,
            lookup,
            artifacts,
            renderer,
            deadline: DEFAULT_DEADLINE,
        }
    }

    /// All three collaborators served by one backend.
    pub fn with_backend<B>(backend: Arc<B>, renderer: Arc<CertificateRenderer>) -> Self
    where
        B: RequestStore + RecordLookup + ArtifactStore + 'static,
    {
        Self::new(backend.clone(), backend.clone(), backend, renderer)
    }

    /// Wall-clock budget for render plus publish.
    pub fn with_deadline(mut self, deadline: Duration) -> Self {
        self.deadline = deadline;
        self
    }

    /// Process the request with this id.
    ///
    /// Step failures end up on the request as an error status and are
    /// reported as [`RunOutcome::Failed`]. `Err` means the terminal status
    /// itself could not be written.
    pub async fn run(&self, request_id: Uuid) -> Result<RunOutcome, PipelineError> {
        let stored = self
            .requests
            .load(request_id)
            .await?
            .ok_or(PipelineError::RequestNotFound(request_id))?;
        self.process(stored).await
    }

    pub async fn process(&self, stored: StoredRequest) -> Result<RunOutcome, PipelineError> {
        let request_id = stored.request.id;
        let status = stored.request.status;
        if status != RequestStatus::Pending {
            tracing::info!(request_id = %request_id, status = %status, "request not pending, skipping");
            return Ok(RunOutcome::Skipped { status });
        }

        tracing::info!(
            request_id = %request_id,
            students = stored.request.student_details.len(),
            "processing certificate request"
        );

        let outcome = match self.generate(&stored.request).await {
            Ok(download_url) => Outcome::Completed { download_url },
            Err(e) => {
                tracing::error!(request_id = %request_id, error = %e, "certificate generation failed");
                Outcome::Failed {
                    message: e.to_string(),
                }
            }
        };

        if !notifier::notify(self.requests.as_ref(), stored, &outcome).await? {
            return Ok(RunOutcome::Superseded);
        }

        Ok(match outcome {
            Outcome::Completed { download_url } => RunOutcome::Completed { download_url },
            Outcome::Failed { message } => RunOutcome::Failed { message },
        })
    }

    async fn generate(&self, request: &CertificateRequest) -> Result<String, PipelineError> {
        let lesson_id = request
            .lesson_instance_id()
            .ok_or(PipelineError::MissingLessonReference)?;

        let lesson = resolver::resolve(self.lookup.as_ref(), lesson_id).await?;

        let input = CertificateInput {
            students: &request.student_details,
            lesson: &lesson,
            information_sheet_handed_out: request.information_sheet_handed_out,
        };

        let render_and_publish = async {
            let pdf = self.renderer.render(input).await?;
            publisher::publish(self.artifacts.as_ref(), request.id, pdf.bytes).await
        };

        tokio::time::timeout(self.deadline, render_and_publish)
            .await
            .map_err(|_| PipelineError::DeadlineExceeded(self.deadline))?
    }
}
