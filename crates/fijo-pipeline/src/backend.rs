//! Collaborator seams. The orchestrator only talks to these traits, so the
//! storage-backed implementations can be swapped for in-memory ones.

use std::future::Future;
use std::pin::Pin;

use uuid::Uuid;

use fijo_core::models::certifier::Certifier;
use fijo_core::models::lesson::LessonInstance;
use fijo_core::models::location::Location;
use fijo_core::models::request::CertificateRequest;

use crate::error::PipelineError;

pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// A request as read from the store, with the version its terminal write
/// must match.
#[derive(Debug, Clone)]
pub struct StoredRequest {
    pub request: CertificateRequest,
    pub version: String,
}

/// Durable record of certificate requests.
pub trait RequestStore: Send + Sync {
    /// Read a request. `None` if it does not exist.
    fn load(&self, id: Uuid) -> BoxFuture<'_, Result<Option<StoredRequest>, PipelineError>>;

    /// Write `request` back if the stored document is still at `version`.
    /// Returns `false` when someone else wrote it first.
    fn finalize<'a>(
        &'a self,
        request: &'a CertificateRequest,
        version: &'a str,
    ) -> BoxFuture<'a, Result<bool, PipelineError>>;
}

/// Read-only reference data. `None` means the document does not exist.
pub trait RecordLookup: Send + Sync {
    fn lesson_instance<'a>(
        &'a self,
        id: &'a str,
    ) -> BoxFuture<'a, Result<Option<LessonInstance>, PipelineError>>;

    fn certifier<'a>(&'a self, id: &'a str)
    -> BoxFuture<'a, Result<Option<Certifier>, PipelineError>>;

    fn location<'a>(&'a self, id: &'a str) -> BoxFuture<'a, Result<Option<Location>, PipelineError>>;
}

/// Durable, publicly readable artifact storage.
pub trait ArtifactStore: Send + Sync {
    /// Upload `bytes` to `key`, replacing any previous object, and make it
    /// publicly readable. All-or-nothing.
    fn put_public<'a>(
        &'a self,
        key: &'a str,
        bytes: Vec<u8>,
        content_type: &'a str,
    ) -> BoxFuture<'a, Result<(), PipelineError>>;

    /// Permanent URL for `key`.
    fn public_url(&self, key: &str) -> String;
}
