//! In-memory collaborators. Every write is kept so callers can check what
//! the pipeline did.

use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard};

use uuid::Uuid;

use fijo_core::models::certifier::Certifier;
use fijo_core::models::lesson::LessonInstance;
use fijo_core::models::location::Location;
use fijo_core::models::request::CertificateRequest;
use fijo_core::storage_keys::{self, DEFAULT_PUBLIC_BASE_URL};
use fijo_storage::error::StorageError;

use crate::backend::{ArtifactStore, BoxFuture, RecordLookup, RequestStore, StoredRequest};
use crate::error::PipelineError;

/// An uploaded artifact.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredObject {
    pub bytes: Vec<u8>,
    pub content_type: String,
    pub public: bool,
}

#[derive(Default)]
struct State {
    requests: HashMap<Uuid, (CertificateRequest, u64)>,
    lessons: HashMap<String, LessonInstance>,
    certifiers: HashMap<String, Certifier>,
    locations: HashMap<String, Location>,
    objects: HashMap<String, StoredObject>,
    uploads: usize,
    request_writes: usize,
    fail_uploads: bool,
    fail_request_writes: bool,
}

pub struct MemoryBackend {
    bucket: String,
    state: Mutex<State>,
}

impl MemoryBackend {
    pub fn new(bucket: impl Into<String>) -> Self {
        Self {
            bucket: bucket.into(),
            state: Mutex::new(State::default()),
        }
    }

    fn state(&self) -> MutexGuard<'_, State> {
        // A panic while holding the lock leaves plain data behind; keep going.
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    pub fn insert_request(&self, request: CertificateRequest) {
        self.state().requests.insert(request.id, (request, 1));
    }

    pub fn insert_lesson(&self, id: impl Into<String>, lesson: LessonInstance) {
        self.state().lessons.insert(id.into(), lesson);
    }

    pub fn insert_certifier(&self, id: impl Into<String>, certifier: Certifier) {
        self.state().certifiers.insert(id.into(), certifier);
    }

    pub fn insert_location(&self, id: impl Into<String>, location: Location) {
        self.state().locations.insert(id.into(), location);
    }

    /// Bump a request's version without changing it, as a concurrent writer would.
    pub fn touch_request(&self, id: Uuid) {
        if let Some((_, version)) = self.state().requests.get_mut(&id) {
            *version += 1;
        }
    }

    /// Make every following upload fail.
    pub fn fail_uploads(&self, fail: bool) {
        self.state().fail_uploads = fail;
    }

    /// Make every following terminal write fail.
    pub fn fail_request_writes(&self, fail: bool) {
        self.state().fail_request_writes = fail;
    }

    pub fn request(&self, id: Uuid) -> Option<CertificateRequest> {
        self.state().requests.get(&id).map(|(request, _)| request.clone())
    }

    pub fn object(&self, key: &str) -> Option<StoredObject> {
        self.state().objects.get(key).cloned()
    }

    pub fn object_keys(&self) -> Vec<String> {
        let mut keys: Vec<_> = self.state().objects.keys().cloned().collect();
        keys.sort();
        keys
    }

    /// Successful uploads so far.
    pub fn upload_count(&self) -> usize {
        self.state().uploads
    }

    /// Successful terminal writes so far.
    pub fn request_write_count(&self) -> usize {
        self.state().request_writes
    }
}

impl RequestStore for MemoryBackend {
    fn load(&self, id: Uuid) -> BoxFuture<'_, Result<Option<StoredRequest>, PipelineError>> {
        Box::pin(async move {
            Ok(self
                .state()
                .requests
                .get(&id)
                .map(|(request, version)| StoredRequest {
                    request: request.clone(),
                    version: version.to_string(),
                }))
        })
    }

    fn finalize<'a>(
        &'a self,
        request: &'a CertificateRequest,
        version: &'a str,
    ) -> BoxFuture<'a, Result<bool, PipelineError>> {
        Box::pin(async move {
            let mut state = self.state();
            if state.fail_request_writes {
                return Err(PipelineError::Storage(StorageError::PutObject(format!(
                    "simulated outage writing request {}",
                    request.id
                ))));
            }
            let current = state.requests.get(&request.id).map(|(_, v)| v.to_string());
            if current.as_deref() != Some(version) {
                return Ok(false);
            }
            let next = version.parse::<u64>().unwrap_or(0) + 1;
            state.requests.insert(request.id, (request.clone(), next));
            state.request_writes += 1;
            Ok(true)
        })
    }
}

impl RecordLookup for MemoryBackend {
    fn lesson_instance<'a>(
        &'a self,
        id: &'a str,
    ) -> BoxFuture<'a, Result<Option<LessonInstance>, PipelineError>> {
        Box::pin(async move { Ok(self.state().lessons.get(id).cloned()) })
    }

    fn certifier<'a>(
        &'a self,
        id: &'a str,
    ) -> BoxFuture<'a, Result<Option<Certifier>, PipelineError>> {
        Box::pin(async move { Ok(self.state().certifiers.get(id).cloned()) })
    }

    fn location<'a>(&'a self, id: &'a str) -> BoxFuture<'a, Result<Option<Location>, PipelineError>> {
        Box::pin(async move { Ok(self.state().locations.get(id).cloned()) })
    }
}

impl ArtifactStore for MemoryBackend {
    fn put_public<'a>(
        &'a self,
        key: &'a str,
        bytes: Vec<u8>,
        content_type: &'a str,
    ) -> BoxFuture<'a, Result<(), PipelineError>> {
        Box::pin(async move {
            let mut state = self.state();
            if state.fail_uploads {
                return Err(PipelineError::Upload(StorageError::PutObject(format!(
                    "simulated outage writing {key}"
                ))));
            }
            state.objects.insert(
                key.to_string(),
                StoredObject {
                    bytes,
                    content_type: content_type.to_string(),
                    public: true,
                },
            );
            state.uploads += 1;
            Ok(())
        })
    }

    fn public_url(&self, key: &str) -> String {
        storage_keys::public_url(DEFAULT_PUBLIC_BASE_URL, &self.bucket, key)
    }
}
