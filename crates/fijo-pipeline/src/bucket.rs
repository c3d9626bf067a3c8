use aws_sdk_s3::Client;
use serde::de::DeserializeOwned;
use uuid::Uuid;

use fijo_core::models::certifier::Certifier;
use fijo_core::models::lesson::LessonInstance;
use fijo_core::models::location::Location;
use fijo_core::models::request::CertificateRequest;
use fijo_core::storage_keys;
use fijo_storage::error::StorageError;
use fijo_storage::{documents, objects};

use crate::backend::{ArtifactStore, BoxFuture, RecordLookup, RequestStore, StoredRequest};
use crate::error::PipelineError;

/// Requests, reference documents and artifacts, all in one bucket.
#[derive(Clone)]
pub struct BucketBackend {
    client: Client,
    bucket: String,
    public_base_url: String,
}

impl BucketBackend {
    pub fn new(client: Client, bucket: impl Into<String>, public_base_url: impl Into<String>) -> Self {
        Self {
            client,
            bucket: bucket.into(),
            public_base_url: public_base_url.into(),
        }
    }

    async fn load_optional<T: DeserializeOwned>(
        &self,
        key: &str,
    ) -> Result<Option<(T, String)>, PipelineError> {
        match documents::load_document(&self.client, &self.bucket, key).await {
            Ok(found) => Ok(Some(found)),
            Err(StorageError::NotFound { .. }) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }
}

impl RequestStore for BucketBackend {
    fn load(&self, id: Uuid) -> BoxFuture<'_, Result<Option<StoredRequest>, PipelineError>> {
        Box::pin(async move {
            let key = storage_keys::certificate_request(id);
            Ok(self
                .load_optional::<CertificateRequest>(&key)
                .await?
                .map(|(request, version)| StoredRequest { request, version }))
        })
    }

    fn finalize<'a>(
        &'a self,
        request: &'a CertificateRequest,
        version: &'a str,
    ) -> BoxFuture<'a, Result<bool, PipelineError>> {
        Box::pin(async move {
            let key = storage_keys::certificate_request(request.id);

            // An endpoint that reports no ETag cannot take a conditional write.
            let result = if version.is_empty() {
                documents::save_document(&self.client, &self.bucket, &key, request).await
            } else {
                documents::save_document_if_match(&self.client, &self.bucket, &key, request, version)
                    .await
            };

            match result {
                Ok(_) => Ok(true),
                Err(StorageError::PreconditionFailed { .. }) => Ok(false),
                Err(e) => Err(e.into()),
            }
        })
    }
}

impl RecordLookup for BucketBackend {
    fn lesson_instance<'a>(
        &'a self,
        id: &'a str,
    ) -> BoxFuture<'a, Result<Option<LessonInstance>, PipelineError>> {
        Box::pin(async move {
            let key = storage_keys::lesson_instance(id)?;
            Ok(self
                .load_optional::<LessonInstance>(&key)
                .await?
                .map(|(lesson, _)| lesson))
        })
    }

    fn certifier<'a>(
        &'a self,
        id: &'a str,
    ) -> BoxFuture<'a, Result<Option<Certifier>, PipelineError>> {
        Box::pin(async move {
            let key = storage_keys::certifier(id)?;
            Ok(self
                .load_optional::<Certifier>(&key)
                .await?
                .map(|(certifier, _)| certifier))
        })
    }

    fn location<'a>(&'a self, id: &'a str) -> BoxFuture<'a, Result<Option<Location>, PipelineError>> {
        Box::pin(async move {
            let key = storage_keys::location(id)?;
            Ok(self
                .load_optional::<Location>(&key)
                .await?
                .map(|(location, _)| location))
        })
    }
}

impl ArtifactStore for BucketBackend {
    fn put_public<'a>(
        &'a self,
        key: &'a str,
        bytes: Vec<u8>,
        content_type: &'a str,
    ) -> BoxFuture<'a, Result<(), PipelineError>> {
        Box::pin(async move {
            objects::put_public_object(&self.client, &self.bucket, key, bytes, content_type)
                .await
                .map_err(PipelineError::Upload)?;
            Ok(())
        })
    }

    fn public_url(&self, key: &str) -> String {
        storage_keys::public_url(&self.public_base_url, &self.bucket, key)
    }
}
