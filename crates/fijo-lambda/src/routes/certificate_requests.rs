use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use serde::Deserialize;
use uuid::Uuid;

use fijo_core::models::request::{CertificateRequest, NewCertificateRequest, RequestStatusView};
use fijo_core::models::status::RequestStatus;
use fijo_core::storage_keys;
use fijo_storage::error::StorageError;
use fijo_storage::{documents, objects};

use crate::error::ApiError;
use crate::state::AppState;

/// Shown on a request whose hand-off to the worker failed.
const DISPATCH_FAILED: &str = "Certificate generation could not be started. Please try again.";

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListQuery {
    pub user_id: Option<String>,
    pub status: Option<RequestStatus>,
}

pub async fn create_certificate_request(
    State(state): State<AppState>,
    Json(input): Json<NewCertificateRequest>,
) -> Result<(StatusCode, Json<CertificateRequest>), ApiError> {
    input.validate()?;

    let mut request = CertificateRequest::new(input);
    let key = storage_keys::certificate_request(request.id);
    let etag = documents::save_document(&state.s3, &state.bucket, &key, &request).await?;

    tracing::info!(
        request_id = %request.id,
        students = request.student_details.len(),
        "certificate request created"
    );

    if let Err(e) = state.dispatcher.dispatch(request.id).await {
        // Leave a terminal status behind so the UI stops waiting.
        request.fail(DISPATCH_FAILED)?;
        let written = if etag.is_empty() {
            documents::save_document(&state.s3, &state.bucket, &key, &request).await
        } else {
            documents::save_document_if_match(&state.s3, &state.bucket, &key, &request, &etag).await
        };
        if let Err(write_error) = written {
            tracing::warn!(request_id = %request.id, error = %write_error, "could not mark undispatched request failed");
        }
        return Err(e);
    }

    Ok((StatusCode::CREATED, Json(request)))
}

pub async fn get_certificate_request(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<RequestStatusView>, ApiError> {
    let key = storage_keys::certificate_request(id);
    let (request, _) =
        documents::load_document::<CertificateRequest>(&state.s3, &state.bucket, &key)
            .await
            .map_err(|e| match e {
                StorageError::NotFound { .. } => {
                    ApiError::NotFound(format!("certificate request not found: {id}"))
                }
                other => other.into(),
            })?;
    Ok(Json(RequestStatusView::from(&request)))
}

pub async fn list_certificate_requests(
    State(state): State<AppState>,
    Query(query): Query<ListQuery>,
) -> Result<Json<Vec<CertificateRequest>>, ApiError> {
    let user_id = query
        .user_id
        .as_deref()
        .map(str::trim)
        .filter(|u| !u.is_empty())
        .ok_or_else(|| ApiError::BadRequest("userId query parameter is required".to_string()))?;

    let keys =
        objects::list_objects(&state.s3, &state.bucket, storage_keys::CERTIFICATE_REQUESTS_PREFIX)
            .await?;

    let mut requests = Vec::new();
    for key in keys
        .iter()
        .filter(|key| storage_keys::certificate_request_id(key).is_some())
    {
        match documents::load_document::<CertificateRequest>(&state.s3, &state.bucket, key).await {
            Ok((request, _)) => requests.push(request),
            // Deleted between listing and reading.
            Err(StorageError::NotFound { .. }) => {}
            Err(StorageError::Serialization(e)) => {
                tracing::warn!(key = %key, error = %e, "skipping unreadable certificate request");
            }
            Err(e) => return Err(e.into()),
        }
    }

    Ok(Json(select_requests(requests, user_id, query.status)))
}

/// A user's requests, optionally with one status, newest first.
fn select_requests(
    requests: Vec<CertificateRequest>,
    user_id: &str,
    status: Option<RequestStatus>,
) -> Vec<CertificateRequest> {
    let mut selected: Vec<_> = requests
        .into_iter()
        .filter(|r| r.user_id == user_id)
        .filter(|r| status.is_none_or(|s| r.status == s))
        .collect();
    selected.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));
    selected
}
