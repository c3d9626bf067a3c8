//! Worker event decoding. The worker is invoked either by a queue
//! (a batch of records, each body a [`DispatchMessage`]) or directly with a
//! single [`DispatchMessage`].

use serde::{Deserialize, Serialize};

pub use fijo_core::models::request::DispatchMessage;

use crate::error::PipelineError;
use crate::orchestrate::{Pipeline, RunOutcome};

#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum WorkerEvent {
    Queue(QueueBatch),
    Direct(DispatchMessage),
}

#[derive(Debug, Clone, Deserialize)]
pub struct QueueBatch {
    #[serde(rename = "Records")]
    pub records: Vec<QueueRecord>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QueueRecord {
    pub message_id: String,
    #[serde(default)]
    pub body: String,
}

/// Partial batch response: records listed here are redelivered.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BatchResponse {
    pub batch_item_failures: Vec<BatchItemFailure>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BatchItemFailure {
    pub item_identifier: String,
}

/// Run the pipeline for every request id the event carries.
///
/// A direct invocation returns the pipeline's error so the caller can retry.
/// Queue records whose bodies cannot be decoded, or whose request does not
/// exist, are dropped; records that failed for any other reason are
/// reported back for redelivery.
pub async fn handle_event(
    pipeline: &Pipeline,
    event: WorkerEvent,
) -> Result<BatchResponse, PipelineError> {
    match event {
        WorkerEvent::Direct(message) => {
            let outcome = pipeline.run(message.request_id).await?;
            log_outcome(&message, &outcome);
            Ok(BatchResponse::default())
        }
        WorkerEvent::Queue(batch) => {
            let mut response = BatchResponse::default();
            for record in batch.records {
                if !handle_record(pipeline, &record).await {
                    response.batch_item_failures.push(BatchItemFailure {
                        item_identifier: record.message_id,
                    });
                }
            }
            Ok(response)
        }
    }
}

/// `false` if the record should be redelivered.
async fn handle_record(pipeline: &Pipeline, record: &QueueRecord) -> bool {
    let message: DispatchMessage = match serde_json::from_str(&record.body) {
        Ok(message) => message,
        Err(e) => {
            tracing::error!(message_id = %record.message_id, error = %e, "undecodable queue record dropped");
            return true;
        }
    };

    match pipeline.run(message.request_id).await {
        Ok(outcome) => {
            log_outcome(&message, &outcome);
            true
        }
        Err(PipelineError::RequestNotFound(id)) => {
            tracing::warn!(message_id = %record.message_id, request_id = %id, "request does not exist, record dropped");
            true
        }
        Err(e) => {
            tracing::error!(
                message_id = %record.message_id,
                request_id = %message.request_id,
                error = %e,
                "record failed, will be redelivered"
            );
            false
        }
    }
}

fn log_outcome(message: &DispatchMessage, outcome: &RunOutcome) {
    match outcome {
        RunOutcome::Completed { download_url } => {
            tracing::info!(request_id = %message.request_id, url = %download_url, "certificate completed")
        }
        RunOutcome::Failed { message: error } => {
            tracing::info!(request_id = %message.request_id, error = %error, "certificate request failed")
        }
        RunOutcome::Skipped { status } => {
            tracing::info!(request_id = %message.request_id, status = %status, "duplicate delivery ignored")
        }
        RunOutcome::Superseded => {
            tracing::info!(request_id = %message.request_id, "request superseded")
        }
    }
}
