use aws_sdk_lambda::primitives::Blob;
use aws_sdk_lambda::types::InvocationType;
use aws_sdk_lambda::Client as LambdaClient;
use uuid::Uuid;

use fijo_core::models::request::DispatchMessage;

use crate::error::ApiError;

/// Hands new requests to the certificate worker with an asynchronous
/// invocation. The worker retries failed invocations on its own.
#[derive(Clone)]
pub struct WorkerDispatcher {
    client: LambdaClient,
    function_name: String,
}

impl WorkerDispatcher {
    pub fn new(client: LambdaClient, function_name: impl Into<String>) -> Self {
        Self {
            client,
            function_name: function_name.into(),
        }
    }

    pub async fn dispatch(&self, request_id: Uuid) -> Result<(), ApiError> {
        let payload = serde_json::to_vec(&DispatchMessage { request_id })
            .map_err(|e| ApiError::Internal(e.to_string()))?;

        self.client
            .invoke()
            .function_name(&self.function_name)
            .invocation_type(InvocationType::Event)
            .payload(Blob::new(payload))
            .send()
            .await
            .map_err(|e| {
                ApiError::Internal(format!(
                    "failed to invoke {}: {}",
                    self.function_name,
                    e.into_service_error()
                ))
            })?;

        tracing::info!(request_id = %request_id, function = %self.function_name, "request dispatched");
        Ok(())
    }
}
