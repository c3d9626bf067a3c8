use std::sync::Arc;

use lambda_http::lambda_runtime;
use lambda_http::{service_fn, LambdaEvent};
use tracing_subscriber::EnvFilter;

use fijo_pipeline::bucket::BucketBackend;
use fijo_pipeline::config::WorkerConfig;
use fijo_pipeline::events::{self, BatchResponse, WorkerEvent};
use fijo_pipeline::Pipeline;

#[tokio::main]
async fn main() -> eyre::Result<()> {
    // Structured JSON logging for CloudWatch
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .json()
        .init();

    let config = WorkerConfig::from_env()?;
    let s3 = fijo_storage::client::build_client(&config.storage).await;
    let backend = Arc::new(BucketBackend::new(
        s3,
        config.storage.bucket.clone(),
        config.public_base_url.clone(),
    ));
    let renderer = Arc::new(config.build_renderer()?);

    let pipeline =
        Arc::new(Pipeline::with_backend(backend, renderer).with_deadline(config.deadline));

    tracing::info!(
        bucket = %config.storage.bucket,
        deadline_secs = config.deadline.as_secs(),
        "certificate worker started"
    );

    lambda_runtime::run(service_fn(move |event: LambdaEvent<WorkerEvent>| {
        let pipeline = Arc::clone(&pipeline);
        async move { handle(&pipeline, event).await }
    }))
    .await
    .map_err(|e| eyre::eyre!(e))
}

async fn handle(
    pipeline: &Pipeline,
    event: LambdaEvent<WorkerEvent>,
) -> Result<BatchResponse, lambda_http::Error> {
    let (payload, context) = event.into_parts();
    tracing::debug!(invocation_id = %context.request_id, "worker invoked");
    Ok(events::handle_event(pipeline, payload).await?)
}
