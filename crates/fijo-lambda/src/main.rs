use std::env;

use axum::middleware as axum_mw;
use axum::routing::get;
use axum::Router;
use tower::ServiceBuilder;
use tower_http::cors::{Any, CorsLayer};
use tracing_subscriber::EnvFilter;

use fijo_storage::client::StorageSettings;

mod dispatch;
mod error;
mod middleware;
mod routes;
mod state;

use dispatch::WorkerDispatcher;
use state::AppState;

#[tokio::main]
async fn main() -> eyre::Result<()> {
    // Structured JSON logging for CloudWatch
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .json()
        .init();

    let storage = StorageSettings::from_env();
    let worker_function =
        env::var("FIJO_WORKER_FUNCTION").unwrap_or_else(|_| "fijo-worker".to_string());

    let s3 = fijo_storage::client::build_client(&storage).await;
    let aws_config = aws_config::defaults(aws_config::BehaviorVersion::latest())
        .load()
        .await;
    let dispatcher = WorkerDispatcher::new(aws_sdk_lambda::Client::new(&aws_config), worker_function);

    let state = AppState {
        s3,
        bucket: storage.bucket.clone(),
        dispatcher,
    };

    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let app = Router::new()
        .route("/health", get(routes::health::health_check))
        .route(
            "/certificate-requests",
            get(routes::certificate_requests::list_certificate_requests)
                .post(routes::certificate_requests::create_certificate_request),
        )
        .route(
            "/certificate-requests/{id}",
            get(routes::certificate_requests::get_certificate_request),
        )
        .layer(
            ServiceBuilder::new()
                .layer(axum_mw::from_fn(middleware::audit::audit_log))
                .layer(cors),
        )
        .with_state(state);

    tracing::info!(bucket = %storage.bucket, emulator = storage.is_emulator(), "api started");

    lambda_http::run(app).await.map_err(|e| eyre::eyre!(e))
}
