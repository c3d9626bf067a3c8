use std::env;

use aws_sdk_s3::Client;

/// Production interoperability endpoint for Cloud Storage.
pub const PRODUCTION_ENDPOINT: &str = "https://storage.googleapis.com";

/// Where the bucket lives and how to reach it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StorageSettings {
    pub bucket: String,
    pub region: String,
    /// Emulator endpoint (e.g. `http://localhost:9000`). `None` means
    /// production.
    pub endpoint: Option<String>,
}

impl StorageSettings {
    /// Read `FIJO_BUCKET`, `AWS_REGION` and `FIJO_STORAGE_ENDPOINT`.
    pub fn from_env() -> Self {
        Self {
            bucket: env::var("FIJO_BUCKET").unwrap_or_else(|_| "fijo-certificates".to_string()),
            region: env::var("AWS_REGION").unwrap_or_else(|_| "auto".to_string()),
            endpoint: env::var("FIJO_STORAGE_ENDPOINT")
                .ok()
                .filter(|e| !e.trim().is_empty()),
        }
    }

    pub fn endpoint(&self) -> &str {
        self.endpoint.as_deref().unwrap_or(PRODUCTION_ENDPOINT)
    }

    pub fn is_emulator(&self) -> bool {
        self.endpoint.is_some()
    }
}

/// Build an S3-compatible client for the configured endpoint.
///
/// Credentials come from the default provider chain (HMAC keys exported as
/// `AWS_ACCESS_KEY_ID` / `AWS_SECRET_ACCESS_KEY`).
pub async fn build_client(settings: &StorageSettings) -> Client {
    let sdk_config = aws_config::defaults(aws_config::BehaviorVersion::latest())
        .region(aws_config::Region::new(settings.region.clone()))
        .load()
        .await;

    let config = aws_sdk_s3::config::Builder::from(&sdk_config)
        .endpoint_url(settings.endpoint())
        .force_path_style(true)
        .build();

    tracing::debug!(
        endpoint = settings.endpoint(),
        bucket = %settings.bucket,
        emulator = settings.is_emulator(),
        "storage client configured"
    );

    Client::from_conf(config)
}
