//! Object key conventions.
//!
//! Pure string functions with no SDK dependency. These define the canonical
//! layout of documents and artifacts in the certificate bucket.

use uuid::Uuid;

use crate::error::CoreError;

pub const CERTIFICATE_REQUESTS_PREFIX: &str = "certificate-requests/";

/// Default host for public object URLs.
pub const DEFAULT_PUBLIC_BASE_URL: &str = "https://storage.googleapis.com";

pub fn certificate_request(id: Uuid) -> String {
    format!("{CERTIFICATE_REQUESTS_PREFIX}{id}.json")
}

/// Inverse of [`certificate_request`], for listings.
pub fn certificate_request_id(key: &str) -> Option<Uuid> {
    key.strip_prefix(CERTIFICATE_REQUESTS_PREFIX)?
        .strip_suffix(".json")?
        .parse()
        .ok()
}

pub fn lesson_instance(id: &str) -> Result<String, CoreError> {
    validate_document_id(id)?;
    Ok(format!("lesson-instances/{id}.json"))
}

pub fn certifier(id: &str) -> Result<String, CoreError> {
    validate_document_id(id)?;
    Ok(format!("certifiers/{id}.json"))
}

pub fn location(id: &str) -> Result<String, CoreError> {
    validate_document_id(id)?;
    Ok(format!("locations/{id}.json"))
}

/// Where the rendered document for a request lives. Re-running the
/// pipeline for the same request overwrites this key.
pub fn certificate_pdf(request_id: Uuid) -> String {
    format!("certificates/{request_id}.pdf")
}

/// Permanent public URL of an object: `{base}/{bucket}/{key}`.
pub fn public_url(base: &str, bucket: &str, key: &str) -> String {
    format!("{}/{bucket}/{key}", base.trim_end_matches('/'))
}

/// Lookup ids are opaque strings from the scheduling screens. They become
/// a single key segment, so separators and traversal are refused.
pub fn validate_document_id(id: &str) -> Result<(), CoreError> {
    let bad = id.is_empty()
        || id.contains('/')
        || id.contains('\\')
        || id.contains("..")
        || id.chars().any(char::is_control);
    if bad {
        return Err(CoreError::InvalidDocumentId(id.to_string()));
    }
    Ok(())
}
