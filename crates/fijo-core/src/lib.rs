//! fijo-core
//!
//! Pure domain types, lesson-time arithmetic, and storage key conventions.
//! No cloud SDK dependency; this is the shared vocabulary of the certificate
//! pipeline, the worker, and the HTTP API.

pub mod error;
pub mod lesson_time;
pub mod models;
pub mod storage_keys;
