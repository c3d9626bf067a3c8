//! fijo-storage
//!
//! Object storage operations. Thin wrapper around the S3 SDK, pointed at the
//! Cloud Storage interoperability endpoint in production or at a local
//! emulator during development.

pub mod client;
pub mod documents;
pub mod error;
pub mod objects;
