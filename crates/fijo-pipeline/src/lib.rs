//! fijo-pipeline
//!
//! The certificate pipeline: resolve a request's lesson context, render
//! one PDF page per student, publish the document, and write the terminal
//! status back to the request.
//!
//! Public API:
//! - [`Pipeline::run`]: process one request by id, exactly once per
//!   pending request
//! - [`events::handle_event`]: decode a worker event and run the pipeline
//!   for every request id it carries
//! - [`backend`]: collaborator traits, with [`bucket::BucketBackend`] for
//!   object storage and [`memory::MemoryBackend`] for tests and local runs

pub mod backend;
pub mod bucket;
pub mod config;
pub mod error;
pub mod events;
pub mod memory;
pub mod notifier;
pub mod orchestrate;
pub mod publisher;
pub mod resolver;

pub use crate::error::PipelineError;
pub use crate::orchestrate::{Pipeline, RunOutcome};
