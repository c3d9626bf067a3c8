//! fijo-export
//!
//! Certificate PDF generation: a Tera template produces Typst markup, one
//! page per student, and a [`pdf::PdfEngine`] typesets it.

pub mod assets;
pub mod certificate;
pub mod error;
pub mod pdf;
pub mod profile;
pub mod template;

pub use certificate::{CertificateInput, CertificateRenderer};
pub use error::ExportError;
