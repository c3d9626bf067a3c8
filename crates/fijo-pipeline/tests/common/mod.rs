#![allow(dead_code)]

use std::sync::{Arc, Mutex};
use std::time::Duration;

use fijo_core::models::certifier::Certifier;
use fijo_core::models::lesson::LessonInstance;
use fijo_core::models::location::Location;
use fijo_core::models::request::{CertificateRequest, NewCertificateRequest};
use fijo_core::models::student::StudentRecord;
use fijo_export::assets::CertificateAssets;
use fijo_export::pdf::{BoxFuture, PdfEngine, RenderJob, RenderedPdf};
use fijo_export::profile::CertificateProfile;
use fijo_export::template::CertificateTemplate;
use fijo_export::{CertificateRenderer, ExportError};
use fijo_pipeline::memory::MemoryBackend;
use fijo_pipeline::Pipeline;

pub const BUCKET: &str = "fijo-test";
pub const LESSON_ID: &str = "lesson-1";

/// Engine double: the "PDF" is the markup itself, one page per
/// `#pagebreak`-separated section.
#[derive(Default)]
pub struct MarkupEngine {
    pub jobs: Mutex<Vec<RenderJob>>,
    pub delay: Option<Duration>,
    /// Runs while rendering, before the document is returned.
    pub during_render: Option<Box<dyn Fn() + Send + Sync>>,
}

impl PdfEngine for MarkupEngine {
    fn name(&self) -> &'static str {
        "markup"
    }

    fn render(&self, job: RenderJob) -> BoxFuture<'_, Result<RenderedPdf, ExportError>> {
        Box::pin(async move {
            if let Some(delay) = self.delay {
                tokio::time::sleep(delay).await;
            }
            if let Some(hook) = &self.during_render {
                hook();
            }
            let pages = job.markup.matches("#pagebreak(").count() + 1;
            let bytes = job.markup.clone().into_bytes();
            self.jobs.lock().unwrap().push(job);
            Ok(RenderedPdf {
                bytes,
                page_count: Some(pages),
            })
        })
    }
}

pub fn renderer(engine: Arc<dyn PdfEngine>) -> Arc<CertificateRenderer> {
    Arc::new(CertificateRenderer::new(
        CertificateTemplate::builtin().unwrap(),
        CertificateProfile::default(),
        CertificateAssets::default(),
        engine,
    ))
}

pub fn pipeline(backend: &Arc<MemoryBackend>, engine: Arc<dyn PdfEngine>) -> Pipeline {
    Pipeline::with_backend(Arc::clone(backend), renderer(engine))
}

/// A backend holding the Berlin lesson and its certifier and location.
pub fn seeded_backend() -> Arc<MemoryBackend> {
    let backend = Arc::new(MemoryBackend::new(BUCKET));
    backend.insert_lesson(
        LESSON_ID,
        LessonInstance {
            date: Some("2025-02-20".to_string()),
            time: Some("10:00".to_string()),
            duration: Some("2".to_string()),
            location: Some("loc-berlin".to_string()),
            certifier_id: Some("cert-john".to_string()),
            ..LessonInstance::default()
        },
    );
    backend.insert_certifier(
        "cert-john",
        Certifier {
            first_name: "John".to_string(),
            last_name: "Doe".to_string(),
            email: None,
        },
    );
    backend.insert_location(
        "loc-berlin",
        Location {
            name: "Berlin Training Center".to_string(),
            address: String::new(),
        },
    );
    backend
}

pub fn pending_request(lesson_id: Option<&str>, names: &[&str]) -> CertificateRequest {
    CertificateRequest::new(NewCertificateRequest {
        user_id: "user-1".to_string(),
        lesson_instance_id: lesson_id.map(str::to_string),
        student_details: names
            .iter()
            .map(|name| StudentRecord::new(*name, "1990-01-01", "Male"))
            .collect(),
        information_sheet_handed_out: None,
    })
}

pub fn artifact_text(backend: &MemoryBackend, key: &str) -> String {
    String::from_utf8(backend.object(key).unwrap().bytes).unwrap()
}
