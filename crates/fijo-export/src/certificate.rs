use std::sync::Arc;

use serde::Serialize;

use fijo_core::lesson_time::format_german_date;
use fijo_core::models::lesson::ResolvedLesson;
use fijo_core::models::student::StudentRecord;

use crate::assets::{CertificateAssets, LOGO_FILE, STAMP_FILE};
use crate::error::ExportError;
use crate::pdf::{PdfEngine, RenderJob, RenderedPdf};
use crate::profile::CertificateProfile;
use crate::template::CertificateTemplate;

/// Everything one certificate document is built from.
#[derive(Debug, Clone, Copy)]
pub struct CertificateInput<'a> {
    /// One page each, in this order.
    pub students: &'a [StudentRecord],
    pub lesson: &'a ResolvedLesson,
    /// Explicit information-sheet answer from the request, if any.
    pub information_sheet_handed_out: Option<bool>,
}

/// Turns a batch of students into one multi-page certificate PDF.
pub struct CertificateRenderer {
    template: CertificateTemplate,
    profile: CertificateProfile,
    assets: CertificateAssets,
    engine: Arc<dyn PdfEngine>,
}

#[derive(Serialize)]
struct DocumentContext<'a> {
    profile: &'a CertificateProfile,
    information_sheet_handed_out: bool,
    has_logo: bool,
    has_stamp: bool,
    logo_file: &'static str,
    stamp_file: &'static str,
    lesson: LessonView<'a>,
    pages: Vec<PageView<'a>>,
}

#[derive(Serialize)]
struct LessonView<'a> {
    date: String,
    start: &'a str,
    end: &'a str,
    location_name: &'a str,
    place_line: &'a str,
    certifier_name: String,
}

#[derive(Serialize)]
struct PageView<'a> {
    full_name: &'a str,
    date_of_birth: String,
}

impl CertificateRenderer {
    pub fn new(
        template: CertificateTemplate,
        profile: CertificateProfile,
        assets: CertificateAssets,
        engine: Arc<dyn PdfEngine>,
    ) -> Self {
        Self {
            template,
            profile,
            assets,
            engine,
        }
    }

    /// Produce the Typst markup for the whole document.
    ///
    /// Every required field on every page is checked before anything is
    /// rendered; one missing value fails the whole document.
    pub fn render_markup(&self, input: CertificateInput<'_>) -> Result<String, ExportError> {
        let lesson = lesson_view(input.lesson)?;

        if input.students.is_empty() {
            return Err(ExportError::MissingField("studentDetails".to_string()));
        }
        let pages = input
            .students
            .iter()
            .enumerate()
            .map(|(index, student)| page_view(index, student))
            .collect::<Result<Vec<_>, _>>()?;

        let context = DocumentContext {
            profile: &self.profile,
            information_sheet_handed_out: input
                .information_sheet_handed_out
                .unwrap_or(self.profile.information_sheet_default),
            has_logo: self.assets.logo.is_some(),
            has_stamp: self.assets.stamp.is_some(),
            logo_file: LOGO_FILE,
            stamp_file: STAMP_FILE,
            lesson,
            pages,
        };

        self.template.render(&context)
    }

    /// Render the document to PDF.
    pub async fn render(&self, input: CertificateInput<'_>) -> Result<RenderedPdf, ExportError> {
        let markup = self.render_markup(input)?;
        let expected = input.students.len();

        tracing::info!(
            engine = self.engine.name(),
            pages = expected,
            "rendering certificate document"
        );

        let rendered = self
            .engine
            .render(RenderJob {
                markup,
                files: self.assets.files(),
            })
            .await?;

        if let Some(actual) = rendered.page_count
            && actual != expected
        {
            return Err(ExportError::PageCount { expected, actual });
        }

        Ok(rendered)
    }
}

fn lesson_view(resolved: &ResolvedLesson) -> Result<LessonView<'_>, ExportError> {
    let date = resolved
        .lesson
        .date()
        .ok_or_else(|| ExportError::MissingField("lesson date".to_string()))?;

    let start = resolved.time_range.start.trim();
    let end = resolved.time_range.end.trim();
    if start.is_empty() || end.is_empty() {
        return Err(ExportError::MissingField("lesson time range".to_string()));
    }

    let location_name = resolved.location.name.trim();
    if location_name.is_empty() {
        return Err(ExportError::MissingField("location name".to_string()));
    }

    let certifier_name = resolved.certifier.display_name();
    if certifier_name.is_empty() {
        return Err(ExportError::MissingField("certifier name".to_string()));
    }

    Ok(LessonView {
        date: format_german_date(date),
        start,
        end,
        location_name,
        place_line: resolved.location.place_line(),
        certifier_name,
    })
}

fn page_view(index: usize, student: &StudentRecord) -> Result<PageView<'_>, ExportError> {
    let full_name = student.name().ok_or_else(|| {
        ExportError::MissingField(format!("studentDetails[{index}].fullName"))
    })?;
    let date_of_birth = student.birth_date().ok_or_else(|| {
        ExportError::MissingField(format!("studentDetails[{index}].dateOfBirth"))
    })?;

    Ok(PageView {
        full_name,
        date_of_birth: format_german_date(date_of_birth),
    })
}
