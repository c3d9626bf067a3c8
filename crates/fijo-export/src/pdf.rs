//! Typesetting engines.
//!
//! The renderer hands an engine finished Typst markup plus the image files
//! it references, and gets PDF bytes back. Two engines exist:
//!
//! - [`TypstEngine`] compiles in-process on a blocking thread.
//! - [`TypstCliEngine`] runs the `typst` binary in a scratch directory. The
//!   directory and the child process live in a [`RenderSession`] that is torn
//!   down on every exit path, including cancellation by a deadline.

use std::future::Future;
use std::path::{Path, PathBuf};
use std::pin::Pin;
use std::process::Stdio;
use std::sync::Arc;

use tempfile::TempDir;
use tokio::process::Command;
use typst_as_lib::typst_kit_options::TypstKitFontOptions;

use crate::error::ExportError;

pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

const MAIN_FILE: &str = "main.typ";
const OUTPUT_FILE: &str = "certificate.pdf";
const UNKNOWN_FONT_WARNING: &str = "unknown font family";

/// Markup plus the files it references by name.
#[derive(Debug, Clone)]
pub struct RenderJob {
    pub markup: String,
    pub files: Vec<(String, Vec<u8>)>,
}

/// A finished document.
#[derive(Debug, Clone)]
pub struct RenderedPdf {
    pub bytes: Vec<u8>,
    /// Page count, when the engine can report it.
    pub page_count: Option<usize>,
}

pub trait PdfEngine: Send + Sync {
    /// Short name for logs.
    fn name(&self) -> &'static str;

    fn render(&self, job: RenderJob) -> BoxFuture<'_, Result<RenderedPdf, ExportError>>;
}

/// In-process Typst compiler. Typst's embedded fonts are always available;
/// extra font files can be added with [`TypstEngine::with_font_files`].
#[derive(Debug, Clone, Default)]
pub struct TypstEngine {
    fonts: Arc<Vec<Vec<u8>>>,
}

impl TypstEngine {
    pub fn new() -> Self {
        Self::default()
    }

    /// Load font files to make available to every compilation.
    pub fn with_font_files(paths: &[PathBuf]) -> Result<Self, ExportError> {
        let fonts = paths
            .iter()
            .map(|path| {
                std::fs::read(path).map_err(|source| ExportError::Io {
                    path: path.display().to_string(),
                    source,
                })
            })
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self {
            fonts: Arc::new(fonts),
        })
    }
}

impl PdfEngine for TypstEngine {
    fn name(&self) -> &'static str {
        "typst"
    }

    fn render(&self, job: RenderJob) -> BoxFuture<'_, Result<RenderedPdf, ExportError>> {
        let fonts = Arc::clone(&self.fonts);
        Box::pin(async move {
            tokio::task::spawn_blocking(move || compile_in_process(&job, &fonts))
                .await
                .map_err(|e| ExportError::Pdf(format!("render task failed: {e}")))?
        })
    }
}

fn compile_in_process(job: &RenderJob, fonts: &[Vec<u8>]) -> Result<RenderedPdf, ExportError> {
    let files: Vec<(&str, Vec<u8>)> = job
        .files
        .iter()
        .map(|(name, bytes)| (name.as_str(), bytes.clone()))
        .collect();

    let engine = typst_as_lib::TypstEngine::builder()
        .main_file(job.markup.clone())
        .fonts(fonts.iter().cloned())
        .search_fonts_with(
            TypstKitFontOptions::default()
                .include_system_fonts(false)
                .include_embedded_fonts(true),
        )
        .with_static_file_resolver(files)
        .build();

    // compiled is Warned<Result<Document, Error>>
    let compiled = engine.compile();
    if !compiled.warnings.is_empty() {
        tracing::debug!(warnings = compiled.warnings.len(), "typst compiled with warnings");
    }
    // Without its font Typst drops the text and still produces pages.
    if let Some(warning) = compiled
        .warnings
        .iter()
        .find(|w| w.message.contains(UNKNOWN_FONT_WARNING))
    {
        return Err(ExportError::Pdf(format!(
            "typst could not typeset text: {}",
            warning.message
        )));
    }
    let document = compiled
        .output
        .map_err(|e| ExportError::Pdf(format!("typst compilation failed: {e:?}")))?;

    let bytes = typst_pdf::pdf(&document, &typst_pdf::PdfOptions::default())
        .map_err(|e| ExportError::Pdf(format!("PDF export failed: {e:?}")))?;

    Ok(RenderedPdf {
        page_count: Some(document.pages.len()),
        bytes: bytes.into(),
    })
}

/// Out-of-process Typst compiler (`typst compile`).
#[derive(Debug, Clone)]
pub struct TypstCliEngine {
    binary: PathBuf,
    font_paths: Vec<PathBuf>,
}

impl TypstCliEngine {
    pub fn new(binary: impl Into<PathBuf>) -> Self {
        Self {
            binary: binary.into(),
            font_paths: Vec::new(),
        }
    }

    pub fn with_font_paths(mut self, paths: Vec<PathBuf>) -> Self {
        self.font_paths = paths;
        self
    }
}

impl PdfEngine for TypstCliEngine {
    fn name(&self) -> &'static str {
        "typst-cli"
    }

    fn render(&self, job: RenderJob) -> BoxFuture<'_, Result<RenderedPdf, ExportError>> {
        Box::pin(async move {
            let session = RenderSession::open(&job).await?;
            session.compile(&self.binary, &self.font_paths).await
        })
    }
}

/// Scratch directory holding one job's sources and output. Dropping the
/// session removes the directory; a child still running when its future is
/// dropped is killed.
pub struct RenderSession {
    dir: TempDir,
}

impl RenderSession {
    pub async fn open(job: &RenderJob) -> Result<Self, ExportError> {
        let dir = tempfile::Builder::new()
            .prefix("fijo-render-")
            .tempdir()
            .map_err(|source| ExportError::Io {
                path: std::env::temp_dir().display().to_string(),
                source,
            })?;

        write_file(&dir.path().join(MAIN_FILE), job.markup.as_bytes()).await?;
        for (name, bytes) in &job.files {
            write_file(&dir.path().join(name), bytes).await?;
        }

        tracing::debug!(dir = %dir.path().display(), "render session opened");
        Ok(Self { dir })
    }

    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    async fn compile(
        &self,
        binary: &Path,
        font_paths: &[PathBuf],
    ) -> Result<RenderedPdf, ExportError> {
        let mut command = Command::new(binary);
        command
            .arg("compile")
            .arg(MAIN_FILE)
            .arg(OUTPUT_FILE)
            .current_dir(self.path())
            .stdin(Stdio::null())
            .kill_on_drop(true);
        for font_path in font_paths {
            command.arg("--font-path").arg(font_path);
        }

        let output = command.output().await.map_err(|e| {
            ExportError::Pdf(format!("failed to run {}: {e}", binary.display()))
        })?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(ExportError::Pdf(format!(
                "typst exited with {}: {}",
                output.status,
                stderr.trim()
            )));
        }

        let output_path = self.path().join(OUTPUT_FILE);
        let bytes = tokio::fs::read(&output_path)
            .await
            .map_err(|source| ExportError::Io {
                path: output_path.display().to_string(),
                source,
            })?;

        Ok(RenderedPdf {
            bytes,
            page_count: None,
        })
    }
}

impl Drop for RenderSession {
    fn drop(&mut self) {
        tracing::debug!(dir = %self.dir.path().display(), "render session closed");
    }
}

async fn write_file(path: &Path, contents: &[u8]) -> Result<(), ExportError> {
    tokio::fs::write(path, contents)
        .await
        .map_err(|source| ExportError::Io {
            path: path.display().to_string(),
            source,
        })
}
