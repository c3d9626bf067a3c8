use std::env;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use fijo_core::storage_keys::DEFAULT_PUBLIC_BASE_URL;
use fijo_export::assets::CertificateAssets;
use fijo_export::pdf::{PdfEngine, TypstCliEngine, TypstEngine};
use fijo_export::profile::CertificateProfile;
use fijo_export::template::CertificateTemplate;
use fijo_export::CertificateRenderer;
use fijo_storage::client::StorageSettings;

use crate::error::PipelineError;
use crate::orchestrate::DEFAULT_DEADLINE;

/// Which PDF engine the worker renders with.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EngineKind {
    Typst,
    TypstCli,
}

impl EngineKind {
    pub fn parse(value: &str) -> Result<Self, PipelineError> {
        match value.trim().to_ascii_lowercase().as_str() {
            "" | "typst" => Ok(Self::Typst),
            "typst-cli" => Ok(Self::TypstCli),
            other => Err(PipelineError::Config(format!(
                "unknown FIJO_RENDER_ENGINE {other:?} (expected typst or typst-cli)"
            ))),
        }
    }
}

/// Worker settings, read once at startup.
#[derive(Debug, Clone)]
pub struct WorkerConfig {
    pub storage: StorageSettings,
    pub public_base_url: String,
    pub deadline: Duration,
    pub engine: EngineKind,
    pub typst_bin: PathBuf,
    pub template_path: Option<PathBuf>,
    pub profile_path: Option<PathBuf>,
    pub logo_path: Option<PathBuf>,
    pub stamp_path: Option<PathBuf>,
    /// Font files for the in-process engine, font directories for the CLI.
    pub font_paths: Vec<PathBuf>,
}

impl WorkerConfig {
    pub fn from_env() -> Result<Self, PipelineError> {
        let deadline = match non_empty_var("FIJO_RENDER_DEADLINE_SECS") {
            Some(secs) => parse_deadline(&secs)?,
            None => DEFAULT_DEADLINE,
        };
        let engine = match non_empty_var("FIJO_RENDER_ENGINE") {
            Some(value) => EngineKind::parse(&value)?,
            None => EngineKind::Typst,
        };

        Ok(Self {
            storage: StorageSettings::from_env(),
            public_base_url: non_empty_var("FIJO_PUBLIC_BASE_URL")
                .unwrap_or_else(|| DEFAULT_PUBLIC_BASE_URL.to_string()),
            deadline,
            engine,
            typst_bin: non_empty_var("FIJO_TYPST_BIN")
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from("typst")),
            template_path: non_empty_var("FIJO_TEMPLATE_PATH").map(PathBuf::from),
            profile_path: non_empty_var("FIJO_PROFILE_PATH").map(PathBuf::from),
            logo_path: non_empty_var("FIJO_LOGO_PATH").map(PathBuf::from),
            stamp_path: non_empty_var("FIJO_STAMP_PATH").map(PathBuf::from),
            font_paths: non_empty_var("FIJO_FONT_PATHS")
                .map(|paths| split_paths(&paths))
                .unwrap_or_default(),
        })
    }

    /// Load the template, profile, images and fonts, and build a renderer.
    pub fn build_renderer(&self) -> Result<CertificateRenderer, PipelineError> {
        let template = match &self.template_path {
            Some(path) => CertificateTemplate::from_file(path)?,
            None => CertificateTemplate::builtin()?,
        };
        let profile = match &self.profile_path {
            Some(path) => CertificateProfile::from_json_file(path)?,
            None => CertificateProfile::default(),
        };
        let assets =
            CertificateAssets::from_paths(self.logo_path.as_deref(), self.stamp_path.as_deref())?;

        let engine: Arc<dyn PdfEngine> = match self.engine {
            EngineKind::Typst => Arc::new(TypstEngine::with_font_files(&self.font_paths)?),
            EngineKind::TypstCli => Arc::new(
                TypstCliEngine::new(self.typst_bin.clone()).with_font_paths(self.font_paths.clone()),
            ),
        };

        tracing::info!(
            engine = engine.name(),
            custom_template = self.template_path.is_some(),
            custom_profile = self.profile_path.is_some(),
            has_logo = assets.logo.is_some(),
            has_stamp = assets.stamp.is_some(),
            "certificate renderer ready"
        );

        Ok(CertificateRenderer::new(template, profile, assets, engine))
    }
}

pub fn parse_deadline(secs: &str) -> Result<Duration, PipelineError> {
    match secs.trim().parse::<u64>() {
        Ok(secs) if secs > 0 => Ok(Duration::from_secs(secs)),
        _ => Err(PipelineError::Config(format!(
            "FIJO_RENDER_DEADLINE_SECS must be a positive number of seconds, got {secs:?}"
        ))),
    }
}

/// Split a colon separated path list, ignoring empty entries.
pub fn split_paths(paths: &str) -> Vec<PathBuf> {
    paths
        .split(':')
        .map(str::trim)
        .filter(|p| !p.is_empty())
        .map(PathBuf::from)
        .collect()
}

fn non_empty_var(name: &str) -> Option<String> {
    env::var(name).ok().filter(|v| !v.trim().is_empty())
}
