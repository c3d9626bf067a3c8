use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::ExportError;

/// Jurisdiction-specific wording and recognition data printed on every
/// certificate. Nothing here varies per student.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CertificateProfile {
    /// Document title, centered under the logo.
    pub title: String,

    /// Closing sentence of the attendance paragraph.
    pub course_statement: String,

    /// Date the training body was recognised by the authority.
    pub recognition_date: String,

    /// Recognising authority.
    pub authority: String,

    /// Authority file reference.
    pub file_reference: String,

    /// Whether the information sheet counts as handed out when a request
    /// does not say.
    pub information_sheet_default: bool,
}

impl Default for CertificateProfile {
    fn default() -> Self {
        Self {
            title: "Bescheinigung über die Teilnahme an einer Schulung in Erster Hilfe \
                    zur Vorlage bei der Fahrerlaubnisbehörde"
                .to_string(),
            course_statement:
                "an einer Schulung in Erster Hilfe mit 9 Unterrichtseinheiten teilgenommen."
                    .to_string(),
            recognition_date: "07.03.2024".to_string(),
            authority: "Landratsamt Bodenseekreis".to_string(),
            file_reference: "1.13 ⬜ 113.32".to_string(),
            information_sheet_default: true,
        }
    }
}

impl CertificateProfile {
    /// Load a profile from a JSON file. Missing keys keep their defaults.
    pub fn from_json_file(path: &Path) -> Result<Self, ExportError> {
        let contents = std::fs::read(path).map_err(|source| ExportError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Ok(serde_json::from_slice(&contents)?)
    }
}
