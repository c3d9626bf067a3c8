use std::path::Path;

use crate::error::ExportError;

/// File name the template uses for the institution logo.
pub const LOGO_FILE: &str = "logo.png";
/// File name the template uses for the institution stamp.
pub const STAMP_FILE: &str = "stamp.png";

/// Branding images. A missing image is left out of the page.
#[derive(Debug, Clone, Default)]
pub struct CertificateAssets {
    pub logo: Option<Vec<u8>>,
    pub stamp: Option<Vec<u8>>,
}

impl CertificateAssets {
    pub fn from_paths(logo: Option<&Path>, stamp: Option<&Path>) -> Result<Self, ExportError> {
        Ok(Self {
            logo: logo.map(read_asset).transpose()?,
            stamp: stamp.map(read_asset).transpose()?,
        })
    }

    /// The images as (file name, bytes) pairs, for the typesetting engine.
    pub fn files(&self) -> Vec<(String, Vec<u8>)> {
        let mut files = Vec::new();
        if let Some(logo) = &self.logo {
            files.push((LOGO_FILE.to_string(), logo.clone()));
        }
        if let Some(stamp) = &self.stamp {
            files.push((STAMP_FILE.to_string(), stamp.clone()));
        }
        files
    }
}

fn read_asset(path: &Path) -> Result<Vec<u8>, ExportError> {
    std::fs::read(path).map_err(|source| ExportError::Io {
        path: path.display().to_string(),
        source,
    })
}
