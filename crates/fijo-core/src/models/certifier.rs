use serde::{Deserialize, Serialize};

/// The person credentialed to lead and attest a lesson.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Certifier {
    #[serde(default)]
    pub first_name: String,
    #[serde(default)]
    pub last_name: String,
    #[serde(default)]
    pub email: Option<String>,
}

impl Certifier {
    /// Stand-in used when a lesson has no certifier or the reference dangles.
    pub fn placeholder() -> Self {
        Self {
            first_name: "Unknown".to_string(),
            last_name: String::new(),
            email: None,
        }
    }

    /// "First Last", trimmed so an empty last name leaves no trailing space.
    pub fn display_name(&self) -> String {
        format!("{} {}", self.first_name.trim(), self.last_name.trim())
            .trim()
            .to_string()
    }
}
