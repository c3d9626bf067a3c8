use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Location {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub address: String,
}

impl Location {
    /// Stand-in used when a lesson has no location or the reference dangles.
    pub fn placeholder() -> Self {
        Self {
            name: "Unknown Location".to_string(),
            address: String::new(),
        }
    }

    /// Text for the "place, date" line above the signatures: the street
    /// address when one is recorded, otherwise the location name.
    pub fn place_line(&self) -> &str {
        let address = self.address.trim();
        if address.is_empty() {
            self.name.trim()
        } else {
            address
        }
    }
}
