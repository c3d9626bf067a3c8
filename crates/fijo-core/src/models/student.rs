use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::error::CoreError;

/// One attendee on a certificate request. Embedded in the request and never
/// edited after creation.
///
/// Fields are optional because the stored document is schemaless; use
/// [`StudentRecord::validate`] before relying on them.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct StudentRecord {
    #[serde(default)]
    pub full_name: Option<String>,
    #[serde(default)]
    pub date_of_birth: Option<String>,
    #[serde(default)]
    pub gender: Option<String>,
}

impl StudentRecord {
    pub fn new(
        full_name: impl Into<String>,
        date_of_birth: impl Into<String>,
        gender: impl Into<String>,
    ) -> Self {
        Self {
            full_name: Some(full_name.into()),
            date_of_birth: Some(date_of_birth.into()),
            gender: Some(gender.into()),
        }
    }

    /// The student's full name, if present and non-blank.
    pub fn name(&self) -> Option<&str> {
        non_blank(self.full_name.as_deref())
    }

    pub fn birth_date(&self) -> Option<&str> {
        non_blank(self.date_of_birth.as_deref())
    }

    /// Check the fields a request must carry at creation time.
    ///
    /// `index` is the zero-based position in the request, used in messages.
    pub fn validate(&self, index: usize) -> Result<(), CoreError> {
        if self.name().is_none() {
            return Err(CoreError::MissingField(format!(
                "studentDetails[{index}].fullName"
            )));
        }
        if self.birth_date().is_none() {
            return Err(CoreError::MissingField(format!(
                "studentDetails[{index}].dateOfBirth"
            )));
        }
        if non_blank(self.gender.as_deref()).is_none() {
            return Err(CoreError::MissingField(format!(
                "studentDetails[{index}].gender"
            )));
        }
        Ok(())
    }
}

pub(crate) fn non_blank(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}
