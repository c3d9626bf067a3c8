use serde::de::IgnoredAny;
use serde::{Deserialize, Deserializer, Serialize};

use super::student::non_blank;

/// A scheduled occurrence of a course. Owned by the scheduling screens;
/// the pipeline only reads it.
///
/// `time` is a clock string (`"10:00"`, `"10:00 AM"`) and `duration` a
/// number of hours, possibly fractional, possibly with a unit suffix
/// (`"1.5 hours"`). Both may arrive as JSON numbers or strings; any other
/// JSON type reads as absent. Fields the scheduling screens keep for
/// themselves (capacity counters, creation stamps) are not modelled and are
/// ignored whatever their shape.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LessonInstance {
    #[serde(default)]
    pub date: Option<String>,
    #[serde(default, deserialize_with = "string_or_number")]
    pub time: Option<String>,
    #[serde(default, deserialize_with = "string_or_number")]
    pub duration: Option<String>,
    /// Location document id.
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default)]
    pub certifier_id: Option<String>,
}

impl LessonInstance {
    pub fn date(&self) -> Option<&str> {
        non_blank(self.date.as_deref())
    }

    pub fn start_time(&self) -> Option<&str> {
        non_blank(self.time.as_deref())
    }

    pub fn duration(&self) -> Option<&str> {
        non_blank(self.duration.as_deref())
    }

    pub fn location_id(&self) -> Option<&str> {
        non_blank(self.location.as_deref())
    }

    pub fn certifier_id(&self) -> Option<&str> {
        non_blank(self.certifier_id.as_deref())
    }
}

fn string_or_number<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Text(String),
        Number(serde_json::Number),
        Other(IgnoredAny),
    }

    Ok(match Option::<Raw>::deserialize(deserializer)? {
        Some(Raw::Text(s)) => Some(s),
        Some(Raw::Number(n)) => Some(n.to_string()),
        Some(Raw::Other(_)) | None => None,
    })
}

/// A lesson with every reference it needs for printing resolved, and the
/// printed time range computed.
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedLesson {
    pub lesson: LessonInstance,
    pub certifier: super::certifier::Certifier,
    pub location: super::location::Location,
    pub time_range: crate::lesson_time::TimeRange,
}
