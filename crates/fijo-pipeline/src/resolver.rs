use fijo_core::lesson_time::lesson_time_range;
use fijo_core::models::certifier::Certifier;
use fijo_core::models::lesson::ResolvedLesson;
use fijo_core::models::location::Location;

use crate::backend::RecordLookup;
use crate::error::PipelineError;

/// Load a lesson instance and everything printed alongside it.
///
/// The lesson itself is required. A missing or dangling certifier or
/// location falls back to a placeholder so the document can still be
/// issued.
pub async fn resolve(
    lookup: &dyn RecordLookup,
    lesson_id: &str,
) -> Result<ResolvedLesson, PipelineError> {
    let lesson = lookup
        .lesson_instance(lesson_id)
        .await?
        .ok_or_else(|| PipelineError::LessonNotFound(lesson_id.to_string()))?;

    let certifier = match lesson.certifier_id() {
        Some(id) => match optional(lookup.certifier(id).await)? {
            Some(certifier) => certifier,
            None => {
                tracing::warn!(lesson_id, certifier_id = id, "certifier not found, using placeholder");
                Certifier::placeholder()
            }
        },
        None => {
            tracing::warn!(lesson_id, "lesson has no certifier, using placeholder");
            Certifier::placeholder()
        }
    };

    let location = match lesson.location_id() {
        Some(id) => match optional(lookup.location(id).await)? {
            Some(location) => location,
            None => {
                tracing::warn!(lesson_id, location_id = id, "location not found, using placeholder");
                Location::placeholder()
            }
        },
        None => {
            tracing::warn!(lesson_id, "lesson has no location, using placeholder");
            Location::placeholder()
        }
    };

    let (Some(start), Some(duration)) = (lesson.start_time(), lesson.duration()) else {
        return Err(PipelineError::MissingLessonTime);
    };
    let time_range = lesson_time_range(start, duration)?;

    tracing::debug!(
        lesson_id,
        start = %time_range.start,
        end = %time_range.end,
        "lesson resolved"
    );

    Ok(ResolvedLesson {
        lesson,
        certifier,
        location,
        time_range,
    })
}

/// A reference id that cannot name a document is as good as a dangling one.
fn optional<T>(result: Result<Option<T>, PipelineError>) -> Result<Option<T>, PipelineError> {
    match result {
        Err(PipelineError::Core(_)) => Ok(None),
        other => other,
    }
}
