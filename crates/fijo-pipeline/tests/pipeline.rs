mod common;

use std::sync::Arc;
use std::time::Duration;

use fijo_core::models::lesson::LessonInstance;
use fijo_core::models::status::RequestStatus;
use fijo_core::storage_keys;
use fijo_pipeline::backend::{RequestStore, StoredRequest};
use fijo_pipeline::memory::MemoryBackend;
use fijo_pipeline::{publisher, resolver, PipelineError, RunOutcome};

use common::{
    artifact_text, pending_request, pipeline, seeded_backend, MarkupEngine, BUCKET, LESSON_ID,
};

#[tokio::test]
async fn single_student_request_completes_with_public_url() {
    let backend = seeded_backend();
    let request = pending_request(Some(LESSON_ID), &["Max Mustermann"]);
    let id = request.id;
    backend.insert_request(request);

    let outcome = pipeline(&backend, Arc::new(MarkupEngine::default()))
        .run(id)
        .await
        .unwrap();

    let expected_url = format!("https://storage.googleapis.com/{BUCKET}/certificates/{id}.pdf");
    assert_eq!(
        outcome,
        RunOutcome::Completed {
            download_url: expected_url.clone()
        }
    );

    let stored = backend.request(id).unwrap();
    assert_eq!(stored.status, RequestStatus::Completed);
    assert_eq!(stored.download_url, expected_url);
    assert_eq!(stored.error_message, None);

    let key = format!("certificates/{id}.pdf");
    assert_eq!(backend.object_keys(), vec![key.clone()]);
    let object = backend.object(&key).unwrap();
    assert_eq!(object.content_type, "application/pdf");
    assert!(object.public);

    let document = artifact_text(&backend, &key);
    assert_eq!(document.matches("#pagebreak(").count(), 0, "one page");
    for needle in [
        "\"Max Mustermann\"",
        "\"01.01.1990\"",
        "\"20.02.2025\"",
        "\"10:00\"",
        "\"12:00 PM\"",
        "\"Berlin Training Center\"",
        "\"John Doe\"",
    ] {
        assert!(document.contains(needle), "{needle} printed");
    }
}

#[tokio::test]
async fn pages_follow_request_order() {
    let backend = seeded_backend();
    let names = ["Anna Alpha", "Bernd Beta", "Clara Gamma", "Dora Delta"];
    let request = pending_request(Some(LESSON_ID), &names);
    let id = request.id;
    backend.insert_request(request);

    let outcome = pipeline(&backend, Arc::new(MarkupEngine::default()))
        .run(id)
        .await
        .unwrap();
    assert!(matches!(outcome, RunOutcome::Completed { .. }));

    let document = artifact_text(&backend, &storage_keys::certificate_pdf(id));
    assert_eq!(document.matches("#pagebreak(").count(), names.len() - 1);
    let positions: Vec<usize> = names
        .iter()
        .map(|name| document.find(&format!("\"{name}\"")).unwrap())
        .collect();
    assert!(positions.windows(2).all(|pair| pair[0] < pair[1]));
}

#[tokio::test]
async fn missing_lesson_reference_fails_without_upload() {
    let backend = seeded_backend();
    let request = pending_request(None, &["Max Mustermann"]);
    let id = request.id;
    backend.insert_request(request);

    let outcome = pipeline(&backend, Arc::new(MarkupEngine::default()))
        .run(id)
        .await
        .unwrap();

    assert_eq!(
        outcome,
        RunOutcome::Failed {
            message: "Missing lessonInstanceId".to_string()
        }
    );
    let stored = backend.request(id).unwrap();
    assert_eq!(stored.status, RequestStatus::Error);
    assert_eq!(stored.error_message.as_deref(), Some("Missing lessonInstanceId"));
    assert!(stored.download_url.is_empty());
    assert_eq!(backend.upload_count(), 0);
}

#[tokio::test]
async fn dangling_lesson_reference_fails_without_upload() {
    let backend = seeded_backend();
    let request = pending_request(Some("no-such-lesson"), &["Max Mustermann"]);
    let id = request.id;
    backend.insert_request(request);

    let outcome = pipeline(&backend, Arc::new(MarkupEngine::default()))
        .run(id)
        .await
        .unwrap();

    assert_eq!(
        outcome,
        RunOutcome::Failed {
            message: "Lesson instance not found for ID: no-such-lesson".to_string()
        }
    );
    assert_eq!(backend.request(id).unwrap().status, RequestStatus::Error);
    assert_eq!(backend.upload_count(), 0);
}

#[tokio::test]
async fn missing_certifier_and_location_use_placeholders() {
    let backend = seeded_backend();
    backend.insert_lesson(
        "lesson-orphaned",
        LessonInstance {
            date: Some("2025-03-01".to_string()),
            time: Some("09:00".to_string()),
            duration: Some("1".to_string()),
            location: Some("gone".to_string()),
            certifier_id: None,
            ..LessonInstance::default()
        },
    );
    let request = pending_request(Some("lesson-orphaned"), &["Anna Alpha", "Bernd Beta"]);
    let id = request.id;
    backend.insert_request(request);

    let outcome = pipeline(&backend, Arc::new(MarkupEngine::default()))
        .run(id)
        .await
        .unwrap();
    assert!(matches!(outcome, RunOutcome::Completed { .. }));

    let document = artifact_text(&backend, &storage_keys::certificate_pdf(id));
    assert_eq!(document.matches("\"Unknown\"").count(), 2);
    assert!(document.matches("\"Unknown Location\"").count() >= 2);
}

#[tokio::test]
async fn missing_lesson_time_fails() {
    let backend = seeded_backend();
    backend.insert_lesson(
        "lesson-untimed",
        LessonInstance {
            date: Some("2025-03-01".to_string()),
            time: None,
            duration: Some("1".to_string()),
            ..LessonInstance::default()
        },
    );
    let request = pending_request(Some("lesson-untimed"), &["Max Mustermann"]);
    let id = request.id;
    backend.insert_request(request);

    let outcome = pipeline(&backend, Arc::new(MarkupEngine::default()))
        .run(id)
        .await
        .unwrap();

    assert_eq!(
        outcome,
        RunOutcome::Failed {
            message: "Invalid lesson time or duration data.".to_string()
        }
    );
    assert_eq!(backend.upload_count(), 0);
}

#[tokio::test]
async fn unparseable_lesson_time_fails() {
    let backend = seeded_backend();
    backend.insert_lesson(
        "lesson-garbled",
        LessonInstance {
            date: Some("2025-03-01".to_string()),
            time: Some("quarter past ten".to_string()),
            duration: Some("1".to_string()),
            ..LessonInstance::default()
        },
    );
    let request = pending_request(Some("lesson-garbled"), &["Max Mustermann"]);
    let id = request.id;
    backend.insert_request(request);

    let outcome = pipeline(&backend, Arc::new(MarkupEngine::default()))
        .run(id)
        .await
        .unwrap();

    assert_eq!(
        outcome,
        RunOutcome::Failed {
            message: "Invalid lesson start time: quarter past ten".to_string()
        }
    );
    assert_eq!(backend.request(id).unwrap().status, RequestStatus::Error);
    assert_eq!(backend.upload_count(), 0);
}

#[tokio::test]
async fn missing_student_field_fails_whole_document() {
    let backend = seeded_backend();
    let mut request = pending_request(Some(LESSON_ID), &["Anna Alpha", "Bernd Beta"]);
    request.student_details[1].date_of_birth = None;
    let id = request.id;
    backend.insert_request(request);

    let engine = Arc::new(MarkupEngine::default());
    let outcome = pipeline(&backend, engine.clone()).run(id).await.unwrap();

    assert_eq!(
        outcome,
        RunOutcome::Failed {
            message: "missing required certificate field: studentDetails[1].dateOfBirth"
                .to_string()
        }
    );
    assert!(engine.jobs.lock().unwrap().is_empty());
    assert_eq!(backend.upload_count(), 0);
}

#[tokio::test]
async fn terminal_requests_are_left_alone() {
    let backend = seeded_backend();
    let pipeline = pipeline(&backend, Arc::new(MarkupEngine::default()));

    let mut completed = pending_request(Some(LESSON_ID), &["Max Mustermann"]);
    completed.complete("https://example.test/old.pdf").unwrap();
    let mut failed = pending_request(Some(LESSON_ID), &["Max Mustermann"]);
    failed.fail("earlier failure").unwrap();

    for request in [completed, failed] {
        let id = request.id;
        let status = request.status;
        backend.insert_request(request.clone());

        let outcome = pipeline.run(id).await.unwrap();

        assert_eq!(outcome, RunOutcome::Skipped { status });
        assert_eq!(backend.request(id).unwrap(), request);
    }
    assert_eq!(backend.upload_count(), 0);
    assert_eq!(backend.request_write_count(), 0);
}

#[tokio::test]
async fn second_delivery_is_a_no_op() {
    let backend = seeded_backend();
    let request = pending_request(Some(LESSON_ID), &["Max Mustermann"]);
    let id = request.id;
    backend.insert_request(request);
    let pipeline = pipeline(&backend, Arc::new(MarkupEngine::default()));

    pipeline.run(id).await.unwrap();
    let after_first = backend.request(id).unwrap();

    let outcome = pipeline.run(id).await.unwrap();

    assert_eq!(
        outcome,
        RunOutcome::Skipped {
            status: RequestStatus::Completed
        }
    );
    assert_eq!(backend.request(id).unwrap(), after_first);
    assert_eq!(backend.upload_count(), 1);
    assert_eq!(backend.request_write_count(), 1);
}

#[tokio::test]
async fn upload_failure_marks_request_failed() {
    let backend = seeded_backend();
    backend.fail_uploads(true);
    let request = pending_request(Some(LESSON_ID), &["Max Mustermann"]);
    let id = request.id;
    backend.insert_request(request);

    let outcome = pipeline(&backend, Arc::new(MarkupEngine::default()))
        .run(id)
        .await
        .unwrap();

    let RunOutcome::Failed { message } = outcome else {
        panic!("expected failure, got {outcome:?}");
    };
    assert!(message.starts_with("upload failed"), "{message}");
    let stored = backend.request(id).unwrap();
    assert_eq!(stored.status, RequestStatus::Error);
    assert!(stored.download_url.is_empty());
    assert!(backend.object_keys().is_empty());
}

#[tokio::test(start_paused = true)]
async fn slow_render_hits_the_deadline() {
    let backend = seeded_backend();
    let request = pending_request(Some(LESSON_ID), &["Max Mustermann"]);
    let id = request.id;
    backend.insert_request(request);

    let engine = MarkupEngine {
        delay: Some(Duration::from_secs(600)),
        ..MarkupEngine::default()
    };
    let outcome = pipeline(&backend, Arc::new(engine))
        .with_deadline(Duration::from_secs(5))
        .run(id)
        .await
        .unwrap();

    assert_eq!(
        outcome,
        RunOutcome::Failed {
            message: "certificate generation timed out after 5s".to_string()
        }
    );
    assert_eq!(backend.request(id).unwrap().status, RequestStatus::Error);
    assert_eq!(backend.upload_count(), 0);
}

#[tokio::test]
async fn concurrent_write_wins_over_terminal_status() {
    let backend = seeded_backend();
    let request = pending_request(Some(LESSON_ID), &["Max Mustermann"]);
    let id = request.id;
    backend.insert_request(request.clone());

    let touched = Arc::clone(&backend);
    let engine = MarkupEngine {
        during_render: Some(Box::new(move || touched.touch_request(id))),
        ..MarkupEngine::default()
    };
    let outcome = pipeline(&backend, Arc::new(engine)).run(id).await.unwrap();

    assert_eq!(outcome, RunOutcome::Superseded);
    assert_eq!(backend.request(id).unwrap(), request);
    assert_eq!(backend.request_write_count(), 0);
}

#[tokio::test]
async fn unwritable_terminal_status_is_an_error() {
    let backend = seeded_backend();
    backend.fail_request_writes(true);
    let request = pending_request(Some(LESSON_ID), &["Max Mustermann"]);
    let id = request.id;
    backend.insert_request(request);

    let result = pipeline(&backend, Arc::new(MarkupEngine::default()))
        .run(id)
        .await;

    assert!(matches!(result, Err(PipelineError::Storage(_))));
    assert_eq!(backend.request(id).unwrap().status, RequestStatus::Pending);
}

#[tokio::test]
async fn unknown_request_id_is_reported() {
    let backend = seeded_backend();
    let id = uuid::Uuid::new_v4();

    let result = pipeline(&backend, Arc::new(MarkupEngine::default()))
        .run(id)
        .await;

    assert!(matches!(result, Err(PipelineError::RequestNotFound(missing)) if missing == id));
}

#[tokio::test]
async fn republishing_overwrites_the_same_key() {
    let backend = MemoryBackend::new(BUCKET);
    let id = uuid::Uuid::new_v4();

    let first = publisher::publish(&backend, id, b"first".to_vec()).await.unwrap();
    let second = publisher::publish(&backend, id, b"second".to_vec()).await.unwrap();

    assert_eq!(first, second);
    assert_eq!(backend.object_keys(), vec![storage_keys::certificate_pdf(id)]);
    assert_eq!(
        backend.object(&storage_keys::certificate_pdf(id)).unwrap().bytes,
        b"second".to_vec()
    );
}

#[tokio::test]
async fn resolver_computes_time_range_for_both_clock_formats() {
    let backend = seeded_backend();
    for (id, time) in [("lesson-24h", "14:00"), ("lesson-12h", "02:00 PM")] {
        backend.insert_lesson(
            id,
            LessonInstance {
                date: Some("2025-02-20".to_string()),
                time: Some(time.to_string()),
                duration: Some("1.5".to_string()),
                location: Some("loc-berlin".to_string()),
                certifier_id: Some("cert-john".to_string()),
                ..LessonInstance::default()
            },
        );
    }

    let a = resolver::resolve(&*backend, "lesson-24h").await.unwrap();
    let b = resolver::resolve(&*backend, "lesson-12h").await.unwrap();

    assert_eq!(a.time_range.end, "15:30 PM");
    assert_eq!(a.time_range.end, b.time_range.end);
    assert_eq!(a.certifier.display_name(), "John Doe");
    assert_eq!(a.location.name, "Berlin Training Center");
}

#[tokio::test]
async fn stale_version_is_refused_by_the_store() {
    let backend = seeded_backend();
    let request = pending_request(Some(LESSON_ID), &["Max Mustermann"]);
    let id = request.id;
    backend.insert_request(request);

    let StoredRequest { mut request, version } = backend.load(id).await.unwrap().unwrap();
    backend.touch_request(id);
    request.fail("late").unwrap();

    assert!(!backend.finalize(&request, &version).await.unwrap());
    assert_eq!(backend.request(id).unwrap().status, RequestStatus::Pending);
}
