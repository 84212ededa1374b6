use std::time::{Duration, Instant};

use chrono::Utc;
use indexmap::IndexMap;
use serde_json::json;

use crate::{
    domain::{FieldKind, FieldSchema, FormSchema},
    form::{AutosaveScheduler, FieldIssue, FieldValue, FormValues, MediaFeedback},
    media::MediaRejection,
    store::{DraftStore, MemoryStore, SUBMITTED_AT_KEY, SubmissionLog, try_load_draft},
    submit::{
        FAILURE_MESSAGE, Priority, SUCCESS_MESSAGE, SubmitFailure, SubmitOutcome, build_record,
    },
    tests::support::*,
};

fn autosaved(
    session: &crate::form::FormSession,
    store: &mut dyn DraftStore,
) -> AutosaveScheduler {
    let mut autosave = AutosaveScheduler::new(Duration::from_millis(2000));
    let start = Instant::now();
    autosave.note_edit(start);
    let saved = autosave
        .poll(start + Duration::from_millis(2000), session, store, &keys())
        .unwrap();
    assert!(saved.is_some(), "draft should be written before submitting");
    autosave
}

#[test]
fn valid_application_without_media_is_logged_and_draft_cleared() {
    let mut store = MemoryStore::new();
    let mut session = filled_session(applicant_schema());
    let mut autosave = autosaved(&session, &mut store);
    let mut h = harness(RecordingNotifier::default(), 30.0);

    let outcome = h.pipeline.submit(&mut session, &mut store, &mut autosave);

    let record = outcome.record().expect("submitted").clone();
    assert_eq!(record.value("firstName"), Some(&json!("Ada")));
    assert_eq!(record.value("age"), Some(&json!(30)));
    let log = SubmissionLog::new(keys().submissions);
    let all = log.read_all(&store).unwrap();
    assert_eq!(all.len(), 1);
    assert_eq!(all[0].submitted_at(), record.submitted_at());
    assert!(!store.contains(&keys().draft));

    let announced = h.announcements.drain();
    assert_eq!(announced.len(), 1);
    assert_eq!(announced[0].message, SUCCESS_MESSAGE);
    assert_eq!(announced[0].priority, Priority::Polite);

    assert_eq!(h.notifier.count(), 1);
    assert!(session.values().is_empty());
    assert!(!session.is_dirty());
    assert!(!session.is_submitting());
}

#[test]
fn under_age_applicant_is_rejected_before_any_side_effect() {
    let mut store = MemoryStore::new();
    let mut session = filled_session(applicant_schema());
    session.edit("age", Some(FieldValue::Integer(20)));
    let mut autosave = AutosaveScheduler::default();
    let mut h = harness(RecordingNotifier::default(), 30.0);

    let outcome = h.pipeline.submit(&mut session, &mut store, &mut autosave);

    let SubmitOutcome::Invalid(report) = outcome else {
        panic!("expected invalid outcome, got {outcome:?}");
    };
    assert_eq!(report.len(), 1);
    let error = report.error("age").expect("age error");
    assert!(matches!(error.issue, FieldIssue::OutOfRange { .. }));
    assert_eq!(
        error.message,
        "You must be between 21 and 70 years old to apply."
    );
    assert!(store.is_empty());
    assert_eq!(h.notifier.count(), 0);
    assert_eq!(session.error_count(), 1);
    assert!(!session.is_submitting());
}

#[test]
fn overlong_video_warns_early_and_blocks_submission() {
    let mut store = MemoryStore::new();
    let mut session = filled_session(video_schema());
    let mut h = harness(RecordingNotifier::default(), 90.0);
    let gate = h.pipeline.gate().clone();

    session.edit("video", Some(media_value("pitch.mp4")));
    let job = session.inspect_media("video", &gate).expect("probe job");
    assert_eq!(session.media_feedback("video"), Some(&MediaFeedback::Probing));
    assert!(session.complete_media_probe(job.run()));
    let warning = session
        .media_feedback("video")
        .and_then(|feedback| feedback.warning(gate.max_duration_secs()))
        .expect("warning");
    assert!(warning.contains("90 seconds"), "{warning}");
    assert!(session.error("video").is_none(), "early probe must not block");

    let mut autosave = autosaved(&session, &mut store);
    let draft_before = store.get(&keys().draft).unwrap();

    let outcome = h.pipeline.submit(&mut session, &mut store, &mut autosave);
    let SubmitOutcome::MediaRejected { field, rejection } = outcome else {
        panic!("expected media rejection, got {outcome:?}");
    };
    assert_eq!(field, "video");
    assert!(matches!(rejection, MediaRejection::TooLong { .. }));
    assert!(rejection.to_string().contains("90 seconds"));

    assert_eq!(store.get(&keys().draft).unwrap(), draft_before);
    assert!(store.get(&keys().submissions).unwrap().is_none());
    assert_eq!(h.notifier.count(), 0);
    assert!(!session.is_submitting());
    let inline = session.error("video").expect("inline error");
    assert!(inline.message.contains("90 seconds"));
    let announced = h.announcements.last().expect("announcement");
    assert_eq!(announced.priority, Priority::Assertive);
}

#[test]
fn missing_required_video_is_rejected() {
    let mut store = MemoryStore::new();
    let mut session = filled_session(video_schema());
    let mut autosave = AutosaveScheduler::default();
    let mut h = harness(RecordingNotifier::default(), 45.0);

    let outcome = h.pipeline.submit(&mut session, &mut store, &mut autosave);
    assert!(matches!(
        outcome,
        SubmitOutcome::MediaRejected {
            rejection: MediaRejection::Missing,
            ..
        }
    ));
}

#[test]
fn accepted_video_is_summarized_in_record_and_mail() {
    let mut store = MemoryStore::new();
    let mut session = filled_session(video_schema());
    session.edit("video", Some(media_value("pitch.mp4")));
    let mut autosave = AutosaveScheduler::default();
    let mut h = harness(RecordingNotifier::default(), 59.6);

    let outcome = h.pipeline.submit(&mut session, &mut store, &mut autosave);
    let record = outcome.record().expect("submitted");
    let video = record.value("video").expect("video summary");
    assert_eq!(video["fileName"], "pitch.mp4");
    assert_eq!(video["mimeType"], "video/mp4");
    assert_eq!(video["durationSeconds"], json!(59.6));

    let sent = h.notifier.sent.borrow();
    let body = &sent[0].body;
    assert!(body.starts_with("New Application Submission\n\n"));
    assert!(body.contains("First Name: Ada\n"));
    assert!(body.contains("Upload 1-Minute Video: pitch.mp4 (60 seconds)\n"));
    assert!(body.contains(&format!("Submitted At: {}", record.submitted_at_iso())));
    assert_eq!(sent[0].to, "casting@example.com");
}

#[test]
fn failed_log_append_keeps_the_draft() {
    let mut store = FlakyStore::new().fail_writes_to(&keys().submissions);
    let mut session = filled_session(applicant_schema());
    let mut autosave = autosaved(&session, &mut store);
    let original = try_load_draft(&store, &keys()).unwrap().expect("draft");
    let mut h = harness(RecordingNotifier::default(), 30.0);

    let outcome = h.pipeline.submit(&mut session, &mut store, &mut autosave);

    assert!(matches!(
        outcome,
        SubmitOutcome::Failed(SubmitFailure::Persistence(_))
    ));
    assert_eq!(try_load_draft(&store, &keys()).unwrap(), Some(original));
    assert_eq!(h.notifier.count(), 0);
    assert_eq!(session.failure(), Some(FAILURE_MESSAGE));
    assert_eq!(session.value("firstName"), Some(&FieldValue::text("Ada")));
    assert!(session.is_dirty());
    let announced = h.announcements.last().expect("announcement");
    assert_eq!(announced.message, FAILURE_MESSAGE);
    assert_eq!(announced.priority, Priority::Assertive);
}

#[test]
fn failed_draft_clear_stops_before_hand_off() {
    let mut store = FlakyStore::new().fail_removes_of(&keys().draft);
    let mut session = filled_session(applicant_schema());
    let mut autosave = autosaved(&session, &mut store);
    let mut h = harness(RecordingNotifier::default(), 30.0);

    let outcome = h.pipeline.submit(&mut session, &mut store, &mut autosave);

    assert!(matches!(
        outcome,
        SubmitOutcome::Failed(SubmitFailure::Persistence(_))
    ));
    assert_eq!(h.notifier.count(), 0);
    assert!(!session.values().is_empty());
}

#[test]
fn failed_hand_off_restores_the_draft() {
    let mut store = MemoryStore::new();
    let mut session = filled_session(applicant_schema());
    let mut autosave = autosaved(&session, &mut store);
    let mut h = harness(RecordingNotifier::failing(), 30.0);

    let outcome = h.pipeline.submit(&mut session, &mut store, &mut autosave);

    assert!(matches!(
        outcome,
        SubmitOutcome::Failed(SubmitFailure::Handoff(_))
    ));
    let restored = try_load_draft(&store, &keys()).unwrap().expect("draft");
    assert_eq!(restored, session.draft_snapshot());
    let log = SubmissionLog::new(keys().submissions);
    assert_eq!(log.read_all(&store).unwrap().len(), 1);
    assert_eq!(session.failure(), Some(FAILURE_MESSAGE));
}

#[test]
fn second_submit_while_in_flight_is_busy() {
    let mut store = MemoryStore::new();
    let mut session = filled_session(applicant_schema());
    let mut autosave = AutosaveScheduler::default();
    let mut h = harness(RecordingNotifier::default(), 30.0);

    assert!(session.begin_submit());
    let outcome = h.pipeline.submit(&mut session, &mut store, &mut autosave);
    assert!(matches!(outcome, SubmitOutcome::Busy));
    assert!(store.is_empty());
    assert!(h.announcements.is_empty());
}

#[test]
fn success_cancels_pending_autosave() {
    let mut store = MemoryStore::new();
    let mut session = filled_session(applicant_schema());
    let mut autosave = AutosaveScheduler::new(Duration::from_millis(2000));
    let start = Instant::now();
    autosave.note_edit(start);
    let mut h = harness(RecordingNotifier::default(), 30.0);

    assert!(
        h.pipeline
            .submit(&mut session, &mut store, &mut autosave)
            .is_submitted()
    );
    assert!(!autosave.is_pending());
    let later = start + Duration::from_secs(10);
    assert!(
        autosave
            .poll(later, &session, &mut store, &keys())
            .unwrap()
            .is_none()
    );
    assert!(!store.contains(&keys().draft));
}

#[test]
fn a_field_named_like_the_timestamp_keeps_the_log_readable() {
    let schema = FormSchema {
        id: "p".to_string(),
        title: "P".to_string(),
        description: None,
        fields: vec![FieldSchema::new(SUBMITTED_AT_KEY, "When", FieldKind::Text)],
    };
    let values: FormValues = [(SUBMITTED_AT_KEY.to_string(), FieldValue::text("last week"))]
        .into_iter()
        .collect();
    let log = SubmissionLog::new("p-submissions");
    let mut store = MemoryStore::new();
    for _ in 0..2 {
        let record = build_record(&schema, &values, &IndexMap::new(), Utc::now());
        log.append(&mut store, &record).unwrap();
    }
    assert_eq!(log.read_all(&store).unwrap().len(), 2);
}
