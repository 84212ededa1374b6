use std::time::{Duration, Instant};

use crate::{
    form::{AutosaveScheduler, FieldValue, FormSession},
    store::try_load_draft,
    tests::support::*,
};

const QUIET: Duration = Duration::from_millis(2000);

#[test]
fn burst_of_edits_produces_one_write_after_the_last() {
    let mut store = FlakyStore::new();
    let mut session = FormSession::new(applicant_schema());
    let mut autosave = AutosaveScheduler::new(QUIET);
    let start = Instant::now();

    let mut last_edit = start;
    for step in 0..6 {
        let now = start + Duration::from_millis(300 * step as u64);
        let typed: String = "Adaeze".chars().take(step + 1).collect();
        session.edit("firstName", Some(FieldValue::text(typed)));
        autosave.note_edit(now);
        let polled = autosave.poll(now, &session, &mut store, &keys()).unwrap();
        assert!(polled.is_none(), "no write while typing");
        last_edit = now;
    }

    let just_before = last_edit + QUIET - Duration::from_millis(1);
    assert!(
        autosave
            .poll(just_before, &session, &mut store, &keys())
            .unwrap()
            .is_none()
    );
    assert_eq!(store.writes_to(&keys().draft), 0);

    let due = last_edit + QUIET;
    assert_eq!(autosave.due_at(), Some(due));
    assert!(
        autosave
            .poll(due, &session, &mut store, &keys())
            .unwrap()
            .is_some()
    );
    assert_eq!(store.writes_to(&keys().draft), 1);
    assert_eq!(autosave.last_write(), Some(due));

    let much_later = due + Duration::from_secs(30);
    autosave
        .poll(much_later, &session, &mut store, &keys())
        .unwrap();
    assert_eq!(store.writes_to(&keys().draft), 1, "one write per quiet period");

    let draft = try_load_draft(&store, &keys()).unwrap().expect("draft");
    assert_eq!(draft, session.draft_snapshot());
}

#[test]
fn clean_session_is_not_written() {
    let mut store = FlakyStore::new();
    let session = FormSession::new(applicant_schema());
    let mut autosave = AutosaveScheduler::new(QUIET);
    let start = Instant::now();
    autosave.note_edit(start);
    autosave
        .poll(start + QUIET, &session, &mut store, &keys())
        .unwrap();
    assert_eq!(store.writes_to(&keys().draft), 0);
}

#[test]
fn stopped_scheduler_never_writes() {
    let mut store = FlakyStore::new();
    let mut session = FormSession::new(applicant_schema());
    let mut autosave = AutosaveScheduler::new(QUIET);
    let start = Instant::now();
    session.edit("firstName", Some(FieldValue::text("Ada")));
    autosave.note_edit(start);
    autosave.stop();
    autosave.note_edit(start);
    assert!(!autosave.is_pending());
    autosave
        .poll(start + QUIET * 3, &session, &mut store, &keys())
        .unwrap();
    assert_eq!(store.writes_to(&keys().draft), 0);
    assert!(autosave.is_stopped());
}

#[test]
fn closed_session_is_not_written() {
    let mut store = FlakyStore::new();
    let mut session = FormSession::new(applicant_schema());
    let mut autosave = AutosaveScheduler::new(QUIET);
    let start = Instant::now();
    session.edit("firstName", Some(FieldValue::text("Ada")));
    autosave.note_edit(start);
    session.close();
    autosave
        .poll(start + QUIET, &session, &mut store, &keys())
        .unwrap();
    assert_eq!(store.writes_to(&keys().draft), 0);
}

#[test]
fn write_failures_surface_to_the_caller() {
    let mut store = FlakyStore::new().fail_writes_to(&keys().draft);
    let mut session = FormSession::new(applicant_schema());
    let mut autosave = AutosaveScheduler::new(QUIET);
    let start = Instant::now();
    session.edit("firstName", Some(FieldValue::text("Ada")));
    autosave.note_edit(start);
    assert!(
        autosave
            .poll(start + QUIET, &session, &mut store, &keys())
            .is_err()
    );
    assert!(autosave.last_saved().is_none());
}

#[test]
fn failed_write_is_retried_after_another_quiet_period() {
    let mut store = FlakyStore::new().fail_writes_to(&keys().draft);
    let mut session = FormSession::new(applicant_schema());
    let mut autosave = AutosaveScheduler::new(QUIET);
    let start = Instant::now();
    session.edit("firstName", Some(FieldValue::text("Ada")));
    autosave.note_edit(start);

    let failed_at = start + QUIET;
    assert!(
        autosave
            .poll(failed_at, &session, &mut store, &keys())
            .is_err()
    );
    assert_eq!(autosave.due_at(), Some(failed_at + QUIET));

    store.failing_writes.clear();
    assert!(
        autosave
            .poll(failed_at + QUIET - Duration::from_millis(1), &session, &mut store, &keys())
            .unwrap()
            .is_none()
    );
    assert!(
        autosave
            .poll(failed_at + QUIET, &session, &mut store, &keys())
            .unwrap()
            .is_some()
    );
    assert_eq!(store.writes_to(&keys().draft), 1);
    assert!(!autosave.is_pending());
    let draft = try_load_draft(&store, &keys()).unwrap().expect("draft");
    assert_eq!(draft, session.draft_snapshot());
}
