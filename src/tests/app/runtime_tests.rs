use std::{
    fs,
    sync::Arc,
    time::{Duration, Instant},
};

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use ratatui::{Terminal, backend::TestBackend};

use crate::{
    EntryForm, FormOptions,
    app::runtime::App,
    domain::{FieldKind, FormSchema, presets::long_form},
    form::{FieldValue, MediaFeedback},
    media::fixtures::mp4_bytes,
    store::{MemoryStore, try_load_draft},
    tests::support::*,
};

fn key(code: KeyCode) -> KeyEvent {
    KeyEvent::new(code, KeyModifiers::NONE)
}

fn ctrl(ch: char) -> KeyEvent {
    KeyEvent::new(KeyCode::Char(ch), KeyModifiers::CONTROL)
}

fn app_for(schema: FormSchema) -> App {
    let options = FormOptions::default()
        .with_namespace(NAMESPACE)
        .with_settle_delay(Duration::ZERO);
    EntryForm::new(schema)
        .with_options(options)
        .with_store(Box::new(MemoryStore::new()))
        .with_notifier(Box::new(RecordingNotifier::default()))
        .with_probe(Arc::new(crate::media::Mp4Probe))
        .into_app()
}

fn name_only() -> FormSchema {
    let mut schema = long_form();
    schema.fields.retain(|field| field.name == "firstName" || field.name == "age");
    schema
}

fn type_text(app: &mut App, text: &str, now: Instant) {
    for ch in text.chars() {
        app.handle_key(key(KeyCode::Char(ch)), now);
    }
}

#[test]
fn typing_schedules_an_autosave() {
    let mut app = app_for(name_only());
    let start = Instant::now();
    type_text(&mut app, "Ada", start);
    assert_eq!(app.session().value("firstName"), Some(&FieldValue::text("Ada")));

    app.on_tick(start + Duration::from_millis(1999));
    assert!(try_load_draft(app.store(), &keys()).unwrap().is_none());

    app.on_tick(start + Duration::from_millis(2000));
    let draft = try_load_draft(app.store(), &keys()).unwrap().expect("draft");
    assert_eq!(draft.get("firstName"), Some(&serde_json::json!("Ada")));
    assert!(app.status_message().starts_with("Draft saved"));
}

#[test]
fn leaving_a_field_validates_it() {
    let mut app = app_for(name_only());
    let now = Instant::now();
    type_text(&mut app, "A", now);
    app.handle_key(key(KeyCode::Tab), now);
    assert_eq!(app.focus(), 1);
    let error = app.session().error("firstName").expect("blur error");
    assert_eq!(error.message, "Please enter your first name.");
}

#[test]
fn numbers_are_typed_as_integers() {
    let mut app = app_for(name_only());
    let now = Instant::now();
    app.handle_key(key(KeyCode::Down), now);
    type_text(&mut app, "42", now);
    assert_eq!(app.session().value("age"), Some(&FieldValue::Integer(42)));
}

#[test]
fn submit_resets_the_form_and_returns_the_record() {
    let mut app = app_for(name_only());
    let now = Instant::now();
    type_text(&mut app, "Ada", now);
    app.handle_key(key(KeyCode::Tab), now);
    type_text(&mut app, "30", now);
    app.handle_key(ctrl('s'), now);
    app.run_pending_submit();

    assert_eq!(app.submitted().len(), 1);
    assert!(app.session().values().is_empty());
    assert_eq!(app.focus(), 0);
    assert!(app.status_message().contains("submitted successfully"));
}

#[test]
fn submit_shows_progress_before_the_pipeline_runs() {
    let mut app = app_for(name_only());
    let now = Instant::now();
    type_text(&mut app, "Ada", now);
    app.handle_key(key(KeyCode::Tab), now);
    type_text(&mut app, "30", now);
    app.handle_key(ctrl('s'), now);
    assert!(app.submitted().is_empty());

    let mut terminal = Terminal::new(TestBackend::new(120, 30)).unwrap();
    terminal.draw(|frame| app.draw(frame)).unwrap();
    let screen: String = terminal
        .backend()
        .buffer()
        .content()
        .iter()
        .map(|cell| cell.symbol())
        .collect();
    assert!(screen.contains("submitting…"), "{screen}");

    app.run_pending_submit();
    assert_eq!(app.submitted().len(), 1);
    app.run_pending_submit();
    assert_eq!(app.submitted().len(), 1, "a request runs once");
}

#[test]
fn invalid_submit_focuses_the_first_problem() {
    let mut app = app_for(name_only());
    let now = Instant::now();
    type_text(&mut app, "Ada", now);
    app.handle_key(ctrl('s'), now);
    app.run_pending_submit();
    assert!(app.submitted().is_empty());
    assert_eq!(app.focus(), 1);
    assert!(app.session().error("age").is_some());
}

#[test]
fn quitting_a_dirty_form_needs_confirmation() {
    let mut app = app_for(name_only());
    let now = Instant::now();
    type_text(&mut app, "Ada", now);
    app.handle_key(ctrl('q'), now);
    assert!(!app.should_quit());
    app.handle_key(ctrl('q'), now);
    assert!(app.should_quit());
}

#[test]
fn shutdown_stops_autosave() {
    let mut app = app_for(name_only());
    let start = Instant::now();
    type_text(&mut app, "Ada", start);
    app.shutdown();
    app.on_tick(start + Duration::from_secs(5));
    assert!(try_load_draft(app.store(), &keys()).unwrap().is_none());
    assert!(!app.session().is_open());
}

#[test]
fn discard_removes_the_draft_and_clears_the_form() {
    let mut app = app_for(name_only());
    let start = Instant::now();
    type_text(&mut app, "Ada", start);
    app.on_tick(start + Duration::from_secs(2));
    assert!(try_load_draft(app.store(), &keys()).unwrap().is_some());

    app.handle_key(ctrl('d'), start + Duration::from_secs(3));
    assert!(try_load_draft(app.store(), &keys()).unwrap().is_none());
    assert!(app.session().values().is_empty());
    assert_eq!(app.status_message(), "Draft discarded");
}

#[test]
fn attaching_a_video_probes_it_in_the_background() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("pitch.mp4");
    fs::write(&path, mp4_bytes(1000, 75_000)).unwrap();

    let mut schema = long_form();
    schema.fields.retain(|field| matches!(field.kind, FieldKind::Media { .. }));
    let mut app = app_for(schema);
    let now = Instant::now();
    type_text(&mut app, &path.display().to_string(), now);
    assert!(app.session().value("video").is_none(), "path is not committed yet");

    app.handle_key(key(KeyCode::Enter), now);
    assert!(matches!(
        app.session().value("video"),
        Some(FieldValue::Media(file)) if file.file_name == "pitch.mp4"
    ));
    app.wait_for_probe();
    let feedback = app.session().media_feedback("video").expect("feedback");
    assert!(matches!(feedback, MediaFeedback::Measured(result) if !result.accepted));
    let warning = feedback.warning(60.0).unwrap();
    assert!(warning.contains("75 seconds"), "{warning}");
}

#[test]
fn missing_video_file_is_reported_inline() {
    let mut schema = long_form();
    schema.fields.retain(|field| matches!(field.kind, FieldKind::Media { .. }));
    let mut app = app_for(schema);
    let now = Instant::now();
    type_text(&mut app, "/definitely/not/here.mp4", now);
    app.handle_key(key(KeyCode::Enter), now);
    assert!(app.session().value("video").is_none());
    assert!(app.session().error("video").is_some());
}
