use std::{
    sync::mpsc::{self, Receiver, Sender},
    thread,
    time::Instant,
};

use anyhow::Result;
use crossterm::event::{self, Event, KeyEvent, KeyEventKind};
use ratatui::layout::Rect;
use tracing::{error, warn};

use crate::{
    countdown::Countdown,
    form::{AutosaveScheduler, FieldValue, FormSession, MediaFeedback, ProbeJob, ProbeResult},
    media::{MediaFile, MediaGate, MediaRejection},
    presentation::{self, FieldRow, Notice, UiContext},
    store::{DraftStore, StorageKeys, SubmissionRecord, clear_draft},
    submit::{AnnouncementQueue, SubmissionPipeline, SubmitOutcome},
};

use super::{
    editor::{EditEffect, FieldEditor},
    input::{KeyCommand, classify},
    options::FormOptions,
    status::StatusLine,
    terminal::TerminalGuard,
};

const HELP_TEXT: &str =
    "Tab/Shift+Tab move • ←/→ choose • Space toggle • Enter attach video • Ctrl+S submit • Ctrl+D discard draft • Ctrl+Q quit";

pub(crate) struct App {
    session: FormSession,
    editors: Vec<FieldEditor>,
    focus: usize,
    scroll_offset: usize,
    store: Box<dyn DraftStore>,
    keys: StorageKeys,
    autosave: AutosaveScheduler,
    pipeline: SubmissionPipeline,
    gate: MediaGate,
    announcements: AnnouncementQueue,
    options: FormOptions,
    status: StatusLine,
    exit_armed: bool,
    submit_requested: bool,
    should_quit: bool,
    submitted: Vec<SubmissionRecord>,
    probe_tx: Sender<ProbeResult>,
    probe_rx: Receiver<ProbeResult>,
}

impl App {
    pub fn new(
        session: FormSession,
        store: Box<dyn DraftStore>,
        pipeline: SubmissionPipeline,
        announcements: AnnouncementQueue,
        options: FormOptions,
    ) -> Self {
        let (probe_tx, probe_rx) = mpsc::channel();
        let editors = build_editors(&session);
        Self {
            keys: pipeline.keys().clone(),
            gate: pipeline.gate().clone(),
            autosave: AutosaveScheduler::new(options.quiet_period),
            session,
            editors,
            focus: 0,
            scroll_offset: 0,
            store,
            pipeline,
            announcements,
            options,
            status: StatusLine::new(),
            exit_armed: false,
            submit_requested: false,
            should_quit: false,
            submitted: Vec::new(),
            probe_tx,
            probe_rx,
        }
    }

    pub fn run(&mut self) -> Result<Vec<SubmissionRecord>> {
        let mut terminal = TerminalGuard::new()?;
        while !self.should_quit {
            self.on_tick(Instant::now());
            terminal.draw(|frame| self.draw(frame))?;
            // The requested submit runs after a frame showing it in progress.
            if self.submit_requested {
                self.run_pending_submit();
                continue;
            }
            if !event::poll(self.options.tick_rate)? {
                continue;
            }
            match event::read()? {
                Event::Key(key) => self.handle_key(key, Instant::now()),
                Event::Resize(width, height) => {
                    terminal.resize(Rect::new(0, 0, width, height))?;
                }
                Event::Mouse(_) | Event::FocusGained | Event::FocusLost | Event::Paste(_) => {}
            }
        }
        self.shutdown();
        Ok(std::mem::take(&mut self.submitted))
    }

    pub(crate) fn draw(&mut self, frame: &mut ratatui::Frame<'_>) {
        let rows = self.field_rows();
        let schema = self.session.schema();
        let help = self.options.show_help.then_some(HELP_TEXT);
        presentation::draw(
            frame,
            UiContext {
                title: &schema.title,
                description: schema.description.as_deref(),
                countdown: self.options.deadline.map(Countdown::until),
                last_saved: self.autosave.last_saved(),
                rows: &rows,
                focus: self.focus,
                status_message: self.status.message(),
                dirty: self.session.is_dirty(),
                submitting: self.submit_requested || self.session.is_submitting(),
                error_count: self.session.error_count(),
                failure: self.session.failure(),
                help,
            },
            &mut self.scroll_offset,
        );
    }

    fn field_rows(&self) -> Vec<FieldRow> {
        let limit = self.gate.max_duration_secs();
        self.session
            .schema()
            .fields
            .iter()
            .zip(&self.editors)
            .map(|(field, editor)| {
                let notice = self
                    .session
                    .media_feedback(&field.name)
                    .and_then(|feedback| match feedback {
                        MediaFeedback::Probing => Some(Notice::Info("Checking video…".to_string())),
                        MediaFeedback::Measured(result) if result.accepted => Some(Notice::Info(
                            format!("Video length: {} seconds", result.rounded_seconds()),
                        )),
                        other => other.warning(limit).map(Notice::Warning),
                    });
                FieldRow {
                    label: field.display_label(),
                    kind: field.kind.name(),
                    value: editor.display(),
                    help: field.help.clone(),
                    error: self
                        .session
                        .error(&field.name)
                        .map(|err| err.message.clone()),
                    notice,
                    cursor: editor.accepts_cursor(),
                }
            })
            .collect()
    }

    pub(crate) fn on_tick(&mut self, now: Instant) {
        while let Ok(result) = self.probe_rx.try_recv() {
            self.session.complete_media_probe(result);
        }
        match self
            .autosave
            .poll(now, &self.session, self.store.as_mut(), &self.keys)
        {
            Ok(Some(saved_at)) => self.status.draft_saved(saved_at),
            Ok(None) => {}
            Err(err) => {
                warn!(error = %err, "autosave failed");
                self.status.set_raw("Could not save your draft.");
            }
        }
    }

    pub(crate) fn handle_key(&mut self, key: KeyEvent, now: Instant) {
        if key.kind != KeyEventKind::Press {
            return;
        }
        match classify(&key) {
            KeyCommand::Submit => {
                self.exit_armed = false;
                self.request_submit();
            }
            KeyCommand::Discard => {
                self.exit_armed = false;
                self.on_discard();
            }
            KeyCommand::Quit => self.on_exit(),
            KeyCommand::NextField => self.move_focus(1),
            KeyCommand::PrevField => self.move_focus(-1),
            KeyCommand::Commit => {
                self.commit_media();
            }
            KeyCommand::ResetStatus => {
                self.exit_armed = false;
                self.status.ready();
            }
            KeyCommand::Edit(event) => self.handle_field_input(&event, now),
            KeyCommand::None => {}
        }
    }

    fn handle_field_input(&mut self, key: &KeyEvent, now: Instant) {
        let schema = self.session.shared_schema();
        let Some(field) = schema.fields.get(self.focus) else {
            return;
        };
        let Some(editor) = self.editors.get_mut(self.focus) else {
            return;
        };
        match editor.handle_key(&field.kind, key) {
            EditEffect::Ignored => return,
            EditEffect::Changed(value) => {
                self.session.edit(&field.name, value);
                self.autosave.note_edit(now);
            }
            EditEffect::PathEdited => {}
        }
        self.exit_armed = false;
        self.status.editing(&field.label);
    }

    fn move_focus(&mut self, delta: isize) {
        let len = self.editors.len();
        if len == 0 {
            return;
        }
        self.blur_focused();
        self.focus = (self.focus as isize + delta).rem_euclid(len as isize) as usize;
        self.exit_armed = false;
    }

    fn blur_focused(&mut self) {
        let schema = self.session.shared_schema();
        let Some(field) = schema.fields.get(self.focus) else {
            return;
        };
        if field.kind.is_media() {
            self.commit_media();
            return;
        }
        self.session.blur(&field.name);
    }

    /// Attach the file named in the focused media field and start probing it.
    fn commit_media(&mut self) {
        let schema = self.session.shared_schema();
        let Some(field) = schema.fields.get(self.focus) else {
            return;
        };
        let Some(path) = self.editors.get(self.focus).and_then(FieldEditor::media_path) else {
            return;
        };
        let current = self
            .session
            .value(&field.name)
            .and_then(FieldValue::as_media)
            .map(|file| file.path.display().to_string());
        if current.as_deref() == Some(path) {
            return;
        }
        if path.is_empty() {
            self.session.edit(&field.name, None);
            return;
        }
        match MediaFile::from_path(path) {
            Ok(file) => {
                let file_name = file.file_name.clone();
                self.session.edit(&field.name, Some(FieldValue::Media(file)));
                if let Some(job) = self.session.inspect_media(&field.name, &self.gate) {
                    self.status.probing(&file_name);
                    self.spawn_probe(job);
                }
            }
            Err(err) => {
                self.session.edit(&field.name, None);
                self.session.reject_media(
                    &field.name,
                    MediaRejection::Unreadable {
                        reason: err.to_string(),
                    },
                );
            }
        }
    }

    fn spawn_probe(&self, job: ProbeJob) {
        let tx = self.probe_tx.clone();
        let spawned = thread::Builder::new()
            .name("media-probe".to_string())
            .spawn(move || {
                // The receiver is gone once the form closes; the result is moot then.
                let _ = tx.send(job.run());
            });
        if let Err(err) = spawned {
            error!(error = %err, "could not start media probe");
        }
    }

    fn request_submit(&mut self) {
        if self.submit_requested || self.session.is_submitting() {
            return;
        }
        self.commit_media();
        self.submit_requested = true;
    }

    /// Run a submit requested by the last key press, if any.
    pub(crate) fn run_pending_submit(&mut self) {
        if !std::mem::take(&mut self.submit_requested) {
            return;
        }
        let outcome = self
            .pipeline
            .submit(&mut self.session, self.store.as_mut(), &mut self.autosave);
        match outcome {
            SubmitOutcome::Submitted(record) => {
                self.submitted.push(record);
                self.editors = build_editors(&self.session);
                self.focus = 0;
                self.scroll_offset = 0;
            }
            SubmitOutcome::Invalid(report) => {
                if let Some(first) = report.errors().next() {
                    self.focus_field(&first.field);
                }
            }
            SubmitOutcome::MediaRejected { field, .. } => self.focus_field(&field),
            SubmitOutcome::Failed(_) | SubmitOutcome::Busy => {}
        }
        if let Some(announcement) = self.announcements.drain().pop() {
            self.status.set_raw(announcement.message);
        }
    }

    fn focus_field(&mut self, name: &str) {
        if let Some(idx) = self
            .session
            .schema()
            .fields
            .iter()
            .position(|field| field.name == name)
        {
            self.focus = idx;
        }
    }

    fn on_discard(&mut self) {
        match clear_draft(self.store.as_mut(), &self.keys) {
            Ok(()) => {
                self.autosave.cancel();
                self.session.reset();
                self.editors = build_editors(&self.session);
                self.status.draft_discarded();
            }
            Err(err) => {
                warn!(error = %err, "could not discard draft");
                self.status.set_raw("Could not discard your draft.");
            }
        }
    }

    fn on_exit(&mut self) {
        if self.options.confirm_exit && self.session.is_dirty() && !self.exit_armed {
            self.exit_armed = true;
            self.status.pending_exit();
            return;
        }
        self.should_quit = true;
    }

    /// Stop background work so nothing touches the store after the form is gone.
    pub(crate) fn shutdown(&mut self) {
        self.autosave.stop();
        self.session.close();
        while let Ok(result) = self.probe_rx.try_recv() {
            self.session.complete_media_probe(result);
        }
    }
}

fn build_editors(session: &FormSession) -> Vec<FieldEditor> {
    session
        .schema()
        .fields
        .iter()
        .map(|field| FieldEditor::for_field(field, session.value(&field.name)))
        .collect()
}

#[cfg(test)]
impl App {
    pub(crate) fn session(&self) -> &FormSession {
        &self.session
    }

    pub(crate) fn store(&self) -> &dyn DraftStore {
        self.store.as_ref()
    }

    pub(crate) fn focus(&self) -> usize {
        self.focus
    }

    pub(crate) fn status_message(&self) -> &str {
        self.status.message()
    }

    pub(crate) fn should_quit(&self) -> bool {
        self.should_quit
    }

    pub(crate) fn submitted(&self) -> &[SubmissionRecord] {
        &self.submitted
    }

    pub(crate) fn wait_for_probe(&mut self) {
        if let Ok(result) = self
            .probe_rx
            .recv_timeout(std::time::Duration::from_secs(5))
        {
            self.session.complete_media_probe(result);
        }
    }
}
