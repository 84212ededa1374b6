use std::{sync::Arc, thread, time::Duration};

use chrono::{DateTime, SecondsFormat, Utc};
use indexmap::IndexMap;
use serde_json::{Value, json};
use thiserror::Error;
use tracing::{error, info};

use crate::{
    domain::{FieldKind, FormSchema},
    form::{AutosaveScheduler, FieldValue, FormSession, FormValues, ValidationReport},
    media::{MediaDurationResult, MediaGate, MediaRejection},
    store::{
        DraftStore, StorageKeys, StoreError, SubmissionLog, SubmissionRecord, clear_draft,
        save_draft,
    },
};

use super::{
    announce::{Announcer, Priority},
    notify::{HandoffError, Notifier, OutboundMessage},
};

pub const SUCCESS_MESSAGE: &str = "Your application has been submitted successfully. Our team will review and contact shortlisted candidates via email.";
pub const FAILURE_MESSAGE: &str =
    "There was an error submitting your application. Please try again.";
pub const DEFAULT_SETTLE_DELAY: Duration = Duration::from_millis(500);

#[derive(Debug, Error)]
pub enum SubmitFailure {
    #[error("could not persist the submission")]
    Persistence(#[from] StoreError),
    #[error("could not hand the submission to the mail client")]
    Handoff(#[from] HandoffError),
}

#[derive(Debug)]
pub enum SubmitOutcome {
    Submitted(SubmissionRecord),
    Invalid(ValidationReport),
    MediaRejected {
        field: String,
        rejection: MediaRejection,
    },
    Failed(SubmitFailure),
    /// Another submission is already in flight, or the session is closed.
    Busy,
}

impl SubmitOutcome {
    pub fn is_submitted(&self) -> bool {
        matches!(self, SubmitOutcome::Submitted(_))
    }

    pub fn record(&self) -> Option<&SubmissionRecord> {
        match self {
            SubmitOutcome::Submitted(record) => Some(record),
            _ => None,
        }
    }
}

/// Where the outbound mail goes and what it is called.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MailSettings {
    pub recipient: String,
    pub subject: String,
}

/// Runs validation, the media gate, persistence and the mail hand-off as
/// ordered hard gates.
pub struct SubmissionPipeline {
    gate: MediaGate,
    notifier: Box<dyn Notifier>,
    announcer: Box<dyn Announcer>,
    keys: StorageKeys,
    log: SubmissionLog,
    mail: MailSettings,
    settle_delay: Duration,
}

impl SubmissionPipeline {
    pub fn new(
        gate: MediaGate,
        notifier: Box<dyn Notifier>,
        announcer: Box<dyn Announcer>,
        keys: StorageKeys,
        mail: MailSettings,
    ) -> Self {
        let log = SubmissionLog::new(keys.submissions.clone());
        Self {
            gate,
            notifier,
            announcer,
            keys,
            log,
            mail,
            settle_delay: DEFAULT_SETTLE_DELAY,
        }
    }

    pub fn with_settle_delay(mut self, delay: Duration) -> Self {
        self.settle_delay = delay;
        self
    }

    pub fn keys(&self) -> &StorageKeys {
        &self.keys
    }

    pub fn log(&self) -> &SubmissionLog {
        &self.log
    }

    pub fn gate(&self) -> &MediaGate {
        &self.gate
    }

    pub fn submit(
        &mut self,
        session: &mut FormSession,
        store: &mut dyn DraftStore,
        autosave: &mut AutosaveScheduler,
    ) -> SubmitOutcome {
        if !session.begin_submit() {
            return SubmitOutcome::Busy;
        }
        let outcome = self.run(session, store, autosave);
        session.finish_submit();
        self.report(session, &outcome);
        outcome
    }

    fn run(
        &mut self,
        session: &mut FormSession,
        store: &mut dyn DraftStore,
        autosave: &mut AutosaveScheduler,
    ) -> SubmitOutcome {
        let report = session.validate_all();
        if !report.is_valid() {
            return SubmitOutcome::Invalid(report);
        }

        let schema = session.shared_schema();
        let media = match self.authorize_media(&schema, session) {
            Ok(media) => media,
            Err((field, rejection)) => {
                session.reject_media(&field, rejection.clone());
                return SubmitOutcome::MediaRejected { field, rejection };
            }
        };

        let record = build_record(&schema, session.values(), &media, Utc::now());
        if let Err(err) = self.log.append(store, &record) {
            return SubmitOutcome::Failed(err.into());
        }
        if let Err(err) = clear_draft(store, &self.keys) {
            return SubmitOutcome::Failed(err.into());
        }

        let message = compose_message(&self.mail, &schema, session.values(), &media, &record);
        if let Err(err) = self.notifier.hand_off(&message) {
            if let Err(restore) = save_draft(store, &self.keys, &session.draft_snapshot()) {
                error!(error = %restore, "could not restore draft after failed hand-off");
            }
            return SubmitOutcome::Failed(err.into());
        }

        if !self.settle_delay.is_zero() {
            thread::sleep(self.settle_delay);
        }
        autosave.cancel();
        session.reset();
        SubmitOutcome::Submitted(record)
    }

    fn authorize_media(
        &self,
        schema: &Arc<FormSchema>,
        session: &FormSession,
    ) -> Result<IndexMap<String, MediaDurationResult>, (String, MediaRejection)> {
        let mut results = IndexMap::new();
        for field in schema.media_fields() {
            let FieldKind::Media { accept } = &field.kind else {
                continue;
            };
            let file = session.value(&field.name).and_then(FieldValue::as_media);
            if file.is_none() && !field.required {
                continue;
            }
            let result = self
                .gate
                .authorize(file, accept)
                .map_err(|rejection| (field.name.clone(), rejection))?;
            results.insert(field.name.clone(), result);
        }
        Ok(results)
    }

    fn report(&mut self, session: &mut FormSession, outcome: &SubmitOutcome) {
        match outcome {
            SubmitOutcome::Submitted(record) => {
                info!(submitted_at = %record.submitted_at_iso(), "submission accepted");
                self.announcer.announce(SUCCESS_MESSAGE, Priority::Polite);
            }
            SubmitOutcome::Invalid(report) => {
                let message = match report.len() {
                    1 => "Please fix 1 field before submitting.".to_string(),
                    n => format!("Please fix {n} fields before submitting."),
                };
                self.announcer.announce(&message, Priority::Assertive);
            }
            SubmitOutcome::MediaRejected { rejection, .. } => {
                self.announcer
                    .announce(&rejection.to_string(), Priority::Assertive);
            }
            SubmitOutcome::Failed(failure) => {
                match failure {
                    SubmitFailure::Persistence(err) => {
                        error!(error = %err, "submission failed to persist")
                    }
                    SubmitFailure::Handoff(err) => {
                        error!(error = %err, "submission hand-off failed")
                    }
                }
                session.set_failure(FAILURE_MESSAGE);
                self.announcer.announce(FAILURE_MESSAGE, Priority::Assertive);
            }
            SubmitOutcome::Busy => {}
        }
    }
}

/// Field values in schema order; media is summarized, never embedded.
pub fn build_record(
    schema: &FormSchema,
    values: &FormValues,
    media: &IndexMap<String, MediaDurationResult>,
    submitted_at: DateTime<Utc>,
) -> SubmissionRecord {
    let mut fields = IndexMap::new();
    for field in &schema.fields {
        let Some(value) = values.get(&field.name) else {
            continue;
        };
        let encoded = match value {
            FieldValue::Media(file) => json!({
                "fileName": file.file_name,
                "sizeBytes": file.size_bytes,
                "mimeType": file.mime_type,
                "durationSeconds": media.get(&field.name).map(|result| result.duration_seconds),
            }),
            other => other.to_json().unwrap_or(Value::Null),
        };
        fields.insert(field.name.clone(), encoded);
    }
    SubmissionRecord::new(fields, submitted_at)
}

pub fn compose_message(
    mail: &MailSettings,
    schema: &FormSchema,
    values: &FormValues,
    media: &IndexMap<String, MediaDurationResult>,
    record: &SubmissionRecord,
) -> OutboundMessage {
    let mut body = String::from("New Application Submission\n\n");
    for field in &schema.fields {
        let shown = match values.get(&field.name) {
            Some(FieldValue::Media(file)) => match media.get(&field.name) {
                Some(result) => format!("{} ({} seconds)", file.file_name, result.rounded_seconds()),
                None => file.file_name.clone(),
            },
            Some(value) => value.display(),
            None => String::new(),
        };
        body.push_str(&format!("{}: {shown}\n", field.label));
    }
    body.push_str(&format!(
        "Submitted At: {}",
        record
            .submitted_at()
            .to_rfc3339_opts(SecondsFormat::Millis, true)
    ));
    OutboundMessage::new(&mail.recipient, &mail.subject, body)
}
