use std::{collections::HashMap, sync::Arc};

use indexmap::IndexMap;
use tracing::debug;

use crate::{
    domain::{FieldKind, FormSchema},
    media::{MediaDurationResult, MediaFile, MediaGate, MediaRejection},
    store::{Draft, DraftStore, StorageKeys, load_draft},
};

use super::{
    error::{FieldError, FieldIssue},
    validation::{ValidationReport, validate, validate_field},
    value::{FieldValue, FormValues},
};

/// Non-blocking media feedback shown next to an upload control.
#[derive(Debug, Clone, PartialEq)]
pub enum MediaFeedback {
    Probing,
    Measured(MediaDurationResult),
    Rejected(MediaRejection),
}

impl MediaFeedback {
    pub fn warning(&self, limit_seconds: f64) -> Option<String> {
        match self {
            MediaFeedback::Probing => None,
            MediaFeedback::Measured(result) if result.accepted => None,
            MediaFeedback::Measured(result) => Some(
                MediaRejection::TooLong {
                    duration_seconds: result.duration_seconds,
                    limit_seconds,
                }
                .to_string(),
            ),
            MediaFeedback::Rejected(rejection) => Some(rejection.to_string()),
        }
    }
}

/// Identifies one on-change probe so late results can be discarded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProbeTicket {
    field: String,
    generation: u64,
}

impl ProbeTicket {
    pub fn field(&self) -> &str {
        &self.field
    }
}

/// A detached duration probe; `run` may execute on any thread.
#[derive(Debug)]
pub struct ProbeJob {
    ticket: ProbeTicket,
    file: MediaFile,
    gate: MediaGate,
}

impl ProbeJob {
    pub fn ticket(&self) -> &ProbeTicket {
        &self.ticket
    }

    pub fn run(self) -> ProbeResult {
        let feedback = match self.gate.measure(&self.file) {
            Ok(result) => MediaFeedback::Measured(result),
            Err(err) => MediaFeedback::Rejected(MediaRejection::Unreadable {
                reason: err.to_string(),
            }),
        };
        ProbeResult {
            ticket: self.ticket,
            feedback,
        }
    }
}

#[derive(Debug)]
pub struct ProbeResult {
    pub ticket: ProbeTicket,
    pub feedback: MediaFeedback,
}

/// In-memory state of one form being filled in.
#[derive(Debug, Clone)]
pub struct FormSession {
    schema: Arc<FormSchema>,
    values: FormValues,
    errors: IndexMap<String, FieldError>,
    media: IndexMap<String, MediaFeedback>,
    generations: HashMap<String, u64>,
    dirty: bool,
    submitting: bool,
    failure: Option<String>,
    open: bool,
}

impl FormSession {
    pub fn new(schema: Arc<FormSchema>) -> Self {
        Self {
            schema,
            values: FormValues::new(),
            errors: IndexMap::new(),
            media: IndexMap::new(),
            generations: HashMap::new(),
            dirty: false,
            submitting: false,
            failure: None,
            open: true,
        }
    }

    pub fn with_draft(schema: Arc<FormSchema>, draft: &Draft) -> Self {
        let values = FormValues::from_draft(&schema, draft);
        let mut session = Self::new(schema);
        session.values = values;
        session
    }

    /// Start a session from whatever draft the store holds. Not dirty.
    pub fn load(schema: Arc<FormSchema>, store: &dyn DraftStore, keys: &StorageKeys) -> Self {
        let draft = load_draft(store, keys);
        debug!(fields = draft.len(), key = %keys.draft, "loaded draft");
        Self::with_draft(schema, &draft)
    }

    pub fn schema(&self) -> &FormSchema {
        &self.schema
    }

    pub fn shared_schema(&self) -> Arc<FormSchema> {
        Arc::clone(&self.schema)
    }

    pub fn values(&self) -> &FormValues {
        &self.values
    }

    pub fn value(&self, field: &str) -> Option<&FieldValue> {
        self.values.get(field)
    }

    pub fn error(&self, field: &str) -> Option<&FieldError> {
        self.errors.get(field)
    }

    pub fn errors(&self) -> impl Iterator<Item = &FieldError> {
        self.errors.values()
    }

    pub fn error_count(&self) -> usize {
        self.errors.len()
    }

    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    pub fn is_submitting(&self) -> bool {
        self.submitting
    }

    pub fn is_open(&self) -> bool {
        self.open
    }

    pub fn failure(&self) -> Option<&str> {
        self.failure.as_deref()
    }

    pub fn media_feedback(&self, field: &str) -> Option<&MediaFeedback> {
        self.media.get(field)
    }

    /// Replace a field's value (`None` clears it). Returns false for unknown fields.
    pub fn edit(&mut self, field: &str, value: Option<FieldValue>) -> bool {
        let Some(schema) = self.schema.field(field) else {
            return false;
        };
        if schema.kind.is_media() {
            *self.generations.entry(field.to_string()).or_default() += 1;
            self.media.shift_remove(field);
        }
        match value {
            Some(value) => {
                self.values.set(field, value);
            }
            None => {
                self.values.remove(field);
            }
        }
        self.errors.shift_remove(field);
        self.dirty = true;
        true
    }

    /// Validate a single field after it loses focus.
    pub fn blur(&mut self, field: &str) -> Option<&FieldError> {
        let schema = self.schema.field(field)?;
        match validate_field(schema, self.values.get(field)) {
            Ok(()) => {
                self.errors.shift_remove(field);
                None
            }
            Err(error) => {
                self.errors.insert(field.to_string(), error);
                self.errors.get(field)
            }
        }
    }

    /// Whole-form pass; replaces every field error with the fresh result.
    pub fn validate_all(&mut self) -> ValidationReport {
        let report = validate(&self.schema, &self.values);
        self.errors = report.clone().into_errors();
        report
    }

    /// Surface a submit-time media rejection next to the upload control.
    pub fn reject_media(&mut self, field: &str, rejection: MediaRejection) {
        if let Some(schema) = self.schema.field(field) {
            self.errors.insert(
                field.to_string(),
                FieldError {
                    field: schema.name.clone(),
                    issue: FieldIssue::MediaRejected,
                    message: rejection.to_string(),
                },
            );
            self.media
                .insert(field.to_string(), MediaFeedback::Rejected(rejection));
        }
    }

    /// Run the cheap checks now and hand back the duration probe to run later.
    pub fn inspect_media(&mut self, field: &str, gate: &MediaGate) -> Option<ProbeJob> {
        let accept = match &self.schema.field(field)?.kind {
            FieldKind::Media { accept } => accept.clone(),
            _ => return None,
        };
        let Some(file) = self.values.get(field).and_then(FieldValue::as_media).cloned() else {
            self.media.shift_remove(field);
            return None;
        };
        if let Err(rejection) = gate.precheck(&file, &accept) {
            self.media
                .insert(field.to_string(), MediaFeedback::Rejected(rejection));
            return None;
        }
        self.media
            .insert(field.to_string(), MediaFeedback::Probing);
        Some(ProbeJob {
            ticket: ProbeTicket {
                field: field.to_string(),
                generation: self.generations.get(field).copied().unwrap_or_default(),
            },
            file,
            gate: gate.clone(),
        })
    }

    /// Apply a finished probe if it still refers to the current file.
    pub fn complete_media_probe(&mut self, result: ProbeResult) -> bool {
        let current = self
            .generations
            .get(&result.ticket.field)
            .copied()
            .unwrap_or_default();
        if !self.open || current != result.ticket.generation {
            debug!(field = %result.ticket.field, "discarding stale media probe");
            return false;
        }
        self.media.insert(result.ticket.field, result.feedback);
        true
    }

    pub fn draft_snapshot(&self) -> Draft {
        self.values.to_draft(&self.schema)
    }

    /// Claim the single in-flight submission slot.
    pub fn begin_submit(&mut self) -> bool {
        if self.submitting || !self.open {
            return false;
        }
        self.submitting = true;
        self.failure = None;
        true
    }

    pub fn finish_submit(&mut self) {
        self.submitting = false;
    }

    pub fn set_failure(&mut self, message: impl Into<String>) {
        self.failure = Some(message.into());
    }

    /// Back to a blank, clean form after a successful submission.
    pub fn reset(&mut self) {
        self.values.clear();
        self.errors.clear();
        self.media.clear();
        for generation in self.generations.values_mut() {
            *generation += 1;
        }
        self.dirty = false;
        self.failure = None;
    }

    /// End the session; late probe results are ignored from now on.
    pub fn close(&mut self) {
        self.open = false;
    }
}
