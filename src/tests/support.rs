use std::{
    cell::RefCell,
    collections::HashSet,
    path::PathBuf,
    rc::Rc,
    sync::Arc,
    time::Duration,
};

use crate::{
    domain::{FormSchema, presets::long_form},
    form::{FieldValue, FormSession},
    media::{MediaFile, MediaGate, MediaProbe, ProbeError},
    store::{DraftStore, MemoryStore, StorageKeys, StoreError},
    submit::{
        AnnouncementQueue, HandoffError, MailSettings, Notifier, OutboundMessage,
        SubmissionPipeline,
    },
};

pub const NAMESPACE: &str = "test-show";

pub fn keys() -> StorageKeys {
    StorageKeys::for_namespace(NAMESPACE)
}

/// The long form without its video field.
pub fn applicant_schema() -> Arc<FormSchema> {
    let mut schema = long_form();
    schema.fields.retain(|field| !field.kind.is_media());
    Arc::new(schema)
}

pub fn video_schema() -> Arc<FormSchema> {
    Arc::new(long_form())
}

pub fn valid_entries() -> Vec<(&'static str, FieldValue)> {
    vec![
        ("firstName", FieldValue::text("Ada")),
        ("lastName", FieldValue::text("Obi")),
        ("email", FieldValue::text("ada@example.com")),
        ("phone", FieldValue::text("+2348012345678")),
        ("state", FieldValue::text("Lagos")),
        ("age", FieldValue::Integer(30)),
        ("occupation", FieldValue::text("Founder")),
        (
            "experience",
            FieldValue::text("Ten years building logistics companies."),
        ),
        (
            "whyYou",
            FieldValue::text("I want to mentor the next generation of founders."),
        ),
        ("socials", FieldValue::text("https://instagram.com/ada")),
        ("referral", FieldValue::text("social")),
        ("consent", FieldValue::Bool(true)),
    ]
}

pub fn filled_session(schema: Arc<FormSchema>) -> FormSession {
    let mut session = FormSession::new(schema);
    for (field, value) in valid_entries() {
        assert!(session.edit(field, Some(value)), "unknown field {field}");
    }
    session
}

pub fn video_file(name: &str) -> MediaFile {
    MediaFile {
        path: PathBuf::from(format!("/uploads/{name}")),
        file_name: name.to_string(),
        mime_type: Some("video/mp4".to_string()),
        size_bytes: 4 * 1024 * 1024,
    }
}

pub fn media_value(name: &str) -> FieldValue {
    FieldValue::Media(video_file(name))
}

/// Reports the same duration for every file.
#[derive(Debug, Clone, Copy)]
pub struct FixedProbe(pub f64);

impl MediaProbe for FixedProbe {
    fn duration_seconds(&self, _file: &MediaFile) -> Result<f64, ProbeError> {
        Ok(self.0)
    }
}

pub fn gate(duration: f64) -> MediaGate {
    MediaGate::new(Arc::new(FixedProbe(duration)))
}

/// Memory store whose writes or removals can be made to fail per key.
#[derive(Debug, Default)]
pub struct FlakyStore {
    pub inner: MemoryStore,
    pub failing_writes: HashSet<String>,
    pub failing_removes: HashSet<String>,
    pub writes: Vec<String>,
}

impl FlakyStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn fail_writes_to(mut self, key: &str) -> Self {
        self.failing_writes.insert(key.to_string());
        self
    }

    pub fn fail_removes_of(mut self, key: &str) -> Self {
        self.failing_removes.insert(key.to_string());
        self
    }

    pub fn writes_to(&self, key: &str) -> usize {
        self.writes.iter().filter(|written| *written == key).count()
    }
}

impl DraftStore for FlakyStore {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        self.inner.get(key)
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), StoreError> {
        if self.failing_writes.contains(key) {
            return Err(StoreError::Unavailable(format!("write to {key} refused")));
        }
        self.writes.push(key.to_string());
        self.inner.set(key, value)
    }

    fn remove(&mut self, key: &str) -> Result<(), StoreError> {
        if self.failing_removes.contains(key) {
            return Err(StoreError::Unavailable(format!("remove of {key} refused")));
        }
        self.inner.remove(key)
    }
}

/// Records hand-offs in a shared list; optionally fails every one.
#[derive(Debug, Clone, Default)]
pub struct RecordingNotifier {
    pub sent: Rc<RefCell<Vec<OutboundMessage>>>,
    pub fail: bool,
}

impl RecordingNotifier {
    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Self::default()
        }
    }

    pub fn count(&self) -> usize {
        self.sent.borrow().len()
    }
}

impl Notifier for RecordingNotifier {
    fn hand_off(&mut self, message: &OutboundMessage) -> Result<(), HandoffError> {
        if self.fail {
            return Err(HandoffError::Unavailable("no mail client in tests".to_string()));
        }
        self.sent.borrow_mut().push(message.clone());
        Ok(())
    }
}

pub struct Harness {
    pub pipeline: SubmissionPipeline,
    pub notifier: RecordingNotifier,
    pub announcements: AnnouncementQueue,
}

pub fn harness(notifier: RecordingNotifier, duration: f64) -> Harness {
    let announcements = AnnouncementQueue::new();
    let pipeline = SubmissionPipeline::new(
        gate(duration),
        Box::new(notifier.clone()),
        Box::new(announcements.clone()),
        keys(),
        MailSettings {
            recipient: "casting@example.com".to_string(),
            subject: "Application".to_string(),
        },
    )
    .with_settle_delay(Duration::ZERO);
    Harness {
        pipeline,
        notifier,
        announcements,
    }
}
