use std::sync::Arc;

use anyhow::Result;

use crate::{
    domain::FormSchema,
    form::FormSession,
    media::{MediaProbe, VideoProbe},
    store::{DraftStore, MemoryStore, SubmissionRecord},
    submit::{AnnouncementQueue, MailtoNotifier, Notifier, SubmissionPipeline},
};

use super::{options::FormOptions, runtime::App};

/// Terminal front-end for one application form.
pub struct EntryForm {
    schema: FormSchema,
    options: FormOptions,
    store: Box<dyn DraftStore>,
    notifier: Box<dyn Notifier>,
    probe: Arc<dyn MediaProbe>,
}

impl EntryForm {
    pub fn new(schema: FormSchema) -> Self {
        Self {
            schema,
            options: FormOptions::default(),
            store: Box::new(MemoryStore::new()),
            notifier: Box::new(MailtoNotifier::new()),
            probe: Arc::new(VideoProbe),
        }
    }

    pub fn with_options(mut self, options: FormOptions) -> Self {
        self.options = options;
        self
    }

    pub fn with_store(mut self, store: Box<dyn DraftStore>) -> Self {
        self.store = store;
        self
    }

    pub fn with_notifier(mut self, notifier: Box<dyn Notifier>) -> Self {
        self.notifier = notifier;
        self
    }

    pub fn with_probe(mut self, probe: Arc<dyn MediaProbe>) -> Self {
        self.probe = probe;
        self
    }

    /// Run until the user quits; returns the records submitted meanwhile.
    pub fn run(self) -> Result<Vec<SubmissionRecord>> {
        let mut app = self.into_app();
        app.run()
    }

    pub(crate) fn into_app(self) -> App {
        let EntryForm {
            schema,
            options,
            store,
            notifier,
            probe,
        } = self;

        let keys = options.storage_keys();
        let session = FormSession::load(Arc::new(schema), store.as_ref(), &keys);
        let announcements = AnnouncementQueue::new();
        let pipeline = SubmissionPipeline::new(
            options.media_gate(probe),
            notifier,
            Box::new(announcements.clone()),
            keys,
            options.mail_settings(),
        )
        .with_settle_delay(options.settle_delay);

        App::new(session, store, pipeline, announcements, options)
    }
}
