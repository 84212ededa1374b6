use std::{sync::Arc, time::Duration};

use chrono::{DateTime, Utc};

use crate::{
    domain::presets::SHOW_NAMESPACE,
    form::DEFAULT_QUIET_PERIOD,
    media::{MAX_DURATION_SECS, MAX_SIZE_BYTES, MediaGate, MediaProbe},
    store::StorageKeys,
    submit::{DEFAULT_SETTLE_DELAY, MailSettings},
};

pub const DEFAULT_RECIPIENT: &str = "info@saproductiontv.com";
pub const DEFAULT_SUBJECT: &str = "KeystoDCity Reality Show Application";

#[derive(Debug, Clone)]
pub struct FormOptions {
    pub tick_rate: Duration,
    pub quiet_period: Duration,
    pub settle_delay: Duration,
    pub max_media_duration_secs: f64,
    pub max_media_size_bytes: u64,
    pub recipient: String,
    pub subject: String,
    /// Prefix of the draft and submissions storage keys.
    pub namespace: String,
    pub deadline: Option<DateTime<Utc>>,
    pub confirm_exit: bool,
    pub show_help: bool,
}

impl Default for FormOptions {
    fn default() -> Self {
        Self {
            tick_rate: Duration::from_millis(250),
            quiet_period: DEFAULT_QUIET_PERIOD,
            settle_delay: DEFAULT_SETTLE_DELAY,
            max_media_duration_secs: MAX_DURATION_SECS,
            max_media_size_bytes: MAX_SIZE_BYTES,
            recipient: DEFAULT_RECIPIENT.to_string(),
            subject: DEFAULT_SUBJECT.to_string(),
            namespace: SHOW_NAMESPACE.to_string(),
            deadline: None,
            confirm_exit: true,
            show_help: true,
        }
    }
}

impl FormOptions {
    pub fn with_tick_rate(mut self, tick_rate: Duration) -> Self {
        self.tick_rate = tick_rate;
        self
    }

    pub fn with_quiet_period(mut self, quiet_period: Duration) -> Self {
        self.quiet_period = quiet_period;
        self
    }

    pub fn with_settle_delay(mut self, delay: Duration) -> Self {
        self.settle_delay = delay;
        self
    }

    pub fn with_max_media_duration(mut self, seconds: f64) -> Self {
        self.max_media_duration_secs = seconds;
        self
    }

    pub fn with_max_media_size(mut self, bytes: u64) -> Self {
        self.max_media_size_bytes = bytes;
        self
    }

    pub fn with_recipient(mut self, recipient: impl Into<String>) -> Self {
        self.recipient = recipient.into();
        self
    }

    pub fn with_subject(mut self, subject: impl Into<String>) -> Self {
        self.subject = subject.into();
        self
    }

    pub fn with_namespace(mut self, namespace: impl Into<String>) -> Self {
        self.namespace = namespace.into();
        self
    }

    pub fn with_deadline(mut self, deadline: DateTime<Utc>) -> Self {
        self.deadline = Some(deadline);
        self
    }

    pub fn with_confirm_exit(mut self, confirm: bool) -> Self {
        self.confirm_exit = confirm;
        self
    }

    pub fn with_help(mut self, show: bool) -> Self {
        self.show_help = show;
        self
    }

    pub fn storage_keys(&self) -> StorageKeys {
        StorageKeys::for_namespace(&self.namespace)
    }

    pub fn mail_settings(&self) -> MailSettings {
        MailSettings {
            recipient: self.recipient.clone(),
            subject: self.subject.clone(),
        }
    }

    pub fn media_gate(&self, probe: Arc<dyn MediaProbe>) -> MediaGate {
        MediaGate::new(probe)
            .with_max_duration(self.max_media_duration_secs)
            .with_max_size(self.max_media_size_bytes)
    }
}
