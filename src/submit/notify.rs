use std::{io, process::Command};

use percent_encoding::{AsciiSet, NON_ALPHANUMERIC, utf8_percent_encode};
use thiserror::Error;
use tracing::info;

/// Characters `encodeURIComponent` leaves untouched.
const URI_COMPONENT: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'!')
    .remove(b'~')
    .remove(b'*')
    .remove(b'\'')
    .remove(b'(')
    .remove(b')');

/// A composed mail handed to the user's own mail client.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutboundMessage {
    pub to: String,
    pub subject: String,
    pub body: String,
}

impl OutboundMessage {
    pub fn new(to: impl Into<String>, subject: impl Into<String>, body: impl Into<String>) -> Self {
        Self {
            to: to.into(),
            subject: subject.into(),
            body: body.into(),
        }
    }

    pub fn mailto_url(&self) -> String {
        format!(
            "mailto:{}?subject={}&body={}",
            self.to,
            encode_component(&self.subject),
            encode_component(&self.body)
        )
    }
}

pub fn encode_component(input: &str) -> String {
    utf8_percent_encode(input, URI_COMPONENT).to_string()
}

#[derive(Debug, Error)]
pub enum HandoffError {
    #[error("failed to launch mail client `{program}`")]
    Launch {
        program: String,
        #[source]
        source: io::Error,
    },
    #[error("no mail client available: {0}")]
    Unavailable(String),
}

/// Best-effort hand-off. `Ok` means the hand-off was invoked, never that mail was delivered.
pub trait Notifier {
    fn hand_off(&mut self, message: &OutboundMessage) -> Result<(), HandoffError>;
}

/// Opens the `mailto:` URL with the platform's default handler.
#[derive(Debug, Clone, Default)]
pub struct MailtoNotifier {
    opener: Option<Vec<String>>,
}

impl MailtoNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    /// Use a custom opener command; the URL is appended as the last argument.
    pub fn with_opener<I, S>(mut self, command: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.opener = Some(command.into_iter().map(Into::into).collect());
        self
    }

    fn command(&self, url: &str) -> Result<Command, HandoffError> {
        let parts = match &self.opener {
            Some(parts) => parts.clone(),
            None => platform_opener(),
        };
        let (program, args) = parts
            .split_first()
            .ok_or_else(|| HandoffError::Unavailable("empty opener command".to_string()))?;
        let mut command = Command::new(program);
        command.args(args).arg(url);
        Ok(command)
    }
}

fn platform_opener() -> Vec<String> {
    let parts: &[&str] = if cfg!(target_os = "windows") {
        &["cmd", "/C", "start", ""]
    } else if cfg!(target_os = "macos") {
        &["open"]
    } else {
        &["xdg-open"]
    };
    parts.iter().map(|part| part.to_string()).collect()
}

impl Notifier for MailtoNotifier {
    fn hand_off(&mut self, message: &OutboundMessage) -> Result<(), HandoffError> {
        let url = message.mailto_url();
        let mut command = self.command(&url)?;
        let program = command.get_program().to_string_lossy().into_owned();
        command
            .spawn()
            .map_err(|source| HandoffError::Launch { program, source })?;
        info!(to = %message.to, "handed submission to mail client");
        Ok(())
    }
}

/// Logs the `mailto:` URL instead of opening anything.
#[derive(Debug, Clone, Default)]
pub struct LogNotifier {
    sent: Vec<OutboundMessage>,
}

impl LogNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn sent(&self) -> &[OutboundMessage] {
        &self.sent
    }
}

impl Notifier for LogNotifier {
    fn hand_off(&mut self, message: &OutboundMessage) -> Result<(), HandoffError> {
        info!(url = %message.mailto_url(), "mail hand-off skipped");
        self.sent.push(message.clone());
        Ok(())
    }
}
