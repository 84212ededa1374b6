use chrono::{DateTime, Local};

#[derive(Debug, Clone)]
pub struct StatusLine {
    message: String,
}

pub const READY_STATUS: &str = "Ready. Press Ctrl+S to submit your application.";

impl Default for StatusLine {
    fn default() -> Self {
        Self {
            message: READY_STATUS.to_string(),
        }
    }
}

impl StatusLine {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_raw(&mut self, msg: impl Into<String>) {
        self.message = msg.into();
    }

    pub fn ready(&mut self) {
        self.message = READY_STATUS.to_string();
    }

    pub fn editing(&mut self, label: &str) {
        self.message = format!("Editing {label}");
    }

    pub fn draft_saved(&mut self, at: DateTime<Local>) {
        self.message = format!("Draft saved {}", at.format("%H:%M:%S"));
    }

    pub fn draft_discarded(&mut self) {
        self.message = "Draft discarded".to_string();
    }

    pub fn probing(&mut self, file_name: &str) {
        self.message = format!("Checking {file_name}…");
    }

    pub fn pending_exit(&mut self) {
        self.message = "Unsaved changes. Press Ctrl+Q again to quit.".to_string();
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}
