use std::fmt;

use crate::domain::{FieldSchema, IssueKind};

/// What is wrong with a single field value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldIssue {
    Required,
    TooShort { min: usize },
    InvalidEmail,
    InvalidPhone,
    NotANumber,
    OutOfRange { min: Option<i64>, max: Option<i64> },
    InvalidUrl,
    InvalidChoice,
    ConsentRequired,
    MediaRejected,
}

impl FieldIssue {
    pub fn kind(&self) -> IssueKind {
        match self {
            FieldIssue::Required => IssueKind::Required,
            FieldIssue::TooShort { .. } => IssueKind::TooShort,
            FieldIssue::InvalidEmail => IssueKind::InvalidEmail,
            FieldIssue::InvalidPhone => IssueKind::InvalidPhone,
            FieldIssue::NotANumber => IssueKind::NotANumber,
            FieldIssue::OutOfRange { .. } => IssueKind::OutOfRange,
            FieldIssue::InvalidUrl => IssueKind::InvalidUrl,
            FieldIssue::InvalidChoice => IssueKind::InvalidChoice,
            FieldIssue::ConsentRequired => IssueKind::ConsentRequired,
            FieldIssue::MediaRejected => IssueKind::MediaRejected,
        }
    }
}

impl fmt::Display for FieldIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldIssue::Required => write!(f, "This field is required."),
            FieldIssue::TooShort { min } => write!(f, "Please enter at least {min} characters."),
            FieldIssue::InvalidEmail => write!(f, "Please enter a valid email address."),
            FieldIssue::InvalidPhone => write!(f, "Please enter a valid phone number."),
            FieldIssue::NotANumber => write!(f, "Please enter a whole number."),
            FieldIssue::OutOfRange { min, max } => match (min, max) {
                (Some(min), Some(max)) => write!(f, "Please enter a value from {min} to {max}."),
                (Some(min), None) => write!(f, "Please enter a value of at least {min}."),
                (None, Some(max)) => write!(f, "Please enter a value of {max} or less."),
                (None, None) => write!(f, "Value is out of range."),
            },
            FieldIssue::InvalidUrl => write!(f, "Please enter a valid URL."),
            FieldIssue::InvalidChoice => write!(f, "Please select an option."),
            FieldIssue::ConsentRequired => write!(f, "You must confirm this before submitting."),
            FieldIssue::MediaRejected => write!(f, "Please upload a valid video file."),
        }
    }
}

/// A field issue paired with the message shown next to the field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldError {
    pub field: String,
    pub issue: FieldIssue,
    pub message: String,
}

impl FieldError {
    pub fn new(schema: &FieldSchema, issue: FieldIssue) -> Self {
        let message = schema
            .messages
            .get(&issue.kind())
            .cloned()
            .unwrap_or_else(|| issue.to_string());
        Self {
            field: schema.name.clone(),
            issue,
            message,
        }
    }
}

impl fmt::Display for FieldError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

impl std::error::Error for FieldError {}
