use std::sync::LazyLock;

use indexmap::IndexMap;
use regex::Regex;
use url::Url;

use crate::domain::{FieldKind, FieldSchema, FormSchema};

use super::{
    error::{FieldError, FieldIssue},
    value::{FieldValue, FormValues},
};

pub const DEFAULT_PHONE_MIN_LENGTH: usize = 10;

static SIMPLE_EMAIL: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("valid email pattern"));

static EMAIL_LOCAL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[A-Za-z0-9_'+\-.]*[A-Za-z0-9_+\-]$").expect("valid local-part pattern")
});

static EMAIL_DOMAIN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^([A-Za-z0-9][A-Za-z0-9\-]*\.)+[A-Za-z]{2,}$").expect("valid domain pattern")
});

static PHONE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[+]?[(]?[0-9]{1,4}[)]?[-\s.]?[(]?[0-9]{1,4}[)]?[-\s.]?[0-9]{1,9}$")
        .expect("valid phone pattern")
});

/// Both the loose `local@domain.tld` shape and the stricter structural
/// check must accept the address.
pub fn is_email(input: &str) -> bool {
    SIMPLE_EMAIL.is_match(input) && is_structured_email(input)
}

fn is_structured_email(input: &str) -> bool {
    let Some((local, domain)) = input.rsplit_once('@') else {
        return false;
    };
    !local.starts_with('.')
        && !local.contains("..")
        && EMAIL_LOCAL.is_match(local)
        && EMAIL_DOMAIN.is_match(domain)
}

/// International phone shape; whitespace is ignored.
pub fn is_phone(input: &str) -> bool {
    let compact: String = input.chars().filter(|c| !c.is_whitespace()).collect();
    PHONE.is_match(&compact)
}

pub fn is_url(input: &str) -> bool {
    Url::parse(input).is_ok()
}

fn is_blank(value: Option<&FieldValue>) -> bool {
    value.is_none_or(FieldValue::is_empty)
}

/// Check one field against its schema. Media presence is left to the media gate.
pub fn validate_field(field: &FieldSchema, value: Option<&FieldValue>) -> Result<(), FieldError> {
    if field.kind.is_media() {
        return Ok(());
    }
    if is_blank(value) && !field.required {
        return Ok(());
    }
    check(field, value).map_err(|issue| FieldError::new(field, issue))
}

fn check(field: &FieldSchema, value: Option<&FieldValue>) -> Result<(), FieldIssue> {
    let text = value.and_then(FieldValue::as_text).unwrap_or_default();
    match &field.kind {
        FieldKind::Text => {
            let min = field
                .constraints
                .min_length
                .unwrap_or(usize::from(field.required));
            if text.chars().count() < min {
                return Err(FieldIssue::TooShort { min });
            }
        }
        FieldKind::Email => {
            if !is_email(text) {
                return Err(FieldIssue::InvalidEmail);
            }
        }
        FieldKind::Phone => {
            let min = field
                .constraints
                .min_length
                .unwrap_or(DEFAULT_PHONE_MIN_LENGTH);
            if text.chars().count() < min || !is_phone(text) {
                return Err(FieldIssue::InvalidPhone);
            }
        }
        FieldKind::Number => {
            let number = match value {
                None => return Err(FieldIssue::Required),
                Some(FieldValue::Integer(number)) => *number,
                Some(FieldValue::Text(raw)) if raw.is_empty() => return Err(FieldIssue::Required),
                Some(FieldValue::Text(raw)) => {
                    raw.trim().parse::<i64>().map_err(|_| FieldIssue::NotANumber)?
                }
                Some(_) => return Err(FieldIssue::NotANumber),
            };
            let (min, max) = (field.constraints.min, field.constraints.max);
            if min.is_some_and(|min| number < min) || max.is_some_and(|max| number > max) {
                return Err(FieldIssue::OutOfRange { min, max });
            }
        }
        FieldKind::Url => {
            if !is_url(text) {
                return Err(FieldIssue::InvalidUrl);
            }
        }
        FieldKind::Enum { options } => {
            if !options.iter().any(|choice| choice.value == text) {
                return Err(FieldIssue::InvalidChoice);
            }
        }
        FieldKind::Boolean => {
            let accepted = matches!(value, Some(FieldValue::Bool(true)));
            if field.required && !accepted {
                return Err(FieldIssue::ConsentRequired);
            }
        }
        FieldKind::Media { .. } => {}
    }
    Ok(())
}

/// Whole-form outcome; valid only when no field reports an issue.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ValidationReport {
    errors: IndexMap<String, FieldError>,
}

impl ValidationReport {
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn error(&self, field: &str) -> Option<&FieldError> {
        self.errors.get(field)
    }

    pub fn errors(&self) -> impl Iterator<Item = &FieldError> {
        self.errors.values()
    }

    pub fn len(&self) -> usize {
        self.errors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn into_errors(self) -> IndexMap<String, FieldError> {
        self.errors
    }
}

/// Pure whole-form pass using the same rules as [`validate_field`].
pub fn validate(schema: &FormSchema, values: &FormValues) -> ValidationReport {
    let errors = schema
        .fields
        .iter()
        .filter_map(|field| {
            validate_field(field, values.get(&field.name))
                .err()
                .map(|error| (field.name.clone(), error))
        })
        .collect();
    ValidationReport { errors }
}
