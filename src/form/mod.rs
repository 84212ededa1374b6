mod autosave;
mod error;
mod session;
mod validation;
mod value;

pub use autosave::{AutosaveScheduler, DEFAULT_QUIET_PERIOD};
pub use error::{FieldError, FieldIssue};
pub use session::{FormSession, MediaFeedback, ProbeJob, ProbeResult, ProbeTicket};
pub use validation::{
    DEFAULT_PHONE_MIN_LENGTH, ValidationReport, is_email, is_phone, is_url, validate,
    validate_field,
};
pub use value::{FieldValue, FormValues};
