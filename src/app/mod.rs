mod editor;
mod entry_form;
pub(crate) mod input;
mod options;
pub(crate) mod runtime;
mod status;
mod terminal;

pub use entry_form::EntryForm;
pub use options::{DEFAULT_RECIPIENT, DEFAULT_SUBJECT, FormOptions};
