#![deny(rust_2018_idioms)]

mod app;
pub mod countdown;
pub mod domain;
pub mod form;
pub mod io;
pub mod media;
mod presentation;
pub mod store;
pub mod submit;

pub use app::{DEFAULT_RECIPIENT, DEFAULT_SUBJECT, EntryForm, FormOptions};

pub mod prelude {
    pub use super::{
        EntryForm, FormOptions,
        domain::{FieldKind, FieldSchema, FormSchema, Variant},
        form::{AutosaveScheduler, FieldValue, FormSession},
        store::{DraftStore, FileStore, MemoryStore, StorageKeys},
        submit::{SubmissionPipeline, SubmitOutcome},
    };
}

#[cfg(test)]
mod tests;
