mod draft;
mod kv;
mod log;

pub use draft::{Draft, StorageKeys, clear_draft, load_draft, save_draft, try_load_draft};
pub use kv::{DraftStore, FileStore, MemoryStore, StoreError};
pub use log::{SUBMITTED_AT_KEY, SubmissionLog, SubmissionRecord};
