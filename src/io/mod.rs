mod format;
mod input;
mod output;

pub use format::{DocumentFormat, format_from_path};
pub use input::parse_document_str;
pub use output::{OutputDestination, OutputOptions, emit};
