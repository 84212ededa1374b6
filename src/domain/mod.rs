mod parser;
pub mod presets;
mod schema;

pub use parser::{SchemaError, load_form_schema, meta_schema, parse_form_schema};
pub use presets::Variant;
pub use schema::{Choice, Constraints, FieldKind, FieldSchema, FormSchema, IssueKind};
