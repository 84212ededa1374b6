use std::{collections::HashSet, fs, path::Path};

use anyhow::{Context, Result};
use jsonschema::validator_for;
use serde_json::Value;
use thiserror::Error;

use crate::{
    io::{format_from_path, parse_document_str},
    store::SUBMITTED_AT_KEY,
};

use super::schema::{FieldKind, FormSchema};

#[derive(Debug, Error)]
pub enum SchemaError {
    #[error("failed to compile form meta-schema: {0}")]
    MetaSchema(String),

    #[error("form document does not match the form meta-schema: {}", issues.join("; "))]
    Invalid { issues: Vec<String> },

    #[error("failed to decode form document: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("field `{0}` is declared more than once")]
    DuplicateField(String),

    #[error("field name `{0}` is reserved for submission records")]
    ReservedField(String),

    #[error("enum field `{0}` has no options")]
    EmptyChoices(String),

    #[error("field `{field}` has min {min} greater than max {max}")]
    InvertedRange { field: String, min: i64, max: i64 },
}

/// JSON Schema every form document must satisfy.
pub fn meta_schema() -> Value {
    let root = schemars::schema_for!(FormSchema);
    serde_json::to_value(root).unwrap_or(Value::Null)
}

/// Parse a form document into the internal `FormSchema`.
pub fn parse_form_schema(value: &Value) -> Result<FormSchema, SchemaError> {
    let meta = meta_schema();
    let validator =
        validator_for(&meta).map_err(|err| SchemaError::MetaSchema(err.to_string()))?;
    let issues = validator
        .iter_errors(value)
        .map(|error| {
            let pointer = error.instance_path.to_string();
            let prefix = if pointer.is_empty() {
                "<root>".to_string()
            } else {
                pointer
            };
            format!("{prefix}: {error}")
        })
        .collect::<Vec<_>>();
    if !issues.is_empty() {
        return Err(SchemaError::Invalid { issues });
    }

    let schema: FormSchema = serde_json::from_value(value.clone())?;
    check_consistency(&schema)?;
    Ok(schema)
}

/// Read a form document from disk, picking the format from the extension.
pub fn load_form_schema(path: &Path) -> Result<FormSchema> {
    let contents = fs::read_to_string(path)
        .with_context(|| format!("failed to read form schema {}", path.display()))?;
    let format = format_from_path(path).unwrap_or_default();
    let value = parse_document_str(&contents, format)?;
    parse_form_schema(&value)
        .with_context(|| format!("invalid form schema {}", path.display()))
}

fn check_consistency(schema: &FormSchema) -> Result<(), SchemaError> {
    let mut seen = HashSet::new();
    for field in &schema.fields {
        if field.name == SUBMITTED_AT_KEY {
            return Err(SchemaError::ReservedField(field.name.clone()));
        }
        if !seen.insert(field.name.as_str()) {
            return Err(SchemaError::DuplicateField(field.name.clone()));
        }
        if let FieldKind::Enum { options } = &field.kind
            && options.is_empty()
        {
            return Err(SchemaError::EmptyChoices(field.name.clone()));
        }
        if let (Some(min), Some(max)) = (field.constraints.min, field.constraints.max)
            && min > max
        {
            return Err(SchemaError::InvertedRange {
                field: field.name.clone(),
                min,
                max,
            });
        }
    }
    Ok(())
}
