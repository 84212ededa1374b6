use indexmap::IndexMap;
use serde_json::{Number, Value};

use crate::{
    domain::{FieldKind, FormSchema},
    media::MediaFile,
    store::Draft,
};

#[derive(Debug, Clone, PartialEq)]
pub enum FieldValue {
    Text(String),
    Integer(i64),
    Bool(bool),
    Media(MediaFile),
}

impl FieldValue {
    pub fn text(value: impl Into<String>) -> Self {
        FieldValue::Text(value.into())
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            FieldValue::Text(text) => Some(text),
            _ => None,
        }
    }

    pub fn as_media(&self) -> Option<&MediaFile> {
        match self {
            FieldValue::Media(file) => Some(file),
            _ => None,
        }
    }

    pub fn is_empty(&self) -> bool {
        matches!(self, FieldValue::Text(text) if text.is_empty())
    }

    /// JSON form used in drafts and submission records. Media has none.
    pub fn to_json(&self) -> Option<Value> {
        match self {
            FieldValue::Text(text) => Some(Value::String(text.clone())),
            FieldValue::Integer(number) => Some(Value::Number(Number::from(*number))),
            FieldValue::Bool(flag) => Some(Value::Bool(*flag)),
            FieldValue::Media(_) => None,
        }
    }

    /// Rebuild a value of `kind` from stored JSON, if the shapes agree.
    pub fn from_json(kind: &FieldKind, value: &Value) -> Option<Self> {
        match (kind, value) {
            (FieldKind::Media { .. }, _) | (_, Value::Null) => None,
            (FieldKind::Number, Value::Number(number)) => number.as_i64().map(FieldValue::Integer),
            (FieldKind::Number, Value::String(text)) => Some(FieldValue::parse_number(text)),
            (FieldKind::Boolean, Value::Bool(flag)) => Some(FieldValue::Bool(*flag)),
            (FieldKind::Boolean, _) => None,
            (_, Value::String(text)) => Some(FieldValue::Text(text.clone())),
            _ => None,
        }
    }

    /// Interpret raw text typed into a field of `kind`.
    pub fn from_input(kind: &FieldKind, input: &str) -> Option<Self> {
        if input.is_empty() {
            return None;
        }
        match kind {
            FieldKind::Number => Some(FieldValue::parse_number(input)),
            FieldKind::Boolean => match input {
                "true" | "yes" => Some(FieldValue::Bool(true)),
                "false" | "no" => Some(FieldValue::Bool(false)),
                _ => Some(FieldValue::Text(input.to_string())),
            },
            _ => Some(FieldValue::Text(input.to_string())),
        }
    }

    fn parse_number(text: &str) -> Self {
        text.trim()
            .parse::<i64>()
            .map(FieldValue::Integer)
            .unwrap_or_else(|_| FieldValue::Text(text.to_string()))
    }

    pub fn display(&self) -> String {
        match self {
            FieldValue::Text(text) => text.clone(),
            FieldValue::Integer(number) => number.to_string(),
            FieldValue::Bool(true) => "Yes".to_string(),
            FieldValue::Bool(false) => "No".to_string(),
            FieldValue::Media(file) => file.file_name.clone(),
        }
    }
}

/// Current values of a session, keyed by field name.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FormValues(IndexMap<String, FieldValue>);

impl FormValues {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, field: &str) -> Option<&FieldValue> {
        self.0.get(field)
    }

    pub fn set(&mut self, field: impl Into<String>, value: FieldValue) -> Option<FieldValue> {
        self.0.insert(field.into(), value)
    }

    pub fn remove(&mut self, field: &str) -> Option<FieldValue> {
        self.0.shift_remove(field)
    }

    pub fn clear(&mut self) {
        self.0.clear();
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &FieldValue)> {
        self.0.iter()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Seed values from a draft, skipping unknown fields and mismatched shapes.
    pub fn from_draft(schema: &FormSchema, draft: &Draft) -> Self {
        let mut values = Self::new();
        for field in &schema.fields {
            if let Some(stored) = draft.get(&field.name)
                && let Some(value) = FieldValue::from_json(&field.kind, stored)
            {
                values.set(field.name.clone(), value);
            }
        }
        values
    }

    /// Snapshot of the persistable subset, in schema order.
    pub fn to_draft(&self, schema: &FormSchema) -> Draft {
        schema
            .fields
            .iter()
            .filter(|field| field.persists_in_draft())
            .filter_map(|field| {
                let value = self.get(&field.name)?.to_json()?;
                Some((field.name.clone(), value))
            })
            .collect()
    }
}

impl FromIterator<(String, FieldValue)> for FormValues {
    fn from_iter<T: IntoIterator<Item = (String, FieldValue)>>(iter: T) -> Self {
        Self(iter.into_iter().collect())
    }
}
