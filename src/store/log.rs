use chrono::{DateTime, SecondsFormat, Utc};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::kv::{DraftStore, StoreError};

/// Record key holding the submission time; no form field may use it.
pub const SUBMITTED_AT_KEY: &str = "submittedAt";

/// Immutable snapshot of one accepted application.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SubmissionRecord {
    #[serde(flatten)]
    values: IndexMap<String, Value>,
    #[serde(rename = "submittedAt")]
    submitted_at: DateTime<Utc>,
}

impl SubmissionRecord {
    pub fn new(mut values: IndexMap<String, Value>, submitted_at: DateTime<Utc>) -> Self {
        values.shift_remove(SUBMITTED_AT_KEY);
        Self {
            values,
            submitted_at,
        }
    }

    pub fn values(&self) -> &IndexMap<String, Value> {
        &self.values
    }

    pub fn value(&self, field: &str) -> Option<&Value> {
        self.values.get(field)
    }

    pub fn submitted_at(&self) -> DateTime<Utc> {
        self.submitted_at
    }

    pub fn submitted_at_iso(&self) -> String {
        self.submitted_at.to_rfc3339_opts(SecondsFormat::Millis, true)
    }
}

/// Append-only sequence of records stored as one JSON array under a single key.
#[derive(Debug, Clone)]
pub struct SubmissionLog {
    key: String,
}

impl SubmissionLog {
    pub fn new(key: impl Into<String>) -> Self {
        Self { key: key.into() }
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn read_all(&self, store: &dyn DraftStore) -> Result<Vec<SubmissionRecord>, StoreError> {
        let Some(raw) = store.get(&self.key)? else {
            return Ok(Vec::new());
        };
        serde_json::from_str(&raw).map_err(|source| StoreError::Corrupt {
            key: self.key.clone(),
            source,
        })
    }

    /// Append `record`; the stored array is untouched unless the write succeeds.
    pub fn append(
        &self,
        store: &mut dyn DraftStore,
        record: &SubmissionRecord,
    ) -> Result<usize, StoreError> {
        let mut records = self.read_all(store)?;
        records.push(record.clone());
        let encoded = serde_json::to_string(&records).map_err(|source| StoreError::Encode {
            key: self.key.clone(),
            source,
        })?;
        store.set(&self.key, &encoded)?;
        Ok(records.len())
    }
}
