use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::warn;

use super::kv::{DraftStore, StoreError};

/// Storage keys owned by one logical form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StorageKeys {
    pub draft: String,
    pub submissions: String,
}

impl StorageKeys {
    pub fn for_namespace(namespace: &str) -> Self {
        Self {
            draft: format!("{namespace}-application-draft"),
            submissions: format!("{namespace}-submissions"),
        }
    }
}

/// Partial field values saved between sessions. Every field is optional.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Draft(IndexMap<String, Value>);

impl Draft {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, field: impl Into<String>, value: Value) {
        self.0.insert(field.into(), value);
    }

    pub fn get(&self, field: &str) -> Option<&Value> {
        self.0.get(field)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &Value)> {
        self.0.iter()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl FromIterator<(String, Value)> for Draft {
    fn from_iter<T: IntoIterator<Item = (String, Value)>>(iter: T) -> Self {
        Self(iter.into_iter().collect())
    }
}

/// Read the draft, treating unreadable or undecodable contents as "no draft".
pub fn load_draft(store: &dyn DraftStore, keys: &StorageKeys) -> Draft {
    match try_load_draft(store, keys) {
        Ok(draft) => draft.unwrap_or_default(),
        Err(err) => {
            warn!(key = %keys.draft, error = %err, "ignoring unreadable draft");
            Draft::default()
        }
    }
}

pub fn try_load_draft(
    store: &dyn DraftStore,
    keys: &StorageKeys,
) -> Result<Option<Draft>, StoreError> {
    let Some(raw) = store.get(&keys.draft)? else {
        return Ok(None);
    };
    serde_json::from_str(&raw)
        .map(Some)
        .map_err(|source| StoreError::Corrupt {
            key: keys.draft.clone(),
            source,
        })
}

/// Overwrite the stored draft wholesale.
pub fn save_draft(
    store: &mut dyn DraftStore,
    keys: &StorageKeys,
    draft: &Draft,
) -> Result<(), StoreError> {
    let encoded = serde_json::to_string(draft).map_err(|source| StoreError::Encode {
        key: keys.draft.clone(),
        source,
    })?;
    store.set(&keys.draft, &encoded)
}

pub fn clear_draft(store: &mut dyn DraftStore, keys: &StorageKeys) -> Result<(), StoreError> {
    store.remove(&keys.draft)
}
