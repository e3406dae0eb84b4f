//! Persisted table-selection state
//!
//! The list detail table remembers the last selected plan digest across
//! rebuilds. The storage key is part of the external contract: older console
//! builds wrote the same key, and selection must restore across upgrades.

use std::path::PathBuf;

use dashmap::DashMap;
use serde_json::Value;

use crate::utils::ApiResult;

/// Storage key for the detail table's selected plan digest. Do not change.
pub const LIST_DETAIL_SELECTED_KEY: &str = "topsql.list_detail_table_selected_key";

/// Key/value storage collaborator for per-widget UI state.
pub trait SelectionStore: Send + Sync {
    fn get(&self, key: &str) -> Option<String>;

    fn set(&self, key: &str, value: &str) -> ApiResult<()>;
}

/// Volatile store; state lives for the process lifetime only.
#[derive(Default)]
pub struct MemorySelectionStore {
    entries: DashMap<String, String>,
}

impl MemorySelectionStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl SelectionStore for MemorySelectionStore {
    fn get(&self, key: &str) -> Option<String> {
        self.entries.get(key).map(|entry| entry.value().clone())
    }

    fn set(&self, key: &str, value: &str) -> ApiResult<()> {
        self.entries.insert(key.to_string(), value.to_string());
        Ok(())
    }
}

/// JSON-file-backed store. Entries are cached in memory and the whole map is
/// rewritten on every set; the state file is tiny.
pub struct FileSelectionStore {
    path: PathBuf,
    entries: DashMap<String, String>,
}

impl FileSelectionStore {
    pub fn load(path: impl Into<PathBuf>) -> ApiResult<Self> {
        let path = path.into();
        let entries = DashMap::new();

        match std::fs::read_to_string(&path) {
            Ok(content) => {
                let parsed: Value = serde_json::from_str(&content).unwrap_or_else(|e| {
                    tracing::warn!(
                        "Selection state file {} is corrupt ({}); starting empty",
                        path.display(),
                        e
                    );
                    Value::Null
                });
                if let Some(map) = parsed.as_object() {
                    for (key, value) in map {
                        if let Some(value) = value.as_str() {
                            entries.insert(key.clone(), value.to_string());
                        }
                    }
                }
            },
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {},
            Err(e) => return Err(e.into()),
        }

        Ok(Self { path, entries })
    }

    fn persist(&self) -> ApiResult<()> {
        let map: serde_json::Map<String, Value> = self
            .entries
            .iter()
            .map(|entry| (entry.key().clone(), Value::String(entry.value().clone())))
            .collect();
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(&self.path, serde_json::to_vec_pretty(&Value::Object(map))?)?;
        Ok(())
    }
}

impl SelectionStore for FileSelectionStore {
    fn get(&self, key: &str) -> Option<String> {
        self.entries.get(key).map(|entry| entry.value().clone())
    }

    fn set(&self, key: &str, value: &str) -> ApiResult<()> {
        self.entries.insert(key.to_string(), value.to_string());
        self.persist()
    }
}
