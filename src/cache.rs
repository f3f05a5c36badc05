use anyhow::{Context, Result};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use crate::storage::read_if_found;

pub const MAINTENANCE_SCHEDULE_KEY: &str = "maintenance-schedule";
pub const RECOMMENDATIONS_KEY: &str = "recommendations";
pub const RECOMMENDATION_STATE_KEY: &str = "recommendation-state";

/// Opaque key-value store for reconciled results. Entries are replaced wholesale; nothing expires.
pub trait KeyValueCache {
    fn get(&self, key: &str) -> Option<Value>;
    fn set(&mut self, key: &str, value: Value) -> Result<()>;

    fn get_as<T: DeserializeOwned>(&self, key: &str) -> Option<T>
    where
        Self: Sized,
    {
        let value = self.get(key)?;
        match serde_json::from_value(value) {
            Ok(decoded) => Some(decoded),
            Err(e) => {
                log::warn!("Ignoring unreadable cache entry '{}': {}", key, e);
                None
            }
        }
    }

    fn put<T: Serialize>(&mut self, key: &str, value: &T) -> Result<()>
    where
        Self: Sized,
    {
        let value = serde_json::to_value(value)
            .with_context(|| format!("Error serialising cache entry '{}'", key))?;
        self.set(key, value)
    }
}

#[derive(Debug, Default)]
pub struct MemoryCache {
    entries: BTreeMap<String, Value>,
}

impl MemoryCache {
    pub fn new() -> Self {
        Self::default()
    }
}

impl KeyValueCache for MemoryCache {
    fn get(&self, key: &str) -> Option<Value> {
        self.entries.get(key).cloned()
    }

    fn set(&mut self, key: &str, value: Value) -> Result<()> {
        self.entries.insert(key.to_string(), value);
        Ok(())
    }
}

/// A single JSON object on disk, rewritten on every `set`.
#[derive(Debug)]
pub struct FileCache {
    path: PathBuf,
    entries: BTreeMap<String, Value>,
}

impl FileCache {
    pub fn open(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        let entries = match read_if_found(&path)? {
            Some(content) => serde_json::from_str(&content)
                .with_context(|| format!("Error de-serialising cache file {:?}", path))?,
            None => BTreeMap::new(),
        };
        Ok(Self { path, entries })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn flush(&self) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Error ensuring path {:?} exists", parent))?;
        }
        let content = serde_json::to_string_pretty(&self.entries)?;
        std::fs::write(&self.path, content).with_context(|| "Error writing cache file")
    }
}

impl KeyValueCache for FileCache {
    fn get(&self, key: &str) -> Option<Value> {
        self.entries.get(key).cloned()
    }

    fn set(&mut self, key: &str, value: Value) -> Result<()> {
        self.entries.insert(key.to_string(), value);
        self.flush()
    }
}
