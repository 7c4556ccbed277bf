//! Persisted key/value blob store abstraction
//!
//! The platform store is modeled as a tiny synchronous key/value surface
//! over JSON values. Reads and writes are treated as atomic and always
//! available; failures are logged and recovered as "nothing there".

use anyhow::{Context, Result};
use serde_json::Value;
use std::collections::HashMap;
use std::fs;
use std::path::PathBuf;
use tracing::{error, info, warn};

pub trait SettingsStore {
    fn get(&self, key: &str) -> Option<Value>;
    fn set(&mut self, key: &str, value: Value);
    fn remove(&mut self, key: &str);
}

/// In-memory store for tests and hosts that persist elsewhere.
#[derive(Debug, Default)]
pub struct MemorySettings {
    values: HashMap<String, Value>,
}

impl MemorySettings {
    pub fn new() -> Self {
        Self::default()
    }
}

impl SettingsStore for MemorySettings {
    fn get(&self, key: &str) -> Option<Value> {
        self.values.get(key).cloned()
    }

    fn set(&mut self, key: &str, value: Value) {
        self.values.insert(key.to_string(), value);
    }

    fn remove(&mut self, key: &str) {
        self.values.remove(key);
    }
}

/// File-backed store: one JSON document, loaded once on open and written
/// through on every mutation.
#[derive(Debug)]
pub struct FileSettings {
    path: PathBuf,
    values: HashMap<String, Value>,
}

impl FileSettings {
    /// Open the store at an explicit path. A missing file starts empty; an
    /// unreadable or unparseable file starts empty with a warning.
    pub fn open(path: PathBuf) -> Self {
        let values = match Self::read_document(&path) {
            Ok(Some(values)) => {
                info!(path = %path.display(), keys = values.len(), "Loaded settings store");
                values
            }
            Ok(None) => HashMap::new(),
            Err(e) => {
                warn!(path = %path.display(), error = %e, "Failed to load settings store, starting empty");
                HashMap::new()
            }
        };
        Self { path, values }
    }

    /// Open the store at the platform config directory for the given
    /// application directory name.
    pub fn for_app(app_dir: &str) -> Self {
        let mut path = dirs::config_dir().unwrap_or_else(|| PathBuf::from("."));
        path.push(app_dir);
        path.push("overrides.json");
        Self::open(path)
    }

    fn read_document(path: &PathBuf) -> Result<Option<HashMap<String, Value>>> {
        if !path.exists() {
            return Ok(None);
        }
        let contents = fs::read_to_string(path)
            .with_context(|| format!("Failed to read settings from {}", path.display()))?;
        let values = serde_json::from_str(&contents)
            .with_context(|| format!("Failed to parse settings from {}", path.display()))?;
        Ok(Some(values))
    }

    fn flush(&self) {
        if let Err(e) = self.try_flush() {
            error!(path = %self.path.display(), error = %e, "Failed to write settings store");
        }
    }

    fn try_flush(&self) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create settings directory {}", parent.display()))?;
        }
        let contents = serde_json::to_string_pretty(&self.values)
            .context("Failed to serialize settings store")?;
        fs::write(&self.path, contents)
            .with_context(|| format!("Failed to write settings to {}", self.path.display()))?;
        Ok(())
    }
}

impl SettingsStore for FileSettings {
    fn get(&self, key: &str) -> Option<Value> {
        self.values.get(key).cloned()
    }

    fn set(&mut self, key: &str, value: Value) {
        self.values.insert(key.to_string(), value);
        self.flush();
    }

    fn remove(&mut self, key: &str) {
        if self.values.remove(key).is_some() {
            self.flush();
        }
    }
}
