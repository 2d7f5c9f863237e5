//! # Storage Module
//!
//! String key-value persistence shared by the statistics log and the
//! note-quiz preferences. Callers get a [`KeyValueStore`] injected; nothing
//! in the core reaches for a global store.
//!
//! ## Features
//! - [`MemoryStore`] for tests and ephemeral sessions
//! - [`JsonFileStore`] persisting every key into one pretty-printed JSON file

use anyhow::{Context, Result};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// Minimal string key-value contract.
///
/// Writes never fail from the caller's point of view; a backend that cannot
/// persist logs the failure and keeps serving the value from memory.
pub trait KeyValueStore {
    fn get(&self, key: &str) -> Option<String>;
    fn set(&mut self, key: &str, value: String);
    fn remove(&mut self, key: &str);
}

/// Volatile in-memory store.
#[derive(Debug, Default, Clone)]
pub struct MemoryStore {
    entries: BTreeMap<String, String>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Option<String> {
        self.entries.get(key).cloned()
    }

    fn set(&mut self, key: &str, value: String) {
        self.entries.insert(key.to_string(), value);
    }

    fn remove(&mut self, key: &str) {
        self.entries.remove(key);
    }
}

/// Store backed by a single JSON object on disk.
///
/// The whole file is rewritten after every change, so each `set` or
/// `remove` is durable as soon as it returns.
#[derive(Debug)]
pub struct JsonFileStore {
    path: PathBuf,
    entries: BTreeMap<String, String>,
}

impl JsonFileStore {
    /// Opens the store at `path`, starting empty if the file does not exist.
    ///
    /// # Errors
    /// * The file exists but cannot be read or is not a JSON object of strings
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        let entries = if path.exists() {
            let data = fs::read_to_string(&path)
                .with_context(|| format!("reading store {}", path.display()))?;
            serde_json::from_str(&data)
                .with_context(|| format!("parsing store {}", path.display()))?
        } else {
            debug!(path = %path.display(), "store file missing, starting empty");
            BTreeMap::new()
        };
        Ok(JsonFileStore { path, entries })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn flush(&self) -> Result<()> {
        let json = serde_json::to_string_pretty(&self.entries)?;
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }
        fs::write(&self.path, json)
            .with_context(|| format!("writing store {}", self.path.display()))?;
        Ok(())
    }

    fn flush_or_warn(&self) {
        if let Err(e) = self.flush() {
            warn!(error = %e, "failed to persist store, keeping value in memory");
        }
    }
}

impl KeyValueStore for JsonFileStore {
    fn get(&self, key: &str) -> Option<String> {
        self.entries.get(key).cloned()
    }

    fn set(&mut self, key: &str, value: String) {
        self.entries.insert(key.to_string(), value);
        self.flush_or_warn();
    }

    fn remove(&mut self, key: &str) {
        if self.entries.remove(key).is_some() {
            self.flush_or_warn();
        }
    }
}
