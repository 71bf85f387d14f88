use crate::domain::ports::KeyValueStore;
use crate::utils::error::{PersistenceError, ReportError, Result};
use std::collections::BTreeMap;
use std::collections::HashMap;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;
use url::Url;

/// Key-value store backed by one JSON object file per origin.
#[derive(Debug, Clone)]
pub struct FileKeyValueStore {
    path: PathBuf,
}

impl FileKeyValueStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// `http://localhost:5173` -> `<state_dir>/http_localhost_5173.json`
    pub fn for_origin(state_dir: impl AsRef<Path>, origin: &str) -> Result<Self> {
        let url = Url::parse(origin).map_err(|e| ReportError::InvalidConfigValueError {
            field: "state.origin".to_string(),
            value: origin.to_string(),
            reason: format!("Invalid origin: {}", e),
        })?;
        let file_name: String = url
            .origin()
            .ascii_serialization()
            .chars()
            .map(|c| if c.is_ascii_alphanumeric() { c } else { '_' })
            .collect::<String>()
            .split('_')
            .filter(|part| !part.is_empty())
            .collect::<Vec<_>>()
            .join("_");
        Ok(Self::new(
            state_dir.as_ref().join(format!("{}.json", file_name)),
        ))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn load(&self) -> std::result::Result<BTreeMap<String, String>, String> {
        match fs::read_to_string(&self.path) {
            Ok(content) => serde_json::from_str(&content).map_err(|e| e.to_string()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(BTreeMap::new()),
            Err(e) => Err(e.to_string()),
        }
    }
}

impl KeyValueStore for FileKeyValueStore {
    fn get_item(&self, key: &str) -> std::result::Result<Option<String>, PersistenceError> {
        let entries = self.load().map_err(|reason| PersistenceError::Read {
            key: key.to_string(),
            reason,
        })?;
        Ok(entries.get(key).cloned())
    }

    fn set_item(&self, key: &str, value: &str) -> std::result::Result<(), PersistenceError> {
        let write_error = |reason: String| PersistenceError::Write {
            key: key.to_string(),
            reason,
        };

        // a corrupt file is left alone rather than clobbered
        let mut entries = self.load().map_err(write_error)?;
        entries.insert(key.to_string(), value.to_string());

        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent).map_err(|e| write_error(e.to_string()))?;
        }
        let content = serde_json::to_string_pretty(&entries).map_err(|e| write_error(e.to_string()))?;
        fs::write(&self.path, content).map_err(|e| write_error(e.to_string()))
    }
}

/// In-process store with switchable failures.
#[derive(Debug, Default)]
pub struct MemoryKeyValueStore {
    entries: Mutex<HashMap<String, String>>,
    fail_reads: AtomicBool,
    fail_writes: AtomicBool,
}

impl MemoryKeyValueStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_entry(key: &str, value: &str) -> Self {
        let store = Self::new();
        if let Ok(mut entries) = store.entries.lock() {
            entries.insert(key.to_string(), value.to_string());
        }
        store
    }

    pub fn fail_reads(&self, fail: bool) {
        self.fail_reads.store(fail, Ordering::SeqCst);
    }

    pub fn fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }
}

impl KeyValueStore for MemoryKeyValueStore {
    fn get_item(&self, key: &str) -> std::result::Result<Option<String>, PersistenceError> {
        let read_error = |reason: &str| PersistenceError::Read {
            key: key.to_string(),
            reason: reason.to_string(),
        };
        if self.fail_reads.load(Ordering::SeqCst) {
            return Err(read_error("store unavailable"));
        }
        let entries = self.entries.lock().map_err(|_| read_error("lock poisoned"))?;
        Ok(entries.get(key).cloned())
    }

    fn set_item(&self, key: &str, value: &str) -> std::result::Result<(), PersistenceError> {
        let write_error = |reason: &str| PersistenceError::Write {
            key: key.to_string(),
            reason: reason.to_string(),
        };
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(write_error("quota exceeded"));
        }
        let mut entries = self.entries.lock().map_err(|_| write_error("lock poisoned"))?;
        entries.insert(key.to_string(), value.to_string());
        Ok(())
    }
}
