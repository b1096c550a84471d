//! Recent-search history: a small, deduplicated, most-recent-first list
//! persisted after every change.

use std::{
    collections::HashMap,
    fmt::Debug,
    fs,
    path::{Path, PathBuf},
    sync::{Arc, Mutex},
};

use directories::ProjectDirs;
use thiserror::Error;
use tracing::{debug, warn};

use crate::model::LocationRecord;

/// Number of locations kept in the history.
pub const HISTORY_CAPACITY: usize = 5;

/// Key under which the serialized list is stored.
pub const HISTORY_KEY: &str = "weatherHistory";

#[derive(Debug, Error)]
pub enum HistoryError {
    #[error("failed to read history from {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to write history to {}: {source}", path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("stored history is malformed: {0}")]
    Malformed(#[from] serde_json::Error),

    #[error("failed to encode history: {0}")]
    Encode(#[source] serde_json::Error),

    #[error("could not determine platform data directory")]
    NoDataDir,
}

/// Move `new_entry` to the front of `history`, dropping any entry with the
/// same name and everything past `capacity`.
pub fn record_visit(
    mut history: Vec<LocationRecord>,
    new_entry: LocationRecord,
    capacity: usize,
) -> Vec<LocationRecord> {
    history.retain(|entry| entry.name != new_entry.name);
    history.insert(0, new_entry);
    history.truncate(capacity);
    history
}

/// Persistence backend for the history list.
pub trait HistoryStore: Send + Debug {
    /// Returns an empty list when nothing has been stored yet.
    fn load(&self) -> Result<Vec<LocationRecord>, HistoryError>;

    /// Replaces the stored list.
    fn save(&self, history: &[LocationRecord]) -> Result<(), HistoryError>;
}

impl<S: HistoryStore + ?Sized> HistoryStore for Box<S> {
    fn load(&self) -> Result<Vec<LocationRecord>, HistoryError> {
        (**self).load()
    }

    fn save(&self, history: &[LocationRecord]) -> Result<(), HistoryError> {
        (**self).save(history)
    }
}

/// JSON document on disk holding the list under [`HISTORY_KEY`].
#[derive(Debug, Clone)]
pub struct JsonFileStore {
    path: PathBuf,
}

impl JsonFileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Store in the platform data directory.
    pub fn in_data_dir() -> Result<Self, HistoryError> {
        let dirs = ProjectDirs::from("dev", "weather-task", "weather-cli")
            .ok_or(HistoryError::NoDataDir)?;

        Ok(Self::new(dirs.data_dir().join("history.json")))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl HistoryStore for JsonFileStore {
    fn load(&self) -> Result<Vec<LocationRecord>, HistoryError> {
        if !self.path.exists() {
            return Ok(Vec::new());
        }

        let contents = fs::read_to_string(&self.path).map_err(|source| HistoryError::Read {
            path: self.path.clone(),
            source,
        })?;

        let mut doc: HashMap<String, Vec<LocationRecord>> = serde_json::from_str(&contents)?;
        Ok(doc.remove(HISTORY_KEY).unwrap_or_default())
    }

    fn save(&self, history: &[LocationRecord]) -> Result<(), HistoryError> {
        let write_err = |source| HistoryError::Write {
            path: self.path.clone(),
            source,
        };

        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent).map_err(write_err)?;
        }

        let doc = HashMap::from([(HISTORY_KEY, history)]);
        let json = serde_json::to_string_pretty(&doc).map_err(HistoryError::Encode)?;
        fs::write(&self.path, json).map_err(write_err)
    }
}

/// In-memory store. Clones share the same contents.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    inner: Arc<Mutex<Option<Vec<LocationRecord>>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_entries(entries: Vec<LocationRecord>) -> Self {
        Self {
            inner: Arc::new(Mutex::new(Some(entries))),
        }
    }

    /// Last saved list, if anything was saved.
    pub fn snapshot(&self) -> Option<Vec<LocationRecord>> {
        self.inner.lock().ok().and_then(|guard| guard.clone())
    }
}

impl HistoryStore for MemoryStore {
    fn load(&self) -> Result<Vec<LocationRecord>, HistoryError> {
        Ok(self.snapshot().unwrap_or_default())
    }

    fn save(&self, history: &[LocationRecord]) -> Result<(), HistoryError> {
        if let Ok(mut guard) = self.inner.lock() {
            *guard = Some(history.to_vec());
        }
        Ok(())
    }
}

/// Owner of the recent-search list.
#[derive(Debug)]
pub struct History<S: HistoryStore> {
    store: S,
    capacity: usize,
    entries: Vec<LocationRecord>,
}

impl<S: HistoryStore> History<S> {
    /// Load the stored list once. Unreadable data starts an empty history.
    /// A capacity of zero is raised to one so visits are never dropped.
    pub fn open(store: S, capacity: usize) -> Self {
        let capacity = capacity.max(1);
        let mut entries = match store.load() {
            Ok(entries) => entries,
            Err(err) => {
                warn!(error = %err, "ignoring unreadable search history");
                Vec::new()
            }
        };
        entries.truncate(capacity);
        debug!(count = entries.len(), "search history loaded");

        Self {
            store,
            capacity,
            entries,
        }
    }

    pub fn entries(&self) -> &[LocationRecord] {
        &self.entries
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Record a visit and persist the whole list. Returns the new list.
    pub fn visit(&mut self, entry: LocationRecord) -> &[LocationRecord] {
        let entries = std::mem::take(&mut self.entries);
        self.entries = record_visit(entries, entry, self.capacity);
        self.persist();
        &self.entries
    }

    pub fn clear(&mut self) {
        self.entries.clear();
        self.persist();
    }

    fn persist(&self) {
        if let Err(err) = self.store.save(&self.entries) {
            warn!(error = %err, "failed to save search history");
        }
    }
}
