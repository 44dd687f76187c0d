//! Record persistence for alerts, clients and tickets.
//!
//! The pure computations never touch a store: services here load a snapshot,
//! hand it to `analysis`/`alert`, and write back whole collections.

use serde::Serialize;
use serde::de::DeserializeOwned;
use std::fs;
use std::io;
use std::marker::PhantomData;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use crate::logging::{self, Component};
use crate::model::{Alert, MonitorError};

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("I/O error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("malformed records in {path}: {source}")]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error(transparent)]
    Rejected(#[from] MonitorError),
}

/// A whole-collection record store.
pub trait RecordStore<T> {
    fn load(&self) -> Result<Vec<T>, StoreError>;
    fn save(&self, records: &[T]) -> Result<(), StoreError>;
}

// ---------------------------------------------------------------------------
// In-memory store
// ---------------------------------------------------------------------------

#[derive(Debug)]
pub struct MemoryStore<T> {
    records: Mutex<Vec<T>>,
}

impl<T> Default for MemoryStore<T> {
    fn default() -> Self {
        Self::new(Vec::new())
    }
}

impl<T> MemoryStore<T> {
    pub fn new(records: Vec<T>) -> Self {
        Self {
            records: Mutex::new(records),
        }
    }
}

impl<T: Clone> RecordStore<T> for MemoryStore<T> {
    fn load(&self) -> Result<Vec<T>, StoreError> {
        let guard = self.records.lock().unwrap_or_else(|e| e.into_inner());
        Ok(guard.clone())
    }

    fn save(&self, records: &[T]) -> Result<(), StoreError> {
        let mut guard = self.records.lock().unwrap_or_else(|e| e.into_inner());
        *guard = records.to_vec();
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// JSON file store
// ---------------------------------------------------------------------------

/// Stores one collection as a pretty-printed JSON array. A missing file
/// loads as an empty collection.
#[derive(Debug, Clone)]
pub struct JsonFileStore<T> {
    path: PathBuf,
    _records: PhantomData<fn() -> T>,
}

impl<T> JsonFileStore<T> {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            _records: PhantomData,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn io_err(&self, source: io::Error) -> StoreError {
        StoreError::Io {
            path: self.path.clone(),
            source,
        }
    }
}

impl<T: Serialize + DeserializeOwned> RecordStore<T> for JsonFileStore<T> {
    fn load(&self) -> Result<Vec<T>, StoreError> {
        let text = match fs::read_to_string(&self.path) {
            Ok(text) => text,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(self.io_err(e)),
        };
        serde_json::from_str(&text).map_err(|source| StoreError::Json {
            path: self.path.clone(),
            source,
        })
    }

    fn save(&self, records: &[T]) -> Result<(), StoreError> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|e| self.io_err(e))?;
        }
        let json = serde_json::to_string_pretty(records).map_err(|source| StoreError::Json {
            path: self.path.clone(),
            source,
        })?;
        // write-then-rename so a crash never leaves a half-written file
        let tmp = self.path.with_extension("json.tmp");
        fs::write(&tmp, json).map_err(|e| self.io_err(e))?;
        fs::rename(&tmp, &self.path).map_err(|e| self.io_err(e))?;
        logging::debug(
            Component::Store,
            None,
            &format!("saved {} records to {}", records.len(), self.path.display()),
        );
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Alert log
// ---------------------------------------------------------------------------

/// Append-only alert collection. Alerts are never edited or removed here.
pub struct AlertLog<S> {
    store: S,
}

impl<S: RecordStore<Alert>> AlertLog<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    /// Appends `alert`, rejecting an id that is already logged.
    pub fn append(&self, alert: Alert) -> Result<(), StoreError> {
        let mut alerts = self.store.load()?;
        if alerts.iter().any(|a| a.id == alert.id) {
            return Err(MonitorError::DuplicateId(alert.id).into());
        }
        logging::info(
            Component::Store,
            Some(&alert.owner_name),
            &format!("{} alert logged: {}", alert.alert_type, alert.message),
        );
        alerts.push(alert);
        self.store.save(&alerts)
    }

    /// Appends every alert whose id is not yet logged; returns how many were added.
    pub fn extend(&self, incoming: Vec<Alert>) -> Result<usize, StoreError> {
        let mut alerts = self.store.load()?;
        let before = alerts.len();
        for alert in incoming {
            if !alerts.iter().any(|a| a.id == alert.id) {
                alerts.push(alert);
            }
        }
        let added = alerts.len() - before;
        if added > 0 {
            self.store.save(&alerts)?;
        }
        Ok(added)
    }

    /// Current alerts, as an owned snapshot for the pure computations.
    pub fn snapshot(&self) -> Result<Vec<Alert>, StoreError> {
        self.store.load()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::AlertType;
    use chrono::{TimeZone, Utc};

    fn alert(id: &str) -> Alert {
        Alert {
            id: id.to_string(),
            alert_type: AlertType::Warning,
            message: "Maintenance due for Plant A".to_string(),
            timestamp: Utc.with_ymd_and_hms(2025, 3, 15, 9, 0, 0).unwrap(),
            owner_id: "1".to_string(),
            owner_name: "Sunshine Group".to_string(),
        }
    }

    #[test]
    fn test_memory_store_round_trips_collection() {
        let store = MemoryStore::new(vec![alert("1")]);
        store.save(&[alert("1"), alert("2")]).expect("save");
        assert_eq!(store.load().expect("load").len(), 2);
    }

    #[test]
    fn test_json_store_missing_file_loads_empty() {
        let dir = tempfile::tempdir().expect("tempdir");
        let store: JsonFileStore<Alert> = JsonFileStore::new(dir.path().join("alerts.json"));
        assert!(store.load().expect("missing file is not an error").is_empty());
    }

    #[test]
    fn test_json_store_persists_between_instances() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("nested").join("alerts.json");
        let store: JsonFileStore<Alert> = JsonFileStore::new(&path);
        store.save(&[alert("7")]).expect("save");

        let reopened: JsonFileStore<Alert> = JsonFileStore::new(&path);
        let loaded = reopened.load().expect("load");
        assert_eq!(loaded, vec![alert("7")]);
    }

    #[test]
    fn test_json_store_reports_malformed_file() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("alerts.json");
        fs::write(&path, "{ not json").expect("write");
        let store: JsonFileStore<Alert> = JsonFileStore::new(&path);
        assert!(matches!(store.load(), Err(StoreError::Json { .. })));
    }

    #[test]
    fn test_alert_log_rejects_duplicate_id() {
        let log = AlertLog::new(MemoryStore::default());
        log.append(alert("1")).expect("first append");
        let err = log.append(alert("1")).expect_err("duplicate id");
        assert!(matches!(err, StoreError::Rejected(MonitorError::DuplicateId(ref id)) if id == "1"));
        assert_eq!(log.snapshot().expect("snapshot").len(), 1);
    }

    #[test]
    fn test_alert_log_extend_skips_known_ids() {
        let log = AlertLog::new(MemoryStore::new(vec![alert("1")]));
        let added = log.extend(vec![alert("1"), alert("2"), alert("3")]).expect("extend");
        assert_eq!(added, 2);
        assert_eq!(log.snapshot().expect("snapshot").len(), 3);
    }
}
