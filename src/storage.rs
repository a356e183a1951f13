//! Persisted dashboard state: the watchlist and the last good snapshot.
//!
//! Both live as JSON files in the state directory. Reads are tolerant: a
//! missing or corrupt file is treated as empty. Writes go through a temp file
//! and a rename so a crash never leaves a half-written file behind.

use crate::consts::cli_consts::{SNAPSHOT_CACHE_FILE_NAME, WATCHLIST_FILE_NAME};
use crate::types::ScanSnapshot;
use serde::{Deserialize, Serialize};
use serde::de::DeserializeOwned;
use std::collections::BTreeSet;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// User-curated set of asset identifiers. Stored as a JSON array.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Watchlist {
    ids: BTreeSet<String>,
}

impl Watchlist {
    /// Add the id if absent, remove it if present. Returns whether it is now watched.
    pub fn toggle(&mut self, asset_id: &str) -> bool {
        if self.contains(asset_id) {
            self.remove(asset_id);
            false
        } else {
            self.add(asset_id);
            true
        }
    }

    /// No-op when already present.
    pub fn add(&mut self, asset_id: &str) {
        self.ids.insert(asset_id.to_string());
    }

    /// No-op when absent.
    pub fn remove(&mut self, asset_id: &str) {
        self.ids.remove(asset_id);
    }

    pub fn contains(&self, asset_id: &str) -> bool {
        self.ids.contains(asset_id)
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.ids.iter().map(String::as_str)
    }
}

impl<S: Into<String>> FromIterator<S> for Watchlist {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        Self {
            ids: iter.into_iter().map(Into::into).collect(),
        }
    }
}

/// File-backed key-value store rooted at the state directory.
#[derive(Debug, Clone)]
pub struct Storage {
    dir: PathBuf,
}

impl Storage {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    fn watchlist_path(&self) -> PathBuf {
        self.dir.join(WATCHLIST_FILE_NAME)
    }

    fn snapshot_path(&self) -> PathBuf {
        self.dir.join(SNAPSHOT_CACHE_FILE_NAME)
    }

    /// Load the watchlist; absence or corruption yields an empty one.
    pub fn load_watchlist(&self) -> Watchlist {
        read_tolerant(&self.watchlist_path()).unwrap_or_default()
    }

    pub fn save_watchlist(&self, watchlist: &Watchlist) -> Result<(), StorageError> {
        write_atomic(&self.watchlist_path(), watchlist)
    }

    /// Load the cached snapshot, marked as coming from the cache.
    pub fn load_cached_snapshot(&self) -> Option<ScanSnapshot> {
        read_tolerant::<ScanSnapshot>(&self.snapshot_path()).map(|mut snapshot| {
            snapshot.from_cache = true;
            snapshot
        })
    }

    pub fn save_snapshot(&self, snapshot: &ScanSnapshot) -> Result<(), StorageError> {
        write_atomic(&self.snapshot_path(), snapshot)
    }

    /// Remove the cached snapshot. Returns whether a file was removed.
    pub fn clear_cached_snapshot(&self) -> Result<bool, StorageError> {
        match fs::remove_file(self.snapshot_path()) {
            Ok(()) => Ok(true),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(false),
            Err(e) => Err(e.into()),
        }
    }
}

fn read_tolerant<T: DeserializeOwned>(path: &Path) -> Option<T> {
    let buf = match fs::read(path) {
        Ok(buf) => buf,
        Err(e) if e.kind() == ErrorKind::NotFound => return None,
        Err(e) => {
            log::warn!("Could not read {}: {}", path.display(), e);
            return None;
        }
    };
    match serde_json::from_slice(&buf) {
        Ok(value) => Some(value),
        Err(e) => {
            log::warn!("Ignoring corrupt file {}: {}", path.display(), e);
            None
        }
    }
}

fn write_atomic<T: Serialize>(path: &Path, value: &T) -> Result<(), StorageError> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    let json = serde_json::to_vec_pretty(value)?;
    let tmp = path.with_extension("json.tmp");
    fs::write(&tmp, json)?;
    fs::rename(&tmp, path)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Asset, LastUpdate};
    use tempfile::tempdir;

    #[test]
    // Toggling the same id twice restores the original set.
    fn test_toggle_twice_is_identity() {
        let mut watchlist: Watchlist = ["eth"].into_iter().collect();
        let original = watchlist.clone();

        assert!(watchlist.toggle("btc"));
        assert!(watchlist.contains("btc"));
        assert!(!watchlist.toggle("btc"));
        assert_eq!(watchlist, original);

        assert!(!watchlist.toggle("eth"));
        assert!(watchlist.toggle("eth"));
        assert_eq!(watchlist, original);
    }

    #[test]
    fn test_add_and_remove_are_idempotent() {
        let mut watchlist = Watchlist::default();
        watchlist.add("sol");
        watchlist.add("sol");
        assert_eq!(watchlist.len(), 1);
        watchlist.remove("doge");
        watchlist.remove("sol");
        watchlist.remove("sol");
        assert!(watchlist.is_empty());
    }

    #[test]
    // Persisting then reloading yields the same set.
    fn test_watchlist_round_trip() {
        let dir = tempdir().unwrap();
        let storage = Storage::new(dir.path().join("state"));
        let watchlist: Watchlist = ["btc", "eth", "sol"].into_iter().collect();

        storage.save_watchlist(&watchlist).unwrap();
        assert_eq!(storage.load_watchlist(), watchlist);

        let on_disk = fs::read_to_string(dir.path().join("state").join(WATCHLIST_FILE_NAME)).unwrap();
        let ids: Vec<String> = serde_json::from_str(&on_disk).unwrap();
        assert_eq!(ids, vec!["btc", "eth", "sol"]);
    }

    #[test]
    fn test_missing_or_corrupt_files_are_empty() {
        let dir = tempdir().unwrap();
        let storage = Storage::new(dir.path());
        assert!(storage.load_watchlist().is_empty());
        assert!(storage.load_cached_snapshot().is_none());

        fs::write(dir.path().join(WATCHLIST_FILE_NAME), "{not json").unwrap();
        fs::write(dir.path().join(SNAPSHOT_CACHE_FILE_NAME), "[1, 2").unwrap();
        assert!(storage.load_watchlist().is_empty());
        assert!(storage.load_cached_snapshot().is_none());
    }

    #[test]
    fn test_snapshot_cache_round_trip_and_clear() {
        let dir = tempdir().unwrap();
        let storage = Storage::new(dir.path());
        let snapshot = ScanSnapshot::new(
            vec![Asset::new("btc").with_score(8.0)],
            LastUpdate::parse("2024-05-01T12:30:00Z"),
        );

        storage.save_snapshot(&snapshot).unwrap();
        let cached = storage.load_cached_snapshot().unwrap();
        assert!(cached.from_cache);
        assert_eq!(cached.assets, snapshot.assets);
        assert_eq!(cached.last_updated, snapshot.last_updated);

        assert!(storage.clear_cached_snapshot().unwrap());
        assert!(!storage.clear_cached_snapshot().unwrap());
        assert!(storage.load_cached_snapshot().is_none());
    }
}
