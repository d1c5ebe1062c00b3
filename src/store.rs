// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2025 Daniel Negri
//
// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU Affero General Public License as published by
// the Free Software Foundation, either version 3 of the License, or
// (at your option) any later version.
//
// This program is distributed in the hope that it will be useful,
// but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE. See the
// GNU Affero General Public License for more details.
//
// You should have received a copy of the GNU Affero General Public License
// along with this program. If not, see <https://www.gnu.org/licenses/>.

//! Snapshot persistence.
//!
//! A [`SnapshotStore`] loads and saves a whole [`MachineTracker`]. Load
//! failures of any kind surface as `None`; save failures are logged here and
//! returned, and callers do not retry.
//!
//! # Snapshot format
//!
//! ```json
//! { "machines": [ { "status": {"Cola": 5}, "id": 1, "location": "Oslo" } ] }
//! ```

use crate::error::StoreError;
use crate::tracker::MachineTracker;
use parking_lot::Mutex;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use tracing::{debug, error, warn};

/// Persistence port for tracker snapshots.
pub trait SnapshotStore: Send + Sync {
    /// Loads the current snapshot, or `None` if it is missing or unreadable.
    fn load(&self) -> Option<MachineTracker>;

    /// Replaces the persisted snapshot.
    fn save(&self, tracker: &MachineTracker) -> Result<(), StoreError>;
}

impl<S: SnapshotStore + ?Sized> SnapshotStore for Arc<S> {
    fn load(&self) -> Option<MachineTracker> {
        (**self).load()
    }

    fn save(&self, tracker: &MachineTracker) -> Result<(), StoreError> {
        (**self).save(tracker)
    }
}

/// Stores the snapshot as a JSON file.
#[derive(Debug, Clone)]
pub struct JsonFileStore {
    path: PathBuf,
}

impl JsonFileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Writes an empty tracker if no snapshot file exists yet.
    ///
    /// Returns `true` if a new file was created.
    pub fn init_if_missing(&self) -> Result<bool, StoreError> {
        if self.path.exists() {
            return Ok(false);
        }
        self.save(&MachineTracker::new())?;
        Ok(true)
    }

    fn read(&self) -> Result<MachineTracker, StoreError> {
        let content = fs::read_to_string(&self.path)?;
        Ok(serde_json::from_str(&content)?)
    }

    fn write(&self, tracker: &MachineTracker) -> Result<(), StoreError> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }

        // Write beside the target and rename so readers never see a partial file.
        let mut tmp_name = self.path.as_os_str().to_owned();
        tmp_name.push(".tmp");
        let tmp_path = PathBuf::from(tmp_name);
        let content = serde_json::to_string_pretty(tracker)?;
        fs::write(&tmp_path, content)?;
        fs::rename(&tmp_path, &self.path)?;
        Ok(())
    }
}

impl SnapshotStore for JsonFileStore {
    fn load(&self) -> Option<MachineTracker> {
        match self.read() {
            Ok(tracker) => {
                debug!(path = %self.path.display(), machines = tracker.len(), "loaded snapshot");
                Some(tracker)
            }
            Err(StoreError::Io(e)) if e.kind() == io::ErrorKind::NotFound => {
                debug!(path = %self.path.display(), "no snapshot file");
                None
            }
            Err(e) => {
                warn!(path = %self.path.display(), error = %e, "failed to load snapshot");
                None
            }
        }
    }

    fn save(&self, tracker: &MachineTracker) -> Result<(), StoreError> {
        self.write(tracker).inspect_err(|e| {
            error!(path = %self.path.display(), error = %e, "failed to save snapshot");
        })?;
        debug!(path = %self.path.display(), machines = tracker.len(), "saved snapshot");
        Ok(())
    }
}

/// Keeps the snapshot in memory.
#[derive(Debug, Default)]
pub struct MemoryStore {
    snapshot: Mutex<Option<MachineTracker>>,
    read_only: AtomicBool,
}

impl MemoryStore {
    /// Creates a store with no snapshot at all.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a store holding `tracker`.
    pub fn with_tracker(tracker: MachineTracker) -> Self {
        Self {
            snapshot: Mutex::new(Some(tracker)),
            read_only: AtomicBool::new(false),
        }
    }

    /// Makes every subsequent save fail, leaving the stored snapshot as is.
    pub fn set_read_only(&self, read_only: bool) {
        self.read_only.store(read_only, Ordering::SeqCst);
    }

    /// Clones the currently stored snapshot.
    pub fn snapshot(&self) -> Option<MachineTracker> {
        self.snapshot.lock().clone()
    }
}

impl SnapshotStore for MemoryStore {
    fn load(&self) -> Option<MachineTracker> {
        self.snapshot()
    }

    fn save(&self, tracker: &MachineTracker) -> Result<(), StoreError> {
        if self.read_only.load(Ordering::SeqCst) {
            let e = StoreError::Io(io::Error::new(
                io::ErrorKind::PermissionDenied,
                "store is read-only",
            ));
            error!(error = %e, "failed to save snapshot");
            return Err(e);
        }
        *self.snapshot.lock() = Some(tracker.clone());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{MachineId, VendingMachine};

    fn sample_tracker() -> MachineTracker {
        let mut tracker = MachineTracker::new();
        let mut machine = VendingMachine::new(MachineId(1), "Oslo");
        machine.add_item("Cola", 5).unwrap();
        tracker.add_vending_machine(machine).unwrap();
        tracker
    }

    #[test]
    fn json_store_missing_file_loads_none() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonFileStore::new(dir.path().join("missing.json"));
        assert!(store.load().is_none());
    }

    #[test]
    fn json_store_malformed_file_loads_none() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("broken.json");
        fs::write(&path, "{ not json").unwrap();
        let store = JsonFileStore::new(path);
        assert!(store.load().is_none());
    }

    #[test]
    fn json_store_save_then_load() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonFileStore::new(dir.path().join("nested").join("tracker.json"));
        let tracker = sample_tracker();

        store.save(&tracker).unwrap();
        assert_eq!(store.load(), Some(tracker));
    }

    #[test]
    fn json_store_reads_existing_snapshot() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("tracker.json");
        fs::write(
            &path,
            r#"{"machines":[{"status":{"Cola":5},"id":1,"location":"Oslo"}]}"#,
        )
        .unwrap();

        let store = JsonFileStore::new(path);
        assert_eq!(store.load(), Some(sample_tracker()));
    }

    #[test]
    fn init_if_missing_creates_empty_tracker_once() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonFileStore::new(dir.path().join("tracker.json"));

        assert!(store.init_if_missing().unwrap());
        assert_eq!(store.load(), Some(MachineTracker::new()));

        store.save(&sample_tracker()).unwrap();
        assert!(!store.init_if_missing().unwrap());
        assert_eq!(store.load(), Some(sample_tracker()));
    }

    #[test]
    fn memory_store_starts_without_snapshot() {
        let store = MemoryStore::new();
        assert!(store.load().is_none());
        store.save(&sample_tracker()).unwrap();
        assert_eq!(store.load(), Some(sample_tracker()));
    }

    #[test]
    fn read_only_memory_store_rejects_saves() {
        let store = MemoryStore::with_tracker(MachineTracker::new());
        store.set_read_only(true);
        assert!(store.save(&sample_tracker()).is_err());
        assert_eq!(store.load(), Some(MachineTracker::new()));
    }
}
