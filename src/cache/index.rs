//! Disk-mirrored cache index.
//!
//! The index maps source paths to [`CacheEntry`] values and mirrors that
//! mapping to a single JSON document. All access goes through an internal
//! lock, so concurrent transforms never observe a half-updated map.
//! Persistence only happens on [`CacheIndex::save`].

use parking_lot::{ArcMutexGuard, Mutex, RawMutex};
use std::collections::{BTreeMap, HashMap};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use super::entry::CacheEntry;
use crate::error::{CacheError, Result};

type KeyLocks = Mutex<HashMap<String, Arc<Mutex<()>>>>;

/// Held while a single source path goes through lookup, pipeline and store.
///
/// Dropping the last guard for a key forgets its lock.
pub struct KeyGuard<'a> {
    guard: Option<ArcMutexGuard<RawMutex, ()>>,
    key: String,
    locks: &'a KeyLocks,
}

impl Drop for KeyGuard<'_> {
    fn drop(&mut self) {
        self.guard.take();
        let mut locks = self.locks.lock();
        if locks
            .get(&self.key)
            .is_some_and(|lock| Arc::strong_count(lock) == 1)
        {
            locks.remove(&self.key);
        }
    }
}

#[derive(Debug, Default)]
struct IndexState {
    entries: BTreeMap<String, CacheEntry>,
    dirty: bool,
    // Bumped on every mutation so a save racing a mutation keeps the dirty flag.
    revision: u64,
}

impl IndexState {
    fn touch(&mut self) {
        self.dirty = true;
        self.revision += 1;
    }
}

/// In-memory index of cache entries backed by a JSON file.
#[derive(Debug)]
pub struct CacheIndex {
    path: PathBuf,
    state: Mutex<IndexState>,
    key_locks: KeyLocks,
}

impl CacheIndex {
    /// Create an empty index for `path` without touching the disk.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            state: Mutex::new(IndexState::default()),
            key_locks: Mutex::new(HashMap::new()),
        }
    }

    /// Open the index at `path`.
    ///
    /// Loads the file if it exists and is a regular file; otherwise writes
    /// an empty index so the file always exists afterwards.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self> {
        let index = Self::new(path);

        let is_file = fs::metadata(&index.path)
            .map(|m| m.is_file())
            .unwrap_or(false);

        if is_file {
            index.load()?;
        } else {
            tracing::debug!(path = %index.path.display(), "creating empty cache index");
            index.persist()?;
        }

        Ok(index)
    }

    /// Path of the backing file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Replace the in-memory entries with the contents of the backing file.
    pub fn load(&self) -> Result<()> {
        let json = fs::read_to_string(&self.path).map_err(|e| CacheError::IndexLoad {
            path: self.path.clone(),
            source: e,
        })?;

        let entries: BTreeMap<String, CacheEntry> =
            serde_json::from_str(&json).map_err(|e| CacheError::IndexParse {
                path: self.path.clone(),
                message: e.to_string(),
            })?;

        tracing::debug!(
            path = %self.path.display(),
            entries = entries.len(),
            "loaded cache index"
        );

        let mut state = self.state.lock();
        state.entries = entries;
        state.dirty = false;
        Ok(())
    }

    /// Write the index if it changed since the last save.
    ///
    /// Returns whether a write happened. On failure the dirty flag stays
    /// set so the save can be retried.
    pub fn save(&self) -> Result<bool> {
        let (json, revision) = {
            let state = self.state.lock();
            if !state.dirty {
                return Ok(false);
            }
            (self.serialize(&state.entries)?, state.revision)
        };

        self.write(&json)?;

        let mut state = self.state.lock();
        if state.revision == revision {
            state.dirty = false;
        }
        tracing::debug!(path = %self.path.display(), "saved cache index");
        Ok(true)
    }

    /// Write the index unconditionally.
    fn persist(&self) -> Result<()> {
        let json = {
            let state = self.state.lock();
            self.serialize(&state.entries)?
        };
        self.write(&json)?;
        self.state.lock().dirty = false;
        Ok(())
    }

    fn serialize(&self, entries: &BTreeMap<String, CacheEntry>) -> Result<String> {
        serde_json::to_string_pretty(entries).map_err(|e| CacheError::IndexSave {
            path: self.path.clone(),
            message: e.to_string(),
        })
    }

    fn write(&self, json: &str) -> Result<()> {
        let save_err = |e: std::io::Error| CacheError::IndexSave {
            path: self.path.clone(),
            message: e.to_string(),
        };

        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(save_err)?;
        }
        fs::write(&self.path, json).map_err(save_err)
    }

    /// Get a copy of the entry for `key`.
    pub fn get(&self, key: &str) -> Option<CacheEntry> {
        self.state.lock().entries.get(key).cloned()
    }

    /// Insert or replace the entry stored under its own path.
    pub fn insert(&self, entry: CacheEntry) -> Option<CacheEntry> {
        let mut state = self.state.lock();
        let previous = state.entries.insert(entry.path.clone(), entry);
        state.touch();
        previous
    }

    /// Remove the entry for `key`, marking the index dirty if one existed.
    pub fn remove(&self, key: &str) -> Option<CacheEntry> {
        let mut state = self.state.lock();
        let removed = state.entries.remove(key);
        if removed.is_some() {
            state.touch();
        }
        removed
    }

    /// Whether the index changed since the last load or save.
    pub fn is_dirty(&self) -> bool {
        self.state.lock().dirty
    }

    /// Number of cached entries.
    pub fn len(&self) -> usize {
        self.state.lock().entries.len()
    }

    /// Whether the index has no entries.
    pub fn is_empty(&self) -> bool {
        self.state.lock().entries.is_empty()
    }

    /// Snapshot of all entries, ordered by path.
    pub fn entries(&self) -> Vec<CacheEntry> {
        self.state.lock().entries.values().cloned().collect()
    }

    /// Acquire the guard for `key`.
    ///
    /// Two holders of the same key are serialized; different keys never
    /// block each other.
    pub fn lock_key(&self, key: &str) -> KeyGuard<'_> {
        let lock = {
            let mut locks = self.key_locks.lock();
            Arc::clone(
                locks
                    .entry(key.to_string())
                    .or_insert_with(|| Arc::new(Mutex::new(()))),
            )
        };
        KeyGuard {
            guard: Some(lock.lock_arc()),
            key: key.to_string(),
            locks: &self.key_locks,
        }
    }

    #[cfg(test)]
    fn key_lock_count(&self) -> usize {
        self.key_locks.lock().len()
    }
}
