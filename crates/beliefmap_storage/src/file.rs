//! File-based storage backend for persistent storage.
//!
//! The backend owns a directory with the following layout:
//!
//! ```text
//! <dir>/
//! ├─ LOCK              # Advisory lock taken for the duration of each write
//! ├─ store.json        # JSON object mapping keys to values
//! └─ store.json.tmp    # Temporary file for atomic replacement
//! ```

use crate::backend::KvBackend;
use crate::error::{StorageError, StorageResult};
use fs2::FileExt;
use parking_lot::Mutex;
use std::collections::BTreeMap;
use std::fs::{self, File, OpenOptions};
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};
use tracing::warn;

const STORE_FILE: &str = "store.json";
const STORE_TEMP: &str = "store.json.tmp";
const LOCK_FILE: &str = "LOCK";
const CORRUPT_SUFFIX: &str = "corrupt";

/// A directory-backed key-value backend.
///
/// Data survives process restarts. Every mutation re-reads the current
/// map while holding the directory lock, applies the change and replaces
/// `store.json` atomically, so two processes sharing the directory never
/// observe a torn file. Ordering across processes is not coordinated:
/// the last writer wins.
///
/// # Example
///
/// ```no_run
/// use beliefmap_storage::{FileBackend, KvBackend};
/// use std::path::Path;
///
/// let backend = FileBackend::open(Path::new("client-data")).unwrap();
/// backend.put("flow-storage", "{}").unwrap();
/// ```
#[derive(Debug)]
pub struct FileBackend {
    dir: PathBuf,
    lock_file: Mutex<File>,
}

impl FileBackend {
    /// Opens or creates a backend in the given directory.
    ///
    /// # Errors
    ///
    /// Returns an error if the directory cannot be created, the lock file
    /// cannot be opened, or an existing `store.json` cannot be parsed.
    pub fn open(dir: &Path) -> StorageResult<Self> {
        fs::create_dir_all(dir)?;

        let lock_file = OpenOptions::new()
            .read(true)
            .write(true)
            .create(true)
            .truncate(false)
            .open(dir.join(LOCK_FILE))?;

        let backend = Self {
            dir: dir.to_path_buf(),
            lock_file: Mutex::new(lock_file),
        };

        // Surface corruption at open time rather than on first access
        backend.load()?;
        Ok(backend)
    }

    /// Opens a backend, moving an unparsable `store.json` aside instead of failing.
    ///
    /// The damaged file is renamed to `store.json.corrupt` and the backend
    /// starts empty.
    ///
    /// # Errors
    ///
    /// Returns an error only for I/O failures unrelated to corruption.
    pub fn open_or_reset(dir: &Path) -> StorageResult<Self> {
        match Self::open(dir) {
            Err(StorageError::Corrupted(_)) => {
                let store = dir.join(STORE_FILE);
                fs::rename(&store, store.with_extension(format!("json.{CORRUPT_SUFFIX}")))?;
                Self::open(dir)
            }
            other => other,
        }
    }

    /// Returns the backend directory.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.dir
    }

    fn store_path(&self) -> PathBuf {
        self.dir.join(STORE_FILE)
    }

    fn load(&self) -> StorageResult<BTreeMap<String, String>> {
        let data = match fs::read(self.store_path()) {
            Ok(data) => data,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(BTreeMap::new()),
            Err(e) => return Err(e.into()),
        };

        if data.is_empty() {
            return Ok(BTreeMap::new());
        }

        serde_json::from_slice(&data).map_err(|e| StorageError::Corrupted(e.to_string()))
    }

    /// Writes the map to a temp file, syncs it and renames it over `store.json`.
    fn persist(&self, map: &BTreeMap<String, String>) -> StorageResult<()> {
        let temp_path = self.dir.join(STORE_TEMP);
        let data = serde_json::to_vec(map)?;

        let mut file = File::create(&temp_path)?;
        file.write_all(&data)?;
        file.sync_all()?;
        drop(file);

        fs::rename(&temp_path, self.store_path())?;
        self.sync_directory()
    }

    #[cfg(unix)]
    fn sync_directory(&self) -> StorageResult<()> {
        let dir = File::open(&self.dir)?;
        dir.sync_all()?;
        Ok(())
    }

    #[cfg(not(unix))]
    fn sync_directory(&self) -> StorageResult<()> {
        Ok(())
    }

    /// Runs a read-modify-write cycle under the directory lock.
    fn mutate<F>(&self, f: F) -> StorageResult<()>
    where
        F: FnOnce(&mut BTreeMap<String, String>) -> bool,
    {
        let lock_file = self.lock_file.lock();
        lock_file.lock_exclusive()?;

        let result = self.load().and_then(|mut map| {
            if f(&mut map) {
                self.persist(&map)
            } else {
                Ok(())
            }
        });

        // The write outcome takes precedence over an unlock failure
        if let Err(e) = FileExt::unlock(&*lock_file) {
            warn!(dir = %self.dir.display(), error = %e, "failed to release store lock");
        }
        result
    }
}

impl KvBackend for FileBackend {
    fn get(&self, key: &str) -> StorageResult<Option<String>> {
        Ok(self.load()?.remove(key))
    }

    fn put(&self, key: &str, value: &str) -> StorageResult<()> {
        self.mutate(|map| {
            map.insert(key.to_string(), value.to_string());
            true
        })
    }

    fn remove(&self, key: &str) -> StorageResult<()> {
        self.mutate(|map| map.remove(key).is_some())
    }

    fn keys(&self) -> StorageResult<Vec<String>> {
        Ok(self.load()?.into_keys().collect())
    }
}
