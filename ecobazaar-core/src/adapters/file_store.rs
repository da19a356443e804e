//! File-backed session store
//!
//! Entries live in `session.json` inside the data directory. Every access takes
//! an advisory lock on `session.lock` (shared for reads, exclusive for
//! writes), and writes go through a temp file + rename, so several client
//! processes can share one session the way browser tabs share localStorage.

use std::collections::BTreeMap;
use std::fs::{self, File, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};

use fs2::FileExt;
use tracing::warn;

use crate::domain::result::{Error, Result};
use crate::ports::SessionStore;

const SESSION_FILE: &str = "session.json";
const LOCK_FILE: &str = "session.lock";

type Entries = BTreeMap<String, String>;

#[derive(Debug, Clone)]
pub struct FileSessionStore {
    dir: PathBuf,
}

impl FileSessionStore {
    /// Create a store in `dir`, creating the directory if needed
    pub fn new(dir: &Path) -> Result<Self> {
        fs::create_dir_all(dir)?;
        Ok(Self {
            dir: dir.to_path_buf(),
        })
    }

    pub fn path(&self) -> PathBuf {
        self.dir.join(SESSION_FILE)
    }

    fn open_lock(&self) -> Result<File> {
        let lock = OpenOptions::new()
            .create(true)
            .truncate(false)
            .write(true)
            .open(self.dir.join(LOCK_FILE))?;
        Ok(lock)
    }

    /// Read all entries. An unreadable file is treated as empty: it will be
    /// replaced by the next write.
    fn read_entries(&self) -> Result<Entries> {
        let path = self.path();
        if !path.exists() {
            return Ok(Entries::new());
        }
        let content = fs::read_to_string(&path)?;
        match serde_json::from_str(&content) {
            Ok(entries) => Ok(entries),
            Err(e) => {
                warn!("Ignoring unreadable session file {}: {}", path.display(), e);
                Ok(Entries::new())
            }
        }
    }

    fn write_entries(&self, entries: &Entries) -> Result<()> {
        let path = self.path();
        let tmp = self.dir.join(format!("{}.tmp", SESSION_FILE));
        let content = serde_json::to_string_pretty(entries)?;
        {
            let mut file = File::create(&tmp)?;
            file.write_all(content.as_bytes())?;
            file.sync_all()?;
        }
        fs::rename(&tmp, &path)?;
        Ok(())
    }

    fn with_exclusive<T>(&self, f: impl FnOnce(&Self) -> Result<T>) -> Result<T> {
        let lock = self.open_lock()?;
        FileExt::lock_exclusive(&lock)
            .map_err(|e| Error::storage(format!("Failed to lock session file: {}", e)))?;
        let result = f(self);
        let _ = FileExt::unlock(&lock);
        result
    }
}

impl SessionStore for FileSessionStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        let mut values = self.get_many(&[key])?;
        Ok(values.pop().flatten())
    }

    fn get_many(&self, keys: &[&str]) -> Result<Vec<Option<String>>> {
        let lock = self.open_lock()?;
        FileExt::lock_shared(&lock)
            .map_err(|e| Error::storage(format!("Failed to lock session file: {}", e)))?;
        let result = self
            .read_entries()
            .map(|mut entries| keys.iter().map(|key| entries.remove(*key)).collect());
        let _ = FileExt::unlock(&lock);
        result
    }

    fn set_many(&self, entries: &[(&str, &str)]) -> Result<()> {
        self.with_exclusive(|store| {
            let mut current = store.read_entries()?;
            for (key, value) in entries {
                current.insert(key.to_string(), value.to_string());
            }
            store.write_entries(&current)
        })
    }

    fn remove_many(&self, keys: &[&str]) -> Result<()> {
        self.with_exclusive(|store| {
            let mut current = store.read_entries()?;
            let before = current.len();
            for key in keys {
                current.remove(*key);
            }
            if current.len() == before && !store.path().exists() {
                return Ok(());
            }
            store.write_entries(&current)
        })
    }
}
