use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, PoisonError};

use super::{DurableStorage, StorageError};

const STORAGE_FILE: &str = "storage.json";

/// JSON file backed storage, one file per client profile.
///
/// The whole map is rewritten on every mutation; there is no journaling, so a
/// crash between two `set` calls leaves the earlier writes only.
#[derive(Debug)]
pub struct FileStorage {
    path: PathBuf,
    entries: Mutex<BTreeMap<String, String>>,
}

/// Resolve the storage directory, creating it when missing
pub fn get_storage_dir(custom: Option<&Path>) -> Result<PathBuf, StorageError> {
    let dir = match custom {
        Some(dir) => dir.to_path_buf(),
        None => {
            let home = std::env::var("HOME")
                .map_err(|_| StorageError::NoDirectory("HOME environment variable not set".to_string()))?;
            PathBuf::from(home).join(".config").join("cirquetask").join("client")
        }
    };

    if !dir.exists() {
        fs::create_dir_all(&dir)?;
    }

    Ok(dir)
}

impl FileStorage {
    /// Open (or create) the storage file inside `dir`
    pub fn open(dir: Option<&Path>) -> Result<Self, StorageError> {
        let path = get_storage_dir(dir)?.join(STORAGE_FILE);

        let entries = if path.exists() {
            let content = fs::read_to_string(&path)?;
            if content.trim().is_empty() {
                BTreeMap::new()
            } else {
                serde_json::from_str(&content)?
            }
        } else {
            BTreeMap::new()
        };

        tracing::debug!("Opened storage at {} ({} keys)", path.display(), entries.len());

        Ok(Self {
            path,
            entries: Mutex::new(entries),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn save(&self, entries: &BTreeMap<String, String>) -> Result<(), StorageError> {
        let content = serde_json::to_string_pretty(entries)?;
        fs::write(&self.path, content)?;
        Ok(())
    }
}

impl DurableStorage for FileStorage {
    fn get(&self, key: &str) -> Option<String> {
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get(key)
            .cloned()
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        let mut entries = self.entries.lock().unwrap_or_else(PoisonError::into_inner);
        entries.insert(key.to_string(), value.to_string());
        self.save(&entries)
    }

    fn remove(&self, key: &str) -> Result<(), StorageError> {
        let mut entries = self.entries.lock().unwrap_or_else(PoisonError::into_inner);
        if entries.remove(key).is_some() {
            self.save(&entries)?;
        }
        Ok(())
    }
}
