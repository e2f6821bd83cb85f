//! Key-value blob storage. Each collection is persisted as one JSON document
//! under its own key and always rewritten whole.

use std::collections::HashMap;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::{debug, warn};

use crate::error::{Result, TrackerError};

pub const KEY_LOG: &str = "HD_LOG_V3";
pub const KEY_DAILY: &str = "HD_DAILY_V1";
pub const KEY_WEIGH: &str = "HD_WEIGH_V1";
pub const KEY_TARGETS: &str = "HD_TARGETS_V1";

pub trait BlobStore {
    fn get(&self, key: &str) -> Result<Option<String>>;
    fn set(&mut self, key: &str, value: &str) -> Result<()>;
}

/// One `<key>.json` file per key inside a directory.
#[derive(Debug, Clone)]
pub struct FileStore {
    dir: PathBuf,
}

impl FileStore {
    pub fn open(dir: impl Into<PathBuf>) -> Result<Self> {
        let dir = dir.into();
        fs::create_dir_all(&dir).map_err(|source| TrackerError::Storage {
            key: dir.display().to_string(),
            source,
        })?;
        Ok(Self { dir })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn path_for(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{key}.json"))
    }
}

impl BlobStore for FileStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        match fs::read_to_string(self.path_for(key)) {
            Ok(text) => Ok(Some(text)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(source) => Err(TrackerError::Storage { key: key.to_string(), source }),
        }
    }

    fn set(&mut self, key: &str, value: &str) -> Result<()> {
        let path = self.path_for(key);
        let tmp = path.with_extension("json.tmp");
        let storage_err = |source| TrackerError::Storage { key: key.to_string(), source };
        fs::write(&tmp, value).map_err(storage_err)?;
        fs::rename(&tmp, &path).map_err(storage_err)?;
        debug!(key, bytes = value.len(), "wrote blob");
        Ok(())
    }
}

#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    blobs: HashMap<String, String>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_blob(mut self, key: &str, value: &str) -> Self {
        self.blobs.insert(key.to_string(), value.to_string());
        self
    }
}

impl BlobStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        Ok(self.blobs.get(key).cloned())
    }

    fn set(&mut self, key: &str, value: &str) -> Result<()> {
        self.blobs.insert(key.to_string(), value.to_string());
        Ok(())
    }
}

/// Reads a collection, falling back to its empty default when the blob is
/// missing, unreadable, or not valid JSON for `T`.
pub fn load_json<T, S>(store: &S, key: &str) -> T
where
    T: DeserializeOwned + Default,
    S: BlobStore + ?Sized,
{
    let text = match store.get(key) {
        Ok(Some(text)) => text,
        Ok(None) => return T::default(),
        Err(e) => {
            warn!(key, error = %e, "could not read stored collection, starting empty");
            return T::default();
        }
    };
    serde_json::from_str(&text).unwrap_or_else(|e| {
        warn!(key, error = %e, "stored collection is corrupt, starting empty");
        T::default()
    })
}

pub fn save_json<T, S>(store: &mut S, key: &str, value: &T) -> Result<()>
where
    T: Serialize + ?Sized,
    S: BlobStore + ?Sized,
{
    let text = serde_json::to_string(value)?;
    store.set(key, &text)
}
