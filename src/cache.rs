//! Process-wide memo of the loaded dataset.
//!
//! The entry is keyed by the canonical source path and its modification
//! time, so editing the file on disk invalidates it on the next lookup.

use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, OnceLock};
use std::time::SystemTime;
use tracing::{debug, info};

use crate::loader::{LoadError, load_dataset};
use crate::model::Dataset;

#[derive(Debug, Clone, PartialEq, Eq)]
struct CacheKey {
    path: PathBuf,
    modified: Option<SystemTime>,
}

impl CacheKey {
    fn for_path(path: &Path) -> Result<Self, LoadError> {
        let metadata = std::fs::metadata(path).map_err(|source| match source.kind() {
            std::io::ErrorKind::NotFound => LoadError::NotFound {
                path: path.to_path_buf(),
            },
            _ => LoadError::Io {
                path: path.to_path_buf(),
                source,
            },
        })?;

        Ok(Self {
            path: path.canonicalize().unwrap_or_else(|_| path.to_path_buf()),
            modified: metadata.modified().ok(),
        })
    }
}

#[derive(Debug, Default)]
pub struct DatasetCache {
    entry: Mutex<Option<(CacheKey, Arc<Dataset>)>>,
}

impl DatasetCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// The cache shared by the whole process.
    pub fn global() -> &'static DatasetCache {
        static GLOBAL: OnceLock<DatasetCache> = OnceLock::new();
        GLOBAL.get_or_init(DatasetCache::new)
    }

    /// Returns the cached dataset for `path`, loading it if the path or its
    /// modification time changed since the last load.
    pub fn get_or_load(&self, path: &Path) -> Result<Arc<Dataset>, LoadError> {
        let key = CacheKey::for_path(path)?;
        let mut entry = self.entry.lock().unwrap_or_else(|poisoned| poisoned.into_inner());

        if let Some((cached_key, dataset)) = entry.as_ref() {
            if *cached_key == key {
                debug!(path = %path.display(), "Dataset cache hit");
                return Ok(Arc::clone(dataset));
            }
            info!(path = %path.display(), "Dataset source changed, reloading");
        }

        let dataset = Arc::new(load_dataset(path)?);
        *entry = Some((key, Arc::clone(&dataset)));
        Ok(dataset)
    }

    pub fn invalidate(&self) {
        let mut entry = self.entry.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        *entry = None;
    }

    pub fn is_loaded(&self) -> bool {
        self.entry
            .lock()
            .map(|entry| entry.is_some())
            .unwrap_or(false)
    }
}
