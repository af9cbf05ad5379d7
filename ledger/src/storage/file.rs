//! File-backed chain store.
//!
//! The whole chain lives in one JSON document. Writes go to a temporary
//! sibling file that is then renamed over the target, so a crash mid-write
//! leaves the previous document intact.

use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use crate::chain::error::StorageError;
use crate::chain::store::ChainStore;

/// Configuration for [`FileChainStore`].
#[derive(Clone, Debug)]
pub struct FileStoreConfig {
    /// Path of the chain document.
    pub path: PathBuf,
}

impl Default for FileStoreConfig {
    fn default() -> Self {
        Self {
            path: PathBuf::from("data/chain.json"),
        }
    }
}

/// File-backed implementation of [`ChainStore`].
#[derive(Clone, Debug)]
pub struct FileChainStore {
    path: PathBuf,
}

impl FileChainStore {
    /// Opens a store at `cfg.path`, creating parent directories as needed.
    ///
    /// The document itself is only created on the first write.
    pub fn open(cfg: &FileStoreConfig) -> Result<Self, StorageError> {
        if let Some(parent) = cfg.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }
        Ok(Self {
            path: cfg.path.clone(),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn tmp_path(&self) -> PathBuf {
        let mut name = self
            .path
            .file_name()
            .map(|n| n.to_os_string())
            .unwrap_or_default();
        name.push(".tmp");
        self.path.with_file_name(name)
    }
}

impl ChainStore for FileChainStore {
    fn read_all(&self) -> Result<Option<Vec<u8>>, StorageError> {
        match fs::read(&self.path) {
            Ok(bytes) => Ok(Some(bytes)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    fn write_all(&mut self, bytes: &[u8]) -> Result<(), StorageError> {
        let tmp = self.tmp_path();
        fs::write(&tmp, bytes)?;
        fs::rename(&tmp, &self.path)?;
        Ok(())
    }
}
