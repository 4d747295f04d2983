//! Key-value slots holding the serialized draft. Values are opaque strings.

use std::collections::HashMap;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use thiserror::Error;

#[derive(Debug, Error)]
pub enum SlotError {
    #[error("I/O error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid slot key '{0}'")]
    InvalidKey(String),

    /// The stored bytes are not UTF-8 text. The value is unusable but the slot works.
    #[error("value under '{key}' is not UTF-8 text")]
    NotText { key: String },
}

/// Synchronous string storage keyed by name, like a browser's local storage.
pub trait DraftSlot {
    fn get(&self, key: &str) -> Result<Option<String>, SlotError>;
    /// Overwrites any previous value.
    fn set(&mut self, key: &str, value: &str) -> Result<(), SlotError>;
    /// Removing an absent key is not an error.
    fn remove(&mut self, key: &str) -> Result<(), SlotError>;
}

#[derive(Debug, Clone, Default)]
pub struct MemorySlot {
    values: HashMap<String, String>,
}

impl DraftSlot for MemorySlot {
    fn get(&self, key: &str) -> Result<Option<String>, SlotError> {
        Ok(self.values.get(key).cloned())
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), SlotError> {
        self.values.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&mut self, key: &str) -> Result<(), SlotError> {
        self.values.remove(key);
        Ok(())
    }
}

/// One file per key inside a directory.
#[derive(Debug, Clone)]
pub struct FileSlot {
    dir: PathBuf,
}

impl FileSlot {
    /// Creates the directory if needed.
    pub fn open(dir: impl Into<PathBuf>) -> Result<Self, SlotError> {
        let dir = dir.into();
        fs::create_dir_all(&dir).map_err(|source| SlotError::Io {
            path: dir.clone(),
            source,
        })?;
        Ok(Self { dir })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn path_for(&self, key: &str) -> Result<PathBuf, SlotError> {
        let safe = !key.is_empty()
            && key
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-');
        if !safe {
            return Err(SlotError::InvalidKey(key.to_string()));
        }
        Ok(self.dir.join(key))
    }
}

impl DraftSlot for FileSlot {
    fn get(&self, key: &str) -> Result<Option<String>, SlotError> {
        let path = self.path_for(key)?;
        match fs::read(&path) {
            Ok(bytes) => String::from_utf8(bytes)
                .map(Some)
                .map_err(|_| SlotError::NotText {
                    key: key.to_string(),
                }),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(source) => Err(SlotError::Io { path, source }),
        }
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), SlotError> {
        let path = self.path_for(key)?;
        fs::write(&path, value).map_err(|source| SlotError::Io { path, source })
    }

    fn remove(&mut self, key: &str) -> Result<(), SlotError> {
        let path = self.path_for(key)?;
        match fs::remove_file(&path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(source) => Err(SlotError::Io { path, source }),
        }
    }
}
