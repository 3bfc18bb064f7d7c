//! On-disk persistence for the card-metadata repository.
//!
//! The repository's cache is an explicit load/save pair behind the
//! [`MetadataStore`] trait; the session that constructs the repository owns
//! the store's lifecycle. The JSON file format matches what a remote
//! catalog cache would hold.

use std::collections::HashMap;
use std::fs;
use std::io;
use std::path::PathBuf;

use crate::card::CardMetadata;

/// Errors from loading or saving the metadata cache.
#[derive(Debug)]
pub enum StorageError {
    Io(io::Error),
    Format(serde_json::Error),
}

impl std::fmt::Display for StorageError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            StorageError::Io(err) => write!(f, "storage I/O error: {err}"),
            StorageError::Format(err) => write!(f, "storage format error: {err}"),
        }
    }
}

impl std::error::Error for StorageError {}

impl From<io::Error> for StorageError {
    fn from(err: io::Error) -> Self {
        StorageError::Io(err)
    }
}

impl From<serde_json::Error> for StorageError {
    fn from(err: serde_json::Error) -> Self {
        StorageError::Format(err)
    }
}

/// Where card metadata persists between sessions.
pub trait MetadataStore {
    fn load(&self) -> Result<HashMap<String, CardMetadata>, StorageError>;
    fn save(&self, cards: &HashMap<String, CardMetadata>) -> Result<(), StorageError>;
}

/// JSON file store. A missing file loads as an empty cache; a malformed
/// one is an error.
#[derive(Debug, Clone)]
pub struct JsonFileStore {
    path: PathBuf,
}

impl JsonFileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &std::path::Path {
        &self.path
    }
}

impl MetadataStore for JsonFileStore {
    fn load(&self) -> Result<HashMap<String, CardMetadata>, StorageError> {
        match fs::read_to_string(&self.path) {
            Ok(contents) => Ok(serde_json::from_str(&contents)?),
            Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(HashMap::new()),
            Err(err) => Err(err.into()),
        }
    }

    fn save(&self, cards: &HashMap<String, CardMetadata>) -> Result<(), StorageError> {
        let contents = serde_json::to_string_pretty(cards)?;
        fs::write(&self.path, contents)?;
        Ok(())
    }
}
