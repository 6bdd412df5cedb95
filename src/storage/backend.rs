//! Raw key-value storage.
//!
//! A [`Backend`] stores opaque strings under string keys. It knows nothing
//! about JSON or records; that is layered on top by
//! [`Persistence`](crate::storage::Persistence).

use std::{
    collections::HashMap,
    fs, io,
    path::{Path, PathBuf},
};

/// A failure reading from or writing to storage.
///
/// Faults never abort an operation: the store logs them and carries on, but
/// keeps them so the caller can report that a write may have been lost or
/// that a document it could not read was treated as empty.
#[derive(Debug, thiserror::Error)]
pub enum PersistenceFault {
    /// The stored value could not be read.
    #[error("failed to read '{key}'")]
    Read {
        /// Storage key.
        key: String,
        /// Underlying error.
        #[source]
        source: io::Error,
    },
    /// The stored value was not valid for its document type.
    #[error("failed to parse '{key}'")]
    Parse {
        /// Storage key.
        key: String,
        /// Underlying error.
        #[source]
        source: serde_json::Error,
    },
    /// The value could not be serialized.
    #[error("failed to serialize '{key}'")]
    Serialize {
        /// Storage key.
        key: String,
        /// Underlying error.
        #[source]
        source: serde_json::Error,
    },
    /// The value could not be written.
    #[error("failed to write '{key}'")]
    Write {
        /// Storage key.
        key: String,
        /// Underlying error.
        #[source]
        source: io::Error,
    },
    /// The value could not be removed.
    #[error("failed to remove '{key}'")]
    Remove {
        /// Storage key.
        key: String,
        /// Underlying error.
        #[source]
        source: io::Error,
    },
}

impl PersistenceFault {
    /// The storage key the fault relates to.
    #[must_use]
    pub fn key(&self) -> &str {
        match self {
            Self::Read { key, .. }
            | Self::Parse { key, .. }
            | Self::Serialize { key, .. }
            | Self::Write { key, .. }
            | Self::Remove { key, .. } => key,
        }
    }

    /// Whether the fault happened while loading a document.
    #[must_use]
    pub const fn is_load(&self) -> bool {
        matches!(self, Self::Read { .. } | Self::Parse { .. })
    }
}

/// Durable, synchronous storage of strings under string keys.
pub trait Backend {
    /// Read the value stored under `key`, or `None` if nothing is stored.
    ///
    /// # Errors
    ///
    /// Returns a fault if the storage medium could not be read.
    fn read(&self, key: &str) -> Result<Option<String>, PersistenceFault>;

    /// Store `value` under `key`, replacing any previous value.
    ///
    /// # Errors
    ///
    /// Returns a fault if the value could not be written.
    fn write(&mut self, key: &str, value: &str) -> Result<(), PersistenceFault>;

    /// Remove the value stored under `key`. Removing an absent key succeeds.
    ///
    /// # Errors
    ///
    /// Returns a fault if the value could not be removed.
    fn remove(&mut self, key: &str) -> Result<(), PersistenceFault>;
}

/// Stores each key as a JSON file in a directory.
#[derive(Debug, Clone)]
pub struct FileBackend {
    root: PathBuf,
}

impl FileBackend {
    /// Use `root` as the storage directory. It is created on first write.
    #[must_use]
    pub const fn new(root: PathBuf) -> Self {
        Self { root }
    }

    /// The storage directory.
    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    fn path(&self, key: &str) -> PathBuf {
        self.root.join(format!("{key}.json"))
    }
}

impl Backend for FileBackend {
    fn read(&self, key: &str) -> Result<Option<String>, PersistenceFault> {
        match fs::read_to_string(self.path(key)) {
            Ok(content) => Ok(Some(content)),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(source) => Err(PersistenceFault::Read {
                key: key.to_string(),
                source,
            }),
        }
    }

    fn write(&mut self, key: &str, value: &str) -> Result<(), PersistenceFault> {
        let path = self.path(key);
        let staging = path.with_extension("json.tmp");

        // Write to a sibling file and rename so readers never see a torn write.
        fs::create_dir_all(&self.root)
            .and_then(|()| fs::write(&staging, value))
            .and_then(|()| fs::rename(&staging, &path))
            .map_err(|source| PersistenceFault::Write {
                key: key.to_string(),
                source,
            })
    }

    fn remove(&mut self, key: &str) -> Result<(), PersistenceFault> {
        match fs::remove_file(self.path(key)) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(source) => Err(PersistenceFault::Remove {
                key: key.to_string(),
                source,
            }),
        }
    }
}

/// Keeps values in memory for the lifetime of the process.
///
/// Writes can be made to fail, to exercise fault handling.
#[derive(Debug, Clone, Default)]
pub struct MemoryBackend {
    values: HashMap<String, String>,
    reject_writes: bool,
}

impl MemoryBackend {
    /// An empty backend.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every subsequent write fail as if storage were full.
    pub const fn reject_writes(&mut self, reject: bool) {
        self.reject_writes = reject;
    }

    /// Store a raw value directly, bypassing the write-failure switch.
    pub fn insert_raw(&mut self, key: &str, value: &str) {
        self.values.insert(key.to_string(), value.to_string());
    }
}

impl Backend for MemoryBackend {
    fn read(&self, key: &str) -> Result<Option<String>, PersistenceFault> {
        Ok(self.values.get(key).cloned())
    }

    fn write(&mut self, key: &str, value: &str) -> Result<(), PersistenceFault> {
        if self.reject_writes {
            return Err(PersistenceFault::Write {
                key: key.to_string(),
                source: io::Error::new(io::ErrorKind::StorageFull, "storage quota exceeded"),
            });
        }
        self.values.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&mut self, key: &str) -> Result<(), PersistenceFault> {
        self.values.remove(key);
        Ok(())
    }
}
