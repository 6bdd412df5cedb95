use serde::{Serialize, de::DeserializeOwned};

use crate::storage::{Backend, PersistenceFault};

/// The six documents a store persists.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Key {
    /// The donor collection.
    Donors,
    /// The request collection.
    Requests,
    /// The bank collection.
    Banks,
    /// The per-bank audit map.
    Audits,
    /// The backup ring.
    Backups,
    /// The meta record.
    Meta,
}

impl Key {
    /// Every persisted document.
    pub const ALL: [Self; 6] = [
        Self::Donors,
        Self::Requests,
        Self::Banks,
        Self::Audits,
        Self::Backups,
        Self::Meta,
    ];

    const fn suffix(self) -> &'static str {
        match self {
            Self::Donors => "donors",
            Self::Requests => "requests",
            Self::Banks => "banks",
            Self::Audits => "audits",
            Self::Backups => "backups",
            Self::Meta => "meta",
        }
    }
}

/// JSON documents over a [`Backend`], under a shared key prefix.
///
/// Loading never fails: a missing or unreadable document yields the caller's
/// fallback. Saving reports faults, but has already logged them.
#[derive(Debug)]
pub struct Persistence<B> {
    backend: B,
    namespace: String,
}

impl<B: Backend> Persistence<B> {
    /// Wrap `backend`, prefixing every key with `namespace`.
    pub fn new(backend: B, namespace: &str) -> Self {
        Self {
            backend,
            namespace: namespace.to_string(),
        }
    }

    /// The full storage key for a document.
    #[must_use]
    pub fn storage_key(&self, key: Key) -> String {
        format!("{}_{}", self.namespace, key.suffix())
    }

    /// The underlying backend.
    pub const fn backend(&self) -> &B {
        &self.backend
    }

    /// Mutable access to the underlying backend.
    pub const fn backend_mut(&mut self) -> &mut B {
        &mut self.backend
    }

    /// Load a document, falling back to `fallback` if it is absent or cannot
    /// be read.
    pub fn load<T: DeserializeOwned>(&self, key: Key, fallback: T) -> T {
        match self.try_load(key) {
            Ok(value) => value.unwrap_or(fallback),
            Err(fault) => {
                tracing::warn!("{fault}: {}", source_message(&fault));
                fallback
            }
        }
    }

    /// Load a document, or `None` if it has never been written.
    ///
    /// # Errors
    ///
    /// Returns a fault if the document exists but could not be read or
    /// parsed.
    pub fn try_load<T: DeserializeOwned>(&self, key: Key) -> Result<Option<T>, PersistenceFault> {
        let storage_key = self.storage_key(key);
        let Some(raw) = self.backend.read(&storage_key)? else {
            return Ok(None);
        };

        serde_json::from_str(&raw)
            .map(Some)
            .map_err(|source| PersistenceFault::Parse {
                key: storage_key,
                source,
            })
    }

    /// Serialize and store a document.
    ///
    /// # Errors
    ///
    /// Returns a fault if the document could not be serialized or written.
    /// The fault is logged before it is returned.
    pub fn save<T: Serialize>(&mut self, key: Key, value: &T) -> Result<(), PersistenceFault> {
        let storage_key = self.storage_key(key);
        let result = serde_json::to_string(value)
            .map_err(|source| PersistenceFault::Serialize {
                key: storage_key.clone(),
                source,
            })
            .and_then(|json| self.backend.write(&storage_key, &json));

        if let Err(fault) = &result {
            tracing::warn!("{fault}: {}", source_message(fault));
        } else {
            tracing::trace!("saved {storage_key}");
        }
        result
    }

    /// Remove a document.
    ///
    /// # Errors
    ///
    /// Returns a fault if the document could not be removed. The fault is
    /// logged before it is returned.
    pub fn remove(&mut self, key: Key) -> Result<(), PersistenceFault> {
        let storage_key = self.storage_key(key);
        self.backend.remove(&storage_key).inspect_err(|fault| {
            tracing::warn!("{fault}: {}", source_message(fault));
        })
    }
}

pub(crate) fn source_message(fault: &PersistenceFault) -> String {
    std::error::Error::source(fault).map_or_else(String::new, ToString::to_string)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemoryBackend;

    #[test]
    fn keys_share_namespace_prefix() {
        let persistence = Persistence::new(MemoryBackend::new(), "bdi");
        let keys: Vec<_> = Key::ALL
            .into_iter()
            .map(|key| persistence.storage_key(key))
            .collect();

        assert_eq!(
            keys,
            [
                "bdi_donors",
                "bdi_requests",
                "bdi_banks",
                "bdi_audits",
                "bdi_backups",
                "bdi_meta"
            ]
        );
    }

    #[test]
    fn missing_document_yields_fallback() {
        let persistence = Persistence::new(MemoryBackend::new(), "bdi");
        let loaded: Vec<u32> = persistence.load(Key::Banks, vec![7]);
        assert_eq!(loaded, [7]);
    }

    #[test]
    fn corrupt_document_yields_fallback() {
        let mut backend = MemoryBackend::new();
        backend.insert_raw("bdi_banks", "{not json");
        let persistence = Persistence::new(backend, "bdi");

        let loaded: Vec<u32> = persistence.load(Key::Banks, Vec::new());
        assert!(loaded.is_empty());
    }

    #[test]
    fn corrupt_document_is_a_parse_fault() {
        let mut backend = MemoryBackend::new();
        backend.insert_raw("bdi_banks", "{not json");
        let persistence = Persistence::new(backend, "bdi");

        let fault = persistence.try_load::<Vec<u32>>(Key::Banks).unwrap_err();
        assert!(matches!(fault, PersistenceFault::Parse { .. }));
        assert_eq!(fault.key(), "bdi_banks");
        assert!(persistence.try_load::<Vec<u32>>(Key::Donors).unwrap().is_none());
    }

    #[test]
    fn save_then_load_round_trips() {
        let mut persistence = Persistence::new(MemoryBackend::new(), "bdi");
        persistence.save(Key::Donors, &vec!["a", "b"]).unwrap();

        let loaded: Vec<String> = persistence.load(Key::Donors, Vec::new());
        assert_eq!(loaded, ["a", "b"]);
    }

    #[test]
    fn write_failure_is_reported() {
        let mut persistence = Persistence::new(MemoryBackend::new(), "bdi");
        persistence.backend_mut().reject_writes(true);

        let fault = persistence.save(Key::Meta, &1).unwrap_err();
        assert_eq!(fault.key(), "bdi_meta");

        let loaded: u32 = persistence.load(Key::Meta, 0);
        assert_eq!(loaded, 0);
    }
}
