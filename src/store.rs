//! The record store.
//!
//! A [`Store`] owns the persistence layer and exposes every query and
//! mutation: bank, donor and request management, inventory reconciliation,
//! the audit trail, backups and merge-import.
//!
//! Every operation runs to completion synchronously. Mutations follow a
//! load-modify-save discipline over whole documents: the collection is
//! loaded, a new collection is derived with at most one record replaced or
//! appended, and the whole collection is written back. Nothing guards against
//! two processes interleaving these steps on the same data root.

use std::{
    cell::RefCell,
    path::{Path, PathBuf},
};

use chrono::{DateTime, Utc};
use serde::{Serialize, de::DeserializeOwned};

use crate::{
    domain::{Config, Meta},
    storage::{
        Backend, FileBackend, Key, MemoryBackend, Persistence, PersistenceFault, source_message,
    },
};

mod audit;
mod backup;
mod banks;
mod donors;
mod inventory;
mod maintenance;
mod merge;
mod requests;

pub use inventory::Fulfillment;
pub use maintenance::Stats;
pub use merge::MergeReport;

/// The blood bank data store.
#[derive(Debug)]
pub struct Store<B> {
    persistence: Persistence<B>,
    config: Config,
    faults: RefCell<Vec<PersistenceFault>>,
}

impl Store<FileBackend> {
    /// Open the store kept in `root`.
    ///
    /// The configuration is read from `root/config.toml`; defaults are used
    /// if it is missing or invalid.
    #[must_use]
    pub fn open(root: PathBuf) -> Self {
        let config = load_config(&root);
        Self::new(FileBackend::new(root), config)
    }
}

impl Store<MemoryBackend> {
    /// A store that keeps everything in memory, with default configuration.
    #[must_use]
    pub fn in_memory() -> Self {
        Self::new(MemoryBackend::new(), Config::default())
    }
}

impl<B: Backend> Store<B> {
    /// Build a store over `backend`.
    pub fn new(backend: B, config: Config) -> Self {
        Self {
            persistence: Persistence::new(backend, config.namespace()),
            config,
            faults: RefCell::default(),
        }
    }

    /// The active configuration.
    pub const fn config(&self) -> &Config {
        &self.config
    }

    /// The underlying storage backend.
    pub const fn backend(&self) -> &B {
        self.persistence.backend()
    }

    /// Mutable access to the underlying storage backend.
    pub const fn backend_mut(&mut self) -> &mut B {
        self.persistence.backend_mut()
    }

    /// Drain the persistence faults recorded since the last call.
    ///
    /// Operations carry on when a write fails or a stored document cannot be
    /// read, so this is the only way to find out that a change may not have
    /// reached storage, or that a document was treated as empty and may be
    /// overwritten by the next save.
    pub fn take_faults(&mut self) -> Vec<PersistenceFault> {
        std::mem::take(self.faults.get_mut())
    }

    /// Load every document once and drain the faults that produced.
    ///
    /// A document listed here is read as empty, so the next mutation that
    /// saves it discards whatever it held.
    pub fn check(&mut self) -> Vec<PersistenceFault> {
        let _ = (self.banks(), self.donors(), self.requests());
        let _ = (self.audits(), self.backups(), self.meta());
        self.take_faults()
    }

    /// When the store was last modified, if ever.
    #[must_use]
    pub fn last_update(&self) -> Option<DateTime<Utc>> {
        self.meta().last_update
    }

    /// Read a whole document, recording any fault and using `fallback` in
    /// its place.
    fn load<T: DeserializeOwned>(&self, key: Key, fallback: T) -> T {
        match self.persistence.try_load(key) {
            Ok(value) => value.unwrap_or(fallback),
            Err(fault) => {
                tracing::warn!("{fault}: {}", source_message(&fault));
                self.faults.borrow_mut().push(fault);
                fallback
            }
        }
    }

    /// Write a whole document, recording (not propagating) any fault.
    fn persist<T: Serialize>(&mut self, key: Key, value: &T) {
        if let Err(fault) = self.persistence.save(key, value) {
            self.faults.get_mut().push(fault);
        }
    }

    fn meta(&self) -> Meta {
        self.load(Key::Meta, Meta::default())
    }

    /// Refresh the "last update" timestamp.
    fn touch(&mut self) {
        let meta = Meta {
            last_update: Some(Utc::now()),
            ..self.meta()
        };
        self.persist(Key::Meta, &meta);
    }
}

fn load_config(root: &Path) -> Config {
    let path = root.join("config.toml");
    Config::load(&path).unwrap_or_else(|e| {
        tracing::debug!("Failed to load config: {e}");
        Config::default()
    })
}

/// Derive a new collection in which the first element matching `matches` is
/// replaced by `update` applied to it.
///
/// Returns the new collection and a copy of the replacement, or `None` if no
/// element matched.
fn replace_one<T: Clone>(
    items: &[T],
    matches: impl Fn(&T) -> bool,
    update: impl FnOnce(&T) -> T,
) -> Option<(Vec<T>, T)> {
    let position = items.iter().position(matches)?;
    let replacement = update(&items[position]);
    let mut replaced = items.to_vec();
    replaced[position] = replacement.clone();
    Some((replaced, replacement))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{BloodGroup, NewBank};

    #[test]
    fn replace_one_touches_exactly_one_element() {
        let items = [1, 2, 3, 2];
        let (replaced, replacement) = replace_one(&items, |&x| x == 2, |x| x * 10).unwrap();

        assert_eq!(replaced, [1, 20, 3, 2]);
        assert_eq!(replacement, 20);
        assert_eq!(items, [1, 2, 3, 2]);
    }

    #[test]
    fn replace_one_without_match_is_none() {
        assert!(replace_one(&[1, 2], |&x| x == 9, |x| *x).is_none());
    }

    #[test]
    fn mutations_refresh_last_update() {
        let mut store = Store::in_memory();
        assert!(store.last_update().is_none());

        store
            .add_bank(NewBank {
                name: "City Blood Bank".to_string(),
                ..NewBank::default()
            })
            .unwrap();
        assert!(store.last_update().is_some());
    }

    #[test]
    fn write_failures_are_recorded_but_not_fatal() {
        let mut store = Store::in_memory();
        let bank = store
            .add_bank(NewBank {
                name: "City Blood Bank".to_string(),
                ..NewBank::default()
            })
            .unwrap();
        assert!(store.take_faults().is_empty());

        store.backend_mut().reject_writes(true);
        let result = store.set_stock(&bank.id, BloodGroup::OPositive, 4);

        // The operation reports success, but its writes were dropped.
        assert!(result.is_ok());
        let faults = store.take_faults();
        assert!(!faults.is_empty());
        assert!(faults.iter().any(|f| f.key() == "bdi_banks"));
        assert_eq!(
            store.bank(&bank.id).unwrap().inventory.get(BloodGroup::OPositive),
            0
        );
        assert!(store.take_faults().is_empty());
    }

    #[test]
    fn unreadable_documents_are_recorded() {
        let mut store = Store::in_memory();
        store.backend_mut().insert_raw("bdi_donors", "{not json");
        store.backend_mut().insert_raw(
            "bdi_banks",
            r#"[{"id": "b1", "name": "City Blood Bank", "inventory": {"O+": 2}}]"#,
        );

        assert!(store.donors().is_empty());
        assert_eq!(store.banks().len(), 1);

        let faults = store.take_faults();
        assert_eq!(faults.len(), 1);
        assert!(matches!(faults[0], PersistenceFault::Parse { .. }));
        assert_eq!(faults[0].key(), "bdi_donors");
        assert!(faults[0].is_load());
    }

    #[test]
    fn check_lists_each_unreadable_document_once() {
        let mut store = Store::in_memory();
        store.backend_mut().insert_raw("bdi_requests", "[{\"name\": 3}]");
        store.backend_mut().insert_raw("bdi_meta", "[]");

        let mut keys: Vec<_> = store.check().iter().map(|f| f.key().to_string()).collect();
        keys.sort();
        assert_eq!(keys, ["bdi_meta", "bdi_requests"]);
        assert!(store.take_faults().is_empty());
    }

    #[test]
    fn file_store_persists_across_reopen() {
        let tmp = tempfile::tempdir().unwrap();
        let id = {
            let mut store = Store::open(tmp.path().to_path_buf());
            store
                .add_bank(NewBank {
                    name: "Hope Blood Center".to_string(),
                    city: Some("Noida".to_string()),
                    inventory: None,
                })
                .unwrap()
                .id
        };

        let store = Store::open(tmp.path().to_path_buf());
        assert_eq!(store.bank(&id).unwrap().name, "Hope Blood Center");
        assert!(tmp.path().join("bdi_banks.json").exists());
    }

    #[test]
    fn namespace_from_config_prefixes_files() {
        let tmp = tempfile::tempdir().unwrap();
        let mut config = Config::default();
        config.set_namespace("clinic");
        config.save(&tmp.path().join("config.toml")).unwrap();

        let mut store = Store::open(tmp.path().to_path_buf());
        store
            .add_bank(NewBank {
                name: "City Blood Bank".to_string(),
                ..NewBank::default()
            })
            .unwrap();

        assert!(tmp.path().join("clinic_banks.json").exists());
        assert!(!tmp.path().join("bdi_banks.json").exists());
    }
}
