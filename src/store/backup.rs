use chrono::Utc;
use tracing::instrument;

use super::{MergeReport, Store};
use crate::{
    Error,
    domain::{BackupEntry, BackupRing, Dataset},
    error::Result,
    storage::{Backend, Key},
};

impl<B: Backend> Store<B> {
    /// A copy of every record store as it is now.
    #[must_use]
    pub fn snapshot(&self) -> Dataset {
        Dataset {
            banks: self.banks(),
            donors: self.donors(),
            requests: self.requests(),
            audits: self.audits(),
        }
    }

    /// The backup ring, newest first.
    #[must_use]
    pub fn backups(&self) -> BackupRing {
        self.load(Key::Backups, BackupRing::default())
    }

    /// Push a snapshot onto the front of the backup ring, evicting the oldest
    /// if the ring is full.
    pub fn record_backup(&mut self, snapshot: Dataset) {
        let mut ring = self.backups();
        ring.record(BackupEntry {
            timestamp: Utc::now(),
            snapshot,
        });
        self.persist(Key::Backups, &ring);
        tracing::debug!("recorded backup, {} held", ring.len());
    }

    /// Merge the backup at `index` (0 is newest) back into the store.
    ///
    /// This is not a rollback: records created since the backup are kept,
    /// and records that exist in both are left as they are now. The merge
    /// itself takes a fresh backup first.
    ///
    /// # Errors
    ///
    /// Fails if there is no backup at `index`.
    #[instrument(skip(self))]
    pub fn restore(&mut self, index: usize) -> Result<MergeReport> {
        let entry = self
            .backups()
            .get(index)
            .cloned()
            .ok_or(Error::BackupNotFound(index))?;

        tracing::info!(
            "restoring backup taken at {}",
            entry.timestamp.to_rfc3339()
        );
        Ok(self.merge(entry.snapshot))
    }
}
