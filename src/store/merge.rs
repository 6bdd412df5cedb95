//! Merge-import.
//!
//! Merging is a union in which existing records always win: an incoming
//! record that collides with an existing one is dropped, never used to update
//! it. Audit entries are the exception; they are appended without any
//! deduplication.

use std::fmt;

use tracing::instrument;

use super::Store;
use crate::{
    domain::{Bank, Dataset, Donor, Id, IdKind, Request},
    storage::{Backend, Key},
};

/// Counts of what a merge added.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MergeReport {
    /// Incoming banks that were kept.
    pub banks_added: usize,
    /// Incoming donors that were kept.
    pub donors_added: usize,
    /// Incoming requests that were kept.
    pub requests_added: usize,
    /// Audit entries appended.
    pub audit_entries_added: usize,
}

impl fmt::Display for MergeReport {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(
            f,
            "added {} bank(s), {} donor(s), {} request(s) and {} audit entries",
            self.banks_added, self.donors_added, self.requests_added, self.audit_entries_added
        )
    }
}

impl<B: Backend> Store<B> {
    /// Union `incoming` into the store.
    ///
    /// A backup of the current state is taken first. Then, for each
    /// collection, incoming records without an identifier are given one and
    /// each is kept unless it matches a record already present:
    ///
    /// - banks match on identifier, or on name and city together;
    /// - donors match on identifier, or on name and phone together;
    /// - requests match on identifier only.
    ///
    /// Incoming records are compared against the collection as it grows, so
    /// duplicates within `incoming` are dropped too. Audit sequences are
    /// appended to each bank's trail unconditionally.
    #[instrument(skip_all)]
    pub fn merge(&mut self, incoming: Dataset) -> MergeReport {
        self.record_backup(self.snapshot());

        let mut banks = self.banks();
        let banks_added = union(&mut banks, incoming.banks);
        self.persist(Key::Banks, &banks);

        let mut donors = self.donors();
        let donors_added = union(&mut donors, incoming.donors);
        self.persist(Key::Donors, &donors);

        let mut requests = self.requests();
        let requests_added = union(&mut requests, incoming.requests);
        self.persist(Key::Requests, &requests);

        let audit_entries_added = incoming.audits.len();
        let mut audits = self.audits();
        audits.absorb(incoming.audits);
        self.persist(Key::Audits, &audits);

        self.touch();

        let report = MergeReport {
            banks_added,
            donors_added,
            requests_added,
            audit_entries_added,
        };
        tracing::info!("merge {report}");
        report
    }

    /// Everything needed to rebuild the store elsewhere.
    #[must_use]
    pub fn export(&self) -> Dataset {
        self.snapshot()
    }

    /// Merge an exported dataset into the store. See [`Store::merge`].
    pub fn import(&mut self, dataset: Dataset) -> MergeReport {
        self.merge(dataset)
    }
}

/// A record that can take part in a merge.
trait Mergeable {
    const KIND: IdKind;

    fn id(&self) -> &Id;

    fn id_mut(&mut self) -> &mut Id;

    /// Whether `other` is the same real-world record as `self`.
    fn same(&self, other: &Self) -> bool;
}

impl Mergeable for Bank {
    const KIND: IdKind = IdKind::Bank;

    fn id(&self) -> &Id {
        &self.id
    }

    fn id_mut(&mut self) -> &mut Id {
        &mut self.id
    }

    fn same(&self, other: &Self) -> bool {
        self.same_identity(other)
    }
}

impl Mergeable for Donor {
    const KIND: IdKind = IdKind::Donor;

    fn id(&self) -> &Id {
        &self.id
    }

    fn id_mut(&mut self) -> &mut Id {
        &mut self.id
    }

    fn same(&self, other: &Self) -> bool {
        self.same_identity(other)
    }
}

impl Mergeable for Request {
    const KIND: IdKind = IdKind::Request;

    fn id(&self) -> &Id {
        &self.id
    }

    fn id_mut(&mut self) -> &mut Id {
        &mut self.id
    }

    fn same(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

/// Append each incoming record to `existing` unless it matches a record
/// already there. Returns how many were appended.
fn union<T: Mergeable>(existing: &mut Vec<T>, incoming: Vec<T>) -> usize {
    let before = existing.len();
    for mut record in incoming {
        if record.id().is_unassigned() {
            *record.id_mut() =
                Id::generate_unique(T::KIND, |candidate| existing.iter().any(|e| e.id() == candidate));
        }

        if existing.iter().any(|e| e.same(&record)) {
            tracing::debug!("dropping duplicate incoming record {}", record.id());
            continue;
        }
        existing.push(record);
    }
    existing.len() - before
}
