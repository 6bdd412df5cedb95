use chrono::Utc;
use serde_json::Value;

use super::Store;
use crate::{
    domain::{AuditAction, AuditEntry, AuditLog, Id},
    storage::{Backend, Key},
};

impl<B: Backend> Store<B> {
    /// The full audit map.
    #[must_use]
    pub fn audits(&self) -> AuditLog {
        self.load(Key::Audits, AuditLog::default())
    }

    /// The entries recorded for a bank, oldest first. Empty if none.
    #[must_use]
    pub fn audit_trail(&self, bank: &Id) -> Vec<AuditEntry> {
        self.audits().entries(bank).to_vec()
    }

    /// Record an action against a bank.
    ///
    /// The bank is not required to exist.
    pub fn append_audit(&mut self, bank: &Id, action: AuditAction, details: Value) {
        let mut audits = self.audits();
        audits.append(
            bank.clone(),
            AuditEntry {
                timestamp: Utc::now(),
                action,
                details,
            },
        );
        self.persist(Key::Audits, &audits);
        tracing::debug!("audit {action} on bank {bank}");
    }
}
