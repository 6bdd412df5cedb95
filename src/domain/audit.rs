use std::{collections::BTreeMap, fmt};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::domain::Id;

/// The kind of state change recorded against a bank.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AuditAction {
    /// The bank was created.
    Created,
    /// The bank's stock was set directly.
    InventoryUpdated,
    /// Units were drawn from the bank to fulfil a request.
    FulfilledRequest,
}

impl fmt::Display for AuditAction {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.pad(match self {
            Self::Created => "created",
            Self::InventoryUpdated => "inventory_updated",
            Self::FulfilledRequest => "fulfilled_request",
        })
    }
}

/// One immutable audit record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuditEntry {
    /// When the action happened.
    #[serde(with = "chrono::serde::ts_milliseconds")]
    pub timestamp: DateTime<Utc>,
    /// What happened.
    pub action: AuditAction,
    /// Action-specific payload.
    #[serde(default)]
    pub details: Value,
}

/// Append-only audit entries, grouped by bank.
///
/// Entries for a bank are kept in the order they were appended.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AuditLog(BTreeMap<Id, Vec<AuditEntry>>);

impl AuditLog {
    /// Append an entry to a bank's sequence, creating it if absent.
    pub fn append(&mut self, bank: Id, entry: AuditEntry) {
        self.0.entry(bank).or_default().push(entry);
    }

    /// The entries recorded for a bank, oldest first.
    #[must_use]
    pub fn entries(&self, bank: &Id) -> &[AuditEntry] {
        self.0.get(bank).map_or(&[], Vec::as_slice)
    }

    /// Concatenate another log's sequences onto this one.
    ///
    /// Entries are never deduplicated: absorbing the same log twice records
    /// its entries twice.
    pub fn absorb(&mut self, other: Self) {
        for (bank, entries) in other.0 {
            self.0.entry(bank).or_default().extend(entries);
        }
    }

    /// Total number of entries across all banks.
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.values().map(Vec::len).sum()
    }

    /// Whether no entries have been recorded.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.values().all(Vec::is_empty)
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    fn entry(action: AuditAction) -> AuditEntry {
        AuditEntry {
            timestamp: Utc::now(),
            action,
            details: json!({}),
        }
    }

    #[test]
    fn unknown_bank_has_no_entries() {
        let log = AuditLog::default();
        assert!(log.entries(&Id::from("b1")).is_empty());
        assert!(log.is_empty());
    }

    #[test]
    fn append_preserves_order_per_bank() {
        let mut log = AuditLog::default();
        log.append(Id::from("b1"), entry(AuditAction::Created));
        log.append(Id::from("b2"), entry(AuditAction::Created));
        log.append(Id::from("b1"), entry(AuditAction::FulfilledRequest));

        let actions: Vec<_> = log
            .entries(&Id::from("b1"))
            .iter()
            .map(|e| e.action)
            .collect();
        assert_eq!(
            actions,
            [AuditAction::Created, AuditAction::FulfilledRequest]
        );
        assert_eq!(log.len(), 3);
    }

    #[test]
    fn absorbing_twice_accumulates() {
        let mut incoming = AuditLog::default();
        incoming.append(Id::from("b1"), entry(AuditAction::InventoryUpdated));

        let mut log = AuditLog::default();
        log.absorb(incoming.clone());
        log.absorb(incoming);

        assert_eq!(log.entries(&Id::from("b1")).len(), 2);
    }

    #[test]
    fn serializes_as_map_of_bank_to_entries() {
        let mut log = AuditLog::default();
        log.append(Id::from("b1"), entry(AuditAction::FulfilledRequest));

        let value = serde_json::to_value(&log).unwrap();
        assert_eq!(value["b1"][0]["action"], json!("fulfilled_request"));
    }
}
