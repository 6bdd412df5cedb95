use std::collections::VecDeque;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::{AuditLog, Bank, Donor, Request, lenient::null_as_default};

/// Maximum number of snapshots retained in the backup ring.
pub const MAX_BACKUPS: usize = 5;

/// A full copy of the record stores.
///
/// This is the shape of export files, import files and backup snapshots.
/// Every key is optional when reading; absent or `null` keys read as empty.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Dataset {
    /// Every bank, archived or not.
    #[serde(deserialize_with = "null_as_default")]
    pub banks: Vec<Bank>,
    /// Every donor.
    #[serde(deserialize_with = "null_as_default")]
    pub donors: Vec<Donor>,
    /// Every request, open or fulfilled.
    #[serde(deserialize_with = "null_as_default")]
    pub requests: Vec<Request>,
    /// Per-bank audit entries.
    #[serde(deserialize_with = "null_as_default")]
    pub audits: AuditLog,
}

/// A point-in-time snapshot in the backup ring.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BackupEntry {
    /// When the snapshot was taken.
    #[serde(with = "chrono::serde::ts_milliseconds")]
    pub timestamp: DateTime<Utc>,
    /// The state at that time.
    pub snapshot: Dataset,
}

/// Bounded history of snapshots, newest first.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BackupRing(VecDeque<BackupEntry>);

impl BackupRing {
    /// Add a snapshot at the front, evicting the oldest beyond
    /// [`MAX_BACKUPS`].
    pub fn record(&mut self, entry: BackupEntry) {
        self.0.push_front(entry);
        self.0.truncate(MAX_BACKUPS);
    }

    /// The snapshot at `index`, where 0 is the newest.
    #[must_use]
    pub fn get(&self, index: usize) -> Option<&BackupEntry> {
        self.0.get(index)
    }

    /// Iterate from newest to oldest.
    pub fn iter(&self) -> impl Iterator<Item = &BackupEntry> {
        self.0.iter()
    }

    /// Number of snapshots held.
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether no snapshots are held.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// Process-wide bookkeeping.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Meta {
    /// Time of the most recent mutation.
    #[serde(
        with = "chrono::serde::ts_milliseconds_option",
        skip_serializing_if = "Option::is_none"
    )]
    pub last_update: Option<DateTime<Utc>>,
    /// Whether the sample records have been installed.
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub sample_seeded: bool,
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn ring_keeps_newest_five() {
        let mut ring = BackupRing::default();
        for i in 0..8 {
            ring.record(BackupEntry {
                timestamp: DateTime::from_timestamp_millis(i).unwrap(),
                snapshot: Dataset::default(),
            });
        }

        assert_eq!(ring.len(), MAX_BACKUPS);
        let stamps: Vec<_> = ring.iter().map(|e| e.timestamp.timestamp_millis()).collect();
        assert_eq!(stamps, [7, 6, 5, 4, 3]);
    }

    #[test]
    fn partial_dataset_reads_missing_keys_as_empty() {
        let dataset: Dataset = serde_json::from_value(json!({
            "banks": [{"name": "City Blood Bank", "city": "New Delhi"}],
            "donors": null,
            "audits": null,
            "unknown": 42,
        }))
        .unwrap();

        assert_eq!(dataset.banks.len(), 1);
        assert!(dataset.donors.is_empty());
        assert!(dataset.requests.is_empty());
        assert!(dataset.audits.is_empty());
    }

    #[test]
    fn null_banks_read_as_empty() {
        let dataset: Dataset = serde_json::from_value(json!({
            "banks": null,
            "donors": [],
        }))
        .unwrap();
        assert_eq!(dataset, Dataset::default());
    }

    #[test]
    fn meta_round_trips_last_update() {
        let meta = Meta {
            last_update: DateTime::from_timestamp_millis(1_700_000_000_000),
            sample_seeded: true,
        };
        let value = serde_json::to_value(&meta).unwrap();
        assert_eq!(value["lastUpdate"], json!(1_700_000_000_000_i64));

        let back: Meta = serde_json::from_value(value).unwrap();
        assert_eq!(back, meta);
    }
}
