use chrono::Utc;
use tracing::instrument;

use super::Store;
use crate::{
    domain::{
        Availability, Bank, BloodGroup, Dataset, Donor, Id, Inventory, Meta, Request,
        RequestStatus,
    },
    storage::{Backend, Key},
};

/// Headline counts for a dashboard.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Stats {
    /// Registered donors.
    pub donors: usize,
    /// Requests still open.
    pub open_requests: usize,
    /// Banks that are not archived.
    pub banks: usize,
    /// Units held across banks that are not archived.
    pub total_units: u64,
}

impl<B: Backend> Store<B> {
    /// Headline counts across every store.
    #[must_use]
    pub fn stats(&self) -> Stats {
        Stats {
            donors: self.donors().len(),
            open_requests: self.requests().iter().filter(|r| r.is_open()).count(),
            banks: self.list_banks().len(),
            total_units: self.aggregate().values().sum(),
        }
    }

    /// Remove every record store, the backup ring and the bookkeeping.
    ///
    /// The configuration file is left alone.
    #[instrument(skip(self))]
    pub fn reset(&mut self) {
        for key in Key::ALL {
            if let Err(fault) = self.persistence.remove(key) {
                self.faults.get_mut().push(fault);
            }
        }
        tracing::info!("all data removed");
    }

    /// Merge a small set of sample records into the store, once.
    ///
    /// Returns `false` without changing anything if the samples have already
    /// been installed, even if they were since removed by hand. A
    /// [`reset`](Self::reset) clears the flag.
    #[instrument(skip(self))]
    pub fn seed_sample_data(&mut self) -> bool {
        if self.meta().sample_seeded {
            tracing::debug!("sample data already seeded");
            return false;
        }

        self.merge(sample_data());
        let meta = Meta {
            sample_seeded: true,
            ..self.meta()
        };
        self.persist(Key::Meta, &meta);
        true
    }
}

fn sample_data() -> Dataset {
    let now = Utc::now();
    Dataset {
        banks: vec![
            Bank {
                id: Id::from("b1"),
                name: "City Blood Bank".to_string(),
                city: Some("New Delhi".to_string()),
                inventory: Inventory::default()
                    .with(BloodGroup::APositive, 5)
                    .with(BloodGroup::ANegative, 2)
                    .with(BloodGroup::BPositive, 4)
                    .with(BloodGroup::BNegative, 1)
                    .with(BloodGroup::OPositive, 8)
                    .with(BloodGroup::ONegative, 1)
                    .with(BloodGroup::AbPositive, 2),
                archived: false,
            },
            Bank {
                id: Id::from("b2"),
                name: "Hope Blood Center".to_string(),
                city: Some("Noida".to_string()),
                inventory: Inventory::default()
                    .with(BloodGroup::APositive, 3)
                    .with(BloodGroup::ANegative, 1)
                    .with(BloodGroup::BPositive, 2)
                    .with(BloodGroup::OPositive, 6)
                    .with(BloodGroup::ONegative, 2)
                    .with(BloodGroup::AbPositive, 1),
                archived: false,
            },
        ],
        donors: vec![Donor {
            id: Id::from("d1"),
            name: "Asha Verma".to_string(),
            blood_group: BloodGroup::APositive,
            phone: "+919876543210".to_string(),
            city: Some("New Delhi".to_string()),
            availability: Availability::Available,
            created: now,
        }],
        requests: vec![Request {
            id: Id::from("r1"),
            name: "Rahul Jain".to_string(),
            blood_group: BloodGroup::APositive,
            phone: "+919999999999".to_string(),
            units: 2,
            city: Some("New Delhi".to_string()),
            notes: Some("ICU".to_string()),
            status: RequestStatus::Open,
            created: now,
        }],
        ..Dataset::default()
    }
}
