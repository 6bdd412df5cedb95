//! Inventory reconciliation.
//!
//! Drawing stock from a bank is independent of marking a request
//! fulfilled: a request may be met by several partial draws, or without any
//! bank at all. Callers that want both must do both.

use std::fmt;

use chrono::Utc;
use serde_json::json;

use super::{Store, replace_one};
use crate::{
    Error,
    domain::{AuditAction, Bank, BloodGroup, GroupTotals, Id, Inventory, blood_group::zeroed_totals},
    error::Result,
    storage::{Backend, Key},
};

/// A successful draw of units from a bank.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Fulfillment {
    /// The bank after the draw.
    pub bank: Bank,
    /// The group drawn from.
    pub blood_group: BloodGroup,
    /// Units drawn.
    pub units: u32,
}

impl Fulfillment {
    /// Units of the group left in the bank.
    #[must_use]
    pub const fn remaining(&self) -> u32 {
        self.bank.inventory.get(self.blood_group)
    }
}

impl fmt::Display for Fulfillment {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "Fulfilled from bank: {}", self.bank.name)
    }
}

impl<B: Backend> Store<B> {
    /// Draw `units` of `blood_group` from a bank.
    ///
    /// On success the bank's stock is reduced, an audit entry is recorded and
    /// the last-update time is refreshed. Requests are not touched.
    ///
    /// # Errors
    ///
    /// Fails without touching storage if the bank does not exist or holds
    /// fewer than `units` of the group.
    pub fn fulfill_from_bank(
        &mut self,
        bank_id: &Id,
        blood_group: BloodGroup,
        units: u32,
    ) -> Result<Fulfillment> {
        let banks = self.banks();
        let bank = banks
            .iter()
            .find(|b| &b.id == bank_id)
            .ok_or_else(|| Error::BankNotFound(bank_id.clone()))?;

        let available = bank.inventory.get(blood_group);
        let Some(inventory) = bank.inventory.checked_take(blood_group, units) else {
            tracing::debug!(
                "rejected draw of {units} {blood_group} from {bank_id}: {available} held"
            );
            return Err(Error::InsufficientUnits {
                bank: bank.name.clone(),
                blood_group,
                requested: units,
                available,
            });
        };

        let (banks, bank) = replace_one(
            &banks,
            |b| &b.id == bank_id,
            |b| Bank {
                inventory,
                ..b.clone()
            },
        )
        .ok_or_else(|| Error::BankNotFound(bank_id.clone()))?;

        self.persist(Key::Banks, &banks);
        self.append_audit(
            bank_id,
            AuditAction::FulfilledRequest,
            json!({
                "bloodGroup": blood_group,
                "units": units,
                "timestamp": Utc::now().timestamp_millis(),
            }),
        );
        self.touch();

        tracing::info!("drew {units} {blood_group} from bank {bank_id}");
        Ok(Fulfillment {
            bank,
            blood_group,
            units,
        })
    }

    /// Stock held by a single bank.
    ///
    /// # Errors
    ///
    /// Fails if the bank does not exist.
    pub fn bank_stock(&self, bank_id: &Id) -> Result<Inventory> {
        self.bank(bank_id)
            .map(|b| b.inventory)
            .ok_or_else(|| Error::BankNotFound(bank_id.clone()))
    }

    /// Stock per group, summed across all banks that are not archived.
    #[must_use]
    pub fn aggregate(&self) -> GroupTotals {
        let mut totals = zeroed_totals();
        for bank in self.list_banks() {
            for (group, units) in bank.inventory.iter() {
                *totals.entry(group).or_default() += u64::from(units);
            }
        }
        totals
    }

    /// Units still needed per group, summed across open requests.
    #[must_use]
    pub fn top_needed(&self) -> GroupTotals {
        let mut totals = zeroed_totals();
        for request in self.requests().into_iter().filter(|r| r.is_open()) {
            *totals.entry(request.blood_group).or_default() += u64::from(request.units);
        }
        totals
    }
}
