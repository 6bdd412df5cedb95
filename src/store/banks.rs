use serde_json::json;

use super::{Store, replace_one};
use crate::{
    Error,
    domain::{AuditAction, Bank, BloodGroup, Id, IdKind, Inventory, NewBank},
    error::Result,
    storage::{Backend, Key},
};

impl<B: Backend> Store<B> {
    /// Every bank, including archived ones, in creation order.
    #[must_use]
    pub fn banks(&self) -> Vec<Bank> {
        self.load(Key::Banks, Vec::new())
    }

    /// Banks that have not been archived.
    #[must_use]
    pub fn list_banks(&self) -> Vec<Bank> {
        self.banks().into_iter().filter(|b| !b.archived).collect()
    }

    /// Look up a bank by identifier, archived or not.
    #[must_use]
    pub fn bank(&self, id: &Id) -> Option<Bank> {
        self.banks().into_iter().find(|b| &b.id == id)
    }

    /// Create a bank.
    ///
    /// Stock defaults to zero for every group. An audit entry is recorded.
    ///
    /// # Errors
    ///
    /// Fails without touching storage if the name is missing.
    pub fn add_bank(&mut self, candidate: NewBank) -> Result<Bank> {
        let mut banks = self.banks();
        let id = Id::generate_unique(IdKind::Bank, |id| banks.iter().any(|b| &b.id == id));
        let bank = candidate.into_bank(id)?;

        banks.push(bank.clone());
        self.persist(Key::Banks, &banks);
        self.append_audit(
            &bank.id,
            AuditAction::Created,
            json!({ "name": bank.name, "city": bank.city }),
        );
        self.touch();

        tracing::info!("created bank {} ({})", bank.id, bank.name);
        Ok(bank)
    }

    /// Replace a bank's entire stock.
    ///
    /// # Errors
    ///
    /// Fails without touching storage if the bank does not exist.
    pub fn update_bank_inventory(&mut self, id: &Id, inventory: Inventory) -> Result<Bank> {
        let (banks, bank) = replace_one(
            &self.banks(),
            |b| &b.id == id,
            |b| Bank {
                inventory,
                ..b.clone()
            },
        )
        .ok_or_else(|| Error::BankNotFound(id.clone()))?;

        self.persist(Key::Banks, &banks);
        self.append_audit(
            id,
            AuditAction::InventoryUpdated,
            json!({ "inventory": inventory }),
        );
        self.touch();

        tracing::info!("updated inventory of bank {id}");
        Ok(bank)
    }

    /// Set the stock of a single blood group, leaving the others unchanged.
    ///
    /// # Errors
    ///
    /// Fails without touching storage if the bank does not exist.
    pub fn set_stock(&mut self, id: &Id, group: BloodGroup, units: u32) -> Result<Bank> {
        let bank = self
            .bank(id)
            .ok_or_else(|| Error::BankNotFound(id.clone()))?;
        self.update_bank_inventory(id, bank.inventory.with(group, units))
    }

    /// Hide a bank from listings and totals.
    ///
    /// The bank and its audit trail are kept; its identifier is never reused.
    ///
    /// # Errors
    ///
    /// Fails without touching storage if the bank does not exist.
    pub fn archive_bank(&mut self, id: &Id) -> Result<Bank> {
        let (banks, bank) = replace_one(
            &self.banks(),
            |b| &b.id == id,
            |b| Bank {
                archived: true,
                ..b.clone()
            },
        )
        .ok_or_else(|| Error::BankNotFound(id.clone()))?;

        self.persist(Key::Banks, &banks);
        self.touch();

        tracing::info!("archived bank {id}");
        Ok(bank)
    }
}
