use serde::{Deserialize, Serialize};

use crate::domain::{
    Id, Inventory, lenient,
    validation::{Checker, ValidationErrors, optional_text},
};

/// A facility holding blood stock.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Bank {
    /// Assigned at creation and never changed.
    #[serde(default)]
    pub id: Id,
    /// Display name.
    pub name: String,
    /// City the bank is located in.
    #[serde(
        default,
        deserialize_with = "lenient::blank_as_none",
        skip_serializing_if = "Option::is_none"
    )]
    pub city: Option<String>,
    /// Units held per blood group.
    #[serde(default)]
    pub inventory: Inventory,
    /// Archived banks are hidden from listings and totals but never deleted.
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub archived: bool,
}

impl Bank {
    /// Whether `other` describes the same bank: either the same identifier,
    /// or the same name in the same city. A blank city is no city.
    #[must_use]
    pub fn same_identity(&self, other: &Self) -> bool {
        self.id == other.id || (self.name == other.name && self.located() == other.located())
    }

    fn located(&self) -> Option<&str> {
        self.city.as_deref().map(str::trim).filter(|c| !c.is_empty())
    }
}

/// A bank as submitted for creation.
#[derive(Debug, Clone, Default)]
pub struct NewBank {
    /// Required.
    pub name: String,
    /// Optional.
    pub city: Option<String>,
    /// Starting stock; all zero when absent.
    pub inventory: Option<Inventory>,
}

impl NewBank {
    /// Validate the candidate and build the stored record.
    ///
    /// # Errors
    ///
    /// Returns the list of missing required fields.
    pub fn into_bank(self, id: Id) -> Result<Bank, ValidationErrors> {
        let mut checker = Checker::default();
        let name = checker.text("name", self.name);
        checker.finish()?;

        Ok(Bank {
            id,
            name,
            city: optional_text(self.city),
            inventory: self.inventory.unwrap_or_default(),
            archived: false,
        })
    }
}
