use bloodbank::{
    BloodGroup, Id, Store,
    domain::{Bank, NewBank},
    storage::FileBackend,
};
use tracing::instrument;

use super::terminal::{Colorize, render_inventory};

#[derive(Debug, clap::Parser)]
pub enum Command {
    /// Register a bank with empty stock
    Add {
        /// Display name
        name: String,

        /// City the bank is located in
        #[arg(long)]
        city: Option<String>,
    },

    /// List banks and their stock
    List {
        /// Include archived banks
        #[arg(long)]
        all: bool,
    },

    /// Show a single bank
    Show {
        /// The bank to show
        id: Id,
    },

    /// Set the stock of one blood group
    Stock {
        /// The bank to update
        id: Id,

        /// The blood group to set
        blood_group: BloodGroup,

        /// New number of units
        units: u32,
    },

    /// Hide a bank from listings and totals
    Archive {
        /// The bank to archive
        id: Id,
    },
}

impl Command {
    #[instrument(skip(store))]
    pub fn run(self, store: &mut Store<FileBackend>) -> anyhow::Result<()> {
        match self {
            Self::Add { name, city } => {
                let bank = store.add_bank(NewBank {
                    name,
                    city,
                    inventory: None,
                })?;
                println!("{}", format!("Added bank {}", bank.id).success());
            }
            Self::List { all } => {
                let banks = if all {
                    store.banks()
                } else {
                    store.list_banks()
                };
                if banks.is_empty() {
                    println!("No banks.");
                }
                for bank in &banks {
                    print_bank(bank);
                }
            }
            Self::Show { id } => {
                let Some(bank) = store.bank(&id) else {
                    anyhow::bail!("Bank not found: {id}");
                };
                print_bank(&bank);
                println!(
                    "  {}",
                    format!("{} audit entries", store.audit_trail(&id).len()).dim()
                );
            }
            Self::Stock {
                id,
                blood_group,
                units,
            } => {
                let bank = store.set_stock(&id, blood_group, units)?;
                println!(
                    "{}",
                    format!("{}: {blood_group} set to {units}", bank.name).success()
                );
            }
            Self::Archive { id } => {
                let bank = store.archive_bank(&id)?;
                println!("{}", format!("Archived {}", bank.name).success());
            }
        }
        Ok(())
    }
}

fn print_bank(bank: &Bank) {
    let mut heading = format!("{} {}", bank.id.as_str().info(), bank.name);
    if let Some(city) = &bank.city {
        heading.push_str(&format!(" ({city})"));
    }
    if bank.archived {
        heading.push_str(&" [archived]".dim());
    }
    println!("{heading}");
    println!(
        "{}",
        render_inventory(bank.inventory.iter().map(|(g, u)| (g, u64::from(u))))
    );
}
