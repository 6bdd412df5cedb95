use bloodbank::{Id, Store, storage::FileBackend};
use tracing::instrument;

use super::terminal::{Colorize, render_inventory};

/// Print headline counts, total stock and outstanding need.
#[instrument(skip(store))]
pub fn summary(store: &Store<FileBackend>) {
    let stats = store.stats();
    println!("{}", "Summary".info());
    println!("  Donors:        {}", stats.donors);
    println!("  Open requests: {}", stats.open_requests);
    println!("  Banks:         {}", stats.banks);
    println!("  Units held:    {}", stats.total_units);
    if let Some(at) = store.last_update() {
        println!(
            "  {}",
            format!("Last updated {}", at.format("%Y-%m-%d %H:%M:%S UTC")).dim()
        );
    }

    println!("\n{}", "Stock".info());
    println!("{}", render_inventory(store.aggregate()));

    println!("\n{}", "Needed by open requests".info());
    println!("{}", render_inventory(store.top_needed()));
}

#[derive(Debug, clap::Parser)]
pub struct Audit {
    /// The bank whose trail to show
    bank: Id,
}

impl Audit {
    #[instrument(skip(store))]
    pub fn run(self, store: &Store<FileBackend>) -> anyhow::Result<()> {
        let trail = store.audit_trail(&self.bank);
        if trail.is_empty() {
            if store.bank(&self.bank).is_none() {
                anyhow::bail!("Bank not found: {}", self.bank);
            }
            println!("No audit entries.");
        }

        for entry in trail {
            println!(
                "{} {:<18} {}",
                entry.timestamp.format("%Y-%m-%d %H:%M:%S").to_string().dim(),
                entry.action,
                entry.details
            );
        }
        Ok(())
    }
}
