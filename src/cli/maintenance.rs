use bloodbank::{Store, storage::FileBackend};
use dialoguer::Confirm;
use tracing::instrument;

use super::terminal::Colorize;

#[derive(Debug, clap::Parser)]
pub struct Reset {
    /// Skip the confirmation prompt
    #[arg(long, short)]
    yes: bool,
}

impl Reset {
    #[instrument(skip(store))]
    pub fn run(self, store: &mut Store<FileBackend>) -> anyhow::Result<()> {
        if !self.yes {
            let confirmed = Confirm::new()
                .with_prompt("Remove all banks, donors, requests, audit entries and backups?")
                .default(false)
                .interact()?;
            if !confirmed {
                println!("Cancelled");
                return Ok(());
            }
        }

        store.reset();
        println!("{}", "All data removed.".warning());
        Ok(())
    }
}

#[instrument(skip(store))]
pub fn seed(store: &mut Store<FileBackend>) {
    if store.seed_sample_data() {
        println!("{}", "Sample data installed.".success());
    } else {
        println!("Sample data was already installed.");
    }
}
