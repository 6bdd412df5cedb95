use bloodbank::{Store, storage::FileBackend};
use tracing::instrument;

use super::terminal::Colorize;

#[derive(Debug, clap::Parser)]
pub enum Command {
    /// List backups, newest first
    List,

    /// Merge a backup back into the store
    ///
    /// Records created since the backup are kept.
    Restore {
        /// Position in the list, 0 being the newest
        index: usize,
    },
}

impl Command {
    #[instrument(skip(store))]
    pub fn run(self, store: &mut Store<FileBackend>) -> anyhow::Result<()> {
        match self {
            Self::List => {
                let ring = store.backups();
                if ring.is_empty() {
                    println!("No backups.");
                }
                for (index, entry) in ring.iter().enumerate() {
                    println!(
                        "{index}: {} {}",
                        entry.timestamp.format("%Y-%m-%d %H:%M:%S"),
                        format!(
                            "({} banks, {} donors, {} requests)",
                            entry.snapshot.banks.len(),
                            entry.snapshot.donors.len(),
                            entry.snapshot.requests.len()
                        )
                        .dim()
                    );
                }
            }
            Self::Restore { index } => {
                let report = store.restore(index)?;
                println!("{}", format!("Restored backup {index}").success());
                println!("  {report}");
            }
        }
        Ok(())
    }
}
