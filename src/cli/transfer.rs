use std::{fs, path::PathBuf};

use anyhow::Context;
use bloodbank::{Store, domain::Dataset, storage::FileBackend};
use tracing::instrument;

use super::terminal::Colorize;

#[derive(Debug, clap::Parser)]
pub struct Export {
    /// Where to write; defaults to `<namespace>_export.json` in the data root
    #[arg(short, long)]
    output: Option<PathBuf>,
}

impl Export {
    #[instrument(skip(store))]
    pub fn run(self, store: &Store<FileBackend>) -> anyhow::Result<()> {
        let path = self.output.unwrap_or_else(|| {
            store
                .backend()
                .root()
                .join(store.config().export_file_name())
        });

        let json = serde_json::to_string_pretty(&store.export())?;
        fs::write(&path, json).with_context(|| format!("Failed to write {}", path.display()))?;

        println!("{}", format!("Exported to {}", path.display()).success());
        Ok(())
    }
}

#[derive(Debug, clap::Parser)]
pub struct Import {
    /// A file written by `export`
    path: PathBuf,
}

impl Import {
    #[instrument(skip(store))]
    pub fn run(self, store: &mut Store<FileBackend>) -> anyhow::Result<()> {
        let content = fs::read_to_string(&self.path)
            .with_context(|| format!("Failed to read {}", self.path.display()))?;
        let dataset: Dataset = serde_json::from_str(&content)
            .with_context(|| format!("{} is not a valid export", self.path.display()))?;

        let report = store.import(dataset);
        println!("{}", format!("Imported {}", self.path.display()).success());
        println!("  {report}");
        Ok(())
    }
}
