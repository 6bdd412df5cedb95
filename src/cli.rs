use std::path::{Path, PathBuf};

mod backup;
mod bank;
mod donor;
mod maintenance;
mod report;
mod request;
mod terminal;
mod transfer;

use bloodbank::{
    BloodGroup, Id, Store,
    domain::coerce_units,
    storage::{FileBackend, PersistenceFault},
};
use clap::ArgAction;
use terminal::Colorize;
use tracing::instrument;

#[derive(Debug, clap::Parser)]
#[command(version, about)]
pub struct Cli {
    /// Verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,

    /// The directory holding the data store
    #[arg(short, long, default_value = ".", global = true)]
    root: PathBuf,

    #[command(subcommand)]
    command: Option<Command>,
}

impl Cli {
    pub fn run(self) -> anyhow::Result<()> {
        Self::setup_logging(self.verbose);

        self.command
            .unwrap_or(Command::Summary)
            .run(self.root)
    }

    fn setup_logging(verbosity: u8) {
        use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

        let level = match verbosity {
            0 => tracing::Level::WARN,
            1 => tracing::Level::INFO,
            2 => tracing::Level::DEBUG,
            _ => tracing::Level::TRACE,
        };

        let filter = tracing_subscriber::EnvFilter::from_default_env().add_directive(level.into());

        let fmt_layer = tracing_subscriber::fmt::layer()
            .with_writer(std::io::stderr)
            .with_target(false)
            .with_thread_names(false)
            .with_line_number(false);

        tracing_subscriber::registry()
            .with(filter)
            .with(fmt_layer)
            .init();
    }
}

#[derive(Debug, clap::Parser)]
pub enum Command {
    /// Show counts, stock and outstanding need (default)
    Summary,

    /// Initialize a new data store
    Init,

    /// Show or modify configuration settings
    Config(Config),

    /// Manage blood banks
    #[command(subcommand)]
    Bank(bank::Command),

    /// Manage donors
    #[command(subcommand)]
    Donor(donor::Command),

    /// Manage blood requests
    #[command(subcommand)]
    Request(request::Command),

    /// Draw units of a blood group from a bank
    ///
    /// This does not mark any request as fulfilled.
    Fulfill(Fulfill),

    /// Show the audit trail of a bank
    Audit(report::Audit),

    /// List or restore backups
    #[command(subcommand)]
    Backup(backup::Command),

    /// Write every record to a JSON file
    Export(transfer::Export),

    /// Merge records from an exported JSON file
    Import(transfer::Import),

    /// Remove all data
    Reset(maintenance::Reset),

    /// Install sample banks, a donor and a request
    Seed,
}

impl Command {
    fn run(self, root: PathBuf) -> anyhow::Result<()> {
        match self {
            Self::Init => init(&root),
            Self::Config(command) => command.run(&root),
            Self::Summary => with_store(root, |store| {
                report::summary(store);
                Ok(())
            }),
            Self::Bank(command) => with_store(root, |store| command.run(store)),
            Self::Donor(command) => with_store(root, |store| command.run(store)),
            Self::Request(command) => with_store(root, |store| command.run(store)),
            Self::Fulfill(command) => with_store(root, |store| command.run(store)),
            Self::Audit(command) => with_store(root, |store| command.run(store)),
            Self::Backup(command) => with_store(root, |store| command.run(store)),
            Self::Export(command) => with_store(root, |store| command.run(store)),
            Self::Import(command) => with_store(root, |store| command.run(store)),
            Self::Reset(command) => with_store(root, |store| command.run(store)),
            Self::Seed => with_store(root, |store| {
                maintenance::seed(store);
                Ok(())
            }),
        }
    }
}

/// Open the store in `root`, run `command` against it, then warn about any
/// writes that did not reach storage.
///
/// Documents that cannot be read are reported before `command` runs, since
/// they are treated as empty and any save replaces them.
fn with_store(
    root: PathBuf,
    command: impl FnOnce(&mut Store<FileBackend>) -> anyhow::Result<()>,
) -> anyhow::Result<()> {
    let mut store = Store::open(root);
    let unreadable = store.check();
    for fault in &unreadable {
        eprintln!(
            "{}",
            format!(
                "warning: {}; treating it as empty, changes will overwrite it",
                fault_message(fault)
            )
            .warning()
        );
    }

    let result = command(&mut store);
    for fault in store.take_faults() {
        let reported = fault.is_load() && unreadable.iter().any(|f| f.key() == fault.key());
        if !reported {
            eprintln!("{}", format!("warning: {}", fault_message(&fault)).warning());
        }
    }
    result
}

fn fault_message(fault: &PersistenceFault) -> String {
    use std::error::Error;

    fault.source().map_or_else(
        || fault.to_string(),
        |source| format!("{fault}: {source}"),
    )
}

#[instrument]
fn init(root: &Path) -> anyhow::Result<()> {
    let config_path = root.join("config.toml");
    if config_path.exists() {
        anyhow::bail!(
            "Data store already initialized (found {})",
            config_path.display()
        );
    }

    std::fs::create_dir_all(root)
        .map_err(|e| anyhow::anyhow!("Failed to create {}: {e}", root.display()))?;
    bloodbank::Config::default()
        .save(&config_path)
        .map_err(|e| anyhow::anyhow!("Failed to create config.toml: {e}"))?;

    println!("Initialized data store in {}", root.display());
    println!("  Created: config.toml");
    Ok(())
}

#[derive(Debug, clap::Parser)]
pub struct Config {
    #[command(subcommand)]
    command: ConfigCommand,
}

#[derive(Debug, clap::Parser)]
enum ConfigCommand {
    /// Show current configuration
    Show,

    /// Set a configuration value
    Set {
        /// Configuration key to set (namespace, recent_limit)
        key: String,

        /// Value to set
        value: String,
    },
}

impl Config {
    #[instrument]
    fn run(self, root: &Path) -> anyhow::Result<()> {
        let config_path = root.join("config.toml");
        let mut config = if config_path.exists() {
            bloodbank::Config::load(&config_path).map_err(|e| anyhow::anyhow!("{e}"))?
        } else {
            bloodbank::Config::default()
        };

        match self.command {
            ConfigCommand::Show => {
                println!("Configuration:");
                println!(
                    "  namespace: {} {}",
                    config.namespace(),
                    format!("(exports to {})", config.export_file_name()).dim()
                );
                println!("  recent_limit: {}", config.recent_limit);
            }
            ConfigCommand::Set { key, value } => {
                match key.as_str() {
                    "namespace" => {
                        if !config.set_namespace(&value) {
                            println!("Namespace unchanged.");
                            return Ok(());
                        }
                    }
                    "recent_limit" => {
                        config.recent_limit = value
                            .parse()
                            .map_err(|_| anyhow::anyhow!("Value must be a non-negative integer"))?;
                    }
                    _ => anyhow::bail!("Unknown configuration key: {key}"),
                }

                config
                    .save(&config_path)
                    .map_err(|e| anyhow::anyhow!("{e}"))?;
                println!("{}", format!("{key} set to {value}").success());
                if key == "namespace" {
                    println!(
                        "{}",
                        "Records stored under the previous namespace are not moved.".info()
                    );
                }
            }
        }

        Ok(())
    }
}

#[derive(Debug, clap::Parser)]
pub struct Fulfill {
    /// The bank to draw from
    bank: Id,

    /// The blood group to draw
    blood_group: BloodGroup,

    /// Units to draw; anything that is not a number counts as zero
    units: String,
}

impl Fulfill {
    #[instrument(skip(store))]
    fn run(self, store: &mut Store<FileBackend>) -> anyhow::Result<()> {
        let units = coerce_units(&self.units);
        let fulfillment = store.fulfill_from_bank(&self.bank, self.blood_group, units)?;

        println!("{}", fulfillment.to_string().success());
        println!(
            "  {} unit(s) of {} drawn, {} left",
            fulfillment.units,
            fulfillment.blood_group,
            fulfillment.remaining()
        );
        Ok(())
    }
}
