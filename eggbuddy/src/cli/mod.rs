//! Command line surface.

mod process;
mod report;
mod verify;

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use data::stat_list::StatListMode;
use data::{ProgressStore, RulesBook, Sex, StatReading, Wipe};
use engine::Engine;

use crate::config::Config;

#[derive(Parser, Debug)]
#[command(name = "eggbuddy", version, about = "Keep or destroy scanned eggs and track breeding progress")]
pub struct Cli {
    /// Configuration file to use instead of the default location.
    #[arg(long, global = true, env = "EGGBUDDY_CONFIG")]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Show what would happen to an egg, without recording anything.
    Verify {
        /// Species as shown in game, e.g. "CS Rex Male" or just "Rex".
        species: String,
        sex: Sex,
        /// Stat reading, repeatable. Example: --stat health=35+2
        #[arg(long = "stat", value_name = "NAME=BASE+MUT", value_parser = data::parse_stat_arg)]
        stats: Vec<(String, StatReading)>,
    },
    /// Run scans through the keep/destroy cycle and record progress.
    Process {
        /// JSON file with one scan or a list of scans. Reads stdin if omitted.
        file: Option<PathBuf>,
    },
    /// Write the stat list for the current wipe.
    StatList {
        #[arg(long)]
        mode: Option<StatListMode>,
        /// Output file. Prints to stdout if omitted.
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Print the main and mutation stud of a species.
    Progress { species: String },
    /// Switch the current wipe.
    Wipe { name: String },
}

/// Rules and the current wipe's store, loaded together.
pub struct Session {
    pub config: Config,
    pub engine: Engine,
    pub rules_path: PathBuf,
    pub rules: RulesBook,
    pub wipe: Wipe,
    pub store: ProgressStore,
    /// Set when `rules_path` exists but could not be parsed.
    unreadable_rules: bool,
}

impl Session {
    pub fn open(config: Config) -> Result<Self> {
        let data_dir = config.data_dir()?;
        let rules_path = data::wipe::rules_path(&data_dir);
        let (rules, unreadable_rules) = match RulesBook::try_load(&rules_path) {
            Ok(rules) => (rules, false),
            Err(err) => {
                tracing::warn!(error = %err, "failed to load rules; starting empty");
                (RulesBook::default(), true)
            }
        };
        let wipe = Wipe::open(&data_dir, &config.current_wipe);
        let store = wipe.load_store();
        tracing::debug!(wipe = wipe.name(), species = store.species().len(), rules = rules.len(), "session opened");
        Ok(Self {
            engine: Engine::new(config.engine),
            config,
            rules_path,
            rules,
            wipe,
            store,
            unreadable_rules,
        })
    }

    /// Save the rules book. An unparsed rules file is copied aside first.
    pub fn save_rules(&mut self) -> Result<()> {
        if self.unreadable_rules {
            let backup = self.rules_backup_path();
            fs::copy(&self.rules_path, &backup).with_context(|| format!("back up {:?}", self.rules_path))?;
            tracing::warn!(backup = %backup.display(), "unreadable rules file backed up before overwrite");
            self.unreadable_rules = false;
        }
        self.rules.save(&self.rules_path)
    }

    pub fn rules_backup_path(&self) -> PathBuf {
        self.rules_path.with_extension("json.bak")
    }

    pub fn save_store(&self) -> Result<()> {
        self.wipe.save_store(&self.store)
    }
}

pub fn run(command: Command, config: Config, config_path: &Path) -> Result<()> {
    match command {
        Command::Verify { species, sex, stats } => {
            let session = Session::open(config)?;
            let out = verify::verify(&session, &species, sex, stats);
            println!("{out}");
        }
        Command::Process { file } => {
            let mut session = Session::open(config)?;
            let scans = process::read_scans(file.as_deref())?;
            for line in process::process_all(&mut session, &scans)? {
                println!("{line}");
            }
        }
        Command::StatList { mode, output } => {
            let session = Session::open(config)?;
            let mode = mode.unwrap_or(session.config.stat_list_mode);
            report::stat_list(&session, mode, output.as_deref())?;
        }
        Command::Progress { species } => {
            let session = Session::open(config)?;
            for line in report::progress(&session, &species) {
                println!("{line}");
            }
        }
        Command::Wipe { name } => switch_wipe(config, config_path, &name)?,
    }
    Ok(())
}

fn switch_wipe(mut config: Config, config_path: &Path, name: &str) -> Result<()> {
    let wipe = Wipe::open(&config.data_dir()?, name);
    config.current_wipe = wipe.name().to_string();
    config.save_to(config_path)?;
    tracing::info!(wipe = wipe.name(), "switched wipe");
    println!("Current wipe: {} ({})", wipe.name(), wipe.dir().display());
    Ok(())
}

#[cfg(test)]
pub(crate) fn test_config(dir: &Path) -> Config {
    Config {
        data_dir: Some(dir.to_path_buf()),
        ..Config::default()
    }
}
