//! Persistent application configuration.
//!
//! Stored as JSON in a platform-appropriate config directory.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use data::stat_list::StatListMode;
use data::{Mode, SpeciesRules};
use engine::EngineConfig;
use serde::{Deserialize, Serialize};

/// On-disk configuration for the application.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Wipe whose progress is read and written.
    pub current_wipe: String,

    /// Root of rules and wipe data. Defaults to the platform data directory.
    pub data_dir: Option<PathBuf>,

    pub engine: EngineConfig,

    /// Rules given to a species the first time it is scanned.
    pub default_species_template: SpeciesRules,

    /// Per-module log levels, e.g. `{"engine::evaluate": "debug"}`.
    pub log_levels: BTreeMap<String, String>,

    pub stat_list_mode: StatListMode,

    /// Appended verbatim to the generated stat list.
    pub custom_stat_list_lines: Vec<String>,
}

impl Default for Config {
    fn default() -> Self {
        let stats = |names: &[&str]| names.iter().map(|s| s.to_string()).collect::<Vec<_>>();
        Self {
            current_wipe: data::wipe::DEFAULT_WIPE.to_string(),
            data_dir: None,
            engine: EngineConfig::default(),
            default_species_template: SpeciesRules {
                modes: [Mode::Mutations, Mode::StatMerge, Mode::AllFemales, Mode::War, Mode::Automated]
                    .into_iter()
                    .collect(),
                mutation_stats: stats(&["health", "melee"]),
                stat_merge_stats: stats(&["health", "melee", "stamina"]),
                top_stat_females_stats: stats(&["health", "melee", "stamina"]),
                war_stats: stats(&["health", "melee", "stamina"]),
            },
            log_levels: BTreeMap::new(),
            stat_list_mode: StatListMode::Full,
            custom_stat_list_lines: Vec::new(),
        }
    }
}

impl Config {
    /// Path to the config file.
    pub fn path() -> Result<PathBuf> {
        let base = dirs::config_dir().context("config_dir() unavailable")?;
        Ok(base.join("eggbuddy.json"))
    }

    /// Try to load configuration from `path`; a missing file gives defaults.
    pub fn try_load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let json = fs::read_to_string(path).with_context(|| format!("read {:?}", path))?;
        let cfg = serde_json::from_str(&json).with_context(|| format!("parse {:?}", path))?;
        Ok(cfg)
    }

    /// Save configuration to `path`.
    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).with_context(|| format!("create {:?}", parent))?;
        }
        let json = serde_json::to_string_pretty(self).context("serialize config")?;
        fs::write(path, json).with_context(|| format!("write {:?}", path))?;
        Ok(())
    }

    /// Root directory for rules and wipes.
    pub fn data_dir(&self) -> Result<PathBuf> {
        match &self.data_dir {
            Some(dir) => Ok(dir.clone()),
            None => {
                let base = dirs::data_dir().context("data_dir() unavailable")?;
                Ok(base.join("EggBuddy"))
            }
        }
    }
}
