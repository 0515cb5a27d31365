//! Read-only reports over the current wipe.

use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use data::stat_list::{self, StatListMode};

use super::Session;

pub fn stat_list_lines(session: &Session, mode: StatListMode) -> Vec<String> {
    stat_list::generate(
        session.store.species(),
        &session.rules,
        mode,
        &session.config.custom_stat_list_lines,
    )
}

/// Write the stat list to `output`, or stdout.
pub fn stat_list(session: &Session, mode: StatListMode, output: Option<&Path>) -> Result<()> {
    let lines = stat_list_lines(session, mode);
    match output {
        Some(path) => {
            let mut text = lines.join("\n");
            text.push('\n');
            fs::write(path, text).with_context(|| format!("write {:?}", path))?;
            tracing::info!(lines = lines.len(), path = %path.display(), "stat list written");
        }
        None => {
            for line in &lines {
                println!("{line}");
            }
        }
    }
    Ok(())
}

pub fn progress(session: &Session, species: &str) -> Vec<String> {
    let species = session.engine.normalize_species(species, &session.rules);
    stat_list::stud_summary(&session.store, &species)
}
