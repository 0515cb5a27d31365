//! Batch processing of scanner output.

use std::fs;
use std::io::Read;
use std::path::Path;

use anyhow::{Context, Result};
use data::ScanResult;
use serde::Deserialize;

use super::Session;

#[derive(Deserialize)]
#[serde(untagged)]
enum Batch {
    One(ScanResult),
    Many(Vec<ScanResult>),
}

pub fn parse_scans(json: &str) -> Result<Vec<ScanResult>> {
    let batch = serde_json::from_str(json).context("parse scans")?;
    Ok(match batch {
        Batch::One(scan) => vec![scan],
        Batch::Many(scans) => scans,
    })
}

/// Read scans from `file`, or stdin when there is none.
pub fn read_scans(file: Option<&Path>) -> Result<Vec<ScanResult>> {
    let json = match file {
        Some(path) => fs::read_to_string(path).with_context(|| format!("read {:?}", path))?,
        None => {
            let mut json = String::new();
            std::io::stdin().read_to_string(&mut json).context("read stdin")?;
            json
        }
    };
    parse_scans(&json)
}

/// Give every species that has progress a rules entry, then bring automated
/// modes in line with the current tiers.
fn sync_rules(session: &mut Session) -> bool {
    let mut changed = false;
    let species = session.store.species().keys().cloned().collect::<Vec<_>>();
    for name in species {
        changed |= session.rules.ensure_species(&name, &session.config.default_species_template);
    }
    changed |= !session.engine.refresh_automated(&mut session.rules, &session.store).is_empty();
    changed
}

/// Run every scan through the cycle, saving after each one.
pub fn process_all(session: &mut Session, scans: &[ScanResult]) -> Result<Vec<String>> {
    if sync_rules(session) {
        session.save_rules()?;
    }

    let mut lines = Vec::with_capacity(scans.len());
    for scan in scans {
        let outcome = session.engine.process(
            scan,
            &mut session.rules,
            &mut session.store,
            &session.config.default_species_template,
        );
        if !outcome.species.is_empty() {
            session.save_store()?;
        }
        if outcome.rules_dirty() {
            session.save_rules()?;
        }

        let fired = outcome.trace.fired_modes().iter().map(|m| m.as_str()).collect::<Vec<_>>();
        let species = if outcome.species.is_empty() { scan.species_raw.as_str() } else { outcome.species.as_str() };
        lines.push(format!("{} {species} [{}]", outcome.decision(), fired.join(", ")));
    }
    Ok(lines)
}
