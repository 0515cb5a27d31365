//! Dry-run evaluation of a hand-entered egg.

use std::fmt;

use data::{ScanResult, Sex, SpeciesProgress, StatReading, Stats};
use engine::{Decision, DecisionTrace};

use super::Session;

pub struct Verdict {
    pub species: String,
    pub decision: Decision,
    pub trace: DecisionTrace,
}

impl fmt::Display for Verdict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Normalized species: {}", self.species)?;
        write!(f, "Overall decision: {}", self.decision.as_str().to_uppercase())?;
        for mode in self.trace.fired_modes() {
            write!(f, "\n  would keep via {mode}")?;
        }
        for (key, value) in &self.trace.debug {
            write!(f, "\n  debug[{key}]: {value}")?;
        }
        Ok(())
    }
}

/// The species line as the game prints it, so "Rex" works as input too.
fn species_line(species: &str, sex: Sex) -> String {
    if engine::has_species_marker(species) {
        species.to_string()
    } else {
        format!("CS {species} {sex}")
    }
}

/// Evaluate against the stored rules and progress without touching either.
pub fn verify(session: &Session, species: &str, sex: Sex, stats: Vec<(String, StatReading)>) -> Verdict {
    let scan = ScanResult::new(species_line(species, sex), sex, stats.into_iter().collect::<Stats>());
    let species = session.engine.normalize_species(&scan.species_raw, &session.rules);
    let rules = session
        .rules
        .get(&species)
        .unwrap_or(&session.config.default_species_template);
    let default = SpeciesProgress::default();
    let progress = session.store.get(&species).unwrap_or(&default);

    let (decision, trace) = session.engine.evaluate(&scan, rules, progress);
    Verdict { species, decision, trace }
}
