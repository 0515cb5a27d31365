//! Keep/destroy decisions for scanned eggs and the progress they drive.

use data::{Modes, ProgressStore, RulesBook, ScanResult, SpeciesProgress, SpeciesRules};

mod automated;
pub use automated::*;
mod cycle;
pub use cycle::*;
mod evaluate;
pub use evaluate::*;

/// Tunables of the decision engine.
#[derive(Debug, Clone, Copy, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct EngineConfig {
	pub tiers: AutomatedTiers,
	/// Minimum similarity for a scanned name to map onto a known species.
	pub fuzzy_cutoff: f64,
}

impl Default for EngineConfig {
	fn default() -> Self {
		Self {
			tiers: AutomatedTiers::default(),
			fuzzy_cutoff: data::DEFAULT_CUTOFF,
		}
	}
}

pub struct Engine {
	config: EngineConfig,
}

impl Engine {
	pub fn new(config: EngineConfig) -> Self {
		Self { config }
	}

	pub fn config(&self) -> &EngineConfig {
		&self.config
	}

	/// Map a raw species line onto a key of `rules`, or a new cleaned key.
	pub fn normalize_species(&self, raw: &str, rules: &RulesBook) -> String {
		data::normalize_species_name(raw, rules.keys(), self.config.fuzzy_cutoff)
	}

	/// The modes a species currently runs with, before the always-on ones.
	pub fn resolve_modes(&self, rules: &SpeciesRules, progress: &SpeciesProgress) -> Modes {
		resolve(progress.female_count, &rules.modes, self.config.tiers.for_species(progress))
	}

	pub fn evaluate(&self, scan: &ScanResult, rules: &SpeciesRules, progress: &SpeciesProgress) -> (Decision, DecisionTrace) {
		evaluate(scan, rules, progress, self.config.tiers)
	}

	/// Resolve every automated species in `rules` against `store`.
	///
	/// Returns the species whose stored modes changed.
	pub fn refresh_automated(&self, rules: &mut RulesBook, store: &ProgressStore) -> Vec<String> {
		let species = rules.keys().map(str::to_owned).collect::<Vec<_>>();
		species
			.into_iter()
			.filter(|name| self.adjust_for_females(name, rules, store))
			.collect()
	}
}

impl Default for Engine {
	fn default() -> Self {
		Self::new(EngineConfig::default())
	}
}

#[cfg(test)]
mod tests {
	use data::{Mode, Sex, Stats};

	use super::*;

	#[test]
	fn config_fills_missing_fields() {
		let config: EngineConfig = serde_json::from_str(r#"{"tiers": {"stop_at": 40}}"#).unwrap();
		assert_eq!(config.tiers.all_females_below, 5);
		assert_eq!(config.tiers.stop_at, 40);
		assert_eq!(config.fuzzy_cutoff, data::DEFAULT_CUTOFF);
	}

	#[test]
	fn stricter_cutoff_creates_new_species() {
		let mut rules = RulesBook::default();
		rules.insert("Raptor", SpeciesRules::default());

		let loose = Engine::default();
		assert_eq!(loose.normalize_species("CS Raptr Male", &rules), "Raptor");

		let strict = Engine::new(EngineConfig {
			fuzzy_cutoff: 0.95,
			..Default::default()
		});
		assert_eq!(strict.normalize_species("CS Raptr Male", &rules), "Raptr");
	}

	#[test]
	fn custom_tiers_reach_evaluation() {
		let engine = Engine::new(EngineConfig {
			tiers: AutomatedTiers {
				all_females_below: 2,
				stop_at: 3,
			},
			..Default::default()
		});
		let rules = SpeciesRules {
			modes: [Mode::Automated].into_iter().collect(),
			..Default::default()
		};
		let progress = SpeciesProgress {
			female_count: 3,
			..Default::default()
		};
		let egg = ScanResult::new("CS Rex Female", Sex::Female, Stats::new());

		assert!(!engine.resolve_modes(&rules, &progress).contains(Mode::AllFemales));
		assert_eq!(engine.evaluate(&egg, &rules, &progress).0, Decision::Destroy);
		assert_eq!(Engine::default().evaluate(&egg, &rules, &progress).0, Decision::Keep);
	}

	#[test]
	fn refresh_reports_changed_species() {
		let engine = Engine::default();
		let mut rules = RulesBook::default();
		rules.ensure_species("Rex", &SpeciesRules::default());
		rules.insert("Dodo", SpeciesRules::default());
		let mut store = ProgressStore::new();
		store.entry("Rex").female_count = 10;

		assert_eq!(engine.refresh_automated(&mut rules, &store), vec!["Rex".to_owned()]);
		assert!(rules.get("Rex").unwrap().modes.contains(Mode::TopStatFemales));
		assert!(engine.refresh_automated(&mut rules, &store).is_empty());
	}
}
