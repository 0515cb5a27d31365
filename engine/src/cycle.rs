//! One scan -> decide -> update cycle.

use data::{ProgressStore, RulesBook, ScanResult, Sex, SpeciesProgress, SpeciesRules};

use crate::{Decision, DecisionTrace, Engine, evaluate, has_species_marker, resolve};

/// Everything a cycle decided and changed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CycleOutcome {
	/// Canonical species key; empty when the species line was unreadable.
	pub species: String,
	pub decision: Option<Decision>,
	pub trace: DecisionTrace,
	pub new_species: bool,
	pub rules_changed: bool,
	pub updated_thresholds: bool,
	pub updated_stud: bool,
	pub updated_mutation_stud: bool,
	pub updated_top_stats: bool,
	pub female_count: u32,
}

impl CycleOutcome {
	pub fn decision(&self) -> Decision {
		self.decision.unwrap_or(Decision::Rescan)
	}

	/// Whether the rules book needs saving.
	pub fn rules_dirty(&self) -> bool {
		self.new_species || self.rules_changed
	}
}

impl Engine {
	/// Run one egg through the whole cycle, updating `rules` and `store`.
	///
	/// A rescan leaves both untouched. Persisting is up to the caller.
	pub fn process(
		&self,
		scan: &ScanResult,
		rules: &mut RulesBook,
		store: &mut ProgressStore,
		template: &SpeciesRules,
	) -> CycleOutcome {
		if !has_species_marker(&scan.species_raw) {
			let (decision, trace) = evaluate(scan, template, &SpeciesProgress::default(), self.config.tiers);
			return CycleOutcome {
				decision: Some(decision),
				trace,
				..Default::default()
			};
		}

		let species = self.normalize_species(&scan.species_raw, rules);
		let new_species = rules.ensure_species(&species, template);
		let mut rules_changed = false;
		if new_species {
			rules_changed = self.adjust_for_females(&species, rules, store);
		}

		let species_rules = rules.get(&species).cloned().unwrap_or_default();
		let (decision, trace) = self.evaluate(scan, &species_rules, store.entry(&species));

		let mut outcome = CycleOutcome {
			female_count: store.get(&species).map_or(0, |p| p.female_count),
			species,
			decision: Some(decision),
			new_species,
			rules_changed,
			..Default::default()
		};
		let species = outcome.species.as_str();
		let stats = &scan.stats;

		if decision == Decision::Keep && scan.sex == Sex::Female {
			outcome.female_count = store.increment_female_count(species, scan.sex);
			if self.adjust_for_females(species, rules, store) {
				log::info!("Rules updated for {species} (females={})", outcome.female_count);
				outcome.rules_changed = true;
			}
		}

		// Thresholds only follow eggs kept for their mutations.
		if trace.mutations {
			outcome.updated_thresholds = store.update_mutation_thresholds(species, stats, &species_rules, scan.sex);
		}
		if scan.sex == Sex::Male {
			outcome.updated_stud = store.update_stud(species, stats, &species_rules);
			outcome.updated_mutation_stud = store.update_mutation_stud(species, stats, &species_rules);
		}
		if decision == Decision::Keep {
			outcome.updated_top_stats = store.update_top_stats(species, stats);
		}

		outcome.trace = trace;
		outcome
	}

	/// Re-resolve an automated species' modes and store them if they moved.
	pub fn adjust_for_females(&self, species: &str, rules: &mut RulesBook, store: &ProgressStore) -> bool {
		let Some(current) = rules.get(species) else {
			return false;
		};
		let default = SpeciesProgress::default();
		let progress = store.get(species).unwrap_or(&default);
		let modes = resolve(progress.female_count, &current.modes, self.config.tiers.for_species(progress));
		rules.set_modes(species, modes)
	}
}
