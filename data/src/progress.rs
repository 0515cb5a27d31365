//! Per-species breeding records and the updaters that advance them.

use std::collections::BTreeMap;

use crate::{Category, History, Sex, SpeciesHistory, SpeciesRules, Stats};

/// Accumulated state of one species within a wipe.
///
/// Every lookup defaults to 0 for an attribute that was never recorded.
#[derive(Debug, Clone, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct SpeciesProgress {
	/// Highest base seen per attribute.
	pub top_stats: BTreeMap<String, u32>,
	/// Highest mutation count seen on a kept male, per attribute.
	pub mutation_thresholds: BTreeMap<String, u32>,
	/// Base values of the current merge stud.
	pub stud: BTreeMap<String, u32>,
	/// Best base seen at the current mutation threshold, per attribute.
	pub mutation_stud: BTreeMap<String, u32>,
	pub female_count: u32,
	/// Overrides the all-females tier boundary when non-zero.
	pub stop_female_count: u32,
	/// Overrides the population target when non-zero.
	pub stop_top_stat_females: u32,
}

fn lookup(map: &BTreeMap<String, u32>, attr: &str) -> u32 {
	map.get(attr).copied().unwrap_or(0)
}

impl SpeciesProgress {
	pub fn top_stat(&self, attr: &str) -> u32 {
		lookup(&self.top_stats, attr)
	}

	pub fn threshold(&self, attr: &str) -> u32 {
		lookup(&self.mutation_thresholds, attr)
	}

	pub fn stud_base(&self, attr: &str) -> u32 {
		lookup(&self.stud, attr)
	}

	pub fn mutation_stud_base(&self, attr: &str) -> u32 {
		lookup(&self.mutation_stud, attr)
	}

	/// Raise top stats to any higher base in `stats`.
	pub fn update_top_stats(&mut self, stats: &Stats, history: &mut SpeciesHistory) -> bool {
		let mut updated = false;
		for (attr, reading) in stats.iter() {
			let current = self.top_stat(attr);
			if reading.base > 0 && reading.base > current {
				log::info!("New top stat for {attr}: {} (was {current})", reading.base);
				self.top_stats.insert(attr.to_owned(), reading.base);
				history.record(Category::TopStats, attr, reading.base);
				updated = true;
			}
		}
		updated
	}

	/// Raise mutation thresholds from a male egg.
	///
	/// An attribute whose threshold advances also takes the egg's base as its
	/// mutation stud, since older studs belong to the lower tier.
	pub fn update_mutation_thresholds(
		&mut self,
		stats: &Stats,
		rules: &SpeciesRules,
		sex: Sex,
		history: &mut SpeciesHistory,
	) -> bool {
		if sex != Sex::Male {
			return false;
		}
		let mut updated = false;
		for attr in &rules.mutation_stats {
			let reading = stats.get(attr);
			let current = self.threshold(attr);
			if reading.mutation > 0 && reading.mutation > current {
				log::info!("New threshold for {attr}: {} (was {current})", reading.mutation);
				self.mutation_thresholds.insert(attr.clone(), reading.mutation);
				self.mutation_stud.insert(attr.clone(), reading.base);
				history.record(Category::MutationThresholds, attr, reading.mutation);
				updated = true;
			}
		}
		updated
	}

	/// Replace the stud when the egg beats it on the merge attributes.
	///
	/// A new stud re-baselines the top stats: they become exactly the stud's
	/// non-zero merge values, even where that lowers or drops an entry.
	pub fn update_stud(&mut self, stats: &Stats, rules: &SpeciesRules, history: &mut SpeciesHistory) -> bool {
		let verdict = StudVerdict::compare(stats, &rules.stat_merge_stats, self);
		if !verdict.is_better() {
			return false;
		}
		log::info!("New stud accepted: {verdict}");

		self.stud = rules
			.stat_merge_stats
			.iter()
			.map(|attr| (attr.clone(), stats.base(attr)))
			.collect();

		let top_stats = self
			.stud
			.iter()
			.filter(|(_, base)| **base > 0)
			.map(|(attr, base)| (attr.clone(), *base))
			.collect::<BTreeMap<_, _>>();
		for (attr, base) in &top_stats {
			if self.top_stats.get(attr) != Some(base) {
				history.record(Category::TopStats, attr, *base);
			}
		}
		self.top_stats = top_stats;
		true
	}

	/// Track the best base among eggs sitting exactly on the mutation threshold.
	pub fn update_mutation_stud(&mut self, stats: &Stats, rules: &SpeciesRules) -> bool {
		let mut updated = false;
		for attr in &rules.mutation_stats {
			let reading = stats.get(attr);
			let current = self.mutation_stud_base(attr);
			if reading.mutation == self.threshold(attr) && reading.base > current {
				log::debug!("New mutation stud base for {attr}: {} (was {current})", reading.base);
				self.mutation_stud.insert(attr.clone(), reading.base);
				updated = true;
			}
		}
		updated
	}

	/// Count a kept female. Returns the count after the call.
	pub fn increment_female_count(&mut self, sex: Sex) -> u32 {
		if sex == Sex::Female {
			self.female_count = self.female_count.saturating_add(1);
		}
		self.female_count
	}
}

/// How an egg compares to the current stud on the merge attributes.
///
/// Shared by the stat merge criterion and [`SpeciesProgress::update_stud`] so
/// the keep decision and the stud replacement never disagree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StudVerdict {
	/// No stud yet and the egg reaches the top on at least one attribute.
	FirstStud { matches: usize },
	/// The egg reaches the top on more attributes than the stud.
	MoreMatches { matches: usize, stud: usize },
	/// Same number of top attributes, but a strictly higher base somewhere.
	HigherBase { attr: String, base: u32, stud_base: u32 },
	NotBetter { matches: usize, stud: usize },
}

impl StudVerdict {
	pub fn compare(stats: &Stats, merge_stats: &[String], progress: &SpeciesProgress) -> Self {
		let matches = merge_stats
			.iter()
			.filter(|attr| stats.base(attr) >= progress.top_stat(attr))
			.count();
		let stud = merge_stats
			.iter()
			.filter(|attr| progress.stud_base(attr) >= progress.top_stat(attr))
			.count();

		if matches > 0 && progress.stud.is_empty() {
			return Self::FirstStud { matches };
		}
		if matches > stud {
			return Self::MoreMatches { matches, stud };
		}
		if matches == stud && matches > 0 {
			let higher = merge_stats.iter().find(|attr| stats.base(attr) > progress.stud_base(attr));
			if let Some(attr) = higher {
				return Self::HigherBase {
					attr: attr.clone(),
					base: stats.base(attr),
					stud_base: progress.stud_base(attr),
				};
			}
		}
		Self::NotBetter { matches, stud }
	}

	pub fn is_better(&self) -> bool {
		!matches!(self, Self::NotBetter { .. })
	}
}

impl std::fmt::Display for StudVerdict {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		match self {
			Self::FirstStud { matches } => write!(f, "first valid stud ({matches} top)"),
			Self::MoreMatches { matches, stud } => write!(f, "{matches}>{stud}"),
			Self::HigherBase { attr, base, stud_base } => write!(f, "{attr} base {base}>{stud_base}"),
			Self::NotBetter { matches, stud } => write!(f, "not better: {matches}<={stud}"),
		}
	}
}

/// Progress and history of every species in one wipe.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProgressStore {
	species: BTreeMap<String, SpeciesProgress>,
	history: History,
}

impl ProgressStore {
	pub fn new() -> Self {
		Self::default()
	}

	pub fn from_parts(species: BTreeMap<String, SpeciesProgress>, history: History) -> Self {
		Self { species, history }
	}

	pub fn get(&self, species: &str) -> Option<&SpeciesProgress> {
		self.species.get(species)
	}

	/// The species' record, created empty on first use.
	pub fn entry(&mut self, species: &str) -> &mut SpeciesProgress {
		self.species.entry(species.to_owned()).or_default()
	}

	pub fn species(&self) -> &BTreeMap<String, SpeciesProgress> {
		&self.species
	}

	pub fn history(&self) -> &History {
		&self.history
	}

	fn split(&mut self, species: &str) -> (&mut SpeciesProgress, &mut SpeciesHistory) {
		let progress = self.species.entry(species.to_owned()).or_default();
		let history = self.history.species_mut(species);
		(progress, history)
	}

	pub fn update_top_stats(&mut self, species: &str, stats: &Stats) -> bool {
		let (progress, history) = self.split(species);
		progress.update_top_stats(stats, history)
	}

	pub fn update_mutation_thresholds(&mut self, species: &str, stats: &Stats, rules: &SpeciesRules, sex: Sex) -> bool {
		if sex != Sex::Male {
			return false;
		}
		let (progress, history) = self.split(species);
		progress.update_mutation_thresholds(stats, rules, sex, history)
	}

	pub fn update_stud(&mut self, species: &str, stats: &Stats, rules: &SpeciesRules) -> bool {
		let (progress, history) = self.split(species);
		progress.update_stud(stats, rules, history)
	}

	pub fn update_mutation_stud(&mut self, species: &str, stats: &Stats, rules: &SpeciesRules) -> bool {
		self.entry(species).update_mutation_stud(stats, rules)
	}

	/// Count a kept female. Males leave the store untouched.
	pub fn increment_female_count(&mut self, species: &str, sex: Sex) -> u32 {
		if sex != Sex::Female {
			return self.get(species).map_or(0, |p| p.female_count);
		}
		self.entry(species).increment_female_count(sex)
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::StatReading;

	fn stats(values: &[(&str, u32, u32)]) -> Stats {
		values.iter().map(|(attr, base, m)| (*attr, StatReading::new(*base, *m))).collect()
	}

	fn merge_rules(attrs: &[&str]) -> SpeciesRules {
		SpeciesRules {
			stat_merge_stats: attrs.iter().map(|s| s.to_string()).collect(),
			..Default::default()
		}
	}

	fn mutation_rules(attrs: &[&str]) -> SpeciesRules {
		SpeciesRules {
			mutation_stats: attrs.iter().map(|s| s.to_string()).collect(),
			..Default::default()
		}
	}

	#[test]
	fn top_stats_record_new_value_once() {
		let mut store = ProgressStore::new();
		let egg = stats(&[("melee", 5, 0), ("health", 0, 0)]);
		assert!(store.update_top_stats("Rex", &egg));
		assert!(!store.update_top_stats("Rex", &egg));

		let rex = store.get("Rex").unwrap();
		assert_eq!(rex.top_stat("melee"), 5);
		assert!(!rex.top_stats.contains_key("health"));
		assert_eq!(store.history().entries("Rex", Category::TopStats, "melee").len(), 1);
	}

	#[test]
	fn top_stats_never_decrease() {
		let mut store = ProgressStore::new();
		store.update_top_stats("Rex", &stats(&[("melee", 5, 0)]));
		assert!(!store.update_top_stats("Rex", &stats(&[("melee", 4, 0)])));
		assert_eq!(store.get("Rex").unwrap().top_stat("melee"), 5);
	}

	#[test]
	fn thresholds_only_move_for_males() {
		let mut store = ProgressStore::new();
		let rules = mutation_rules(&["melee"]);
		let egg = stats(&[("melee", 30, 3), ("health", 20, 9)]);
		assert!(!store.update_mutation_thresholds("Rex", &egg, &rules, Sex::Female));
		assert!(store.get("Rex").is_none());

		assert!(store.update_mutation_thresholds("Rex", &egg, &rules, Sex::Male));
		let rex = store.get("Rex").unwrap();
		assert_eq!(rex.threshold("melee"), 3);
		assert_eq!(rex.threshold("health"), 0);
		assert_eq!(rex.mutation_stud_base("melee"), 30);
		assert_eq!(
			store.history().entries("Rex", Category::MutationThresholds, "melee")[0].value,
			3
		);
		assert!(!store.update_mutation_thresholds("Rex", &stats(&[("melee", 40, 2)]), &rules, Sex::Male));
	}

	#[test]
	fn mutation_stud_tracks_best_base_on_threshold() {
		let mut progress = SpeciesProgress::default();
		progress.mutation_thresholds.insert("melee".into(), 2);
		progress.mutation_stud.insert("melee".into(), 5);
		let rules = mutation_rules(&["melee"]);

		assert!(progress.update_mutation_stud(&stats(&[("melee", 6, 2)]), &rules));
		assert_eq!(progress.mutation_stud_base("melee"), 6);
		assert!(!progress.update_mutation_stud(&stats(&[("melee", 9, 1)]), &rules));
		assert!(!progress.update_mutation_stud(&stats(&[("melee", 6, 2)]), &rules));
	}

	#[test]
	fn first_stud_sets_top_stats() {
		let mut store = ProgressStore::new();
		let rules = merge_rules(&["health", "melee"]);
		assert!(store.update_stud("Rex", &stats(&[("health", 30, 0), ("melee", 0, 0)]), &rules));

		let rex = store.get("Rex").unwrap();
		assert_eq!(rex.stud, BTreeMap::from([("health".into(), 30), ("melee".into(), 0)]));
		assert_eq!(rex.top_stats, BTreeMap::from([("health".into(), 30)]));
	}

	#[test]
	fn tied_stud_with_higher_base_replaces_and_rebaselines() {
		let mut progress = SpeciesProgress::default();
		progress.top_stats = BTreeMap::from([("health".into(), 30), ("melee".into(), 40), ("food".into(), 12)]);
		progress.stud = BTreeMap::from([("health".into(), 30), ("melee".into(), 35)]);
		let rules = merge_rules(&["health", "melee"]);
		let mut history = SpeciesHistory::default();

		// One top attribute each, but melee 38 beats the stud's 35.
		let egg = stats(&[("health", 30, 0), ("melee", 38, 0)]);
		assert!(progress.update_stud(&egg, &rules, &mut history));
		assert_eq!(progress.stud, BTreeMap::from([("health".into(), 30), ("melee".into(), 38)]));
		assert_eq!(progress.top_stats, BTreeMap::from([("health".into(), 30), ("melee".into(), 38)]));
		assert_eq!(history.entries(Category::TopStats, "melee")[0].value, 38);
		assert!(history.entries(Category::TopStats, "health").is_empty());
	}

	#[test]
	fn weaker_egg_keeps_stud() {
		let mut progress = SpeciesProgress::default();
		progress.top_stats = BTreeMap::from([("health".into(), 30), ("melee".into(), 40)]);
		progress.stud = BTreeMap::from([("health".into(), 30), ("melee".into(), 40)]);
		let rules = merge_rules(&["health", "melee"]);
		let egg = stats(&[("health", 30, 0), ("melee", 39, 0)]);

		let verdict = StudVerdict::compare(&egg, &rules.stat_merge_stats, &progress);
		assert_eq!(verdict, StudVerdict::NotBetter { matches: 1, stud: 2 });
		assert!(!progress.update_stud(&egg, &rules, &mut SpeciesHistory::default()));
		assert_eq!(progress.stud_base("melee"), 40);
	}

	#[test]
	fn new_stud_can_lower_top_stats() {
		let mut progress = SpeciesProgress::default();
		progress.top_stats = BTreeMap::from([("health".into(), 30), ("melee".into(), 40)]);
		progress.stud = BTreeMap::from([("health".into(), 20), ("melee".into(), 20)]);
		let rules = merge_rules(&["health", "melee"]);
		let egg = stats(&[("health", 30, 0), ("melee", 10, 0)]);
		let mut history = SpeciesHistory::default();

		assert_eq!(
			StudVerdict::compare(&egg, &rules.stat_merge_stats, &progress),
			StudVerdict::MoreMatches { matches: 1, stud: 0 }
		);
		assert!(progress.update_stud(&egg, &rules, &mut history));
		assert_eq!(progress.top_stats, BTreeMap::from([("health".into(), 30), ("melee".into(), 10)]));
		assert_eq!(history.entries(Category::TopStats, "melee")[0].value, 10);
		assert!(history.entries(Category::TopStats, "health").is_empty());
	}

	#[test]
	fn female_count_ignores_males() {
		let mut store = ProgressStore::new();
		assert_eq!(store.increment_female_count("Rex", Sex::Male), 0);
		assert!(store.get("Rex").is_none());
		assert_eq!(store.increment_female_count("Rex", Sex::Female), 1);
		assert_eq!(store.increment_female_count("Rex", Sex::Female), 2);
		assert_eq!(store.increment_female_count("Rex", Sex::Male), 2);
	}
}
