//! Keep/destroy decisions for a scanned egg.

use std::{cmp::Ordering, collections::BTreeMap};

use data::{Mode, ScanResult, Sex, SpeciesProgress, SpeciesRules, Stats, StudVerdict};

use crate::{AutomatedTiers, resolve};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Decision {
	Keep,
	Destroy,
	/// The species line was misread; scan the slot again.
	Rescan,
}

impl Decision {
	pub fn as_str(&self) -> &'static str {
		match self {
			Decision::Keep => "keep",
			Decision::Destroy => "destroy",
			Decision::Rescan => "rescan",
		}
	}
}

impl std::fmt::Display for Decision {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.write_str(self.as_str())
	}
}

/// Which criteria fired, with a short justification per criterion.
///
/// The kept/destroyed audit logs are built from this, so every evaluated
/// criterion leaves a `debug` entry whether it passed or not.
#[derive(Debug, Clone, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct DecisionTrace {
	pub mutations: bool,
	pub all_females: bool,
	pub stat_merge: bool,
	pub top_stat_females: bool,
	pub war: bool,
	pub debug: BTreeMap<String, String>,
}

impl DecisionTrace {
	pub fn fired(&self, mode: Mode) -> bool {
		match mode {
			Mode::Mutations => self.mutations,
			Mode::AllFemales => self.all_females,
			Mode::StatMerge => self.stat_merge,
			Mode::TopStatFemales => self.top_stat_females,
			Mode::War => self.war,
			Mode::Automated => false,
		}
	}

	/// Criteria that voted to keep, in declaration order.
	pub fn fired_modes(&self) -> Vec<Mode> {
		Mode::ALL.into_iter().filter(|m| self.fired(*m)).collect()
	}

	pub fn any(&self) -> bool {
		!self.fired_modes().is_empty()
	}

	fn set(&mut self, mode: Mode, (passed, detail): (bool, String)) {
		match mode {
			Mode::Mutations => self.mutations = passed,
			Mode::AllFemales => self.all_females = passed,
			Mode::StatMerge => self.stat_merge = passed,
			Mode::TopStatFemales => self.top_stat_females = passed,
			Mode::War => self.war = passed,
			Mode::Automated => return,
		}
		self.note(mode.as_str(), detail);
	}

	fn note(&mut self, key: &str, detail: impl Into<String>) {
		self.debug.insert(key.to_owned(), detail.into());
	}
}

/// A real species line carries the "CS" tag and the egg's sex.
pub fn has_species_marker(raw: &str) -> bool {
	let lower = raw.to_lowercase();
	lower.contains("cs") && lower.contains("male")
}

/// Decide what to do with an egg.
///
/// `progress` is the species' record before this egg; nothing is mutated.
pub fn evaluate(
	scan: &ScanResult,
	rules: &SpeciesRules,
	progress: &SpeciesProgress,
	tiers: AutomatedTiers,
) -> (Decision, DecisionTrace) {
	let mut trace = DecisionTrace::default();
	let raw = scan.species_raw.as_str();
	log::debug!("Evaluating egg: {raw} ({})", scan.sex);

	if !has_species_marker(raw) {
		trace.note("invalid_species", "name did not contain CS and male/female");
		trace.note("final", Decision::Rescan.as_str());
		log::info!(target: "destroyed_eggs", "Egg {raw} RESCAN | reason: invalid_species");
		return (Decision::Rescan, trace);
	}

	let modes = resolve(progress.female_count, &rules.modes, tiers.for_species(progress)).effective();
	if scan.sex == Sex::Female && !modes.keeps_females() {
		trace.note("auto_destroy", "no female modes enabled");
		trace.note("final", Decision::Destroy.as_str());
		log::info!(target: "destroyed_eggs", "Egg {raw} DESTROYED | reason: no female modes enabled");
		return (Decision::Destroy, trace);
	}

	let stats = &scan.stats;
	match scan.sex {
		Sex::Male => {
			trace.set(Mode::Mutations, check_mutations(stats, &rules.mutation_stats, progress));
			trace.set(Mode::StatMerge, check_stat_merge(scan, &rules.stat_merge_stats, progress));
		}
		Sex::Female => {
			if modes.contains(Mode::AllFemales) {
				trace.set(Mode::AllFemales, (true, "female".to_owned()));
			}
			if modes.contains(Mode::TopStatFemales) {
				trace.set(
					Mode::TopStatFemales,
					check_top_stat_female(stats, &rules.top_stat_females_stats, progress),
				);
			}
		}
	}
	if modes.contains(Mode::War) {
		trace.set(Mode::War, check_war(stats, &rules.war_stats, progress));
	}

	let decision = if trace.any() { Decision::Keep } else { Decision::Destroy };
	trace.note("final", decision.as_str());

	if decision == Decision::Keep {
		let reasons = trace.fired_modes().iter().map(|m| m.as_str()).collect::<Vec<_>>();
		log::info!(target: "kept_eggs", "Egg {raw} KEPT | reasons: {}", reasons.join(", "));
	} else {
		let details = trace
			.debug
			.iter()
			.filter(|(k, _)| k.as_str() != "final")
			.map(|(k, v)| format!("{k}:{v}"))
			.collect::<Vec<_>>();
		log::info!(target: "destroyed_eggs", "Egg {raw} DESTROYED | details: {}", details.join("; "));
	}
	(decision, trace)
}

/// Every tracked mutation at least at its threshold, and one of them better:
/// either above it, or on it with a base above the mutation stud.
fn check_mutations(stats: &Stats, attrs: &[String], progress: &SpeciesProgress) -> (bool, String) {
	let mut all_ok = true;
	let mut improved = false;
	let mut reasons = Vec::with_capacity(attrs.len());

	for attr in attrs {
		let reading = stats.get(attr);
		let threshold = progress.threshold(attr);
		let mutation = reading.mutation;
		match mutation.cmp(&threshold) {
			Ordering::Less => {
				all_ok = false;
				reasons.push(format!("{attr}={mutation}<{threshold}"));
			}
			Ordering::Greater => {
				improved = true;
				reasons.push(format!("{attr}={mutation}>{threshold}"));
			}
			Ordering::Equal => {
				let stud = progress.mutation_stud_base(attr);
				if reading.base > stud {
					improved = true;
					reasons.push(format!("{attr}={mutation}={threshold} base {}>{stud}", reading.base));
				} else {
					reasons.push(format!("{attr}={mutation}={threshold}"));
				}
			}
		}
	}

	let details = reasons.join(" | ");
	if all_ok && improved {
		(true, details)
	} else {
		(false, format!("not qualified: {details}"))
	}
}

fn check_stat_merge(scan: &ScanResult, attrs: &[String], progress: &SpeciesProgress) -> (bool, String) {
	if scan.updated_stud {
		return (true, "updated_stud = true".to_owned());
	}
	let verdict = StudVerdict::compare(&scan.stats, attrs, progress);
	(verdict.is_better(), verdict.to_string())
}

/// The female sits exactly on the species' top stats.
fn check_top_stat_female(stats: &Stats, attrs: &[String], progress: &SpeciesProgress) -> (bool, String) {
	let mismatched = attrs
		.iter()
		.filter_map(|attr| {
			let base = stats.base(attr);
			let top = progress.top_stat(attr);
			(base != top).then(|| format!("{attr}={base}!={top}"))
		})
		.collect::<Vec<_>>();
	if mismatched.is_empty() {
		(true, "all matched".to_owned())
	} else {
		(false, format!("mismatched: {}", mismatched.join(", ")))
	}
}

/// Base plus mutations reaches the top stat on every war attribute.
fn check_war(stats: &Stats, attrs: &[String], progress: &SpeciesProgress) -> (bool, String) {
	let below = attrs
		.iter()
		.filter_map(|attr| {
			let total = stats.get(attr).total();
			let top = progress.top_stat(attr);
			(total < top).then(|| format!("{attr}={total}<{top}"))
		})
		.collect::<Vec<_>>();
	if below.is_empty() {
		(true, "all stats>=top".to_owned())
	} else {
		(false, format!("below top: {}", below.join(", ")))
	}
}

#[cfg(test)]
mod tests {
	use data::{Modes, StatReading};

	use super::*;

	fn scan(raw: &str, sex: Sex, stats: &[(&str, u32, u32)]) -> ScanResult {
		let stats = stats.iter().map(|(a, b, m)| (*a, StatReading::new(*b, *m))).collect();
		ScanResult::new(raw, sex, stats)
	}

	fn male(stats: &[(&str, u32, u32)]) -> ScanResult {
		scan("CS Test Male", Sex::Male, stats)
	}

	fn female(stats: &[(&str, u32, u32)]) -> ScanResult {
		scan("CS Test Female", Sex::Female, stats)
	}

	fn rules(modes: &[Mode]) -> SpeciesRules {
		SpeciesRules {
			modes: modes.iter().copied().collect::<Modes>(),
			..Default::default()
		}
	}

	fn attrs(list: &[&str]) -> Vec<String> {
		list.iter().map(|s| s.to_string()).collect()
	}

	fn values(list: &[(&str, u32)]) -> BTreeMap<String, u32> {
		list.iter().map(|(k, v)| (k.to_string(), *v)).collect()
	}

	fn run(scan: &ScanResult, rules: &SpeciesRules, progress: &SpeciesProgress) -> (Decision, DecisionTrace) {
		evaluate(scan, rules, progress, AutomatedTiers::default())
	}

	#[test]
	fn mutation_above_threshold_keeps_male() {
		let rules = SpeciesRules {
			mutation_stats: attrs(&["melee"]),
			..rules(&[Mode::Mutations])
		};
		let progress = SpeciesProgress {
			mutation_thresholds: values(&[("melee", 2)]),
			..Default::default()
		};
		let (decision, trace) = run(&male(&[("melee", 0, 3)]), &rules, &progress);
		assert_eq!(decision, Decision::Keep);
		assert!(trace.mutations);
		assert_eq!(trace.debug["mutations"], "melee=3>2");
		assert_eq!(trace.debug["final"], "keep");
	}

	#[test]
	fn mutation_tie_with_better_base_keeps_male() {
		let rules = SpeciesRules {
			mutation_stats: attrs(&["melee"]),
			..rules(&[Mode::Mutations])
		};
		let progress = SpeciesProgress {
			mutation_thresholds: values(&[("melee", 2)]),
			mutation_stud: values(&[("melee", 5)]),
			..Default::default()
		};
		let (decision, trace) = run(&male(&[("melee", 6, 2)]), &rules, &progress);
		assert_eq!(decision, Decision::Keep);
		assert!(trace.mutations);

		let (decision, trace) = run(&male(&[("melee", 5, 2)]), &rules, &progress);
		assert_eq!(decision, Decision::Destroy);
		assert!(trace.debug["mutations"].starts_with("not qualified"));
	}

	#[test]
	fn mutation_below_any_threshold_fails() {
		let rules = SpeciesRules {
			mutation_stats: attrs(&["melee", "health"]),
			..rules(&[Mode::Mutations])
		};
		let progress = SpeciesProgress {
			mutation_thresholds: values(&[("melee", 2), ("health", 4)]),
			..Default::default()
		};
		let (decision, trace) = run(&male(&[("melee", 0, 9), ("health", 0, 3)]), &rules, &progress);
		assert_eq!(decision, Decision::Destroy);
		assert!(!trace.mutations);
		assert!(trace.debug["mutations"].contains("health=3<4"));
	}

	#[test]
	fn all_females_keeps_any_female() {
		let (decision, trace) = run(&female(&[]), &rules(&[Mode::AllFemales]), &SpeciesProgress::default());
		assert_eq!(decision, Decision::Keep);
		assert!(trace.all_females);
	}

	#[test]
	fn updated_stud_flag_keeps_male() {
		let mut egg = male(&[]);
		egg.updated_stud = true;
		let rules = SpeciesRules {
			stat_merge_stats: attrs(&["melee"]),
			..rules(&[Mode::StatMerge])
		};
		let (decision, trace) = run(&egg, &rules, &SpeciesProgress::default());
		assert_eq!(decision, Decision::Keep);
		assert!(trace.stat_merge);
	}

	#[test]
	fn stat_merge_without_listing_the_mode() {
		let rules = SpeciesRules {
			stat_merge_stats: attrs(&["health", "melee"]),
			..rules(&[Mode::War])
		};
		let progress = SpeciesProgress {
			top_stats: values(&[("health", 30), ("melee", 40)]),
			stud: values(&[("health", 30), ("melee", 35)]),
			..Default::default()
		};
		let (decision, trace) = run(&male(&[("health", 31, 0), ("melee", 40, 0)]), &rules, &progress);
		assert_eq!(decision, Decision::Keep);
		assert!(trace.stat_merge);
		assert_eq!(trace.debug["stat_merge"], "2>1");
	}

	#[test]
	fn stat_merge_tie_needs_higher_base() {
		let rules = SpeciesRules {
			stat_merge_stats: attrs(&["health", "melee"]),
			..Default::default()
		};
		let progress = SpeciesProgress {
			top_stats: values(&[("health", 30), ("melee", 40)]),
			stud: values(&[("health", 30), ("melee", 35)]),
			..Default::default()
		};
		let (_, trace) = run(&male(&[("health", 30, 0), ("melee", 38, 0)]), &rules, &progress);
		assert!(trace.stat_merge);
		assert_eq!(trace.debug["stat_merge"], "melee base 38>35");

		let (decision, trace) = run(&male(&[("health", 30, 0), ("melee", 35, 0)]), &rules, &progress);
		assert_eq!(decision, Decision::Destroy);
		assert!(!trace.stat_merge);
	}

	#[test]
	fn top_stat_female_must_match_exactly() {
		let rules = SpeciesRules {
			top_stat_females_stats: attrs(&["health"]),
			..rules(&[Mode::TopStatFemales])
		};
		let progress = SpeciesProgress {
			top_stats: values(&[("health", 10)]),
			..Default::default()
		};
		let (decision, trace) = run(&female(&[("health", 10, 0)]), &rules, &progress);
		assert_eq!(decision, Decision::Keep);
		assert!(trace.top_stat_females);

		for base in [9, 12] {
			let (decision, trace) = run(&female(&[("health", base, 0)]), &rules, &progress);
			assert_eq!(decision, Decision::Destroy);
			assert!(trace.debug["top_stat_females"].starts_with("mismatched"));
		}
	}

	#[test]
	fn war_counts_mutations_on_top_of_base() {
		let rules = SpeciesRules {
			war_stats: attrs(&["melee"]),
			..rules(&[Mode::War])
		};
		let progress = SpeciesProgress {
			top_stats: values(&[("melee", 5)]),
			..Default::default()
		};
		let (decision, trace) = run(&male(&[("melee", 5, 1)]), &rules, &progress);
		assert_eq!(decision, Decision::Keep);
		assert!(trace.war);

		let (decision, trace) = run(&female(&[("melee", 3, 1)]), &rules, &progress);
		assert_eq!(decision, Decision::Destroy);
		assert_eq!(trace.debug["war"], "below top: melee=4<5");
	}

	#[test]
	fn female_without_female_modes_is_destroyed() {
		let rules = SpeciesRules {
			mutation_stats: attrs(&["melee"]),
			..rules(&[Mode::Mutations])
		};
		let (decision, trace) = run(&female(&[("melee", 99, 20)]), &rules, &SpeciesProgress::default());
		assert_eq!(decision, Decision::Destroy);
		assert!(!trace.any());
		assert!(trace.debug.contains_key("auto_destroy"));
	}

	#[test]
	fn unreadable_species_is_rescanned() {
		let egg = scan("Bad Read", Sex::Male, &[]);
		let (decision, trace) = run(&egg, &rules(&[Mode::Mutations]), &SpeciesProgress::default());
		assert_eq!(decision, Decision::Rescan);
		assert_eq!(trace.debug["final"], "rescan");
		assert!(trace.debug.contains_key("invalid_species"));
	}

	#[test]
	fn automated_low_population_keeps_females() {
		let progress = SpeciesProgress {
			female_count: 4,
			..Default::default()
		};
		let (decision, trace) = run(&female(&[]), &rules(&[Mode::Automated]), &progress);
		assert_eq!(decision, Decision::Keep);
		assert!(trace.all_females);
	}

	#[test]
	fn automated_mid_population_wants_top_stats() {
		let rules = SpeciesRules {
			top_stat_females_stats: attrs(&["health"]),
			..rules(&[Mode::Automated])
		};
		let progress = SpeciesProgress {
			female_count: 50,
			top_stats: values(&[("health", 10)]),
			..Default::default()
		};
		let (decision, trace) = run(&female(&[("health", 10, 0)]), &rules, &progress);
		assert_eq!(decision, Decision::Keep);
		assert!(trace.top_stat_females);
		assert!(!trace.all_females);
	}

	#[test]
	fn automated_full_population_destroys_females() {
		let progress = SpeciesProgress {
			female_count: 120,
			..Default::default()
		};
		let (decision, trace) = run(&female(&[]), &rules(&[Mode::Automated]), &progress);
		assert_eq!(decision, Decision::Destroy);
		assert!(trace.debug.contains_key("auto_destroy"));
	}

	#[test]
	fn automated_full_population_still_runs_war() {
		let rules = SpeciesRules {
			war_stats: attrs(&["melee"]),
			..rules(&[Mode::Automated, Mode::War])
		};
		let progress = SpeciesProgress {
			female_count: 120,
			top_stats: values(&[("melee", 5)]),
			..Default::default()
		};
		let (decision, trace) = run(&male(&[("melee", 5, 0)]), &rules, &progress);
		assert_eq!(decision, Decision::Keep);
		assert!(trace.war);
	}

	#[test]
	fn species_marker_is_case_insensitive() {
		assert!(has_species_marker("cs rex FEMALE"));
		assert!(has_species_marker("CS Rex Male"));
		assert!(!has_species_marker("Rex Male"));
		assert!(!has_species_marker("CS Rex"));
	}
}
