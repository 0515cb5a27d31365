//! Population-driven switching of the female modes.

use data::{Mode, Modes, SpeciesProgress};

/// Female population boundaries for species in `automated` mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct AutomatedTiers {
	/// Below this many kept females, every female is kept.
	pub all_females_below: u32,
	/// At this many kept females, no more females are collected.
	pub stop_at: u32,
}

impl Default for AutomatedTiers {
	fn default() -> Self {
		Self {
			all_females_below: 5,
			stop_at: 96,
		}
	}
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tier {
	/// Building a base population: keep all females.
	Founding,
	/// Keep only females that match the top stats.
	Selecting,
	/// Population target reached.
	Complete,
}

impl AutomatedTiers {
	/// Apply a species' own stop counts, where set.
	pub fn for_species(self, progress: &SpeciesProgress) -> Self {
		Self {
			all_females_below: match progress.stop_female_count {
				0 => self.all_females_below,
				n => n,
			},
			stop_at: match progress.stop_top_stat_females {
				0 => self.stop_at,
				n => n,
			},
		}
	}

	pub fn tier(&self, female_count: u32) -> Tier {
		if female_count >= self.stop_at {
			Tier::Complete
		} else if female_count < self.all_females_below {
			Tier::Founding
		} else {
			Tier::Selecting
		}
	}
}

/// Rewrite the female modes of an `automated` species for its population.
///
/// Without `automated` the modes come back unchanged. `automated` and `war`
/// are never added or removed here.
pub fn resolve(female_count: u32, modes: &Modes, tiers: AutomatedTiers) -> Modes {
	if !modes.contains(Mode::Automated) {
		return modes.clone();
	}

	let mut out = modes.clone();
	for mode in Mode::ALWAYS_ON {
		out.insert(mode);
	}
	match tiers.tier(female_count) {
		Tier::Founding => {
			out.insert(Mode::AllFemales);
			out.remove(Mode::TopStatFemales);
		}
		Tier::Selecting => {
			out.insert(Mode::TopStatFemales);
			out.remove(Mode::AllFemales);
		}
		Tier::Complete => {
			out.remove(Mode::AllFemales);
			out.remove(Mode::TopStatFemales);
		}
	}
	log::trace!("automated modes at {female_count} females: {modes} -> {out}");
	out
}
