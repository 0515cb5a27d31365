use std::{collections::BTreeMap, path::Path};

use anyhow::Result;

use crate::{Mode, Modes};

/// Breeding rules for one species.
#[derive(Debug, Clone, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct SpeciesRules {
	pub modes: Modes,
	pub mutation_stats: Vec<String>,
	pub stat_merge_stats: Vec<String>,
	pub top_stat_females_stats: Vec<String>,
	pub war_stats: Vec<String>,
}

/// All configured species, keyed by canonical species name.
#[derive(Debug, Clone, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(transparent)]
pub struct RulesBook {
	species: BTreeMap<String, SpeciesRules>,
}

impl RulesBook {
	pub fn try_load(path: &Path) -> Result<Self> {
		crate::persist::read_json(path)
	}

	pub fn save(&self, path: &Path) -> Result<()> {
		crate::persist::write_json(path, self)
	}

	pub fn get(&self, species: &str) -> Option<&SpeciesRules> {
		self.species.get(species)
	}

	pub fn insert(&mut self, species: impl Into<String>, rules: SpeciesRules) {
		self.species.insert(species.into(), rules);
	}

	/// Canonical keys the normalizer matches against.
	pub fn keys(&self) -> impl Iterator<Item = &str> {
		self.species.keys().map(String::as_str)
	}

	pub fn len(&self) -> usize {
		self.species.len()
	}

	pub fn is_empty(&self) -> bool {
		self.species.is_empty()
	}

	/// Give a newly seen species a copy of the template, with automation on.
	///
	/// Returns `true` if an entry was created.
	pub fn ensure_species(&mut self, species: &str, template: &SpeciesRules) -> bool {
		if self.species.contains_key(species) {
			return false;
		}
		let mut rules = template.clone();
		rules.modes.insert(Mode::Automated);
		log::info!("Added {species} to rules with modes {}", rules.modes);
		self.species.insert(species.to_owned(), rules);
		true
	}

	/// Store `modes` for a species, reporting whether anything changed.
	pub fn set_modes(&mut self, species: &str, modes: Modes) -> bool {
		let rules = self.species.entry(species.to_owned()).or_default();
		if rules.modes == modes {
			return false;
		}
		log::info!("Modes for {species}: {} -> {modes}", rules.modes);
		rules.modes = modes;
		true
	}
}
