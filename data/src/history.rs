//! Append-only audit trail of record updates.

use std::collections::BTreeMap;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Category {
	TopStats,
	MutationThresholds,
}

impl Category {
	pub fn as_str(&self) -> &'static str {
		match self {
			Category::TopStats => "top_stats",
			Category::MutationThresholds => "mutation_thresholds",
		}
	}
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct HistoryEntry {
	#[serde(rename = "ts")]
	pub timestamp: i64,
	pub value: u32,
}

/// `category -> attribute -> entries` for one species.
#[derive(Debug, Clone, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(transparent)]
pub struct SpeciesHistory(BTreeMap<String, BTreeMap<String, Vec<HistoryEntry>>>);

impl SpeciesHistory {
	pub fn record(&mut self, category: Category, attr: &str, value: u32) {
		self.record_at(category, attr, value, chrono::Utc::now().timestamp());
	}

	pub fn record_at(&mut self, category: Category, attr: &str, value: u32, timestamp: i64) {
		self.0
			.entry(category.as_str().to_owned())
			.or_default()
			.entry(attr.to_owned())
			.or_default()
			.push(HistoryEntry { timestamp, value });
	}

	pub fn entries(&self, category: Category, attr: &str) -> &[HistoryEntry] {
		self.0
			.get(category.as_str())
			.and_then(|attrs| attrs.get(attr))
			.map(Vec::as_slice)
			.unwrap_or(&[])
	}
}

/// History of every species in a wipe.
#[derive(Debug, Clone, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(transparent)]
pub struct History(BTreeMap<String, SpeciesHistory>);

impl History {
	pub fn species(&self, species: &str) -> Option<&SpeciesHistory> {
		self.0.get(species)
	}

	pub fn species_mut(&mut self, species: &str) -> &mut SpeciesHistory {
		self.0.entry(species.to_owned()).or_default()
	}

	pub fn entries(&self, species: &str, category: Category, attr: &str) -> &[HistoryEntry] {
		self.species(species).map(|h| h.entries(category, attr)).unwrap_or(&[])
	}
}
