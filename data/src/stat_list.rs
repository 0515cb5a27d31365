//! Plain-text reports generated from a wipe's progress.

use std::collections::{BTreeMap, BTreeSet};

use crate::{ProgressStore, RulesBook, SpeciesProgress};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StatListMode {
	/// Every stud and mutation attribute.
	#[default]
	Full,
	/// Only the species' mutation attributes.
	Mutation,
}

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
#[error("unknown stat list mode {0:?} (expected full or mutation)")]
pub struct UnknownStatListMode(pub String);

impl std::str::FromStr for StatListMode {
	type Err = UnknownStatListMode;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		match s.trim().to_ascii_lowercase().as_str() {
			"full" => Ok(Self::Full),
			"mutation" => Ok(Self::Mutation),
			_ => Err(UnknownStatListMode(s.trim().to_owned())),
		}
	}
}

/// `40+2M`, `40M` or `+2M`, where `M` is the attribute's initial.
fn token(attr: &str, base: Option<u32>, mutation: Option<u32>) -> Option<String> {
	let letter = attr.chars().next()?.to_uppercase().collect::<String>();
	match (base, mutation) {
		(Some(b), Some(m)) => Some(format!("{b}+{m}{letter}")),
		(Some(b), None) => Some(format!("{b}{letter}")),
		(None, Some(m)) => Some(format!("+{m}{letter}")),
		(None, None) => None,
	}
}

fn tokens<'a>(progress: &SpeciesProgress, attrs: impl IntoIterator<Item = &'a str>) -> Vec<String> {
	attrs
		.into_iter()
		.filter_map(|attr| {
			token(
				attr,
				progress.stud.get(attr).copied(),
				progress.mutation_thresholds.get(attr).copied(),
			)
		})
		.collect()
}

fn species_tokens(progress: &SpeciesProgress, mutation_stats: Option<&[String]>) -> Vec<String> {
	match mutation_stats {
		Some(attrs) if !attrs.is_empty() => tokens(progress, attrs.iter().map(String::as_str)),
		_ => {
			let attrs = progress
				.stud
				.keys()
				.chain(progress.mutation_thresholds.keys())
				.map(String::as_str)
				.collect::<BTreeSet<_>>();
			tokens(progress, attrs)
		}
	}
}

/// One line per species, e.g. `30+2H 40M Rex`, followed by `extra` verbatim.
pub fn generate(
	species: &BTreeMap<String, SpeciesProgress>,
	rules: &RulesBook,
	mode: StatListMode,
	extra: &[String],
) -> Vec<String> {
	let mut lines = Vec::new();
	for (name, progress) in species {
		let mutation_stats = match mode {
			StatListMode::Full => None,
			StatListMode::Mutation => rules.get(name).map(|r| r.mutation_stats.as_slice()),
		};
		let tokens = species_tokens(progress, mutation_stats);
		if !tokens.is_empty() {
			lines.push(format!("{} {name}", tokens.join(" ")));
		}
	}
	lines.extend(extra.iter().cloned());
	lines
}

/// Main stud and mutation stud of a species, for sharing.
pub fn stud_summary(store: &ProgressStore, species: &str) -> Vec<String> {
	let mut lines = vec![format!("{species} stud stats:")];
	let Some(progress) = store.get(species) else {
		return lines;
	};
	for (title, values) in [("Main Stud:", &progress.stud), ("Mutation Stud:", &progress.mutation_stud)] {
		if values.is_empty() {
			continue;
		}
		lines.push(title.to_owned());
		lines.extend(values.iter().map(|(attr, value)| format!("  {attr}: {value}")));
	}
	lines
}
