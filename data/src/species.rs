//! Mapping noisy OCR species lines to canonical species keys.

use std::sync::LazyLock;

use regex::Regex;

/// Similarity a candidate needs before we trust it over the raw text.
pub const DEFAULT_CUTOFF: f64 = 0.8;

static PARENS: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\([^)]*\)").expect("regex"));
static GENDER: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?i)(?:fe)?male").expect("regex"));
static CS_TAG: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?i)\bcs\b").expect("regex"));
static PUNCTUATION: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"[^\w\s]").expect("regex"));

fn clean_pass(text: &str) -> String {
	let text = PARENS.replace_all(text, " ");
	let text = GENDER.replace_all(&text, " ");
	let text = text.replace("CS", " ");
	let text = CS_TAG.replace_all(&text, " ");
	let text = PUNCTUATION.replace_all(&text, "");
	text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Strip the gender, the "CS" tag, parenthesized parts and punctuation.
///
/// Runs until nothing changes, so removing one token can't leave another
/// behind (e.g. "C.S" or "FeMALEmale").
pub fn clean_species_name(raw: &str) -> String {
	let mut current = clean_pass(raw);
	loop {
		let next = clean_pass(&current);
		if next == current {
			return current;
		}
		current = next;
	}
}

/// Normalized edit similarity in `0.0..=1.0`.
pub fn similarity(a: &str, b: &str) -> f64 {
	let len = a.chars().count().max(b.chars().count());
	if len == 0 {
		return 1.0;
	}
	1.0 - levenshtein::levenshtein(a, b) as f64 / len as f64
}

/// The most similar candidate at or above `cutoff`.
///
/// Ties go to the candidate that comes first in iteration order.
pub fn best_match<'a>(query: &str, candidates: impl IntoIterator<Item = &'a str>, cutoff: f64) -> Option<&'a str> {
	let mut best: Option<(&str, f64)> = None;
	for candidate in candidates {
		let score = similarity(query, candidate);
		if score < cutoff {
			continue;
		}
		match best {
			Some((_, best_score)) if score <= best_score => {}
			_ => best = Some((candidate, score)),
		}
	}
	best.map(|(name, _)| name)
}

/// Canonical key for a raw species line.
///
/// Falls back to the cleaned text, which introduces a new species key.
pub fn normalize_species_name<'a>(raw: &str, known: impl IntoIterator<Item = &'a str>, cutoff: f64) -> String {
	let cleaned = clean_species_name(raw);
	match best_match(&cleaned, known, cutoff) {
		Some(name) => name.to_owned(),
		None => {
			log::debug!("No known species close to {cleaned:?} (raw {raw:?})");
			cleaned
		}
	}
}
