use std::collections::BTreeMap;

/// Attributes read off the egg screen, in display order.
pub const ALL_STATS: [&str; 6] = ["health", "stamina", "weight", "melee", "oxygen", "food"];

/// A single egg's measured value for one attribute.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct StatReading {
	#[serde(default)]
	pub base: u32,
	#[serde(default)]
	pub mutation: u32,
}

impl StatReading {
	pub fn new(base: u32, mutation: u32) -> Self {
		Self { base, mutation }
	}

	/// Combat value: mutations stack on top of the base level.
	pub fn total(&self) -> u32 {
		self.base.saturating_add(self.mutation)
	}
}

/// Per-attribute readings of one egg.
///
/// Lookups never fail: a missing attribute reads as `base=0, mutation=0`.
#[derive(Debug, Clone, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(transparent)]
pub struct Stats(BTreeMap<String, StatReading>);

impl Stats {
	pub fn new() -> Self {
		Self::default()
	}

	pub fn get(&self, attr: &str) -> StatReading {
		self.0.get(attr).copied().unwrap_or_default()
	}

	pub fn base(&self, attr: &str) -> u32 {
		self.get(attr).base
	}

	pub fn mutation(&self, attr: &str) -> u32 {
		self.get(attr).mutation
	}

	pub fn insert(&mut self, attr: impl Into<String>, reading: StatReading) {
		self.0.insert(attr.into(), reading);
	}

	pub fn iter(&self) -> impl Iterator<Item = (&str, StatReading)> {
		self.0.iter().map(|(k, v)| (k.as_str(), *v))
	}

	pub fn is_empty(&self) -> bool {
		self.0.is_empty()
	}
}

impl<K: Into<String>> FromIterator<(K, StatReading)> for Stats {
	fn from_iter<T: IntoIterator<Item = (K, StatReading)>>(iter: T) -> Self {
		Self(iter.into_iter().map(|(k, v)| (k.into(), v)).collect())
	}
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Sex {
	Male,
	Female,
}

impl Sex {
	/// The egg screen prints the sex inside the species line.
	pub fn from_species_text(raw: &str) -> Self {
		if raw.to_lowercase().contains("female") {
			Self::Female
		} else {
			Self::Male
		}
	}
}

impl std::fmt::Display for Sex {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		match self {
			Self::Male => write!(f, "male"),
			Self::Female => write!(f, "female"),
		}
	}
}

impl std::str::FromStr for Sex {
	type Err = StatParseError;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		match s.trim().to_ascii_lowercase().as_str() {
			"male" | "m" => Ok(Self::Male),
			"female" | "f" => Ok(Self::Female),
			_ => Err(StatParseError::Sex(s.to_owned())),
		}
	}
}

/// One OCR reading of the egg slot, as handed over by the scanner.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct ScanResult {
	#[serde(alias = "species", alias = "egg")]
	pub species_raw: String,
	pub sex: Sex,
	#[serde(default)]
	pub stats: Stats,
	/// Set by the caller when this egg was just accepted as the new stud.
	#[serde(default)]
	pub updated_stud: bool,
}

impl ScanResult {
	pub fn new(species_raw: impl Into<String>, sex: Sex, stats: Stats) -> Self {
		Self {
			species_raw: species_raw.into(),
			sex,
			stats,
			updated_stud: false,
		}
	}

	/// Build a scan from raw OCR text, taking the sex from the species line.
	pub fn from_ocr(species_raw: impl Into<String>, stats: Stats) -> Self {
		let species_raw = species_raw.into();
		let sex = Sex::from_species_text(&species_raw);
		Self::new(species_raw, sex, stats)
	}
}

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum StatParseError {
	#[error("expected NAME=BASE[+MUT], got {0:?}")]
	MissingValue(String),
	#[error("invalid number {value:?} for stat {stat}")]
	Number { stat: String, value: String },
	#[error("unknown sex {0:?} (expected male or female)")]
	Sex(String),
}

/// Parse a `name=base+mut` (or `name=base/mut`, or `name=base`) argument.
pub fn parse_stat_arg(text: &str) -> Result<(String, StatReading), StatParseError> {
	let (name, value) = text
		.split_once('=')
		.ok_or_else(|| StatParseError::MissingValue(text.to_owned()))?;
	let name = name.trim().to_lowercase();
	let value = value.trim();
	let (base, mutation) = value
		.split_once('+')
		.or_else(|| value.split_once('/'))
		.unwrap_or((value, "0"));

	let number = |v: &str| {
		v.trim().parse::<u32>().map_err(|_| StatParseError::Number {
			stat: name.clone(),
			value: v.trim().to_owned(),
		})
	};
	Ok((name.clone(), StatReading::new(number(base)?, number(mutation)?)))
}
