use std::collections::BTreeSet;

/// A rule category that can be enabled per species.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Mode {
	Mutations,
	AllFemales,
	StatMerge,
	TopStatFemales,
	War,
	Automated,
}

impl Mode {
	pub const ALL: [Mode; 6] = [
		Mode::Mutations,
		Mode::AllFemales,
		Mode::StatMerge,
		Mode::TopStatFemales,
		Mode::War,
		Mode::Automated,
	];

	/// Modes under which a female egg can be kept.
	pub const FEMALE: [Mode; 3] = [Mode::AllFemales, Mode::TopStatFemales, Mode::War];

	/// Modes that are evaluated no matter what the rules list.
	pub const ALWAYS_ON: [Mode; 2] = [Mode::Mutations, Mode::StatMerge];

	pub fn as_str(&self) -> &'static str {
		match self {
			Mode::Mutations => "mutations",
			Mode::AllFemales => "all_females",
			Mode::StatMerge => "stat_merge",
			Mode::TopStatFemales => "top_stat_females",
			Mode::War => "war",
			Mode::Automated => "automated",
		}
	}
}

impl std::fmt::Display for Mode {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.write_str(self.as_str())
	}
}

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
#[error("unknown mode {0:?}")]
pub struct UnknownMode(pub String);

impl std::str::FromStr for Mode {
	type Err = UnknownMode;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		let s = s.trim();
		Mode::ALL
			.into_iter()
			.find(|m| m.as_str().eq_ignore_ascii_case(s))
			.ok_or_else(|| UnknownMode(s.to_owned()))
	}
}

/// The modes a species has switched on, stored as a list of names.
///
/// Unknown names in a stored list are dropped with a warning.
#[derive(Debug, Clone, Default, PartialEq, Eq, serde::Serialize)]
#[serde(transparent)]
pub struct Modes(BTreeSet<Mode>);

impl<'de> serde::Deserialize<'de> for Modes {
	fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
		let names = <Vec<String> as serde::Deserialize>::deserialize(deserializer)?;
		Ok(names
			.iter()
			.filter_map(|name| match name.parse::<Mode>() {
				Ok(mode) => Some(mode),
				Err(err) => {
					log::warn!("Ignoring {err}");
					None
				}
			})
			.collect())
	}
}

impl Modes {
	pub fn new() -> Self {
		Self::default()
	}

	pub fn contains(&self, mode: Mode) -> bool {
		self.0.contains(&mode)
	}

	pub fn insert(&mut self, mode: Mode) -> bool {
		self.0.insert(mode)
	}

	pub fn remove(&mut self, mode: Mode) -> bool {
		self.0.remove(&mode)
	}

	pub fn iter(&self) -> impl Iterator<Item = Mode> + '_ {
		self.0.iter().copied()
	}

	pub fn is_empty(&self) -> bool {
		self.0.is_empty()
	}

	/// The set the evaluator acts on: these modes plus the always-on ones.
	pub fn effective(&self) -> EffectiveModes {
		let mut modes = self.clone();
		for mode in Mode::ALWAYS_ON {
			modes.insert(mode);
		}
		EffectiveModes(modes)
	}
}

impl FromIterator<Mode> for Modes {
	fn from_iter<T: IntoIterator<Item = Mode>>(iter: T) -> Self {
		Self(iter.into_iter().collect())
	}
}

impl std::fmt::Display for Modes {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		let names = self.iter().map(|m| m.as_str()).collect::<Vec<_>>();
		write!(f, "{{{}}}", names.join(", "))
	}
}

/// Mode set with mutations and stat merge guaranteed present.
///
/// Only obtainable through [`Modes::effective`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EffectiveModes(Modes);

impl EffectiveModes {
	pub fn contains(&self, mode: Mode) -> bool {
		self.0.contains(mode)
	}

	/// Whether any mode that can keep a female is on.
	pub fn keeps_females(&self) -> bool {
		Mode::FEMALE.into_iter().any(|m| self.contains(m))
	}

	pub fn modes(&self) -> &Modes {
		&self.0
	}
}
