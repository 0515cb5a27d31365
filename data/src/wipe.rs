//! On-disk layout of one wipe (server reset epoch).
//!
//! ```text
//! <data_dir>/rules.json
//! <data_dir>/wipes/<wipe>/breeding_progress.json
//! <data_dir>/wipes/<wipe>/breeding_history.json
//! ```

use std::{
	collections::BTreeMap,
	path::{Path, PathBuf},
};

use anyhow::Result;

use crate::{History, ProgressStore, SpeciesProgress, persist};

pub const DEFAULT_WIPE: &str = "default";

pub fn rules_path(data_dir: &Path) -> PathBuf {
	data_dir.join("rules.json")
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Wipe {
	name: String,
	dir: PathBuf,
}

impl Wipe {
	pub fn open(data_dir: &Path, name: &str) -> Self {
		let name = sanitize_name(name);
		let dir = data_dir.join("wipes").join(&name);
		Self { name, dir }
	}

	pub fn name(&self) -> &str {
		&self.name
	}

	pub fn dir(&self) -> &Path {
		&self.dir
	}

	pub fn progress_path(&self) -> PathBuf {
		self.dir.join("breeding_progress.json")
	}

	pub fn history_path(&self) -> PathBuf {
		self.dir.join("breeding_history.json")
	}

	pub fn try_load_store(&self) -> Result<ProgressStore> {
		let species: BTreeMap<String, SpeciesProgress> = persist::read_json(&self.progress_path())?;
		let history: History = persist::read_json(&self.history_path())?;
		Ok(ProgressStore::from_parts(species, history))
	}

	/// Load the wipe's store. Unreadable files start over empty.
	pub fn load_store(&self) -> ProgressStore {
		let species = persist::read_json_or_default(&self.progress_path());
		let history = persist::read_json_or_default(&self.history_path());
		ProgressStore::from_parts(species, history)
	}

	pub fn save_store(&self, store: &ProgressStore) -> Result<()> {
		persist::write_json(&self.progress_path(), store.species())?;
		persist::write_json(&self.history_path(), store.history())?;
		Ok(())
	}
}

/// Reduce a wipe name to one safe path component.
fn sanitize_name(name: &str) -> String {
	let name = name
		.trim()
		.chars()
		.map(|c| if c.is_whitespace() { '_' } else { c })
		.filter(|c| c.is_alphanumeric() || *c == '_' || *c == '-')
		.collect::<String>();
	if name.is_empty() {
		DEFAULT_WIPE.to_owned()
	} else {
		name
	}
}
