//! JSON file helpers shared by the rules book and the wipe store.

use std::{
	fs::File,
	io::{BufReader, BufWriter, Write},
	path::Path,
};

use anyhow::{Context, Result};
use serde::{Serialize, de::DeserializeOwned};

/// Read a JSON file, treating a missing file as the default value.
pub fn read_json<T: DeserializeOwned + Default>(path: &Path) -> Result<T> {
	if !path.exists() {
		return Ok(T::default());
	}
	let file = File::open(path).with_context(|| format!("Open {}", path.display()))?;
	let reader = BufReader::new(file);
	let value = serde_json::from_reader(reader).with_context(|| format!("Parse {}", path.display()))?;
	Ok(value)
}

/// Like [`read_json`], but logs the failure and falls back to the default.
pub fn read_json_or_default<T: DeserializeOwned + Default>(path: &Path) -> T {
	read_json(path).unwrap_or_else(|err| {
		log::warn!("Failed to load {}; starting empty: {err:#}", path.display());
		T::default()
	})
}

/// Write pretty JSON through a temp file so a crash never leaves half a file behind.
pub fn write_json<T: Serialize + ?Sized>(path: &Path, value: &T) -> Result<()> {
	if let Some(parent) = path.parent() {
		std::fs::create_dir_all(parent).with_context(|| format!("Create dir {}", parent.display()))?;
	}

	let tmp = path.with_extension("json.tmp");
	let file = File::create(&tmp).with_context(|| format!("Write temp {}", tmp.display()))?;
	let mut writer = BufWriter::new(file);
	serde_json::to_writer_pretty(&mut writer, value).with_context(|| format!("Serialize {}", path.display()))?;
	writer.flush().with_context(|| format!("Flush {}", tmp.display()))?;
	drop(writer);

	// Replace existing file (Windows-friendly).
	if std::fs::rename(&tmp, path).is_err() {
		let _ = std::fs::remove_file(path);
		std::fs::rename(&tmp, path).with_context(|| format!("Persist {}", path.display()))?;
	}
	Ok(())
}
