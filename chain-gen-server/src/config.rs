use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;

/// Server configuration, loaded from a TOML file.
///
/// Every field has a default, so a missing or partial file works: an
/// empty corpora table just means every generation request is a 404.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Config {
	/// Address the HTTP server binds to.
	pub bind_address: String,

	/// Port the HTTP server binds to.
	pub port: u16,

	/// Token depth used when a request does not specify one.
	pub default_depth: usize,

	/// Minimum generated length, in words, when a request does not
	/// specify one.
	pub default_min_length: usize,

	/// Corpus name → source text path.
	pub corpora: HashMap<String, PathBuf>,
}

impl Default for Config {
	fn default() -> Self {
		Self {
			bind_address: "127.0.0.1".to_owned(),
			port: 5000,
			default_depth: 1,
			default_min_length: 200,
			corpora: HashMap::new(),
		}
	}
}

impl Config {
	/// Loads the configuration from `path`, falling back to defaults
	/// when the file does not exist.
	pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, Box<dyn std::error::Error>> {
		let path = path.as_ref();
		if !path.exists() {
			log::info!("no config at {}, using defaults", path.display());
			return Ok(Self::default());
		}
		let raw = fs::read_to_string(path)?;
		Ok(toml::from_str(&raw)?)
	}
}
