//! Config file loading: `<config_dir>/config.json`, every key optional.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use serde::{Deserialize, Serialize};

pub const CONFIG_FILE: &str = "config.json";
const DEFAULT_CORPUS_DIR: &str = "corpora";

/// `$XDG_CONFIG_HOME/rs-mimic` (or the platform equivalent), `./rs-mimic` as a last resort.
pub fn default_config_dir() -> PathBuf {
	dirs::config_dir().unwrap_or_else(|| PathBuf::from(".")).join("rs-mimic")
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
	/// Where corpora are written; relative paths are resolved against the config dir.
	pub corpus_dir: PathBuf,
	/// History file used by `build` and for automatic rebuilds.
	pub history: Option<PathBuf>,
	pub state_size: usize,
	pub max_chars: usize,
	pub min_chars: usize,
	pub max_attempts: usize,
	/// Text put in front of every generated message.
	pub prefix: String,
	/// The bot's own account, never messaged.
	pub own_identity: Option<String>,
	pub recipients: Vec<String>,
	/// Also write the log to `<config_dir>/logs/rs-mimic.log`.
	pub log_to_file: bool,
}

impl Default for Config {
	fn default() -> Self {
		Self {
			corpus_dir: PathBuf::from(DEFAULT_CORPUS_DIR),
			history: None,
			state_size: rs_mimic_core::builder::DEFAULT_STATE_SIZE,
			max_chars: 140,
			min_chars: 0,
			max_attempts: rs_mimic_core::model::generation_request::DEFAULT_MAX_ATTEMPTS,
			prefix: String::new(),
			own_identity: None,
			recipients: Vec::new(),
			log_to_file: false,
		}
	}
}

impl Config {
	/// Loads `<config_dir>/config.json`, or the defaults when the file does not exist.
	pub fn load(config_dir: &Path) -> Result<Self> {
		let path = config_dir.join(CONFIG_FILE);
		let config = if path.is_file() {
			let contents = fs::read_to_string(&path).with_context(|| format!("Failed to read {}", path.display()))?;
			serde_json::from_str(&contents).with_context(|| format!("Invalid config file {}", path.display()))?
		} else {
			Self::default()
		};
		config.validate()?;
		Ok(config)
	}

	pub fn validate(&self) -> Result<()> {
		if self.state_size == 0 {
			bail!("state_size must be >= 1");
		}
		if self.max_attempts == 0 {
			bail!("max_attempts must be >= 1");
		}
		if self.min_chars > self.max_chars {
			bail!("min_chars ({}) is greater than max_chars ({})", self.min_chars, self.max_chars);
		}
		Ok(())
	}

	pub fn corpus_dir(&self, config_dir: &Path) -> PathBuf {
		config_dir.join(&self.corpus_dir)
	}

	pub fn history_path(&self, config_dir: &Path) -> Option<PathBuf> {
		self.history.as_ref().map(|h| config_dir.join(h))
	}

	pub fn log_file(&self, config_dir: &Path) -> Option<PathBuf> {
		self.log_to_file.then(|| config_dir.join("logs").join("rs-mimic.log"))
	}
}
