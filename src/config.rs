use std::env;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use thiserror::Error;

const CONFIG_FILE: &str = "config.toml";
const APP_DIR: &str = "equinox_events";
const DEFAULT_CATEGORY: &str = "foss";
const DEFAULT_REFRESH_MILLIS: u64 = 250;

#[derive(Debug, Error)]
pub enum ConfigError {
	#[error("failed to read config {}: {source}", .path.display())]
	Io {
		path: PathBuf,
		source: std::io::Error,
	},
	#[error("failed to parse config {}: {source}", .path.display())]
	Decode {
		path: PathBuf,
		source: toml::de::Error,
	},
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct Config {
	/// Event data file; the bundled catalog is used when unset.
	pub catalog: Option<PathBuf>,
	pub default_category: String,
	/// How often the board redraws and re-evaluates live status.
	pub refresh_millis: u64,
	pub log_level: Option<String>,
	pub log_file: Option<PathBuf>,
}

impl Default for Config {
	fn default() -> Self {
		Self {
			catalog: None,
			default_category: DEFAULT_CATEGORY.to_string(),
			refresh_millis: DEFAULT_REFRESH_MILLIS,
			log_level: None,
			log_file: None,
		}
	}
}

impl Config {
	pub fn refresh_millis(&self) -> u64 {
		self.refresh_millis.max(1)
	}

	pub fn log_file(&self) -> PathBuf {
		self.log_file
			.clone()
			.unwrap_or_else(|| state_dir().join("equinox_events.log"))
	}
}

/// Resolves the config path from the CLI, then `EQUINOX_CONFIG`, then the
/// platform config directory, and loads it. A missing file means defaults.
pub fn load_config(cli_path: Option<&Path>) -> Result<Config, ConfigError> {
	let path = match cli_path {
		Some(path) => path.to_path_buf(),
		None => resolve_config_path(),
	};
	read_config(&path)
}

pub fn read_config(path: &Path) -> Result<Config, ConfigError> {
	let raw = match fs::read_to_string(path) {
		Ok(raw) => raw,
		Err(err) if err.kind() == ErrorKind::NotFound => return Ok(Config::default()),
		Err(source) => {
			return Err(ConfigError::Io {
				path: path.to_path_buf(),
				source,
			});
		}
	};

	toml::from_str(&raw).map_err(|source| ConfigError::Decode {
		path: path.to_path_buf(),
		source,
	})
}

fn resolve_config_path() -> PathBuf {
	if let Some(path) = env::var_os("EQUINOX_CONFIG") {
		let path = PathBuf::from(path);
		if !path.as_os_str().is_empty() {
			return path;
		}
	}

	config_dir().join(CONFIG_FILE)
}

fn config_dir() -> PathBuf {
	#[cfg(target_os = "windows")]
	{
		if let Some(path) = env::var_os("APPDATA") {
			return PathBuf::from(path).join(APP_DIR);
		}
	}

	if let Some(path) = env::var_os("XDG_CONFIG_HOME") {
		return PathBuf::from(path).join(APP_DIR);
	}

	if let Some(path) = env::var_os("HOME") {
		return PathBuf::from(path).join(".config").join(APP_DIR);
	}

	PathBuf::from(".").join(APP_DIR)
}

fn state_dir() -> PathBuf {
	#[cfg(target_os = "windows")]
	{
		if let Some(path) = env::var_os("LOCALAPPDATA") {
			return PathBuf::from(path).join(APP_DIR);
		}
	}

	if let Some(path) = env::var_os("XDG_STATE_HOME") {
		return PathBuf::from(path).join(APP_DIR);
	}

	if let Some(path) = env::var_os("HOME") {
		return PathBuf::from(path).join(".local").join("state").join(APP_DIR);
	}

	PathBuf::from(".").join(APP_DIR)
}
