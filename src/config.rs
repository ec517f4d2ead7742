use crate::error::ConfigError;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Virtual and pass-through devices that never carry SMART data
const DEFAULT_BLACKLIST: [&str; 6] = [
    r"^/dev/sg[0-9]+$",
    r"^/dev/md[0-9]+$",
    r"^/dev/dm-[0-9]+$",
    r"^/dev/zram[0-9]+$",
    r"^/dev/loop[0-9]+$",
    r"^/dev/ram[0-9]+$",
];

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct Config {
    pub smartctl: SmartctlConfig,
    pub detection: DetectionConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SmartctlConfig {
    /// Binary name or full path
    pub binary: String,
}

impl Default for SmartctlConfig {
    fn default() -> Self {
        Self {
            binary: "smartctl".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DetectionConfig {
    /// Regexes matched against device paths; matching devices are ignored
    pub blacklist_patterns: Vec<String>,
}

impl Default for DetectionConfig {
    fn default() -> Self {
        Self {
            blacklist_patterns: DEFAULT_BLACKLIST.iter().map(|s| s.to_string()).collect(),
        }
    }
}

impl Config {
    /// `<config dir>/storage-health/config.toml`
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("storage-health").join("config.toml"))
    }

    /// Loads the given file, or the default one if it exists. A missing
    /// default file gives the defaults; a missing explicit file is an error.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        match path {
            Some(path) => Self::load_file(path),
            None => match Self::default_path() {
                Some(path) if path.exists() => Self::load_file(&path),
                _ => {
                    debug!("No config file, using defaults");
                    Ok(Self::default())
                }
            },
        }
    }

    pub fn load_file(path: &Path) -> Result<Self, ConfigError> {
        debug!("Loading config from {}", path.display());
        let contents = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        toml::from_str(&contents).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Compiled blacklist; the first invalid pattern is an error.
    pub fn blacklist_regexes(&self) -> Result<Vec<Regex>, ConfigError> {
        compile_patterns(&self.detection.blacklist_patterns)
    }
}

pub fn compile_patterns<S: AsRef<str>>(patterns: &[S]) -> Result<Vec<Regex>, ConfigError> {
    patterns
        .iter()
        .map(|pattern| {
            let pattern = pattern.as_ref();
            Regex::new(pattern).map_err(|source| ConfigError::InvalidPattern {
                pattern: pattern.to_string(),
                source,
            })
        })
        .collect()
}
