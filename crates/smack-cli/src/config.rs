//! Configuration for the `smackrules` tool.
//!
//! Configuration lives in a TOML file. The path is taken from `--config`
//! (or `SMACKRULES_CONFIG`), falling back to
//! `<config dir>/smackrules/config.toml`. A missing file means defaults.
//!
//! ```toml
//! rules_path = "/etc/smack/accesses"
//! output_format = "kernel"
//!
//! [logging]
//! level = "info"
//! ```

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use smack_rules::RuleFormat;
use std::path::{Path, PathBuf};

/// Name used for the config directory.
pub const PROJECT_NAME: &str = "smackrules";

/// Environment variable naming the config file.
pub const CONFIG_ENV_VAR: &str = "SMACKRULES_CONFIG";

/// Logging settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Filter directive used when `RUST_LOG` is not set.
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "warn".to_string(),
        }
    }
}

/// Settings shared by every subcommand.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SmackConfig {
    /// Rule file used when a command is given no `--file`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rules_path: Option<PathBuf>,
    /// Layout used when writing rule files.
    pub output_format: RuleFormat,
    /// Subject filter applied by `list` when none is given.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub subject_filter: Option<String>,
    /// Logging settings.
    pub logging: LoggingConfig,
}

impl SmackConfig {
    /// Default location of the config file, if the platform has one.
    pub fn default_config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join(PROJECT_NAME).join("config.toml"))
    }

    /// The config file to use: `explicit` if given, else the default.
    pub fn resolve_config_path(explicit: Option<&str>) -> Option<PathBuf> {
        match explicit {
            Some(path) => Some(PathBuf::from(path)),
            None => Self::default_config_path(),
        }
    }

    /// Loads configuration, returning defaults when the file does not exist.
    pub fn load(explicit: Option<&str>) -> Result<Self> {
        match Self::resolve_config_path(explicit) {
            Some(path) if path.exists() => Self::from_file(&path),
            _ => Ok(Self::default()),
        }
    }

    /// Loads configuration from `path`.
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| smack_rules::Error::io_with_path(e, path))?;
        Self::from_toml_str(&content)
            .map_err(|e| Error::config(format!("Failed to parse {}: {e}", path.display())))
    }

    /// Parses configuration from TOML text.
    pub fn from_toml_str(content: &str) -> Result<Self> {
        toml::from_str(content).map_err(|e| Error::config(e.to_string()))
    }

    /// Serializes to pretty TOML.
    pub fn to_toml_string(&self) -> Result<String> {
        toml::to_string_pretty(self).map_err(|e| Error::config(e.to_string()))
    }

    /// Picks the rule file: `explicit` if given, else `rules_path`.
    pub fn rules_file(&self, explicit: Option<&Path>) -> Result<PathBuf> {
        explicit
            .map(Path::to_path_buf)
            .or_else(|| self.rules_path.clone())
            .ok_or_else(|| {
                Error::config("No rule file given; pass --file or set rules_path in the config")
            })
    }
}
