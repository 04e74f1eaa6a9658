//! Configuration loading for the matching tools
//!
//! Config file resolution priority:
//! 1. Command-line argument (highest priority)
//! 2. `CE_MATCH_CONFIG` environment variable
//! 3. `~/.config/culture-extractor/ce-match.toml`
//! 4. Compiled defaults (fallback)
//!
//! A missing config file is not an error: a warning is logged and compiled
//! defaults are used.

use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::{info, warn};

/// Environment variable naming an explicit config file
pub const CONFIG_ENV_VAR: &str = "CE_MATCH_CONFIG";

/// Bootstrap configuration loaded from TOML file
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TomlConfig {
    /// Logging configuration (optional)
    #[serde(default)]
    pub logging: LoggingConfig,

    /// Matcher thresholds (optional, defaults per field)
    #[serde(default)]
    pub matcher: MatchThresholds,

    /// Substring identifying StashDB cross-references in `stash_ids` endpoints
    #[serde(default = "default_external_endpoint")]
    pub external_endpoint: String,
}

impl Default for TomlConfig {
    fn default() -> Self {
        Self {
            logging: LoggingConfig::default(),
            matcher: MatchThresholds::default(),
            external_endpoint: default_external_endpoint(),
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

/// Confidence thresholds and scoring knobs for performer matching
///
/// Defaults are the values observed in the importer scripts. None of them
/// are calibrated; callers pick stricter values for unattended linking and
/// looser ones for a human-reviewed suggestion queue.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MatchThresholds {
    /// Minimum score accepted by the direct pass
    pub high_confidence: f64,

    /// Minimum boosted score accepted by the context pass (scene rounds)
    pub boost_min_confidence: f64,

    /// Minimum score for both passes of the global roster round
    pub global_min_confidence: f64,

    /// Floor for the unmatched sweep (strictly exceeded)
    pub unmatched_min_confidence: f64,

    /// Flat bonus added to raw scores in the context pass
    pub context_boost: f64,

    /// Names of at most this many characters only match exactly
    pub short_name_max_len: usize,

    /// Multiplier applied to alias-derived scores
    pub alias_weight: f64,
}

impl Default for MatchThresholds {
    fn default() -> Self {
        Self {
            high_confidence: 0.9,
            boost_min_confidence: 0.65,
            global_min_confidence: 0.9,
            unmatched_min_confidence: 0.5,
            context_boost: 0.15,
            short_name_max_len: 4,
            alias_weight: 0.95,
        }
    }
}

impl MatchThresholds {
    /// Check every ratio lies in [0, 1] and the short-name length is usable
    pub fn validate(&self) -> Result<()> {
        let ratios = [
            ("high_confidence", self.high_confidence),
            ("boost_min_confidence", self.boost_min_confidence),
            ("global_min_confidence", self.global_min_confidence),
            ("unmatched_min_confidence", self.unmatched_min_confidence),
            ("context_boost", self.context_boost),
            ("alias_weight", self.alias_weight),
        ];

        for (name, value) in ratios {
            if !(0.0..=1.0).contains(&value) {
                return Err(Error::Config(format!(
                    "matcher.{} must be within [0, 1], got {}",
                    name, value
                )));
            }
        }

        if self.short_name_max_len == 0 {
            return Err(Error::Config(
                "matcher.short_name_max_len must be at least 1".to_string(),
            ));
        }

        Ok(())
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_external_endpoint() -> String {
    "stashdb".to_string()
}

/// Default config file location for the platform
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("culture-extractor").join("ce-match.toml"))
}

/// Resolve which config file to read, if any
///
/// Returns `None` when neither the CLI nor the environment names a file and
/// the platform default does not exist.
pub fn resolve_config_path(cli_arg: Option<&Path>) -> Option<PathBuf> {
    // Priority 1: Command-line argument
    if let Some(path) = cli_arg {
        return Some(path.to_path_buf());
    }

    // Priority 2: Environment variable
    if let Ok(path) = std::env::var(CONFIG_ENV_VAR) {
        if !path.trim().is_empty() {
            return Some(PathBuf::from(path));
        }
    }

    // Priority 3: Platform config directory
    default_config_path().filter(|p| p.exists())
}

/// Parse and validate a TOML config file
///
/// # Errors
/// Fails when the file cannot be read, does not parse, or carries invalid
/// thresholds.
pub fn load_toml_config(path: &Path) -> Result<TomlConfig> {
    let content = std::fs::read_to_string(path)?;
    let config: TomlConfig = toml::from_str(&content)?;
    config.matcher.validate()?;
    Ok(config)
}

/// Where the loaded configuration came from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigOrigin {
    /// Parsed from this file
    File(PathBuf),
    /// Named file does not exist; compiled defaults used
    Missing(PathBuf),
    /// No file named or found; compiled defaults used
    Defaults,
}

impl ConfigOrigin {
    /// Report the origin once a subscriber is installed
    pub fn log(&self) {
        match self {
            Self::File(path) => info!(path = %path.display(), "Loaded config file"),
            Self::Missing(path) => warn!(
                path = %path.display(),
                "Config file not found, using compiled defaults"
            ),
            Self::Defaults => info!("No config file found, using compiled defaults"),
        }
    }
}

/// Load configuration following the resolution priority
///
/// A resolved path that does not exist degrades to compiled defaults. A file
/// that exists but fails to parse or validate is an error. Nothing is logged
/// here so callers can load config before initializing tracing; call
/// [`ConfigOrigin::log`] afterwards.
pub fn load_config(cli_arg: Option<&Path>) -> Result<(TomlConfig, ConfigOrigin)> {
    let Some(path) = resolve_config_path(cli_arg) else {
        return Ok((TomlConfig::default(), ConfigOrigin::Defaults));
    };

    if !path.exists() {
        return Ok((TomlConfig::default(), ConfigOrigin::Missing(path)));
    }

    let config = load_toml_config(&path)?;
    Ok((config, ConfigOrigin::File(path)))
}

/// Write configuration atomically (temp file + rename)
///
/// Parent directories are created as needed.
pub fn write_toml_config(config: &TomlConfig, path: &Path) -> Result<()> {
    let content = toml::to_string_pretty(config)
        .map_err(|e| Error::Config(format!("Serialize TOML failed: {}", e)))?;

    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }

    let mut temp_path = path.as_os_str().to_owned();
    temp_path.push(".tmp");
    let temp_path = PathBuf::from(temp_path);

    std::fs::write(&temp_path, content)?;
    if let Err(e) = std::fs::rename(&temp_path, path) {
        let _ = std::fs::remove_file(&temp_path);
        return Err(Error::Io(e));
    }

    Ok(())
}
