//! Configuration loading and config file resolution
//!
//! The skill is configured from a single, optional TOML file. Everything has a
//! built-in default, so a missing file only produces a warning.
//!
//! Config file resolution priority order:
//! 1. Command-line argument (highest priority)
//! 2. Environment variable (`WMC_CONFIG`)
//! 3. Platform config file (`<config dir>/web-music-control/config.toml`)
//! 4. Built-in defaults (fallback)

use crate::events::EventChannel;
use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::{info, warn};

/// Environment variable naming an explicit config file
pub const CONFIG_ENV_VAR: &str = "WMC_CONFIG";

/// Directory name used under the platform config directory
const APP_DIR: &str = "web-music-control";

/// Which intent resolver the skill runs
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum ResolverKind {
    /// Ordered named regex patterns
    #[default]
    Regex,
    /// Example-trained phrase classifier
    Classifier,
}

impl std::str::FromStr for ResolverKind {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "regex" => Ok(ResolverKind::Regex),
            "classifier" => Ok(ResolverKind::Classifier),
            other => Err(Error::InvalidInput(format!(
                "Unknown resolver '{}' (expected regex or classifier)",
                other
            ))),
        }
    }
}

/// Skill configuration loaded from TOML
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SkillConfig {
    /// Resolver implementation
    pub resolver: ResolverKind,

    /// Spoken name of the playback client, matched case-insensitively
    pub client_name: String,

    /// Resource language folder
    pub language: String,

    /// Directory holding `<language>/<name>` resource files
    ///
    /// If not specified, the bundled resources are used.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub resource_dir: Option<PathBuf>,

    /// Outbound play event name
    pub event_channel: EventChannel,

    /// Whether a client is assumed connected at startup
    pub client_connected: bool,

    /// EventBus channel capacity
    pub event_bus_capacity: usize,

    pub classifier: ClassifierConfig,

    pub tiers: TierConfig,

    pub logging: LoggingConfig,
}

impl Default for SkillConfig {
    fn default() -> Self {
        Self {
            resolver: ResolverKind::default(),
            client_name: "apple music".to_string(),
            language: "en-us".to_string(),
            resource_dir: None,
            event_channel: EventChannel::default(),
            client_connected: false,
            event_bus_capacity: 100,
            classifier: ClassifierConfig::default(),
            tiers: TierConfig::default(),
            logging: LoggingConfig::default(),
        }
    }
}

/// Classifier resolver tuning
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClassifierConfig {
    /// Classifications below this confidence are rejected
    pub min_confidence: f64,

    /// Minimum Jaro-Winkler similarity for a slot value to count as a known entity
    pub fuzzy_threshold: f64,
}

impl Default for ClassifierConfig {
    fn default() -> Self {
        Self {
            min_confidence: 0.5,
            fuzzy_threshold: 0.92,
        }
    }
}

/// Confidence tier thresholds
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TierConfig {
    /// Score above which a match is MULTI_KEY
    pub multi_key_threshold: f64,

    /// Same, when the phrase named the client explicitly
    pub multi_key_threshold_client_named: f64,
}

impl Default for TierConfig {
    fn default() -> Self {
        Self {
            multi_key_threshold: 0.5,
            multi_key_threshold_client_named: 0.7,
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    pub level: String,

    /// Log file path (optional, logs to stderr if not specified)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub file: Option<PathBuf>,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            file: None,
        }
    }
}

impl SkillConfig {
    /// Load and validate a config file
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: SkillConfig = toml::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// Resolve the config file per priority order and load it
    ///
    /// An explicitly named file (argument or environment) must exist. The
    /// platform file is optional: without it the built-in defaults are used.
    pub fn resolve(cli_arg: Option<&Path>) -> Result<Self> {
        match resolve_config_path(cli_arg, CONFIG_ENV_VAR) {
            ConfigSource::Explicit(path) | ConfigSource::Platform(path) => {
                info!("Loading config from {}", path.display());
                Self::load(&path)
            }
            ConfigSource::Defaults => {
                warn!("No config file found, using built-in defaults");
                Ok(Self::default())
            }
        }
    }

    /// Check value ranges
    pub fn validate(&self) -> Result<()> {
        if self.client_name.trim().is_empty() {
            return Err(Error::Config("client_name must not be empty".to_string()));
        }
        if self.language.trim().is_empty() {
            return Err(Error::Config("language must not be empty".to_string()));
        }
        if self.event_bus_capacity == 0 {
            return Err(Error::Config("event_bus_capacity must be > 0".to_string()));
        }

        let unit_values = [
            ("classifier.min_confidence", self.classifier.min_confidence),
            ("classifier.fuzzy_threshold", self.classifier.fuzzy_threshold),
            ("tiers.multi_key_threshold", self.tiers.multi_key_threshold),
            (
                "tiers.multi_key_threshold_client_named",
                self.tiers.multi_key_threshold_client_named,
            ),
        ];
        for (key, value) in unit_values {
            if !(0.0..=1.0).contains(&value) {
                return Err(Error::Config(format!(
                    "{} must be within [0.0, 1.0], got {}",
                    key, value
                )));
            }
        }

        Ok(())
    }
}

/// Where the configuration comes from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigSource {
    /// Named on the command line or in the environment
    Explicit(PathBuf),
    /// Found at the platform default location
    Platform(PathBuf),
    /// No file, built-in defaults
    Defaults,
}

/// Pick the config file following the priority order
pub fn resolve_config_path(cli_arg: Option<&Path>, env_var_name: &str) -> ConfigSource {
    // Priority 1: Command-line argument
    if let Some(path) = cli_arg {
        return ConfigSource::Explicit(path.to_path_buf());
    }

    // Priority 2: Environment variable
    if let Ok(path) = std::env::var(env_var_name) {
        if !path.is_empty() {
            return ConfigSource::Explicit(PathBuf::from(path));
        }
    }

    // Priority 3: Platform config file
    if let Some(path) = platform_config_file() {
        return ConfigSource::Platform(path);
    }

    // Priority 4: Built-in defaults
    ConfigSource::Defaults
}

/// Existing platform config file, if any
fn platform_config_file() -> Option<PathBuf> {
    let user_config = dirs::config_dir().map(|d| d.join(APP_DIR).join("config.toml"));
    if let Some(path) = user_config {
        if path.exists() {
            return Some(path);
        }
    }

    if cfg!(target_os = "linux") {
        let system_config = PathBuf::from("/etc").join(APP_DIR).join("config.toml");
        if system_config.exists() {
            return Some(system_config);
        }
    }

    None
}
