//! Configuration loading for the ProcureAI client
//!
//! Bootstrap settings are resolved key by key in priority order:
//! 1. Command-line argument (highest priority)
//! 2. Environment variable
//! 3. TOML config file
//! 4. Compiled default (fallback)
//!
//! A missing TOML file is not an error. A TOML file that exists but cannot be
//! parsed is.

use crate::{Error, Result};
use serde::Deserialize;
use std::fmt;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{debug, info};

/// Model service base URL used when nothing else is configured
pub const DEFAULT_API_BASE: &str = "http://localhost:5000/api";

/// CPV dictionary location used when nothing else is configured
pub const DEFAULT_CPV_SOURCE: &str = "cpv.json";

/// Health poll interval used when nothing else is configured
pub const DEFAULT_HEALTH_INTERVAL_MS: u64 = 5000;

pub const DEFAULT_LANGUAGE: &str = "pl";

/// Environment variable selecting the model service base URL
pub const API_BASE_ENV: &str = "PROCUREAI_API_BASE";

/// Environment variable selecting the CPV dictionary location
pub const CPV_SOURCE_ENV: &str = "PROCUREAI_CPV_SOURCE";

/// Bootstrap configuration loaded from TOML file
///
/// Every key is optional; absent keys fall through to the compiled defaults.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TomlConfig {
    /// Model service base URL, e.g. `http://localhost:5000/api`
    #[serde(default)]
    pub api_base: Option<String>,

    /// CPV dictionary location: `http(s)://` URL or file path
    #[serde(default)]
    pub cpv_source: Option<String>,

    /// Interface language (pl, en, ua)
    #[serde(default)]
    pub language: Option<String>,

    #[serde(default)]
    pub health_interval_ms: Option<u64>,

    /// Optional per-request timeout. Unset means requests never time out.
    #[serde(default)]
    pub request_timeout_ms: Option<u64>,

    /// Logging configuration (optional)
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Logging configuration
#[derive(Debug, Clone, Deserialize)]
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

fn default_log_level() -> String {
    "info".to_string()
}

impl TomlConfig {
    /// Parse a TOML config file
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config = toml::from_str(&content)?;
        debug!("Loaded config file {}", path.display());
        Ok(config)
    }

    /// Locate and load the config file
    ///
    /// An explicit path must exist. Without one, the per-user config file is
    /// used when present and skipped otherwise.
    pub fn discover(explicit: Option<&Path>) -> Result<Option<Self>> {
        if let Some(path) = explicit {
            if !path.exists() {
                return Err(Error::Config(format!(
                    "Config file not found: {}",
                    path.display()
                )));
            }
            return Self::load(path).map(Some);
        }

        match default_config_path() {
            Some(path) if path.exists() => {
                info!("Using config file {}", path.display());
                Self::load(&path).map(Some)
            }
            _ => {
                debug!("No config file found, using defaults");
                Ok(None)
            }
        }
    }
}

/// Per-user config file location (`<config_dir>/procureai/config.toml`)
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("procureai").join("config.toml"))
}

/// Where the CPV description dictionary is read from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DictionaryLocation {
    /// Fetched over HTTP(S)
    Url(String),
    /// Read from the local filesystem
    File(PathBuf),
}

impl DictionaryLocation {
    pub fn parse(raw: &str) -> Self {
        let raw = raw.trim();
        if raw.starts_with("http://") || raw.starts_with("https://") {
            DictionaryLocation::Url(raw.to_string())
        } else {
            DictionaryLocation::File(PathBuf::from(raw))
        }
    }
}

impl fmt::Display for DictionaryLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DictionaryLocation::Url(url) => write!(f, "{}", url),
            DictionaryLocation::File(path) => write!(f, "{}", path.display()),
        }
    }
}

/// Values given on the command line
#[derive(Debug, Clone, Default)]
pub struct CliOverrides {
    pub api_base: Option<String>,
    pub cpv_source: Option<String>,
    pub language: Option<String>,
    pub health_interval_ms: Option<u64>,
}

/// Fully resolved client settings
#[derive(Debug, Clone, PartialEq)]
pub struct ClientSettings {
    /// Model service base URL without trailing slash
    pub api_base: String,
    pub cpv_source: DictionaryLocation,
    pub language: String,
    pub health_interval: Duration,
    pub request_timeout: Option<Duration>,
    pub log_level: String,
}

impl ClientSettings {
    /// Compiled defaults only, ignoring environment and files
    pub fn defaults() -> Self {
        Self {
            api_base: DEFAULT_API_BASE.to_string(),
            cpv_source: DictionaryLocation::parse(DEFAULT_CPV_SOURCE),
            language: DEFAULT_LANGUAGE.to_string(),
            health_interval: Duration::from_millis(DEFAULT_HEALTH_INTERVAL_MS),
            request_timeout: None,
            log_level: default_log_level(),
        }
    }

    /// Resolve settings from CLI values, environment and an optional TOML file
    pub fn resolve(cli: &CliOverrides, file: Option<&TomlConfig>) -> Result<Self> {
        let api_base = cli
            .api_base
            .clone()
            .or_else(|| env_value(API_BASE_ENV))
            .or_else(|| file.and_then(|f| f.api_base.clone()))
            .unwrap_or_else(|| DEFAULT_API_BASE.to_string());
        let api_base = normalize_api_base(&api_base)?;

        let cpv_source = cli
            .cpv_source
            .clone()
            .or_else(|| env_value(CPV_SOURCE_ENV))
            .or_else(|| file.and_then(|f| f.cpv_source.clone()))
            .unwrap_or_else(|| DEFAULT_CPV_SOURCE.to_string());

        let language = cli
            .language
            .clone()
            .or_else(|| file.and_then(|f| f.language.clone()))
            .unwrap_or_else(|| DEFAULT_LANGUAGE.to_string());

        let interval_ms = cli
            .health_interval_ms
            .or_else(|| file.and_then(|f| f.health_interval_ms))
            .unwrap_or(DEFAULT_HEALTH_INTERVAL_MS);
        if interval_ms == 0 {
            return Err(Error::Config(
                "health_interval_ms must be greater than zero".to_string(),
            ));
        }

        let request_timeout = file
            .and_then(|f| f.request_timeout_ms)
            .filter(|ms| *ms > 0)
            .map(Duration::from_millis);

        let log_level = file
            .map(|f| f.logging.level.clone())
            .unwrap_or_else(default_log_level);

        Ok(Self {
            api_base,
            cpv_source: DictionaryLocation::parse(&cpv_source),
            language,
            health_interval: Duration::from_millis(interval_ms),
            request_timeout,
            log_level,
        })
    }
}

fn env_value(name: &str) -> Option<String> {
    std::env::var(name)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// Check the scheme and strip trailing slashes
fn normalize_api_base(raw: &str) -> Result<String> {
    let trimmed = raw.trim().trim_end_matches('/');
    if !(trimmed.starts_with("http://") || trimmed.starts_with("https://")) {
        return Err(Error::Config(format!(
            "API base must be an http(s) URL, got '{}'",
            raw
        )));
    }
    Ok(trimmed.to_string())
}
