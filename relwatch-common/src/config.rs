//! Configuration loading and root folder resolution
//!
//! Bootstrap settings live in a single TOML file. Every value can be
//! overridden, with priority:
//! 1. Command-line argument (highest priority)
//! 2. Environment variable
//! 3. TOML config file
//! 4. Compiled default (fallback)

use crate::atomic_file::write_atomic_private;
use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Application directory name under the platform config/data dirs
pub const APP_DIR_NAME: &str = "relwatch";

/// Environment variable naming the root folder
pub const ROOT_FOLDER_ENV: &str = "RELWATCH_ROOT_FOLDER";

/// Environment variable naming the config file
pub const CONFIG_PATH_ENV: &str = "RELWATCH_CONFIG";

/// Bootstrap configuration loaded from TOML
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TomlConfig {
    /// Folder holding the scan checkpoint
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub root_folder: Option<PathBuf>,

    /// Target playlist receiving new tracks
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub playlist_id: Option<String>,

    /// Pre-acquired OAuth bearer token
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub access_token: Option<String>,

    /// Catalog market used when listing releases (ISO 3166-1 alpha-2)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub market: Option<String>,

    /// Web API base URL override
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_base_url: Option<String>,

    /// Local wall-clock trigger times, `HH:MM`
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub schedule: Vec<String>,

    /// Scan tuning
    #[serde(default)]
    pub scan: ScanSection,

    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// `[scan]` table; unset values fall back to built-in defaults
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ScanSection {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub entity_page_size: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub release_page_size: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub release_pages_per_kind: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub chunk_size: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub throttle_ms: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rate_limit_margin_secs: Option<u64>,
    /// Absent means retry rate-limited calls forever
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_rate_limit_retries: Option<u32>,
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

fn default_log_level() -> String {
    "info".to_string()
}

/// Config file path: CLI → `RELWATCH_CONFIG` → `<config_dir>/relwatch/config.toml`
pub fn resolve_config_path(cli_arg: Option<&Path>) -> Result<PathBuf> {
    if let Some(path) = cli_arg {
        return Ok(path.to_path_buf());
    }

    if let Ok(path) = std::env::var(CONFIG_PATH_ENV) {
        if !path.trim().is_empty() {
            return Ok(PathBuf::from(path));
        }
    }

    dirs::config_dir()
        .map(|d| d.join(APP_DIR_NAME).join("config.toml"))
        .ok_or_else(|| Error::Config("Could not determine config directory".to_string()))
}

/// Load TOML config; a missing file yields the default (empty) config
pub fn load_toml_config(path: &Path) -> Result<TomlConfig> {
    if !path.exists() {
        info!("No config file at {}, using defaults", path.display());
        return Ok(TomlConfig::default());
    }

    let content = std::fs::read_to_string(path)
        .map_err(|e| Error::Config(format!("Read {} failed: {}", path.display(), e)))?;
    let config: TomlConfig = toml::from_str(&content)
        .map_err(|e| Error::Config(format!("Parse {} failed: {}", path.display(), e)))?;

    debug!(path = %path.display(), "Loaded TOML config");
    Ok(config)
}

/// Write TOML config atomically with owner-only permissions
pub fn write_toml_config(config: &TomlConfig, path: &Path) -> Result<()> {
    let content = toml::to_string_pretty(config)
        .map_err(|e| Error::Config(format!("Serialize TOML failed: {}", e)))?;
    write_atomic_private(path, content.as_bytes())
}

/// Root folder: CLI → `RELWATCH_ROOT_FOLDER` → TOML → OS default
pub fn resolve_root_folder(cli_arg: Option<&Path>, toml_config: &TomlConfig) -> PathBuf {
    if let Some(path) = cli_arg {
        return path.to_path_buf();
    }

    if let Ok(path) = std::env::var(ROOT_FOLDER_ENV) {
        if !path.trim().is_empty() {
            return PathBuf::from(path);
        }
    }

    if let Some(path) = &toml_config.root_folder {
        return path.clone();
    }

    default_root_folder()
}

/// OS-dependent default root folder
pub fn default_root_folder() -> PathBuf {
    dirs::data_local_dir()
        .map(|d| d.join(APP_DIR_NAME))
        .unwrap_or_else(|| PathBuf::from("./relwatch_data"))
}

/// Pick the first non-blank value among CLI, environment and TOML
pub fn first_configured(
    cli_arg: Option<&str>,
    env_var_name: &str,
    toml_value: Option<&str>,
) -> Option<String> {
    let env_value = std::env::var(env_var_name).ok();
    let found = [cli_arg, env_value.as_deref(), toml_value]
        .into_iter()
        .flatten()
        .map(str::trim)
        .find(|v| !v.is_empty())
        .map(str::to_string);
    found
}
