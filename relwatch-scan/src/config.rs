//! Configuration resolution for relwatch-scan
//!
//! Turns the bootstrap [`TomlConfig`] plus CLI/environment overrides into the
//! explicit objects the engine is constructed with:
//! - [`ScanConfig`]: target playlist, paging windows, chunking, throttling
//! - [`ApiSettings`]: token, base URL and market for the catalog client
//!
//! Core logic never reads the process environment itself.

use relwatch_common::config::{first_configured, ScanSection, TomlConfig};
use relwatch_common::{Error, Result};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Checkpoint file name inside the root folder
pub const CHECKPOINT_FILE_NAME: &str = "scan_state.json";

pub const DEFAULT_ENTITY_PAGE_SIZE: u32 = 50;
pub const DEFAULT_RELEASE_PAGE_SIZE: u32 = 10;
pub const DEFAULT_RELEASE_PAGES_PER_KIND: u32 = 1;
/// Playlist append accepts at most 100 items per call
pub const MAX_APPEND_CHUNK: usize = 100;
pub const DEFAULT_THROTTLE_MS: u64 = 500;
pub const DEFAULT_RATE_LIMIT_MARGIN_SECS: u64 = 5;
/// Upper bound the catalog accepts for any page size
pub const MAX_PAGE_SIZE: u32 = 50;

pub const DEFAULT_API_BASE_URL: &str = "https://api.spotify.com/v1";
pub const ACCESS_TOKEN_ENV: &str = "RELWATCH_ACCESS_TOKEN";
pub const PLAYLIST_ID_ENV: &str = "RELWATCH_PLAYLIST_ID";

/// Bounded per-kind release fetch.
///
/// Releases beyond `page_size * pages_per_kind` for a kind are never seen;
/// artists with a very long history may have older releases excluded.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReleaseWindow {
    pub page_size: u32,
    pub pages_per_kind: u32,
}

impl Default for ReleaseWindow {
    fn default() -> Self {
        Self {
            page_size: DEFAULT_RELEASE_PAGE_SIZE,
            pages_per_kind: DEFAULT_RELEASE_PAGES_PER_KIND,
        }
    }
}

/// Everything the scan orchestrator needs, injected at construction
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScanConfig {
    /// Target playlist
    pub playlist_id: String,
    /// Where the checkpoint is persisted
    pub checkpoint_path: PathBuf,
    pub entity_page_size: u32,
    pub release_window: ReleaseWindow,
    pub chunk_size: usize,
    /// Delay between successive artist/release calls
    pub throttle: Duration,
    /// Added on top of the server's retry-after
    pub rate_limit_margin: Duration,
    /// `None` retries rate-limited calls indefinitely
    pub max_rate_limit_retries: Option<u32>,
}

impl ScanConfig {
    /// Config with built-in defaults
    pub fn new(playlist_id: impl Into<String>, checkpoint_path: impl Into<PathBuf>) -> Self {
        Self {
            playlist_id: playlist_id.into(),
            checkpoint_path: checkpoint_path.into(),
            entity_page_size: DEFAULT_ENTITY_PAGE_SIZE,
            release_window: ReleaseWindow::default(),
            chunk_size: MAX_APPEND_CHUNK,
            throttle: Duration::from_millis(DEFAULT_THROTTLE_MS),
            rate_limit_margin: Duration::from_secs(DEFAULT_RATE_LIMIT_MARGIN_SECS),
            max_rate_limit_retries: None,
        }
    }

    /// Resolve from TOML, with the playlist optionally overridden by CLI/env
    pub fn resolve(
        toml_config: &TomlConfig,
        root_folder: &Path,
        playlist_cli: Option<&str>,
    ) -> Result<Self> {
        let playlist_id = first_configured(
            playlist_cli,
            PLAYLIST_ID_ENV,
            toml_config.playlist_id.as_deref(),
        )
        .ok_or_else(|| {
            Error::Config(format!(
                "Target playlist not configured. Use --playlist, {PLAYLIST_ID_ENV}, \
                 or playlist_id in the config file"
            ))
        })?;

        let mut config = Self::new(playlist_id, root_folder.join(CHECKPOINT_FILE_NAME));
        config.apply_section(&toml_config.scan);
        config.validate()?;
        Ok(config)
    }

    fn apply_section(&mut self, scan: &ScanSection) {
        if let Some(v) = scan.entity_page_size {
            self.entity_page_size = v;
        }
        if let Some(v) = scan.release_page_size {
            self.release_window.page_size = v;
        }
        if let Some(v) = scan.release_pages_per_kind {
            self.release_window.pages_per_kind = v;
        }
        if let Some(v) = scan.chunk_size {
            self.chunk_size = v;
        }
        if let Some(v) = scan.throttle_ms {
            self.throttle = Duration::from_millis(v);
        }
        if let Some(v) = scan.rate_limit_margin_secs {
            self.rate_limit_margin = Duration::from_secs(v);
        }
        if scan.max_rate_limit_retries.is_some() {
            self.max_rate_limit_retries = scan.max_rate_limit_retries;
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.playlist_id.trim().is_empty() {
            return Err(Error::Config("playlist_id must not be empty".to_string()));
        }
        check_page_size("entity_page_size", self.entity_page_size)?;
        check_page_size("release_page_size", self.release_window.page_size)?;
        if self.release_window.pages_per_kind == 0 {
            return Err(Error::Config("release_pages_per_kind must be at least 1".to_string()));
        }
        if self.chunk_size == 0 || self.chunk_size > MAX_APPEND_CHUNK {
            return Err(Error::Config(format!(
                "chunk_size must be within 1..={MAX_APPEND_CHUNK}, got {}",
                self.chunk_size
            )));
        }
        Ok(())
    }
}

fn check_page_size(name: &str, value: u32) -> Result<()> {
    if value == 0 || value > MAX_PAGE_SIZE {
        return Err(Error::Config(format!(
            "{name} must be within 1..={MAX_PAGE_SIZE}, got {value}"
        )));
    }
    Ok(())
}

/// Catalog client settings
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiSettings {
    pub access_token: String,
    pub base_url: String,
    pub market: Option<String>,
}

impl ApiSettings {
    /// Token priority: CLI → `RELWATCH_ACCESS_TOKEN` → TOML
    pub fn resolve(toml_config: &TomlConfig, token_cli: Option<&str>) -> Result<Self> {
        let access_token = first_configured(
            token_cli,
            ACCESS_TOKEN_ENV,
            toml_config.access_token.as_deref(),
        )
        .ok_or_else(|| {
            Error::Config(format!(
                "Access token not configured. Use --access-token, {ACCESS_TOKEN_ENV}, \
                 or access_token in the config file"
            ))
        })?;

        let base_url = toml_config
            .api_base_url
            .as_deref()
            .map(str::trim)
            .filter(|u| !u.is_empty())
            .unwrap_or(DEFAULT_API_BASE_URL)
            .trim_end_matches('/')
            .to_string();

        let market = toml_config
            .market
            .as_deref()
            .map(str::trim)
            .filter(|m| !m.is_empty())
            .map(str::to_uppercase);

        Ok(Self {
            access_token,
            base_url,
            market,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn toml_with_playlist() -> TomlConfig {
        TomlConfig {
            playlist_id: Some("pl-1".to_string()),
            ..Default::default()
        }
    }

    #[test]
    fn test_defaults_are_valid() {
        let config = ScanConfig::new("pl", "/tmp/scan_state.json");
        assert!(config.validate().is_ok());
        assert_eq!(config.chunk_size, 100);
        assert_eq!(config.rate_limit_margin, Duration::from_secs(5));
        assert_eq!(config.max_rate_limit_retries, None);
    }

    #[test]
    fn test_resolve_places_checkpoint_in_root_folder() {
        let config = ScanConfig::resolve(&toml_with_playlist(), Path::new("/srv/rw"), None).unwrap();
        assert_eq!(config.checkpoint_path, PathBuf::from("/srv/rw/scan_state.json"));
        assert_eq!(config.playlist_id, "pl-1");
    }

    #[test]
    fn test_resolve_applies_scan_section() {
        let mut toml_config = toml_with_playlist();
        toml_config.scan.chunk_size = Some(50);
        toml_config.scan.throttle_ms = Some(0);
        toml_config.scan.release_pages_per_kind = Some(3);
        toml_config.scan.max_rate_limit_retries = Some(2);

        let config = ScanConfig::resolve(&toml_config, Path::new("/r"), None).unwrap();
        assert_eq!(config.chunk_size, 50);
        assert_eq!(config.throttle, Duration::ZERO);
        assert_eq!(config.release_window.pages_per_kind, 3);
        assert_eq!(config.max_rate_limit_retries, Some(2));
    }

    #[test]
    fn test_cli_playlist_overrides_toml() {
        let config =
            ScanConfig::resolve(&toml_with_playlist(), Path::new("/r"), Some("pl-cli")).unwrap();
        assert_eq!(config.playlist_id, "pl-cli");
    }

    #[test]
    fn test_oversized_chunk_rejected() {
        let mut config = ScanConfig::new("pl", "/tmp/s.json");
        config.chunk_size = 101;
        assert!(config.validate().is_err());
        config.chunk_size = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_zero_page_size_rejected() {
        let mut config = ScanConfig::new("pl", "/tmp/s.json");
        config.entity_page_size = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_api_settings_normalize_url_and_market() {
        let toml_config = TomlConfig {
            access_token: Some("tok".to_string()),
            api_base_url: Some("http://localhost:9000/v1/".to_string()),
            market: Some(" ua ".to_string()),
            ..Default::default()
        };
        let api = ApiSettings::resolve(&toml_config, Some("cli-token")).unwrap();
        assert_eq!(api.access_token, "cli-token");
        assert_eq!(api.base_url, "http://localhost:9000/v1");
        assert_eq!(api.market.as_deref(), Some("UA"));
    }
}
