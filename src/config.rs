//! Site configuration
//!
//! Where the post index lives and which page elements the search uses.
//! Stored as `site.json` in the platform config directory, with
//! environment variables taking precedence over the file.

use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;

use crate::page::PageSelectors;

pub const ENV_BASE_URL: &str = "POSTSEARCH_BASE_URL";
pub const ENV_TIMEOUT_SECS: &str = "POSTSEARCH_TIMEOUT_SECS";

const CONFIG_FILE_NAME: &str = "site.json";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),
    #[error("Invalid value for {name}: {value}")]
    InvalidValue { name: String, value: String },
    #[error("Failed to get app config directory")]
    NoConfigDir,
}

/// Settings for searching one site
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct SiteConfig {
    /// Site root the index is served under, e.g. `https://example.org/blog`
    pub base_url: Option<String>,
    /// Id of the element holding one hidden entry per post
    pub results_container: String,
    /// Id of the search box
    pub search_input: String,
    /// Index request timeout; none by default
    pub request_timeout_secs: Option<u64>,
}

impl Default for SiteConfig {
    fn default() -> Self {
        let selectors = PageSelectors::default();
        Self {
            base_url: None,
            results_container: selectors.results_container,
            search_input: selectors.search_input,
            request_timeout_secs: None,
        }
    }
}

impl SiteConfig {
    pub fn selectors(&self) -> PageSelectors {
        PageSelectors {
            results_container: self.results_container.clone(),
            search_input: self.search_input.clone(),
        }
    }

    pub fn request_timeout(&self) -> Option<Duration> {
        self.request_timeout_secs.map(Duration::from_secs)
    }

    /// Apply overrides from the process environment
    pub fn populate_from_env(&mut self) -> Result<bool, ConfigError> {
        self.populate_from(|name| env::var(name).ok())
    }

    /// Apply overrides from `lookup`; returns whether anything changed
    pub fn populate_from<F>(&mut self, lookup: F) -> Result<bool, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut updated = false;

        if let Some(url) = lookup(ENV_BASE_URL).filter(|v| !v.trim().is_empty()) {
            log::info!("Loaded base URL from environment");
            self.base_url = Some(url.trim().to_string());
            updated = true;
        }

        if let Some(raw) = lookup(ENV_TIMEOUT_SECS).filter(|v| !v.trim().is_empty()) {
            let secs = raw.trim().parse::<u64>().map_err(|_| ConfigError::InvalidValue {
                name: ENV_TIMEOUT_SECS.to_string(),
                value: raw.clone(),
            })?;
            log::info!("Loaded request timeout from environment: {}s", secs);
            self.request_timeout_secs = Some(secs);
            updated = true;
        }

        Ok(updated)
    }
}

/// Get the app config directory
fn get_app_config_dir() -> Result<PathBuf, ConfigError> {
    ProjectDirs::from("com", "postsearch", "Postsearch")
        .map(|dirs| dirs.config_dir().to_path_buf())
        .ok_or(ConfigError::NoConfigDir)
}

/// Path of the site config file
pub fn get_site_config_path() -> Result<PathBuf, ConfigError> {
    Ok(get_app_config_dir()?.join(CONFIG_FILE_NAME))
}

/// Load a config file; a missing file gives the defaults
pub fn load_site_config_from(path: &Path) -> Result<SiteConfig, ConfigError> {
    if !path.exists() {
        return Ok(SiteConfig::default());
    }

    let content = fs::read_to_string(path)?;
    let config: SiteConfig = serde_json::from_str(&content)?;
    Ok(config)
}

/// Save a config file, creating its directory
pub fn save_site_config_to(path: &Path, config: &SiteConfig) -> Result<(), ConfigError> {
    if let Some(dir) = path.parent() {
        fs::create_dir_all(dir)?;
    }

    let content = serde_json::to_string_pretty(config)?;
    fs::write(path, content)?;
    Ok(())
}

/// Load the config from `path` (or the default location) and apply env overrides
pub fn load_site_config(path: Option<&Path>) -> Result<SiteConfig, ConfigError> {
    let mut config = match path {
        Some(path) => load_site_config_from(path)?,
        None => match get_site_config_path() {
            Ok(path) => load_site_config_from(&path)?,
            Err(e) => {
                log::warn!("{}; using defaults", e);
                SiteConfig::default()
            }
        },
    };

    if config.populate_from_env()? {
        log::info!("Site config updated from environment variables");
    }
    Ok(config)
}
