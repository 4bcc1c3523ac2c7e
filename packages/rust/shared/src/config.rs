//! Application configuration for mushaf.
//!
//! User config lives at `~/.mushaf/mushaf.toml`.
//! CLI flags override config file values, which override defaults.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{MushafError, Result};

/// Default configuration file name.
const CONFIG_FILE_NAME: &str = "mushaf.toml";

/// Default config directory name under the user's home.
const CONFIG_DIR_NAME: &str = ".mushaf";

// ---------------------------------------------------------------------------
// Config structs (matching mushaf.toml schema)
// ---------------------------------------------------------------------------

/// Top-level application config, deserialized from TOML.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    /// Input/output locations.
    #[serde(default)]
    pub paths: PathsConfig,

    /// Pronunciation page scraping.
    #[serde(default)]
    pub scrape: ScrapeSettings,

    /// Audio download pipeline.
    #[serde(default)]
    pub download: DownloadSettings,
}

/// `[paths]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PathsConfig {
    /// Root of the input tree (`<data_dir>/quran.sqlite`, `<data_dir>/surah/<folder>/`).
    #[serde(default = "default_data_dir")]
    pub data_dir: String,

    /// Output root (`<output_dir>/surahs.json`, `<output_dir>/audios/`).
    #[serde(default = "default_output_dir")]
    pub output_dir: String,
}

impl Default for PathsConfig {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
            output_dir: default_output_dir(),
        }
    }
}

fn default_data_dir() -> String {
    "data".into()
}
fn default_output_dir() -> String {
    "output".into()
}

/// `[scrape]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScrapeSettings {
    /// Base URL of the transliteration pages; the surah page is
    /// `<base_url>/<nnn>.asp` with a zero-padded surah number.
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Politeness delay between successive surah page fetches.
    #[serde(default = "default_rate_limit_ms")]
    pub rate_limit_ms: u64,

    /// Timeout for a single page fetch.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for ScrapeSettings {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            rate_limit_ms: default_rate_limit_ms(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

fn default_base_url() -> String {
    "http://transliteration.org/quran/WebSite_CD/MixFrench".into()
}
fn default_rate_limit_ms() -> u64 {
    500
}
fn default_timeout_secs() -> u64 {
    30
}

/// `[download]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DownloadSettings {
    /// Maximum concurrent audio downloads.
    #[serde(default = "default_concurrency")]
    pub concurrency: u32,

    /// Total fetch attempts per asset (first try included).
    #[serde(default = "default_retry_attempts")]
    pub retry_attempts: u32,

    /// Linear backoff base; the wait after attempt `n` is `n * base`.
    #[serde(default = "default_backoff_base_ms")]
    pub backoff_base_ms: u64,

    /// Timeout for a single download attempt.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for DownloadSettings {
    fn default() -> Self {
        Self {
            concurrency: default_concurrency(),
            retry_attempts: default_retry_attempts(),
            backoff_base_ms: default_backoff_base_ms(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

fn default_concurrency() -> u32 {
    8
}
fn default_retry_attempts() -> u32 {
    3
}
fn default_backoff_base_ms() -> u64 {
    2000
}

// ---------------------------------------------------------------------------
// Config loading
// ---------------------------------------------------------------------------

/// Get the path to the config directory (`~/.mushaf/`).
pub fn config_dir() -> Result<PathBuf> {
    let home = dirs::home_dir()
        .ok_or_else(|| MushafError::config("could not determine home directory"))?;
    Ok(home.join(CONFIG_DIR_NAME))
}

/// Get the path to the config file (`~/.mushaf/mushaf.toml`).
pub fn config_file_path() -> Result<PathBuf> {
    Ok(config_dir()?.join(CONFIG_FILE_NAME))
}

/// Load the application config from disk. Returns defaults if the file does not exist.
pub fn load_config() -> Result<AppConfig> {
    let path = config_file_path()?;

    if !path.exists() {
        tracing::debug!(?path, "config file not found, using defaults");
        return Ok(AppConfig::default());
    }

    load_config_from(&path)
}

/// Load the application config from a specific file path.
pub fn load_config_from(path: &Path) -> Result<AppConfig> {
    let content = std::fs::read_to_string(path).map_err(|e| MushafError::io(path, e))?;

    toml::from_str(&content)
        .map_err(|e| MushafError::config(format!("failed to parse {}: {e}", path.display())))
}

/// Create the config directory and write a default config file.
/// Returns the path to the created file.
pub fn init_config() -> Result<PathBuf> {
    let dir = config_dir()?;
    std::fs::create_dir_all(&dir).map_err(|e| MushafError::io(&dir, e))?;

    let path = dir.join(CONFIG_FILE_NAME);
    let config = AppConfig::default();
    let content = toml::to_string_pretty(&config).map_err(|e| MushafError::config(e.to_string()))?;

    std::fs::write(&path, content).map_err(|e| MushafError::io(&path, e))?;
    tracing::info!(?path, "created default config file");

    Ok(path)
}
