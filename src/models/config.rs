//! Configuration model.

use crate::Result;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Default video extensions (union of what both provider front-ends accepted).
pub const DEFAULT_VIDEO_EXTENSIONS: &[&str] = &["mp4", "mkv", "avi", "mov", "wmv", "flv"];

/// Which metadata service to query.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum ProviderKind {
    #[default]
    Tmdb,
    Omdb,
}

impl std::fmt::Display for ProviderKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ProviderKind::Tmdb => write!(f, "tmdb"),
            ProviderKind::Omdb => write!(f, "omdb"),
        }
    }
}

/// Destination layout for TV episodes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "kebab-case")]
pub enum LibraryLayout {
    /// `TV Shows/<title>/Season NN/`
    #[default]
    Plex,
    /// `TV/<year>/<title>/Season N/`
    ByYear,
}

/// Zero-padding policy for episode numbers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum EpisodePadding {
    /// Two digits, three when the season has more than 99 episodes.
    #[default]
    Adaptive,
    /// Always two digits.
    Fixed,
}

/// Application configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Metadata provider to use.
    pub provider: ProviderKind,
    /// TMDB configuration.
    pub tmdb: TmdbConfig,
    /// OMDb configuration.
    pub omdb: OmdbConfig,
    /// Destination naming.
    pub library: LibraryConfig,
    /// Discovery settings.
    pub scan: ScanConfig,
    /// Search settings.
    pub search: SearchConfig,
}

/// TMDB configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TmdbConfig {
    /// API key or v4 bearer token.
    pub api_key: Option<String>,
    /// Language for responses.
    pub language: String,
}

/// OMDb configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct OmdbConfig {
    /// API key.
    pub api_key: Option<String>,
}

/// Library layout configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct LibraryConfig {
    pub layout: LibraryLayout,
    pub episode_padding: EpisodePadding,
}

/// Discovery configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ScanConfig {
    /// Video extensions without the leading dot.
    pub video_extensions: Vec<String>,
}

/// Search configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchConfig {
    /// Fetch full details for every candidate before filtering.
    pub prefetch_details: bool,
    /// Upper bound for any single provider request, in seconds.
    pub request_timeout_secs: u64,
}

impl Default for TmdbConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            language: "en-US".to_string(),
        }
    }
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            video_extensions: DEFAULT_VIDEO_EXTENSIONS.iter().map(|e| e.to_string()).collect(),
        }
    }
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            prefetch_details: false,
            request_timeout_secs: 30,
        }
    }
}

impl Config {
    /// Check values that would make a run meaningless.
    pub fn validate(&self) -> Result<()> {
        if self.scan.video_extensions.is_empty() {
            return Err(crate::Error::InvalidConfig(
                "scan.video_extensions must not be empty".to_string(),
            ));
        }
        if self.search.request_timeout_secs == 0 {
            return Err(crate::Error::InvalidConfig(
                "search.request_timeout_secs must be greater than zero".to_string(),
            ));
        }
        Ok(())
    }

    /// TMDB API key from config, falling back to the environment.
    pub fn tmdb_api_key(&self) -> Option<String> {
        self.tmdb
            .api_key
            .clone()
            .filter(|k| !k.is_empty())
            .or_else(|| std::env::var("TMDB_API_KEY").ok())
    }

    /// OMDb API key from config, falling back to the environment.
    pub fn omdb_api_key(&self) -> Option<String> {
        self.omdb
            .api_key
            .clone()
            .filter(|k| !k.is_empty())
            .or_else(|| std::env::var("OMDB_API_KEY").ok())
    }
}

/// Get the configuration directory path.
fn dirs_config_path() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("plex_sorter")
}

/// Default location of the configuration file.
pub fn default_config_path() -> PathBuf {
    dirs_config_path().join("config.toml")
}

/// Load configuration from a specific file.
///
/// A missing file yields defaults; a file that fails to parse is an error.
pub fn load_config_from(path: &Path) -> Result<Config> {
    if !path.exists() {
        tracing::debug!("No config file at {}, using defaults", path.display());
        return Ok(Config::default());
    }

    let content = std::fs::read_to_string(path)?;
    let config: Config = toml::from_str(&content)
        .map_err(|e| crate::Error::InvalidConfig(format!("{}: {}", path.display(), e)))?;
    config.validate()?;
    Ok(config)
}
