//! Application configuration structures.

use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};

use chrono::format::{Item, StrftimeItems};
use serde::{Deserialize, Serialize};

use crate::error::{AppError, Result};
use crate::models::Region;

/// Root application configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Upstream list file location and HTTP behavior
    #[serde(default)]
    pub fetcher: FetcherConfig,

    /// Where parsed weeks are kept
    #[serde(default)]
    pub storage: StorageConfig,

    /// Week-over-week comparison settings
    #[serde(default)]
    pub comparison: ComparisonConfig,

    /// Write guard against truncated upstream files
    #[serde(default)]
    pub circuit_breaker: CircuitBreakerSettings,

    /// Region definitions
    #[serde(default = "defaults::default_regions")]
    pub regions: Vec<Region>,
}

impl Config {
    /// Load configuration from a TOML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        Ok(toml::from_str(&content)?)
    }

    /// Load configuration or return default if loading fails.
    pub fn load_or_default(path: impl AsRef<Path>) -> Self {
        Self::load(&path).unwrap_or_else(|e| {
            log::warn!(
                "Config load failed from {:?}: {}. Using defaults.",
                path.as_ref(),
                e
            );
            Self::default()
        })
    }

    /// Find a region by its code.
    pub fn region(&self, code: &str) -> Result<&Region> {
        self.regions
            .iter()
            .find(|r| r.code.eq_ignore_ascii_case(code))
            .ok_or_else(|| AppError::config(format!("Unknown region '{code}'")))
    }

    /// Resolve the storage root against the directory holding the config.
    pub fn storage_root(&self, base: &Path) -> PathBuf {
        if self.storage.root.is_absolute() {
            self.storage.root.clone()
        } else {
            base.join(&self.storage.root)
        }
    }

    /// Validate configuration values for basic sanity.
    pub fn validate(&self) -> Result<()> {
        if self.fetcher.user_agent.trim().is_empty() {
            return Err(AppError::validation("fetcher.user_agent is empty"));
        }
        if self.fetcher.timeout_secs == 0 {
            return Err(AppError::validation("fetcher.timeout_secs must be > 0"));
        }
        if self.fetcher.max_concurrent == 0 {
            return Err(AppError::validation("fetcher.max_concurrent must be > 0"));
        }
        for placeholder in ["{date}", "{code}"] {
            if !self.fetcher.url_template.contains(placeholder) {
                return Err(AppError::validation(format!(
                    "fetcher.url_template is missing {placeholder}"
                )));
            }
        }
        if StrftimeItems::new(&self.fetcher.date_format).any(|item| item == Item::Error) {
            return Err(AppError::validation(format!(
                "fetcher.date_format '{}' is not a valid date format",
                self.fetcher.date_format
            )));
        }
        if let Some(proxy) = self.fetcher.proxies.iter().find(|p| !p.contains("{url}")) {
            return Err(AppError::validation(format!(
                "proxy template '{proxy}' is missing {{url}}"
            )));
        }
        if self.comparison.weeks_lookback == 0 {
            return Err(AppError::validation(
                "comparison.weeks_lookback must be > 0",
            ));
        }
        if self.circuit_breaker.max_drop_percent > 100 {
            return Err(AppError::validation(
                "circuit_breaker.max_drop_percent must be <= 100",
            ));
        }
        if self.regions.is_empty() {
            return Err(AppError::validation("No regions defined"));
        }
        let mut codes = HashSet::new();
        for region in &self.regions {
            if region.code.trim().is_empty() || region.file_code.trim().is_empty() {
                return Err(AppError::validation(format!(
                    "Region '{}' needs both code and file_code",
                    region.name
                )));
            }
            if !codes.insert(region.code.to_lowercase()) {
                return Err(AppError::validation(format!(
                    "Duplicate region code '{}'",
                    region.code
                )));
            }
        }
        Ok(())
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            fetcher: FetcherConfig::default(),
            storage: StorageConfig::default(),
            comparison: ComparisonConfig::default(),
            circuit_breaker: CircuitBreakerSettings::default(),
            regions: defaults::default_regions(),
        }
    }
}

/// Upstream list location and HTTP client settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FetcherConfig {
    /// User-Agent header for HTTP requests
    #[serde(default = "defaults::user_agent")]
    pub user_agent: String,

    /// Request timeout in seconds
    #[serde(default = "defaults::timeout")]
    pub timeout_secs: u64,

    /// List file URL with `{date}` and `{code}` placeholders
    #[serde(default = "defaults::url_template")]
    pub url_template: String,

    /// chrono format string for the `{date}` placeholder
    #[serde(default = "defaults::date_format")]
    pub date_format: String,

    /// Proxy URL templates tried in order after the direct URL; `{url}` is
    /// replaced by the percent-encoded list URL
    #[serde(default = "defaults::proxies")]
    pub proxies: Vec<String>,

    /// Maximum regions updated concurrently
    #[serde(default = "defaults::max_concurrent")]
    pub max_concurrent: usize,
}

impl Default for FetcherConfig {
    fn default() -> Self {
        Self {
            user_agent: defaults::user_agent(),
            timeout_secs: defaults::timeout(),
            url_template: defaults::url_template(),
            date_format: defaults::date_format(),
            proxies: defaults::proxies(),
            max_concurrent: defaults::max_concurrent(),
        }
    }
}

/// Storage settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    /// Root directory for stored weeks; relative paths resolve against the
    /// storage directory given on the command line
    #[serde(default = "defaults::storage_root")]
    pub root: PathBuf,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            root: defaults::storage_root(),
        }
    }
}

/// Week-over-week comparison settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ComparisonConfig {
    /// Maximum number of stored weeks scanned when counting weeks on list
    #[serde(default = "defaults::weeks_lookback")]
    pub weeks_lookback: u32,
}

impl Default for ComparisonConfig {
    fn default() -> Self {
        Self {
            weeks_lookback: defaults::weeks_lookback(),
        }
    }
}

/// Circuit breaker thresholds.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CircuitBreakerSettings {
    /// Maximum allowed drop in a category's book count, in percent
    #[serde(default = "defaults::max_drop_percent")]
    pub max_drop_percent: u8,

    /// Categories with fewer listed books last week are not checked
    #[serde(default = "defaults::min_category_books")]
    pub min_category_books: usize,

    /// Allow an empty list when the previous week was also empty
    #[serde(default = "defaults::allow_cold_start")]
    pub allow_cold_start: bool,
}

impl Default for CircuitBreakerSettings {
    fn default() -> Self {
        Self {
            max_drop_percent: defaults::max_drop_percent(),
            min_category_books: defaults::min_category_books(),
            allow_cold_start: defaults::allow_cold_start(),
        }
    }
}

mod defaults {
    use std::path::PathBuf;

    use crate::models::Region;

    // Fetcher defaults
    pub fn user_agent() -> String {
        "Mozilla/5.0 (compatible; bestsellers/0.1)".into()
    }
    pub fn timeout() -> u64 {
        30
    }
    pub fn url_template() -> String {
        "https://www.bookweb.org/sites/default/files/regional_bestseller/{date}{code}.txt".into()
    }
    pub fn date_format() -> String {
        "%y%m%d".into()
    }
    pub fn proxies() -> Vec<String> {
        vec![
            "https://api.allorigins.win/raw?url={url}".into(),
            "https://corsproxy.io/?url={url}".into(),
        ]
    }
    pub fn max_concurrent() -> usize {
        3
    }

    // Storage defaults
    pub fn storage_root() -> PathBuf {
        PathBuf::from("lists")
    }

    // Comparison defaults
    pub fn weeks_lookback() -> u32 {
        52
    }

    // Circuit breaker defaults
    pub fn max_drop_percent() -> u8 {
        50
    }
    pub fn min_category_books() -> usize {
        5
    }
    pub fn allow_cold_start() -> bool {
        true
    }

    // Region defaults
    pub fn default_regions() -> Vec<Region> {
        vec![
            Region::new("ne", "New England", "ne"),
            Region::new("na", "New Atlantic", "na"),
            Region::new("si", "Southern", "si"),
            Region::new("mw", "Midwest", "mw"),
            Region::new("mp", "Mountains & Plains", "mp"),
            Region::new("pn", "Pacific Northwest", "pn"),
            Region::new("nc", "Northern California", "nc"),
            Region::new("sc", "Southern California", "sc"),
        ]
    }
}
