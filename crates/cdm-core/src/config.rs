//! Configuration types for cdm.
//!
//! [`Config::load`] reads `~/.config/cdm/config.toml`, creating it with
//! hardcoded defaults if it does not yet exist, then applies `CDM_`-prefixed
//! environment overrides (`CDM_PLACES__API_KEY=...`). [`Config::defaults`]
//! returns the built-in defaults without touching the filesystem (useful in
//! tests).

use crate::{session::DEFAULT_RADIUS_KM, types::Coordinate};
use serde::Deserialize;
use std::path::PathBuf;

// ---------------------------------------------------------------------------
// Embedded defaults
// ---------------------------------------------------------------------------

const DEFAULT_CONFIG: &str = r#"
[search]
max_results       = 20
default_radius_km = 2

# Stand-in for the device location. Leave unset to search without an origin
# (no distance ranking or radius filtering).
[location]

[places]
# "auto" uses Google when an API key is set, otherwise the offline fixtures.
provider     = "auto"
api_key      = ""
base_url     = "https://places.googleapis.com"
timeout_secs = 10

[store]

[ui]
theme = "default"
"#;

// ---------------------------------------------------------------------------
// Public config types
// ---------------------------------------------------------------------------

/// Top-level application configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub search: SearchConfig,
    #[serde(default)]
    pub location: LocationConfig,
    #[serde(default)]
    pub places: PlacesConfig,
    #[serde(default)]
    pub store: StoreConfig,
    #[serde(default)]
    pub ui: UiConfig,
}

/// `[search]` section of `config.toml`.
#[derive(Debug, Clone, Deserialize)]
pub struct SearchConfig {
    #[serde(default = "default_max_results")]
    pub max_results: usize,
    #[serde(default = "default_radius_km")]
    pub default_radius_km: u32,
}

fn default_max_results() -> usize { crate::aggregator::DEFAULT_MAX_RESULTS }
fn default_radius_km() -> u32 { DEFAULT_RADIUS_KM }

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            max_results: default_max_results(),
            default_radius_km: default_radius_km(),
        }
    }
}

/// `[location]` section of `config.toml`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct LocationConfig {
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
}

impl LocationConfig {
    /// The configured origin, if both halves are present.
    pub fn origin(&self) -> Option<Coordinate> {
        Some(Coordinate::new(self.latitude?, self.longitude?))
    }
}

/// Which places provider to build.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProviderKind {
    #[default]
    Auto,
    Google,
    Fixture,
}

/// `[places]` section of `config.toml`.
#[derive(Debug, Clone, Deserialize)]
pub struct PlacesConfig {
    #[serde(default)]
    pub provider: ProviderKind,
    #[serde(default)]
    pub api_key: String,
    #[serde(default = "default_base_url")]
    pub base_url: String,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    /// JSON fixture file for the offline provider. The embedded sample set is
    /// used when unset.
    pub fixture_path: Option<PathBuf>,
}

fn default_base_url() -> String { "https://places.googleapis.com".to_string() }
fn default_timeout_secs() -> u64 { 10 }

impl Default for PlacesConfig {
    fn default() -> Self {
        Self {
            provider: ProviderKind::default(),
            api_key: String::new(),
            base_url: default_base_url(),
            timeout_secs: default_timeout_secs(),
            fixture_path: None,
        }
    }
}

/// `[store]` section of `config.toml`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct StoreConfig {
    /// Defaults to `$XDG_DATA_HOME/cdm/records.json`.
    pub path: Option<PathBuf>,
}

impl StoreConfig {
    pub fn resolved_path(&self) -> PathBuf {
        self.path.clone().unwrap_or_else(data_path)
    }
}

/// `[ui]` section of `config.toml`.
#[derive(Debug, Clone, Deserialize)]
pub struct UiConfig {
    #[serde(default = "default_theme")]
    pub theme: String,
}

fn default_theme() -> String { "default".to_string() }

impl Default for UiConfig {
    fn default() -> Self {
        Self { theme: default_theme() }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::defaults()
    }
}

impl Config {
    /// Load from `~/.config/cdm/config.toml`, layered on top of the built-in
    /// defaults and under `CDM_*` environment variables. Creates the file with
    /// defaults if it does not exist.
    pub fn load() -> anyhow::Result<Self> {
        let path = config_path();

        if !path.exists() {
            if let Some(parent) = path.parent() {
                std::fs::create_dir_all(parent)?;
            }
            std::fs::write(&path, DEFAULT_CONFIG.trim_start())?;
        }

        config::Config::builder()
            .add_source(config::File::from_str(DEFAULT_CONFIG, config::FileFormat::Toml))
            .add_source(config::File::from(path.as_path()).required(false))
            .add_source(
                config::Environment::with_prefix("CDM")
                    .prefix_separator("_")
                    .separator("__"),
            )
            .build()?
            .try_deserialize()
            .map_err(Into::into)
    }

    /// Return the built-in defaults without touching the filesystem.
    pub fn defaults() -> Self {
        config::Config::builder()
            .add_source(config::File::from_str(DEFAULT_CONFIG, config::FileFormat::Toml))
            .build()
            .expect("built-in default config must be valid TOML")
            .try_deserialize()
            .expect("built-in default config must deserialize correctly")
    }
}

// ---------------------------------------------------------------------------
// Path helpers
// ---------------------------------------------------------------------------

fn home_dir() -> PathBuf {
    PathBuf::from(std::env::var("HOME").unwrap_or_else(|_| ".".to_string()))
}

fn config_path() -> PathBuf {
    std::env::var("XDG_CONFIG_HOME")
        .map(PathBuf::from)
        .unwrap_or_else(|_| home_dir().join(".config"))
        .join("cdm")
        .join("config.toml")
}

fn data_path() -> PathBuf {
    std::env::var("XDG_DATA_HOME")
        .map(PathBuf::from)
        .unwrap_or_else(|_| home_dir().join(".local").join("share"))
        .join("cdm")
        .join("records.json")
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
