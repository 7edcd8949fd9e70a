//! Configuration loading and management.

use std::path::{Path, PathBuf};

use figment::Figment;
use figment::providers::{Env, Format, Serialized, Toml};
use serde::{Deserialize, Serialize};
use stint_core::DEFAULT_RESOLUTION;

/// Application configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Path to the ledger file.
    pub ledger_path: PathBuf,

    /// Rounding granularity for computed hours, in hours.
    pub resolution: f64,

    /// Optional pay rate per hour. Unset means no pay figures anywhere.
    pub rate: Option<f64>,
}

impl Default for Config {
    fn default() -> Self {
        let data_dir = dirs_data_path().unwrap_or_else(|| PathBuf::from("."));
        Self {
            ledger_path: data_dir.join("ledger.stint"),
            resolution: DEFAULT_RESOLUTION,
            rate: None,
        }
    }
}

impl Config {
    /// Loads configuration, optionally from a specific file.
    #[expect(
        clippy::result_large_err,
        reason = "figment::Error is large but only returned at startup"
    )]
    pub fn load_from(config_path: Option<&Path>) -> Result<Self, figment::Error> {
        let mut figment = Figment::from(Serialized::defaults(Self::default()));

        // Load from default config location
        if let Some(config_dir) = dirs_config_path() {
            figment = figment.merge(Toml::file(config_dir.join("config.toml")));
        }

        // Load from specified config file
        if let Some(path) = config_path {
            figment = figment.merge(Toml::file(path));
        }

        // Load from environment variables (STINT_*)
        figment = figment.merge(Env::prefixed("STINT_"));

        figment.extract()
    }

    pub fn settings(&self) -> stint_core::Settings {
        stint_core::Settings {
            resolution: self.resolution,
            rate: self.rate,
        }
    }
}

/// Returns the platform-specific config directory for stint.
fn dirs_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|p| p.join("stint"))
}

/// Returns the platform-specific data directory for stint.
///
/// On Linux: `~/.local/share/stint`
pub fn dirs_data_path() -> Option<PathBuf> {
    dirs::data_dir().map(|p| p.join("stint"))
}
