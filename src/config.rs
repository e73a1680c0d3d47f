//! Dashboard configuration
//!
//! Read from TOML. Every field has a default, so an empty file (or no file)
//! yields a working fixture-only setup.
//!
//! ```toml
//! api_base_url = "http://sessions.example.com"
//! request_timeout_secs = 30
//! fallback_to_fixtures = true
//! default_fx_pairs = ["USD/JPY", "EUR/JPY"]
//! balance_table_sessions = 2
//! ```

use crate::currency::CurrencyPair;
use crate::error::{DashboardError, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Configuration file structure
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DashboardConfig {
    /// Base URL of the session API; `None` serves fixtures only
    #[serde(default)]
    pub api_base_url: Option<String>,
    #[serde(default = "default_timeout_secs")]
    pub request_timeout_secs: u64,
    /// Serve fixture data when the API cannot be reached
    #[serde(default = "default_true")]
    pub fallback_to_fixtures: bool,
    /// Fixture JSON file; `None` uses the bundled sample
    #[serde(default)]
    pub fixtures_path: Option<PathBuf>,
    #[serde(default)]
    pub fixture_latency_ms: u64,
    #[serde(default = "default_fx_pairs")]
    pub default_fx_pairs: Vec<String>,
    /// Scenarios whose FX chart is not shown
    #[serde(default = "default_hidden_rate_scenarios")]
    pub hidden_rate_scenarios: Vec<String>,
    /// Number of most recently selected sessions that get a balance table
    #[serde(default = "default_balance_table_sessions")]
    pub balance_table_sessions: usize,
}

fn default_timeout_secs() -> u64 {
    30
}

fn default_true() -> bool {
    true
}

fn default_fx_pairs() -> Vec<String> {
    vec!["USD/JPY".to_string(), "EUR/JPY".to_string()]
}

fn default_hidden_rate_scenarios() -> Vec<String> {
    vec![
        "Feb_Apr_2017".to_string(),
        "Jun_Aug_2017".to_string(),
        "Feb_Apr_2017_wit_commission".to_string(),
    ]
}

fn default_balance_table_sessions() -> usize {
    2
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            api_base_url: None,
            request_timeout_secs: default_timeout_secs(),
            fallback_to_fixtures: default_true(),
            fixtures_path: None,
            fixture_latency_ms: 0,
            default_fx_pairs: default_fx_pairs(),
            hidden_rate_scenarios: default_hidden_rate_scenarios(),
            balance_table_sessions: default_balance_table_sessions(),
        }
    }
}

impl DashboardConfig {
    /// Default config location: `~/.session-dashboard/config.toml`
    pub fn default_path() -> Option<PathBuf> {
        dirs::home_dir().map(|home| home.join(".session-dashboard").join("config.toml"))
    }

    /// Parse a TOML document
    pub fn from_toml_str(contents: &str) -> Result<Self> {
        toml::from_str(contents)
            .map_err(|e| DashboardError::ConfigError(format!("Failed to parse config: {}", e)))
    }

    /// Read and parse a config file
    pub fn from_file(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path)?;
        Self::from_toml_str(&contents)
    }

    /// Load from `path`, or from the default location when `path` is `None`.
    ///
    /// A missing or unreadable file falls back to defaults with a warning.
    pub fn load(path: Option<&Path>) -> Self {
        let (config_path, explicit) = match path {
            Some(p) => (p.to_path_buf(), true),
            None => match Self::default_path() {
                Some(p) => (p, false),
                None => return Self::default(),
            },
        };

        if !config_path.exists() {
            if explicit {
                log::warn!("Config file {} not found, using defaults", config_path.display());
            }
            return Self::default();
        }

        match Self::from_file(&config_path) {
            Ok(config) => config,
            Err(e) => {
                log::warn!("{} ({}), using defaults", e, config_path.display());
                Self::default()
            }
        }
    }

    /// Check values that parse but cannot be used
    pub fn validate(&self) -> Result<()> {
        if self.request_timeout_secs == 0 {
            return Err(DashboardError::ConfigError(
                "request_timeout_secs must be positive".to_string(),
            ));
        }
        if self.balance_table_sessions == 0 {
            return Err(DashboardError::ConfigError(
                "balance_table_sessions must be at least 1".to_string(),
            ));
        }
        for pair in &self.default_fx_pairs {
            CurrencyPair::parse(pair)
                .map_err(|e| DashboardError::ConfigError(format!("default_fx_pairs: {}", e)))?;
        }
        Ok(())
    }

    /// Whether the FX chart is suppressed for `scenario`
    pub fn hides_rates_for(&self, scenario: &str) -> bool {
        self.hidden_rate_scenarios.iter().any(|s| s == scenario)
    }
}
