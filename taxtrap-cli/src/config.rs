//! `taxtrap.toml` configuration file.
//!
//! Every key is optional:
//!
//! ```toml
//! log_level = "debug"
//! format = "json"
//!
//! [materiality]
//! irmaa = 600
//! capital_gains = "100"
//! social_security = 250
//! aca = 500
//! bracket_proximity_window = 5000
//! ```
//!
//! Command-line flags take precedence over the file; `RUST_LOG` takes
//! precedence over `log_level`.

use std::path::Path;

use rust_decimal::Decimal;
use serde::Deserialize;
use taxtrap_core::AnalyzerConfig;
use thiserror::Error;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid config file: {0}")]
    Parse(#[from] toml::de::Error),
}

/// Overrides for [`AnalyzerConfig`]; unset keys keep the built-in defaults.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct MaterialityOverrides {
    pub irmaa: Option<Decimal>,
    pub capital_gains: Option<Decimal>,
    pub social_security: Option<Decimal>,
    pub aca: Option<Decimal>,
    pub bracket_proximity_window: Option<Decimal>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct AppConfig {
    pub log_level: Option<String>,
    pub format: Option<OutputFormat>,
    pub materiality: MaterialityOverrides,
}

impl AppConfig {
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_toml(&contents)
    }

    pub fn from_toml(contents: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(contents)?)
    }

    /// The built-in analyzer defaults with this file's overrides applied.
    /// Validation happens when the analyzer is built.
    pub fn analyzer_config(&self) -> AnalyzerConfig {
        let defaults = AnalyzerConfig::default();
        let m = &self.materiality;
        AnalyzerConfig {
            irmaa_materiality: m.irmaa.unwrap_or(defaults.irmaa_materiality),
            capital_gains_materiality: m
                .capital_gains
                .unwrap_or(defaults.capital_gains_materiality),
            social_security_materiality: m
                .social_security
                .unwrap_or(defaults.social_security_materiality),
            aca_materiality: m.aca.unwrap_or(defaults.aca_materiality),
            bracket_proximity_window: m
                .bracket_proximity_window
                .unwrap_or(defaults.bracket_proximity_window),
        }
    }
}
