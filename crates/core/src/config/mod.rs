use std::{fs, path::Path};

use serde::{Deserialize, Serialize};

use crate::{analysis::DEFAULT_SEGMENT_SECONDS, BaseConfig, GenerationSettings, Result};

/// Top-level configuration structure for the application.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub analysis: AnalysisConfig,
    pub generation: GenerationSettings,
    pub base: BaseConfig,
    /// Seed for the surface noise. A random seed is drawn when unset.
    pub noise_seed: Option<u64>,
}

impl AppConfig {
    /// Parses a TOML document. Missing tables and keys keep their defaults.
    pub fn from_toml_str(text: &str) -> Result<Self> {
        Ok(toml::from_str(text)?)
    }

    /// Reads and parses a TOML file.
    pub fn load(path: &Path) -> Result<Self> {
        let text = fs::read_to_string(path)?;
        let config = Self::from_toml_str(&text)?;
        tracing::debug!(?path, "loaded configuration");
        Ok(config)
    }
}

/// Configuration specific to the feature extractor.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalysisConfig {
    pub segment_seconds: f32,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            segment_seconds: DEFAULT_SEGMENT_SECONDS,
        }
    }
}
