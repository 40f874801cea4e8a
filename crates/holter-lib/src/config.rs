use crate::error::ConfigError;
use crate::metrics::heart_rate::ExtremaPolicy;
use crate::summary::{AggregationOptions, DEFAULT_PREMATURE_TAG};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// Optional settings file for the `report` command. Every key has a default.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReportConfig {
    pub premature_tag: String,
    pub extrema_policy: ExtremaPolicy,
    pub plot: PlotConfig,
    pub pdf: PdfConfig,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlotConfig {
    pub width: u32,
    pub height: u32,
    /// Heart-rate axis range in bpm.
    pub y_min: u32,
    pub y_max: u32,
    pub y_step: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PdfConfig {
    /// Executable invoked as `<converter> [args...] <input.html> <output.pdf>`.
    pub converter: String,
    pub args: Vec<String>,
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            premature_tag: DEFAULT_PREMATURE_TAG.to_string(),
            extrema_policy: ExtremaPolicy::default(),
            plot: PlotConfig::default(),
            pdf: PdfConfig::default(),
        }
    }
}

impl Default for PlotConfig {
    fn default() -> Self {
        Self {
            width: 1024,
            height: 768,
            y_min: 40,
            y_max: 210,
            y_step: 10,
        }
    }
}

impl Default for PdfConfig {
    fn default() -> Self {
        Self {
            converter: "wkhtmltopdf".into(),
            args: Vec::new(),
        }
    }
}

impl ReportConfig {
    pub fn from_toml_str(text: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(text)?)
    }

    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let text = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&text)
    }

    pub fn aggregation_options(&self) -> AggregationOptions {
        AggregationOptions {
            premature_tag: self.premature_tag.clone(),
            extrema_policy: self.extrema_policy,
        }
    }
}
