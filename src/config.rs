use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::barriers::BarrierMatch;
use crate::error::Result;
use crate::sentiment::LabelScales;

/// Percentages that raise per-group insights and sentiment highlights.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct InsightThresholds {
    /// Expensive share above which a financial concern is raised.
    pub financial_concern_above: f64,
    /// Definitely-willing share below which a participation risk is raised.
    pub participation_risk_below: f64,
    /// Dissatisfied share above which a trust issue is raised.
    pub trust_issue_above: f64,
    /// Overall scores below this are listed as concerning.
    pub concerning_below: f64,
    /// Overall scores at or above this are listed as very positive.
    pub very_positive_from: f64,
}

impl Default for InsightThresholds {
    fn default() -> Self {
        Self {
            financial_concern_above: 50.0,
            participation_risk_below: 60.0,
            trust_issue_above: 40.0,
            concerning_below: 40.0,
            very_positive_from: 70.0,
        }
    }
}

/// Static report configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReportConfig {
    pub data_path: PathBuf,
    pub access_secret: String,
    pub barrier_matching: BarrierMatch,
    /// chrono formats tried in order when reading `Timestamp`.
    pub timestamp_formats: Vec<String>,
    pub scales: LabelScales,
    pub insights: InsightThresholds,
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            data_path: PathBuf::from("109.csv"),
            access_secret: "admin123".to_string(),
            barrier_matching: BarrierMatch::Substring,
            timestamp_formats: vec![
                "%m/%d/%Y %H:%M:%S".to_string(),
                "%Y/%m/%d %I:%M:%S %p".to_string(),
                "%Y-%m-%d %H:%M:%S".to_string(),
            ],
            scales: LabelScales::default(),
            insights: InsightThresholds::default(),
        }
    }
}

impl ReportConfig {
    pub fn from_toml_str(raw: &str) -> Result<Self> {
        Ok(toml::from_str(raw)?)
    }

    /// Read a TOML file. A relative `data_path` is resolved against the
    /// file's directory.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path)?;
        let mut config = Self::from_toml_str(&raw)?;
        if config.data_path.is_relative() {
            if let Some(dir) = path.parent() {
                config.data_path = dir.join(&config.data_path);
            }
        }
        tracing::debug!("Loaded config from {}", path.display());
        Ok(config)
    }
}
