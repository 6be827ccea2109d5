//! Pipeline configuration: balancing and selection settings plus the run seed
//!
//! Settings can come from a JSON file (optionally wrapped in a `modelConfig`
//! object) or be assembled from command-line flags. Every stage re-validates
//! its own settings before doing any work.

use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::pipeline::{PrepError, PrepResult};

/// Seed used when none is configured, so repeated runs are reproducible
pub const DEFAULT_SEED: u64 = 42;

/// Class balancing strategy
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase", try_from = "String")]
pub enum BalanceMethod {
    /// Leave the class distribution untouched
    #[default]
    None,
    /// Undersample the majority class and synthesize minority rows
    Smote,
}

impl std::fmt::Display for BalanceMethod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            BalanceMethod::None => write!(f, "none"),
            BalanceMethod::Smote => write!(f, "smote"),
        }
    }
}

impl std::str::FromStr for BalanceMethod {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "none" => Ok(BalanceMethod::None),
            "smote" => Ok(BalanceMethod::Smote),
            _ => Err(format!(
                "Unknown balancing method: '{}'. Use 'none' or 'smote'.",
                s
            )),
        }
    }
}

impl TryFrom<String> for BalanceMethod {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

/// Feature selection strategy
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase", try_from = "String")]
pub enum SelectionMethod {
    /// Keep every candidate feature
    #[default]
    None,
    /// Rank by label correlation, prune multicollinear features
    Correlation,
}

impl std::fmt::Display for SelectionMethod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SelectionMethod::None => write!(f, "none"),
            SelectionMethod::Correlation => write!(f, "correlation"),
        }
    }
}

impl std::str::FromStr for SelectionMethod {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "none" => Ok(SelectionMethod::None),
            "correlation" | "corr" => Ok(SelectionMethod::Correlation),
            _ => Err(format!(
                "Unknown selection method: '{}'. Use 'none' or 'correlation'.",
                s
            )),
        }
    }
}

impl TryFrom<String> for SelectionMethod {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

/// Settings for the class balancing stage
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct BalancingConfig {
    pub method: BalanceMethod,
    /// Fraction of the majority class kept, in (0, 1]
    pub undersampling_ratio: f64,
    /// Target minority size relative to the undersampled majority, in (0, 1]
    pub minority_to_majority_ratio: f64,
    /// Neighbors considered per minority point, at least 1
    pub k_neighbors: usize,
    /// Balancing runs first when this is <= the selection order
    pub execution_order: i32,
}

impl Default for BalancingConfig {
    fn default() -> Self {
        Self {
            method: BalanceMethod::None,
            undersampling_ratio: 1.0,
            minority_to_majority_ratio: 1.0,
            k_neighbors: 5,
            execution_order: 1,
        }
    }
}

impl BalancingConfig {
    pub fn validate(&self) -> PrepResult<()> {
        validate_unit_ratio("undersampling_ratio", self.undersampling_ratio)?;
        validate_unit_ratio("minority_to_majority_ratio", self.minority_to_majority_ratio)?;
        if self.k_neighbors < 1 {
            return Err(PrepError::config(
                "k_neighbors",
                format!("must be at least 1, got {}", self.k_neighbors),
            ));
        }
        Ok(())
    }
}

/// Settings for the feature selection stage
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SelectionConfig {
    pub method: SelectionMethod,
    /// Upper bound on the number of selected features
    pub max_features: usize,
    /// Candidates correlated above this with a selected feature are pruned, in (0, 1]
    pub multicollinearity_threshold: f64,
    pub execution_order: i32,
}

impl Default for SelectionConfig {
    fn default() -> Self {
        Self {
            method: SelectionMethod::None,
            max_features: 20,
            multicollinearity_threshold: 0.8,
            execution_order: 2,
        }
    }
}

impl SelectionConfig {
    pub fn validate(&self) -> PrepResult<()> {
        if self.max_features == 0 {
            return Err(PrepError::config("max_features", "must be greater than 0"));
        }
        validate_unit_ratio(
            "multicollinearity_threshold",
            self.multicollinearity_threshold,
        )
    }
}

/// Complete configuration for one pipeline run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PipelineConfig {
    pub data_balancing: BalancingConfig,
    pub feature_engineering: SelectionConfig,
    /// Base seed for every random stream in the run
    pub seed: u64,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            data_balancing: BalancingConfig::default(),
            feature_engineering: SelectionConfig::default(),
            seed: DEFAULT_SEED,
        }
    }
}

impl PipelineConfig {
    /// Validate the settings of every enabled stage.
    ///
    /// A disabled stage's settings are never read, so they are not checked.
    pub fn validate(&self) -> PrepResult<()> {
        if self.data_balancing.method != BalanceMethod::None {
            self.data_balancing.validate()?;
        }
        if self.feature_engineering.method != SelectionMethod::None {
            self.feature_engineering.validate()?;
        }
        Ok(())
    }
}

/// Load and validate a pipeline configuration from a JSON file
pub fn load_config(path: &Path) -> Result<PipelineConfig> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read configuration file: {}", path.display()))?;
    let config = parse_config(&text)
        .with_context(|| format!("Failed to parse configuration file: {}", path.display()))?;
    Ok(config)
}

/// Parse and validate a pipeline configuration from JSON text.
///
/// Accepts both `{ "modelConfig": { ... } }` and the bare config object.
/// Keys unrelated to balancing or selection are ignored.
pub fn parse_config(text: &str) -> Result<PipelineConfig> {
    let mut document: serde_json::Value = serde_json::from_str(text)?;
    let section = match document.get_mut("modelConfig").map(serde_json::Value::take) {
        Some(inner) => inner,
        None => document,
    };
    let config: PipelineConfig = serde_json::from_value(section)?;
    config.validate()?;
    Ok(config)
}

fn validate_unit_ratio(field: &'static str, value: f64) -> PrepResult<()> {
    if value > 0.0 && value <= 1.0 {
        Ok(())
    } else {
        Err(PrepError::config(
            field,
            format!("must be in (0, 1], got {}", value),
        ))
    }
}
