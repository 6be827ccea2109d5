//! Command-line argument definitions using clap

use std::path::{Path, PathBuf};

use anyhow::Result;
use clap::Parser;

use crate::config::{
    load_config, BalanceMethod, BalancingConfig, PipelineConfig, SelectionConfig,
    SelectionMethod, DEFAULT_SEED,
};
use crate::pipeline::TargetMapping;

/// prepfit - Balance classes and select features before model training
#[derive(Parser, Debug)]
#[command(name = "prepfit")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Input file path (CSV or Parquet)
    #[arg(short, long)]
    pub input: PathBuf,

    /// Label column name.
    /// If not provided, it is selected interactively from the available columns.
    #[arg(short, long)]
    pub target: Option<String>,

    /// Feature columns to use (comma-separated).
    /// Defaults to every numeric column except the target.
    #[arg(short, long, value_delimiter = ',')]
    pub features: Vec<String>,

    /// Value in the target column that represents EVENT (maps to 1).
    /// Required with --non-event-value when the target is not binary 0/1.
    #[arg(long)]
    pub event_value: Option<String>,

    /// Value in the target column that represents NON-EVENT (maps to 0).
    #[arg(long)]
    pub non_event_value: Option<String>,

    /// Output file path (CSV or Parquet, determined by extension).
    /// Defaults to the input directory with a '_prepared' suffix (e.g., data.csv -> data_prepared.csv).
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// JSON configuration file. When given, its balancing and selection
    /// settings replace the corresponding flags; --seed still applies.
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// JSON run report path. Defaults to '<input>_prep_report.json'.
    #[arg(long)]
    pub report: Option<PathBuf>,

    /// Class balancing method: "none" or "smote"
    #[arg(long, default_value = "none")]
    pub balancing: BalanceMethod,

    /// Fraction of the majority class to keep, in (0, 1]
    #[arg(long, default_value = "1.0", value_parser = validate_unit_interval)]
    pub undersampling_ratio: f64,

    /// Target minority size relative to the undersampled majority, in (0, 1]
    #[arg(long, default_value = "1.0", value_parser = validate_unit_interval)]
    pub minority_ratio: f64,

    /// Nearest neighbors considered per minority sample
    #[arg(long, default_value = "5", value_parser = validate_k_neighbors)]
    pub k_neighbors: usize,

    /// Execution order of the balancing stage (lower runs first, ties favor balancing)
    #[arg(long, default_value = "1", allow_hyphen_values = true)]
    pub balancing_order: i32,

    /// Feature selection method: "none" or "correlation"
    #[arg(long, default_value = "none")]
    pub selection: SelectionMethod,

    /// Maximum number of features to select
    #[arg(long, default_value = "20")]
    pub max_features: usize,

    /// Candidates correlated above this with an already selected feature are pruned, in (0, 1]
    #[arg(long, default_value = "0.8", value_parser = validate_unit_interval)]
    pub multicollinearity_threshold: f64,

    /// Execution order of the selection stage
    #[arg(long, default_value = "2", allow_hyphen_values = true)]
    pub selection_order: i32,

    /// Random seed for undersampling and synthetic sample generation (default: 42)
    #[arg(long)]
    pub seed: Option<u64>,

    /// Skip interactive prompts
    #[arg(long, default_value = "false")]
    pub no_confirm: bool,

    /// Number of rows to use for schema inference (CSV only).
    /// Use 0 for a full table scan.
    #[arg(long, default_value = "10000")]
    pub infer_schema_length: usize,

    /// Show debug-level log output on stderr
    #[arg(short, long, default_value = "false")]
    pub verbose: bool,
}

/// `<dir>/<stem><suffix>` next to `input`
fn sibling_path(input: &Path, suffix: &str) -> PathBuf {
    let parent = input.parent().unwrap_or_else(|| Path::new("."));
    let stem = input
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("output");
    parent.join(format!("{}{}", stem, suffix))
}

impl Cli {
    /// Output path, derived from the input when not given explicitly
    pub fn output_path(&self) -> PathBuf {
        self.output.clone().unwrap_or_else(|| {
            let extension = self
                .input
                .extension()
                .and_then(|e| e.to_str())
                .unwrap_or("parquet");
            sibling_path(&self.input, &format!("_prepared.{}", extension))
        })
    }

    pub fn report_path(&self) -> PathBuf {
        self.report
            .clone()
            .unwrap_or_else(|| sibling_path(&self.input, "_prep_report.json"))
    }

    /// Explicit feature list, if one was given
    pub fn feature_list(&self) -> Option<&[String]> {
        if self.features.is_empty() {
            None
        } else {
            Some(&self.features)
        }
    }

    /// Label mapping from --event-value/--non-event-value. Both or neither must be given.
    pub fn target_mapping(&self) -> Result<Option<TargetMapping>> {
        match (&self.event_value, &self.non_event_value) {
            (Some(event), Some(non_event)) => {
                if event == non_event {
                    anyhow::bail!("--event-value and --non-event-value must differ");
                }
                Ok(Some(TargetMapping::new(event.clone(), non_event.clone())))
            }
            (None, None) => Ok(None),
            _ => anyhow::bail!("--event-value and --non-event-value must be given together"),
        }
    }

    /// Configuration assembled from flags alone
    pub fn to_pipeline_config(&self) -> PipelineConfig {
        PipelineConfig {
            data_balancing: BalancingConfig {
                method: self.balancing,
                undersampling_ratio: self.undersampling_ratio,
                minority_to_majority_ratio: self.minority_ratio,
                k_neighbors: self.k_neighbors,
                execution_order: self.balancing_order,
            },
            feature_engineering: SelectionConfig {
                method: self.selection,
                max_features: self.max_features,
                multicollinearity_threshold: self.multicollinearity_threshold,
                execution_order: self.selection_order,
            },
            seed: self.seed.unwrap_or(DEFAULT_SEED),
        }
    }

    /// Effective configuration: the --config file when given, otherwise the
    /// flags. An explicit --seed always wins.
    pub fn resolve_config(&self) -> Result<PipelineConfig> {
        let mut config = match &self.config {
            Some(path) => load_config(path)?,
            None => self.to_pipeline_config(),
        };
        if let Some(seed) = self.seed {
            config.seed = seed;
        }
        config.validate()?;
        Ok(config)
    }
}

/// Validator for ratios and thresholds in (0, 1]
fn validate_unit_interval(s: &str) -> Result<f64, String> {
    let value: f64 = s
        .parse()
        .map_err(|_| format!("'{}' is not a valid number", s))?;

    if value > 0.0 && value <= 1.0 {
        Ok(value)
    } else {
        Err(format!("value must be in (0, 1], got {}", value))
    }
}

/// Validator for k_neighbors
fn validate_k_neighbors(s: &str) -> Result<usize, String> {
    let value: usize = s
        .parse()
        .map_err(|_| format!("'{}' is not a valid count", s))?;

    if value == 0 {
        Err("k_neighbors must be at least 1".to_string())
    } else {
        Ok(value)
    }
}
