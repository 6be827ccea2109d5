//! JSON report of a processing run
//!
//! Records what was run (input, target, effective configuration, stage order),
//! what came out (row and class counts, balancing statistics) and the full
//! feature selection report.

use std::path::Path;

use anyhow::{Context, Result};
use chrono::Utc;
use serde::Serialize;

use crate::config::PipelineConfig;
use crate::pipeline::{BalanceStats, ClassCounts, ProcessedResult, StageKind};
use crate::report::{ProcessingSummary, SelectionReport};

#[derive(Debug, Clone, Serialize)]
pub struct RunMetadata {
    pub timestamp: String,
    pub prepfit_version: String,
    pub input_file: String,
    pub output_file: String,
    pub target_column: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct SampleCounts {
    pub original: usize,
    pub after_balancing: usize,
    #[serde(rename = "final")]
    pub final_count: usize,
    pub classes_before: ClassCounts,
    pub classes_after: ClassCounts,
}

/// Timing information in milliseconds
#[derive(Debug, Clone, Default, Serialize)]
pub struct TimingInfo {
    pub load_ms: u64,
    pub balancing_ms: u64,
    pub selection_ms: u64,
    pub save_ms: u64,
    pub total_ms: u64,
}

impl From<&ProcessingSummary> for TimingInfo {
    fn from(summary: &ProcessingSummary) -> Self {
        Self {
            load_ms: summary.load_time.as_millis() as u64,
            balancing_ms: summary.balancing_time.as_millis() as u64,
            selection_ms: summary.selection_time.as_millis() as u64,
            save_ms: summary.save_time.as_millis() as u64,
            total_ms: summary.total_time().as_millis() as u64,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct RunReport {
    pub metadata: RunMetadata,
    pub config: PipelineConfig,
    pub stage_order: [StageKind; 2],
    pub samples: SampleCounts,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub balancing: Option<BalanceStats>,
    pub selection: SelectionReport,
    pub final_features: Vec<String>,
    pub timing: TimingInfo,
}

impl RunReport {
    pub fn new(
        input_file: &Path,
        output_file: &Path,
        target_column: &str,
        config: &PipelineConfig,
        result: &ProcessedResult,
        summary: &ProcessingSummary,
    ) -> Self {
        Self {
            metadata: RunMetadata {
                timestamp: Utc::now().to_rfc3339(),
                prepfit_version: env!("CARGO_PKG_VERSION").to_string(),
                input_file: input_file.display().to_string(),
                output_file: output_file.display().to_string(),
                target_column: target_column.to_string(),
            },
            config: config.clone(),
            stage_order: result.stage_order,
            samples: SampleCounts {
                original: result.original_count,
                after_balancing: result.balanced_count,
                final_count: result.table.len(),
                classes_before: summary.classes_before,
                classes_after: result.table.class_counts(),
            },
            balancing: result.balance_stats,
            selection: result.selection_report.clone(),
            final_features: result.feature_names.clone(),
            timing: TimingInfo::from(summary),
        }
    }
}

/// Write the run report as pretty-printed JSON
pub fn export_run_report(report: &RunReport, output_path: &Path) -> Result<()> {
    let json =
        serde_json::to_string_pretty(report).context("Failed to serialize run report to JSON")?;

    std::fs::write(output_path, json)
        .with_context(|| format!("Failed to write run report to {}", output_path.display()))?;

    Ok(())
}
