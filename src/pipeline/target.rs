//! Label column analysis and encoding to 0/1

use std::collections::BTreeSet;

use anyhow::{Context, Result};
use polars::prelude::*;
use serde::{Deserialize, Serialize};

/// Tolerance when checking whether numeric labels are exactly 0 or 1
const TOLERANCE: f64 = 1e-9;

/// Which raw label values mean "event" (1) and "non-event" (0)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TargetMapping {
    pub event_value: String,
    pub non_event_value: String,
}

impl TargetMapping {
    pub fn new(event_value: impl Into<String>, non_event_value: impl Into<String>) -> Self {
        Self {
            event_value: event_value.into(),
            non_event_value: non_event_value.into(),
        }
    }
}

/// What the label column looks like
#[derive(Debug, Clone, PartialEq)]
pub enum TargetAnalysis {
    /// Only 0 and 1 present; used as is
    AlreadyBinary,
    /// Anything else; the distinct values, sorted
    NeedsMapping { unique_values: Vec<String> },
}

/// Decide whether `target` can be used directly or needs a [`TargetMapping`]
pub fn analyze_target_column(df: &DataFrame, target: &str) -> Result<TargetAnalysis> {
    let column = df
        .column(target)
        .with_context(|| format!("Target column '{}' not found", target))?;

    if column.len() == 0 {
        anyhow::bail!("Target column '{}' is empty", target);
    }
    if column.null_count() == column.len() {
        anyhow::bail!("Target column '{}' contains only null values", target);
    }

    if column.dtype().is_primitive_numeric() {
        let as_float = column.cast(&DataType::Float64)?;
        let binary = as_float
            .f64()?
            .into_iter()
            .flatten()
            .all(|v| v.abs() < TOLERANCE || (v - 1.0).abs() < TOLERANCE);
        if binary {
            return Ok(TargetAnalysis::AlreadyBinary);
        }
    }

    let unique_values: Vec<String> = column_as_strings(column)?
        .into_iter()
        .flatten()
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect();

    Ok(TargetAnalysis::NeedsMapping { unique_values })
}

/// Encode the label column as 0/1.
///
/// Without a mapping the column must already be binary. With a mapping every
/// value must equal either the event or the non-event value. Nulls are
/// always rejected.
pub fn encode_target(
    df: &DataFrame,
    target: &str,
    mapping: Option<&TargetMapping>,
) -> Result<Vec<u8>> {
    let column = df
        .column(target)
        .with_context(|| format!("Target column '{}' not found", target))?;

    if let Some(row) = first_null(column) {
        anyhow::bail!("Target column '{}' has a missing value at row {}", target, row);
    }

    match mapping {
        Some(mapping) => column_as_strings(column)?
            .into_iter()
            .enumerate()
            .map(|(row, value)| match value.as_deref() {
                Some(v) if v == mapping.event_value => Ok(1),
                Some(v) if v == mapping.non_event_value => Ok(0),
                other => anyhow::bail!(
                    "Target column '{}' has value '{}' at row {}, which is neither the event value '{}' nor the non-event value '{}'",
                    target,
                    other.unwrap_or_default(),
                    row,
                    mapping.event_value,
                    mapping.non_event_value
                ),
            })
            .collect(),
        None => match analyze_target_column(df, target)? {
            TargetAnalysis::AlreadyBinary => {
                let as_float = column.cast(&DataType::Float64)?;
                Ok(as_float
                    .f64()?
                    .into_iter()
                    .map(|v| u8::from(v.is_some_and(|v| (v - 1.0).abs() < TOLERANCE)))
                    .collect())
            }
            TargetAnalysis::NeedsMapping { unique_values } => anyhow::bail!(
                "Target column '{}' is not binary (values: {}). Provide --event-value and --non-event-value",
                target,
                unique_values.join(", ")
            ),
        },
    }
}

fn first_null(column: &Column) -> Option<usize> {
    if column.null_count() == 0 {
        return None;
    }
    let nulls = column.as_materialized_series().is_null();
    let first = nulls.into_iter().position(|v| v == Some(true));
    first
}

/// Render each value as the string a user would type for it
fn column_as_strings(column: &Column) -> Result<Vec<Option<String>>> {
    let values = match column.dtype() {
        DataType::String => column
            .str()?
            .into_iter()
            .map(|v| v.map(str::to_string))
            .collect(),
        DataType::Boolean => column
            .bool()?
            .into_iter()
            .map(|v| v.map(|b| b.to_string()))
            .collect(),
        dtype if dtype.is_integer() => column
            .cast(&DataType::Int64)?
            .i64()?
            .into_iter()
            .map(|v| v.map(|n| n.to_string()))
            .collect(),
        dtype if dtype.is_float() => column
            .cast(&DataType::Float64)?
            .f64()?
            .into_iter()
            .map(|v| v.map(|n| n.to_string()))
            .collect(),
        _ => column
            .cast(&DataType::String)?
            .str()?
            .into_iter()
            .map(|v| v.map(str::to_string))
            .collect(),
    };
    Ok(values)
}
