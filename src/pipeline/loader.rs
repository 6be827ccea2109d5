//! Dataset input and output for CSV and Parquet files
//!
//! Converts between polars DataFrames and the engine's [`FeatureTable`].

use std::path::Path;

use anyhow::{Context, Result};
use polars::prelude::*;

use super::table::FeatureTable;
use super::target::{encode_target, TargetMapping};

/// Supported file formats, chosen by extension
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileFormat {
    Csv,
    Parquet,
}

impl FileFormat {
    pub fn from_path(path: &Path) -> Result<Self> {
        let extension = path
            .extension()
            .and_then(|e| e.to_str())
            .unwrap_or("")
            .to_lowercase();

        match extension.as_str() {
            "csv" => Ok(FileFormat::Csv),
            "parquet" => Ok(FileFormat::Parquet),
            _ => anyhow::bail!(
                "Unsupported file format: '{}'. Supported formats: csv, parquet",
                extension
            ),
        }
    }
}

/// Shape and approximate memory footprint of a loaded dataset
#[derive(Debug, Clone, Copy)]
pub struct DatasetStats {
    pub rows: usize,
    pub columns: usize,
    pub memory_mb: f64,
}

impl DatasetStats {
    pub fn of(df: &DataFrame) -> Self {
        let (rows, columns) = df.shape();
        Self {
            rows,
            columns,
            memory_mb: df.estimated_size() as f64 / (1024.0 * 1024.0),
        }
    }
}

fn scan(path: &Path, infer_schema_length: usize) -> Result<LazyFrame> {
    let lf = match FileFormat::from_path(path)? {
        FileFormat::Csv => {
            // 0 means scan the whole file
            let schema_length = (infer_schema_length > 0).then_some(infer_schema_length);
            LazyCsvReader::new(path)
                .with_infer_schema_length(schema_length)
                .finish()
                .with_context(|| format!("Failed to load CSV file: {}", path.display()))?
        }
        FileFormat::Parquet => LazyFrame::scan_parquet(path, Default::default())
            .with_context(|| format!("Failed to load Parquet file: {}", path.display()))?,
    };
    Ok(lf)
}

/// Read a CSV or Parquet file into memory
pub fn load_dataset(path: &Path, infer_schema_length: usize) -> Result<DataFrame> {
    scan(path, infer_schema_length)?
        .collect()
        .with_context(|| format!("Failed to read dataset: {}", path.display()))
}

/// Column names from the file schema, without reading any rows
pub fn get_column_names(path: &Path) -> Result<Vec<String>> {
    let schema = scan(path, 100)?
        .collect_schema()
        .with_context(|| format!("Failed to read schema: {}", path.display()))?;
    Ok(schema.iter_names().map(|name| name.to_string()).collect())
}

/// Numeric columns other than `target`, in file order
pub fn numeric_feature_columns(df: &DataFrame, target: &str) -> Vec<String> {
    df.get_columns()
        .iter()
        .filter(|col| col.dtype().is_primitive_numeric() && col.name().as_str() != target)
        .map(|col| col.name().to_string())
        .collect()
}

/// Build a [`FeatureTable`] from a DataFrame.
///
/// `features` defaults to every numeric column except the target. Each feature
/// is cast to `f64`; a null (including a value that could not be parsed as a
/// number) is an error naming the column.
pub fn dataframe_to_table(
    df: &DataFrame,
    target: &str,
    features: Option<&[String]>,
    mapping: Option<&TargetMapping>,
) -> Result<FeatureTable> {
    let feature_names = match features {
        Some(list) => {
            if let Some(name) = list.iter().find(|name| name.as_str() == target) {
                anyhow::bail!("Target column '{}' cannot also be a feature", name);
            }
            list.to_vec()
        }
        None => numeric_feature_columns(df, target),
    };

    if feature_names.is_empty() {
        anyhow::bail!("No feature columns found besides target '{}'", target);
    }

    let labels = encode_target(df, target, mapping)?;

    let columns = feature_names
        .iter()
        .map(|name| feature_values(df, name))
        .collect::<Result<Vec<_>>>()?;

    let table = FeatureTable::from_columns(feature_names, &columns, &labels)?;
    Ok(table)
}

fn feature_values(df: &DataFrame, name: &str) -> Result<Vec<f64>> {
    let column = df
        .column(name)
        .with_context(|| format!("Feature column '{}' not found", name))?
        .cast(&DataType::Float64)
        .with_context(|| format!("Feature column '{}' is not numeric", name))?;

    let values = column.f64()?;
    if values.null_count() > 0 {
        anyhow::bail!(
            "Feature column '{}' has {} missing or non-numeric value(s)",
            name,
            values.null_count()
        );
    }
    Ok(values.into_no_null_iter().collect())
}

/// Convert a table back to a DataFrame: one `f64` column per feature, then the
/// label as an integer column named `target`.
pub fn table_to_dataframe(table: &FeatureTable, target: &str) -> Result<DataFrame> {
    let mut columns: Vec<Column> = table
        .feature_names()
        .iter()
        .enumerate()
        .map(|(i, name)| Column::new(name.as_str().into(), table.column(i)))
        .collect();

    let labels: Vec<i32> = table.rows().iter().map(|r| i32::from(r.label)).collect();
    columns.push(Column::new(target.into(), labels));

    DataFrame::new(columns).context("Failed to build output DataFrame")
}

/// Write a DataFrame as CSV or Parquet, chosen by extension
pub fn save_dataset(df: &mut DataFrame, path: &Path) -> Result<()> {
    let format = FileFormat::from_path(path)?;
    let file = std::fs::File::create(path)
        .with_context(|| format!("Failed to create output file: {}", path.display()))?;

    match format {
        FileFormat::Csv => {
            let mut file = file;
            CsvWriter::new(&mut file)
                .finish(df)
                .with_context(|| format!("Failed to write CSV file: {}", path.display()))?;
        }
        FileFormat::Parquet => {
            ParquetWriter::new(file)
                .finish(df)
                .with_context(|| format!("Failed to write Parquet file: {}", path.display()))?;
        }
    }

    Ok(())
}
