//! Shared test utilities and fixture generators

#![allow(dead_code)]

use polars::prelude::*;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::path::PathBuf;
use tempfile::TempDir;

use prepfit::config::{BalanceMethod, BalancingConfig, SelectionConfig, SelectionMethod};
use prepfit::pipeline::{FeatureTable, FeatureVector};

pub fn names(list: &[&str]) -> Vec<String> {
    list.iter().map(|s| s.to_string()).collect()
}

/// Random table with `majority` rows of `majority_label` first, then
/// `minority` rows of the other label. Minority rows are shifted so the
/// classes are separable.
pub fn imbalanced_table(
    majority: usize,
    minority: usize,
    n_features: usize,
    majority_label: u8,
    seed: u64,
) -> FeatureTable {
    let mut rng = StdRng::seed_from_u64(seed);
    let minority_label = 1 - majority_label;

    let mut rows = Vec::with_capacity(majority + minority);
    for _ in 0..majority {
        let features = (0..n_features).map(|_| rng.gen::<f64>() * 10.0).collect();
        rows.push(FeatureVector::new(features, majority_label));
    }
    for _ in 0..minority {
        let features = (0..n_features)
            .map(|_| 20.0 + rng.gen::<f64>() * 10.0)
            .collect();
        rows.push(FeatureVector::new(features, minority_label));
    }

    let feature_names = (0..n_features).map(|i| format!("f{}", i)).collect();
    FeatureTable::new(feature_names, rows).unwrap()
}

/// 90 label-0 rows and 10 label-1 rows with 3 features
pub fn ninety_ten_table() -> FeatureTable {
    imbalanced_table(90, 10, 3, 0, 7)
}

/// Labels shared by the small selection fixtures
pub const SELECTION_LABELS: [u8; 8] = [0, 0, 0, 0, 1, 1, 1, 1];

/// Five candidates where `c` is constant.
///
/// |r| with the label: a 0.970, b 0.632, d 0.040, e 0.0, c NaN.
/// Largest pairwise |r| among a, b, d, e is 0.649 (a/b).
pub fn ranked_with_constant_table() -> FeatureTable {
    FeatureTable::from_columns(
        names(&["a", "b", "c", "d", "e"]),
        &[
            vec![1.0, 2.0, 1.0, 2.0, 5.0, 6.0, 5.0, 6.0],
            vec![3.0, 1.0, 4.0, 1.0, 5.0, 9.0, 2.0, 6.0],
            vec![7.0; 8],
            vec![2.0, 7.0, 1.0, 8.0, 2.0, 8.0, 1.0, 8.0],
            vec![1.0, 0.0, 0.0, 1.0, 1.0, 0.0, 1.0, 0.0],
        ],
        &SELECTION_LABELS,
    )
    .unwrap()
}

/// `g` is a noisy copy of `a`: |r(a, g)| = 0.971.
///
/// |r| with the label: a 0.970, g 0.904, b 0.632; |r(a, b)| = 0.649,
/// |r(b, g)| = 0.665.
pub fn redundant_table() -> FeatureTable {
    FeatureTable::from_columns(
        names(&["b", "g", "a"]),
        &[
            vec![3.0, 1.0, 4.0, 1.0, 5.0, 9.0, 2.0, 6.0],
            vec![1.0, 2.0, 1.0, 3.0, 5.0, 6.0, 4.0, 6.0],
            vec![1.0, 2.0, 1.0, 2.0, 5.0, 6.0, 5.0, 6.0],
        ],
        &SELECTION_LABELS,
    )
    .unwrap()
}

/// Wide random table for comparing correlation methods
pub fn random_table(rows: usize, n_features: usize, seed: u64) -> FeatureTable {
    let mut rng = StdRng::seed_from_u64(seed);
    let columns: Vec<Vec<f64>> = (0..n_features)
        .map(|_| (0..rows).map(|_| rng.gen::<f64>()).collect())
        .collect();
    let labels: Vec<u8> = (0..rows).map(|_| rng.gen_range(0..2)).collect();
    let feature_names = (0..n_features).map(|i| format!("feature_{}", i)).collect();
    FeatureTable::from_columns(feature_names, &columns, &labels).unwrap()
}

pub fn smote_config(undersampling_ratio: f64, minority_ratio: f64, k: usize) -> BalancingConfig {
    BalancingConfig {
        method: BalanceMethod::Smote,
        undersampling_ratio,
        minority_to_majority_ratio: minority_ratio,
        k_neighbors: k,
        execution_order: 1,
    }
}

pub fn correlation_config(max_features: usize, threshold: f64) -> SelectionConfig {
    SelectionConfig {
        method: SelectionMethod::Correlation,
        max_features,
        multicollinearity_threshold: threshold,
        execution_order: 2,
    }
}

/// Imbalanced dataset with a string id column, three numeric features and a
/// 0/1 `label` column (`minority` ones at the end)
pub fn create_imbalanced_dataframe(majority: usize, minority: usize) -> DataFrame {
    let mut rng = StdRng::seed_from_u64(11);
    let rows = majority + minority;

    let ids: Vec<String> = (0..rows).map(|i| format!("id_{}", i)).collect();
    let income: Vec<f64> = (0..rows)
        .map(|i| {
            let base = if i < majority { 30.0 } else { 80.0 };
            base + rng.gen::<f64>() * 10.0
        })
        .collect();
    let age: Vec<f64> = (0..rows).map(|_| 20.0 + rng.gen::<f64>() * 40.0).collect();
    let score: Vec<i64> = (0..rows).map(|_| rng.gen_range(300..850)).collect();
    let label: Vec<i32> = (0..rows).map(|i| i32::from(i >= majority)).collect();

    df! {
        "id" => ids,
        "income" => income,
        "age" => age,
        "score" => score,
        "label" => label,
    }
    .unwrap()
}

/// Create a temporary directory with a test CSV file
pub fn create_temp_csv(df: &mut DataFrame) -> (TempDir, PathBuf) {
    let temp_dir = TempDir::new().unwrap();
    let csv_path = temp_dir.path().join("test_data.csv");

    let mut file = std::fs::File::create(&csv_path).unwrap();
    CsvWriter::new(&mut file).finish(df).unwrap();

    (temp_dir, csv_path)
}

/// Create a temporary directory with a test Parquet file
pub fn create_temp_parquet(df: &mut DataFrame) -> (TempDir, PathBuf) {
    let temp_dir = TempDir::new().unwrap();
    let parquet_path = temp_dir.path().join("test_data.parquet");

    let file = std::fs::File::create(&parquet_path).unwrap();
    ParquetWriter::new(file).finish(df).unwrap();

    (temp_dir, parquet_path)
}

/// Assert that a DataFrame has expected shape
pub fn assert_shape(df: &DataFrame, expected_rows: usize, expected_cols: usize) {
    let (rows, cols) = df.shape();
    assert_eq!(rows, expected_rows, "Row count mismatch: expected {}, got {}", expected_rows, rows);
    assert_eq!(cols, expected_cols, "Column count mismatch: expected {}, got {}", expected_cols, cols);
}

/// Squared distance from `point` to the segment [`a`, `b`]
pub fn distance_to_segment(point: &[f64], a: &[f64], b: &[f64]) -> f64 {
    let ab: Vec<f64> = a.iter().zip(b).map(|(x, y)| y - x).collect();
    let ap: Vec<f64> = a.iter().zip(point).map(|(x, p)| p - x).collect();
    let len_sq: f64 = ab.iter().map(|v| v * v).sum();
    let t = if len_sq == 0.0 {
        0.0
    } else {
        (ap.iter().zip(&ab).map(|(p, q)| p * q).sum::<f64>() / len_sq).clamp(0.0, 1.0)
    };
    a.iter()
        .zip(&ab)
        .zip(point)
        .map(|((x, d), p)| {
            let proj = x + t * d;
            (p - proj) * (p - proj)
        })
        .sum()
}
