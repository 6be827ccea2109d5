//! Tests for dataset loading, conversion and saving

use polars::prelude::*;
use prepfit::pipeline::{
    analyze_target_column, dataframe_to_table, get_column_names, load_dataset, save_dataset,
    table_to_dataframe, DatasetStats, TargetAnalysis, TargetMapping,
};
use std::io::Write;
use tempfile::TempDir;

#[path = "common/mod.rs"]
mod common;

use common::*;

#[test]
fn test_load_csv_file() {
    let temp_dir = TempDir::new().unwrap();
    let csv_path = temp_dir.path().join("test.csv");

    let mut file = std::fs::File::create(&csv_path).unwrap();
    writeln!(file, "a,b,c").unwrap();
    writeln!(file, "1,2,3").unwrap();
    writeln!(file, "4,5,6").unwrap();
    drop(file);

    let df = load_dataset(&csv_path, 100).unwrap();
    let stats = DatasetStats::of(&df);

    assert_eq!(stats.rows, 2, "Should have 2 data rows");
    assert_eq!(stats.columns, 3, "Should have 3 columns");
    assert!(stats.memory_mb >= 0.0);
    assert_eq!(df.get_column_names(), &["a", "b", "c"]);
}

#[test]
fn test_load_parquet_file() {
    let mut df = create_imbalanced_dataframe(20, 5);
    let (_temp_dir, path) = create_temp_parquet(&mut df);

    let loaded = load_dataset(&path, 100).unwrap();
    assert_shape(&loaded, 25, 5);
}

#[test]
fn test_full_schema_scan() {
    let mut df = create_imbalanced_dataframe(30, 10);
    let (_temp_dir, path) = create_temp_csv(&mut df);

    let loaded = load_dataset(&path, 0).unwrap();
    assert_shape(&loaded, 40, 5);
}

#[test]
fn test_get_column_names() {
    let mut df = create_imbalanced_dataframe(5, 5);
    let (_temp_dir, path) = create_temp_csv(&mut df);

    let columns = get_column_names(&path).unwrap();
    assert_eq!(columns, names(&["id", "income", "age", "score", "label"]));
}

#[test]
fn test_unsupported_extension() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("data.xlsx");
    std::fs::write(&path, "a,b\n1,2\n").unwrap();

    let err = load_dataset(&path, 100).unwrap_err();
    assert!(err.to_string().contains("Unsupported file format"));
}

#[test]
fn test_missing_file() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("absent.csv");
    assert!(load_dataset(&path, 100).is_err());
}

#[test]
fn test_default_features_are_numeric_columns() {
    let df = create_imbalanced_dataframe(40, 10);
    let table = dataframe_to_table(&df, "label", None, None).unwrap();

    assert_eq!(table.feature_names(), names(&["income", "age", "score"]).as_slice());
    assert_eq!(table.len(), 50);

    let counts = table.class_counts();
    assert_eq!(counts.zeros, 40);
    assert_eq!(counts.ones, 10);
}

#[test]
fn test_explicit_features_keep_given_order() {
    let df = create_imbalanced_dataframe(10, 5);
    let features = names(&["score", "income"]);
    let table = dataframe_to_table(&df, "label", Some(&features), None).unwrap();

    assert_eq!(table.feature_names(), features.as_slice());
    let income: Vec<f64> = df
        .column("income")
        .unwrap()
        .f64()
        .unwrap()
        .into_no_null_iter()
        .collect();
    assert_eq!(table.column(1), income);
}

#[test]
fn test_unknown_feature_column() {
    let df = create_imbalanced_dataframe(10, 5);
    let features = names(&["income", "missing_col"]);

    let err = dataframe_to_table(&df, "label", Some(&features), None).unwrap_err();
    assert!(err.to_string().contains("missing_col"));
}

#[test]
fn test_text_feature_is_rejected() {
    let df = create_imbalanced_dataframe(10, 5);
    let features = names(&["id"]);

    let err = dataframe_to_table(&df, "label", Some(&features), None).unwrap_err();
    assert!(err.to_string().contains("'id'"));
}

#[test]
fn test_string_target_needs_mapping() {
    let df = df! {
        "x" => [1.0f64, 2.0, 3.0, 4.0],
        "outcome" => ["good", "bad", "good", "bad"],
    }
    .unwrap();

    match analyze_target_column(&df, "outcome").unwrap() {
        TargetAnalysis::NeedsMapping { unique_values } => {
            assert_eq!(unique_values, names(&["bad", "good"]));
        }
        other => panic!("expected NeedsMapping, got {:?}", other),
    }

    let err = dataframe_to_table(&df, "outcome", None, None).unwrap_err();
    assert!(err.to_string().contains("not binary"));

    let mapping = TargetMapping::new("bad", "good");
    let table = dataframe_to_table(&df, "outcome", None, Some(&mapping)).unwrap();
    let labels: Vec<u8> = table.rows().iter().map(|r| r.label).collect();
    assert_eq!(labels, vec![0, 1, 0, 1]);
}

#[test]
fn test_mapping_rejects_unlisted_value() {
    let df = df! {
        "x" => [1.0f64, 2.0, 3.0],
        "outcome" => ["yes", "no", "maybe"],
    }
    .unwrap();

    let mapping = TargetMapping::new("yes", "no");
    let err = dataframe_to_table(&df, "outcome", None, Some(&mapping)).unwrap_err();
    assert!(err.to_string().contains("maybe"));
}

#[test]
fn test_save_and_reload_csv() {
    let df = create_imbalanced_dataframe(30, 6);
    let table = dataframe_to_table(&df, "label", None, None).unwrap();

    let temp_dir = TempDir::new().unwrap();
    let out_path = temp_dir.path().join("out.csv");
    let mut out_df = table_to_dataframe(&table, "label").unwrap();
    save_dataset(&mut out_df, &out_path).unwrap();

    let reloaded = load_dataset(&out_path, 0).unwrap();
    assert_shape(&reloaded, 36, 4);

    let round_trip = dataframe_to_table(&reloaded, "label", None, None).unwrap();
    assert_eq!(round_trip.feature_names(), table.feature_names());
    assert_eq!(round_trip.class_counts(), table.class_counts());
}

#[test]
fn test_save_and_reload_parquet_is_exact() {
    let df = create_imbalanced_dataframe(15, 5);
    let table = dataframe_to_table(&df, "label", None, None).unwrap();

    let temp_dir = TempDir::new().unwrap();
    let out_path = temp_dir.path().join("out.parquet");
    let mut out_df = table_to_dataframe(&table, "label").unwrap();
    save_dataset(&mut out_df, &out_path).unwrap();

    let reloaded = load_dataset(&out_path, 100).unwrap();
    let round_trip = dataframe_to_table(&reloaded, "label", None, None).unwrap();
    assert_eq!(round_trip, table);
}

#[test]
fn test_missing_label_is_reported_with_its_row() {
    let df = df! {
        "x" => [1.0f64, 2.0, 3.0, 4.0],
        "outcome" => [Some("yes"), Some("no"), None, Some("yes")],
    }
    .unwrap();

    let mapping = TargetMapping::new("yes", "no");
    let err = dataframe_to_table(&df, "outcome", None, Some(&mapping)).unwrap_err();
    assert!(err.to_string().contains("missing value at row 2"));
}
