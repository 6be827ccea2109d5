//! Integration tests for the pipeline coordinator

use prepfit::config::{BalanceMethod, PipelineConfig, SelectionMethod};
use prepfit::pipeline::{
    CancelFlag, ErrorKind, FeatureTable, FeatureVector, PipelineCoordinator, PrepError, StageKind,
};

#[path = "common/mod.rs"]
mod common;

use common::*;

fn full_config(balancing_order: i32, selection_order: i32) -> PipelineConfig {
    let mut data_balancing = smote_config(0.5, 1.0, 5);
    data_balancing.execution_order = balancing_order;
    let mut feature_engineering = correlation_config(2, 0.8);
    feature_engineering.execution_order = selection_order;

    PipelineConfig {
        data_balancing,
        feature_engineering,
        seed: 42,
    }
}

#[test]
fn test_balancing_first_by_default_order() {
    let coordinator = PipelineCoordinator::new(full_config(1, 2)).unwrap();
    assert_eq!(
        coordinator.stage_order(),
        [StageKind::Balancing, StageKind::Selection]
    );

    let result = coordinator.run(ninety_ten_table()).unwrap();
    assert_eq!(result.stage_order, [StageKind::Balancing, StageKind::Selection]);
    assert_eq!(result.original_count, 100);
    assert_eq!(result.balanced_count, 90);
    assert_eq!(result.table.len(), 90);
    assert_eq!(result.balance_stats.map(|s| s.synthetic), Some(35));
    assert_eq!(result.balancing_method, BalanceMethod::Smote);
    assert_eq!(result.selection_method, SelectionMethod::Correlation);
    assert_eq!(result.timings.len(), 2);
}

#[test]
fn test_selection_first_when_its_order_is_lower() {
    let coordinator = PipelineCoordinator::new(full_config(5, 1)).unwrap();
    let result = coordinator.run(ninety_ten_table()).unwrap();

    assert_eq!(result.stage_order, [StageKind::Selection, StageKind::Balancing]);
    assert_eq!(result.balancing_order, 5);
    assert_eq!(result.selection_order, 1);

    // Balancing saw only the selected features
    assert_eq!(
        result.feature_names,
        result.selection_report.selected_names()
    );
    assert_eq!(result.table.feature_names(), result.feature_names.as_slice());
    assert_eq!(result.balanced_count, 90);
    assert_eq!(result.selection_report.candidate_count, 3);
}

#[test]
fn test_equal_orders_run_balancing_first() {
    let coordinator = PipelineCoordinator::new(full_config(2, 2)).unwrap();
    let result = coordinator.run(ninety_ten_table()).unwrap();
    assert_eq!(result.stage_order[0], StageKind::Balancing);
}

#[test]
fn test_disabled_stages_pass_table_through() {
    let table = ninety_ten_table();
    let coordinator = PipelineCoordinator::new(PipelineConfig::default()).unwrap();

    let result = coordinator.run(table.clone()).unwrap();
    assert_eq!(result.table, table);
    assert_eq!(result.feature_names, table.feature_names().to_vec());
    assert_eq!(result.original_count, 100);
    assert_eq!(result.balanced_count, 100);
    assert!(result.balance_stats.is_none());
    assert!(result.selection_report.is_disabled());
    assert!(result
        .selection_report
        .to_string()
        .contains("Using all enabled features: 3"));
}

#[test]
fn test_only_selection_enabled_keeps_row_count() {
    let mut config = PipelineConfig::default();
    config.feature_engineering = correlation_config(4, 0.7);
    let table = ranked_with_constant_table();

    let result = PipelineCoordinator::new(config).unwrap().run(table).unwrap();
    assert_eq!(result.original_count, 8);
    assert_eq!(result.balanced_count, 8);
    assert_eq!(result.feature_names, names(&["a", "b", "d", "e"]));
}

#[test]
fn test_invalid_enabled_stage_fails_at_construction() {
    let mut config = full_config(1, 2);
    config.data_balancing.k_neighbors = 0;

    let err = PipelineCoordinator::new(config).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Config);
}

#[test]
fn test_invalid_disabled_stage_is_ignored() {
    let mut config = PipelineConfig::default();
    config.feature_engineering.max_features = 0;
    assert!(PipelineCoordinator::new(config).is_ok());
}

#[test]
fn test_stage_errors_propagate_unchanged() {
    let rows = (0..4).map(|i| FeatureVector::new(vec![i as f64], 0)).collect();
    let table = FeatureTable::new(names(&["x"]), rows).unwrap();

    let err = PipelineCoordinator::new(full_config(1, 2))
        .unwrap()
        .run(table)
        .unwrap_err();
    assert!(matches!(err, PrepError::EmptyMinorityClass));
}

#[test]
fn test_cancelled_coordinator() {
    let cancel = CancelFlag::new();
    let coordinator = PipelineCoordinator::new(full_config(1, 2))
        .unwrap()
        .with_cancel_flag(cancel.clone());
    cancel.cancel();

    let err = coordinator.run(ninety_ten_table()).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Cancelled);
}

#[test]
fn test_runs_are_deterministic_for_fixed_seed() {
    let coordinator = PipelineCoordinator::new(full_config(1, 2)).unwrap();
    let first = coordinator.run(ninety_ten_table()).unwrap();
    let second = coordinator.run(ninety_ten_table()).unwrap();

    assert_eq!(first.table, second.table);
    assert_eq!(
        first.selection_report.to_string(),
        second.selection_report.to_string()
    );
}
