//! Pipeline coordinator: decides stage order and threads data between stages

use std::fmt;
use std::time::{Duration, Instant};

use serde::Serialize;
use tracing::{debug, info};

use super::cancel::CancelFlag;
use super::error::PrepResult;
use super::smote::BalanceStats;
use super::stages::{Balancer, Selector};
use super::table::FeatureTable;
use crate::config::{BalanceMethod, PipelineConfig, SelectionMethod};
use crate::report::SelectionReport;

/// One of the two processing stages
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum StageKind {
    Balancing,
    Selection,
}

impl fmt::Display for StageKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StageKind::Balancing => write!(f, "Data Balancing"),
            StageKind::Selection => write!(f, "Feature Selection"),
        }
    }
}

/// Wall-clock time spent in one stage
#[derive(Debug, Clone, Copy, Serialize)]
pub struct StageTiming {
    pub stage: StageKind,
    pub duration: Duration,
}

/// Everything a run produces
#[derive(Debug, Clone)]
pub struct ProcessedResult {
    pub table: FeatureTable,
    /// Feature names of `table`, in column order
    pub feature_names: Vec<String>,
    /// Row count before any stage ran
    pub original_count: usize,
    /// Row count after balancing (equal to `original_count` when disabled)
    pub balanced_count: usize,
    pub selection_report: SelectionReport,
    pub balance_stats: Option<BalanceStats>,
    pub balancing_method: BalanceMethod,
    pub selection_method: SelectionMethod,
    pub balancing_order: i32,
    pub selection_order: i32,
    /// Stages in the order they ran
    pub stage_order: [StageKind; 2],
    pub timings: Vec<StageTiming>,
}

impl ProcessedResult {
    pub fn feature_count(&self) -> usize {
        self.feature_names.len()
    }
}

/// Runs balancing and selection in configured order.
///
/// Strategies are resolved once in [`PipelineCoordinator::new`]; a coordinator
/// can then run any number of tables.
#[derive(Debug, Clone)]
pub struct PipelineCoordinator {
    config: PipelineConfig,
    balancer: Balancer,
    selector: Selector,
    cancel: CancelFlag,
}

impl PipelineCoordinator {
    /// Validate every enabled stage and resolve its strategy.
    pub fn new(config: PipelineConfig) -> PrepResult<Self> {
        config.validate()?;
        let balancer = Balancer::from_config(&config.data_balancing, config.seed)?;
        let selector = Selector::from_config(&config.feature_engineering)?;

        Ok(Self {
            config,
            balancer,
            selector,
            cancel: CancelFlag::new(),
        })
    }

    /// Use `cancel` for every subsequent run
    pub fn with_cancel_flag(mut self, cancel: CancelFlag) -> Self {
        self.cancel = cancel;
        self
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// Balancing runs first when its order is less than or equal to the
    /// selection order.
    pub fn stage_order(&self) -> [StageKind; 2] {
        if self.config.data_balancing.execution_order
            <= self.config.feature_engineering.execution_order
        {
            [StageKind::Balancing, StageKind::Selection]
        } else {
            [StageKind::Selection, StageKind::Balancing]
        }
    }

    /// Run both stages over `table`.
    ///
    /// The second stage receives the first stage's table and feature list.
    /// Errors from either stage are returned unchanged.
    pub fn run(&self, table: FeatureTable) -> PrepResult<ProcessedResult> {
        let stage_order = self.stage_order();
        let original_count = table.len();
        debug!(?stage_order, rows = original_count, "Starting pipeline");

        self.cancel.check()?;

        let mut feature_names = table.feature_names().to_vec();
        let mut table = table;
        let mut balanced_count = original_count;
        let mut balance_stats = None;
        let mut selection_report = None;
        let mut timings = Vec::with_capacity(2);

        for stage in stage_order {
            let enabled = match stage {
                StageKind::Balancing => self.balancer.is_enabled(),
                StageKind::Selection => self.selector.is_enabled(),
            };
            if !enabled {
                debug!(%stage, "Stage disabled, passing table through");
            }

            let start = Instant::now();
            match stage {
                StageKind::Balancing => {
                    let (next, names, stats) =
                        self.balancer.apply(table, feature_names, &self.cancel)?;
                    balanced_count = next.len();
                    balance_stats = stats;
                    table = next;
                    feature_names = names;
                }
                StageKind::Selection => {
                    let (next, names, report) =
                        self.selector.apply(table, feature_names, &self.cancel)?;
                    selection_report = Some(report);
                    table = next;
                    feature_names = names;
                }
            }
            let duration = start.elapsed();
            debug!(%stage, elapsed_ms = duration.as_millis() as u64, "Stage finished");
            timings.push(StageTiming { stage, duration });
        }

        let selection_report =
            selection_report.unwrap_or_else(|| SelectionReport::disabled(&feature_names));

        info!(
            original_count,
            balanced_count,
            final_rows = table.len(),
            features = feature_names.len(),
            "Pipeline complete"
        );

        Ok(ProcessedResult {
            table,
            feature_names,
            original_count,
            balanced_count,
            selection_report,
            balance_stats,
            balancing_method: self.config.data_balancing.method,
            selection_method: self.config.feature_engineering.method,
            balancing_order: self.config.data_balancing.execution_order,
            selection_order: self.config.feature_engineering.execution_order,
            stage_order,
            timings,
        })
    }
}
