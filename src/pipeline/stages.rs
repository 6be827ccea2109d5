//! Closed strategy enums for the two pipeline stages
//!
//! Each enum is resolved from configuration once, when the coordinator is
//! built. The `Disabled` variants hand their input back unchanged.

use super::cancel::CancelFlag;
use super::correlation::CorrelationSelector;
use super::error::PrepResult;
use super::smote::{BalanceStats, SmoteBalancer};
use super::table::FeatureTable;
use crate::config::{BalanceMethod, BalancingConfig, SelectionConfig, SelectionMethod};
use crate::report::SelectionReport;

/// Class balancing strategy
#[derive(Debug, Clone)]
pub enum Balancer {
    Disabled,
    Smote(SmoteBalancer),
}

impl Balancer {
    /// Resolve the configured method, validating its settings when enabled.
    pub fn from_config(config: &BalancingConfig, seed: u64) -> PrepResult<Self> {
        match config.method {
            BalanceMethod::None => Ok(Balancer::Disabled),
            BalanceMethod::Smote => Ok(Balancer::Smote(SmoteBalancer::new(config.clone(), seed)?)),
        }
    }

    pub fn is_enabled(&self) -> bool {
        !matches!(self, Balancer::Disabled)
    }

    /// Balance `table`. Returns the table and feature names to pass on, plus
    /// class statistics when balancing actually ran.
    pub fn apply(
        &self,
        table: FeatureTable,
        feature_names: Vec<String>,
        cancel: &CancelFlag,
    ) -> PrepResult<(FeatureTable, Vec<String>, Option<BalanceStats>)> {
        match self {
            Balancer::Disabled => Ok((table, feature_names, None)),
            Balancer::Smote(balancer) => {
                let outcome = balancer.balance_with_cancel(&table, &feature_names, cancel)?;
                Ok((outcome.table, feature_names, Some(outcome.stats)))
            }
        }
    }
}

/// Feature selection strategy
#[derive(Debug, Clone)]
pub enum Selector {
    Disabled,
    Correlation(CorrelationSelector),
}

impl Selector {
    pub fn from_config(config: &SelectionConfig) -> PrepResult<Self> {
        match config.method {
            SelectionMethod::None => Ok(Selector::Disabled),
            SelectionMethod::Correlation => {
                Ok(Selector::Correlation(CorrelationSelector::new(config.clone())?))
            }
        }
    }

    pub fn is_enabled(&self) -> bool {
        !matches!(self, Selector::Disabled)
    }

    /// Select from `feature_names`. Returns the narrowed table, the selected
    /// names and a fresh report.
    pub fn apply(
        &self,
        table: FeatureTable,
        feature_names: Vec<String>,
        cancel: &CancelFlag,
    ) -> PrepResult<(FeatureTable, Vec<String>, SelectionReport)> {
        match self {
            Selector::Disabled => {
                let report = SelectionReport::disabled(&feature_names);
                Ok((table, feature_names, report))
            }
            Selector::Correlation(selector) => {
                let outcome = selector.select_with_cancel(&table, &feature_names, cancel)?;
                Ok((outcome.table, outcome.selected, outcome.report))
            }
        }
    }
}
