//! Correlation-based feature selection
//!
//! Candidates are ranked by absolute Pearson correlation with the label and
//! then admitted greedily, skipping any candidate that is too correlated with
//! a feature already selected. The pairwise matrix is computed once per run,
//! either cell by cell in parallel or as a single matrix product for wide
//! tables.

use std::cmp::Ordering;
use std::collections::HashSet;

use faer::Mat;
use rayon::prelude::*;
use tracing::{debug, info, warn};

use super::cancel::CancelFlag;
use super::error::{PrepError, PrepResult};
use super::table::FeatureTable;
use crate::config::{SelectionConfig, SelectionMethod};
use crate::report::{PrunedFeature, RankedFeature, SelectionReport};

/// Whether a NaN pairwise correlation (a zero-variance feature) counts as
/// exceeding the multicollinearity threshold.
pub const NAN_CORRELATION_BLOCKS: bool = false;

/// Candidate count at which the matrix product replaces pairwise computation
pub const MATRIX_METHOD_COLUMN_THRESHOLD: usize = 15;

/// How the pairwise correlation matrix is computed
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum CorrelationMethod {
    /// One Welford pass per column pair, pairs spread over the rayon pool
    Pairwise,
    /// Standardize every column once and compute `ZᵀZ` with faer
    Matrix,
    /// Matrix at or above [`MATRIX_METHOD_COLUMN_THRESHOLD`] candidates, pairwise below
    #[default]
    Auto,
}

impl CorrelationMethod {
    /// Concrete method for `n_columns` candidates
    pub fn resolve(self, n_columns: usize) -> CorrelationMethod {
        match self {
            CorrelationMethod::Auto if n_columns >= MATRIX_METHOD_COLUMN_THRESHOLD => {
                CorrelationMethod::Matrix
            }
            CorrelationMethod::Auto => CorrelationMethod::Pairwise,
            other => other,
        }
    }
}

impl std::fmt::Display for CorrelationMethod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CorrelationMethod::Pairwise => write!(f, "pairwise"),
            CorrelationMethod::Matrix => write!(f, "matrix"),
            CorrelationMethod::Auto => write!(f, "auto"),
        }
    }
}

/// Symmetric matrix of absolute pairwise correlations.
///
/// The diagonal is 1.0 for columns with variance and NaN for constant
/// columns; every cell involving a constant column is NaN.
#[derive(Debug, Clone)]
pub struct CorrelationMatrix {
    size: usize,
    values: Vec<f64>,
}

impl CorrelationMatrix {
    fn filled(size: usize) -> Self {
        Self {
            size,
            values: vec![f64::NAN; size * size],
        }
    }

    fn set_pair(&mut self, i: usize, j: usize, value: f64) {
        self.values[i * self.size + j] = value;
        self.values[j * self.size + i] = value;
    }

    #[inline]
    pub fn get(&self, i: usize, j: usize) -> f64 {
        self.values[i * self.size + j]
    }

    pub fn size(&self) -> usize {
        self.size
    }
}

/// Pearson correlation of two equally long series, clamped to [-1, 1].
///
/// Single-pass Welford accumulation. Returns NaN for empty input, mismatched
/// lengths, or when either series has zero variance.
pub fn pearson_correlation(x: &[f64], y: &[f64]) -> f64 {
    if x.is_empty() || x.len() != y.len() {
        return f64::NAN;
    }

    let mut n = 0.0;
    let mut mean_x = 0.0;
    let mut mean_y = 0.0;
    let mut var_x = 0.0;
    let mut var_y = 0.0;
    let mut cov_xy = 0.0;

    for (&xi, &yi) in x.iter().zip(y) {
        n += 1.0;
        let dx = xi - mean_x;
        let dy = yi - mean_y;
        mean_x += dx / n;
        mean_y += dy / n;
        var_x += dx * (xi - mean_x);
        var_y += dy * (yi - mean_y);
        cov_xy += dx * (yi - mean_y);
    }

    if var_x <= 0.0 || var_y <= 0.0 {
        return f64::NAN;
    }

    (cov_xy / (var_x.sqrt() * var_y.sqrt())).clamp(-1.0, 1.0)
}

/// True when at least one value differs from the first
pub fn has_variance(values: &[f64]) -> bool {
    match values.first() {
        Some(&first) => values.iter().any(|&v| v != first),
        None => false,
    }
}

/// Whether an absolute pairwise correlation rules out admitting a candidate
pub fn is_redundant(correlation: f64, threshold: f64) -> bool {
    if correlation.is_nan() {
        NAN_CORRELATION_BLOCKS
    } else {
        correlation > threshold
    }
}

/// Absolute pairwise correlation matrix over `columns`.
///
/// Only the upper triangle is computed; each cell is mirrored onto the lower
/// triangle. `cancel` is checked between pairs (pairwise) or before the
/// product (matrix).
pub fn compute_correlation_matrix(
    columns: &[Vec<f64>],
    method: CorrelationMethod,
    cancel: &CancelFlag,
) -> PrepResult<CorrelationMatrix> {
    let n = columns.len();
    let varying: Vec<bool> = columns.iter().map(|c| has_variance(c)).collect();

    let resolved = method.resolve(n);
    debug!(columns = n, method = %resolved, "Computing correlation matrix");

    let mut matrix = match resolved {
        CorrelationMethod::Matrix => matrix_correlations(columns, &varying, cancel)?,
        _ => pairwise_correlations(columns, cancel)?,
    };

    for (i, &has_var) in varying.iter().enumerate() {
        matrix.values[i * n + i] = if has_var { 1.0 } else { f64::NAN };
    }

    Ok(matrix)
}

fn pairwise_correlations(columns: &[Vec<f64>], cancel: &CancelFlag) -> PrepResult<CorrelationMatrix> {
    let n = columns.len();
    let pairs: Vec<(usize, usize)> = (0..n)
        .flat_map(|i| ((i + 1)..n).map(move |j| (i, j)))
        .collect();

    let cells: Vec<f64> = pairs
        .par_iter()
        .map(|&(i, j)| -> PrepResult<f64> {
            cancel.check()?;
            Ok(pearson_correlation(&columns[i], &columns[j]).abs())
        })
        .collect::<PrepResult<_>>()?;

    let mut matrix = CorrelationMatrix::filled(n);
    for (&(i, j), &value) in pairs.iter().zip(&cells) {
        matrix.set_pair(i, j, value);
    }
    Ok(matrix)
}

/// Correlations via `R = ZᵀZ`, where each column of Z is standardized and
/// scaled by `1/√n`. Constant columns stay zero in Z and read back as NaN.
fn matrix_correlations(
    columns: &[Vec<f64>],
    varying: &[bool],
    cancel: &CancelFlag,
) -> PrepResult<CorrelationMatrix> {
    let n_cols = columns.len();
    let n_rows = columns.first().map_or(0, Vec::len);

    let standardized: Vec<Option<Vec<f64>>> = columns
        .par_iter()
        .zip(varying.par_iter())
        .map(|(column, &has_var)| {
            if !has_var {
                return None;
            }
            let count = column.len() as f64;
            let mean = column.iter().sum::<f64>() / count;
            let ss: f64 = column.iter().map(|v| (v - mean) * (v - mean)).sum();
            let scale = ss.sqrt();
            if scale <= 0.0 {
                return None;
            }
            Some(column.iter().map(|v| (v - mean) / scale).collect())
        })
        .collect();

    cancel.check()?;

    let mut z = Mat::<f64>::zeros(n_rows, n_cols);
    for (col_idx, values) in standardized.iter().enumerate() {
        if let Some(values) = values {
            for (row_idx, &v) in values.iter().enumerate() {
                z[(row_idx, col_idx)] = v;
            }
        }
    }

    let product = z.transpose() * &z;
    cancel.check()?;

    let mut matrix = CorrelationMatrix::filled(n_cols);
    for i in 0..n_cols {
        for j in (i + 1)..n_cols {
            let value = if standardized[i].is_some() && standardized[j].is_some() {
                product[(i, j)].clamp(-1.0, 1.0).abs()
            } else {
                f64::NAN
            };
            matrix.set_pair(i, j, value);
        }
    }
    Ok(matrix)
}

/// Descending by score, NaN last. Equal scores compare equal so a stable
/// sort keeps candidate order.
fn rank_order(a: f64, b: f64) -> Ordering {
    match (a.is_nan(), b.is_nan()) {
        (true, true) => Ordering::Equal,
        (true, false) => Ordering::Greater,
        (false, true) => Ordering::Less,
        (false, false) => b.total_cmp(&a),
    }
}

/// Selected table, names in selection order, and the run's report
#[derive(Debug, Clone)]
pub struct SelectionOutcome {
    pub table: FeatureTable,
    pub selected: Vec<String>,
    pub report: SelectionReport,
}

/// Greedy correlation-ranked selector with multicollinearity pruning
#[derive(Debug, Clone)]
pub struct CorrelationSelector {
    config: SelectionConfig,
    method: CorrelationMethod,
}

impl CorrelationSelector {
    /// Create a selector, rejecting `max_features == 0` and thresholds outside (0, 1].
    pub fn new(config: SelectionConfig) -> PrepResult<Self> {
        config.validate()?;
        Ok(Self {
            config,
            method: CorrelationMethod::Auto,
        })
    }

    /// Force a specific matrix computation method
    pub fn with_method(mut self, method: CorrelationMethod) -> Self {
        self.method = method;
        self
    }

    pub fn config(&self) -> &SelectionConfig {
        &self.config
    }

    pub fn select(&self, table: &FeatureTable, candidates: &[String]) -> PrepResult<SelectionOutcome> {
        self.select_with_cancel(table, candidates, &CancelFlag::new())
    }

    /// Select up to `max_features` of `candidates`.
    ///
    /// The input table is not modified. The returned table holds only the
    /// selected columns, in selection order, with labels unchanged.
    pub fn select_with_cancel(
        &self,
        table: &FeatureTable,
        candidates: &[String],
        cancel: &CancelFlag,
    ) -> PrepResult<SelectionOutcome> {
        let indices = resolve_candidates(table, candidates)?;

        let columns: Vec<Vec<f64>> = indices.iter().map(|&i| table.column(i)).collect();
        let labels = table.labels_f64();

        cancel.check()?;
        let scores: Vec<f64> = columns
            .par_iter()
            .map(|column| pearson_correlation(column, &labels).abs())
            .collect();

        for (name, score) in candidates.iter().zip(&scores) {
            if score.is_nan() {
                warn!(feature = %name, "Feature has zero variance, ranked last");
            }
        }

        let matrix = compute_correlation_matrix(&columns, self.method, cancel)?;

        let mut order: Vec<usize> = (0..candidates.len()).collect();
        order.sort_by(|&a, &b| rank_order(scores[a], scores[b]));

        let max_features = self.config.max_features;
        let threshold = self.config.multicollinearity_threshold;

        let mut chosen: Vec<usize> = Vec::with_capacity(max_features.min(order.len()));
        let mut pruned = Vec::new();
        let mut not_evaluated = Vec::new();

        for &candidate in &order {
            if chosen.len() >= max_features {
                not_evaluated.push(candidates[candidate].clone());
                continue;
            }

            let blocker = chosen
                .iter()
                .copied()
                .find(|&s| is_redundant(matrix.get(candidate, s), threshold));

            match blocker {
                Some(s) => {
                    debug!(
                        feature = %candidates[candidate],
                        blocked_by = %candidates[s],
                        correlation = matrix.get(candidate, s),
                        "Pruned for multicollinearity"
                    );
                    pruned.push(PrunedFeature {
                        name: candidates[candidate].clone(),
                        target_correlation: scores[candidate],
                        blocked_by: candidates[s].clone(),
                        pairwise_correlation: matrix.get(candidate, s),
                    });
                }
                None => chosen.push(candidate),
            }
        }

        let ranked = |i: usize| RankedFeature {
            name: candidates[i].clone(),
            target_correlation: scores[i],
        };

        let report = SelectionReport {
            method: SelectionMethod::Correlation,
            candidate_count: candidates.len(),
            ranking: order.iter().map(|&i| ranked(i)).collect(),
            selected: chosen.iter().map(|&i| ranked(i)).collect(),
            pruned,
            not_evaluated,
            max_features: Some(max_features),
            multicollinearity_threshold: Some(threshold),
        };

        let table_positions: Vec<usize> = chosen.iter().map(|&i| indices[i]).collect();
        let selected: Vec<String> = chosen.iter().map(|&i| candidates[i].clone()).collect();

        info!(
            candidates = candidates.len(),
            selected = selected.len(),
            pruned = report.pruned.len(),
            "Correlation selection complete"
        );

        Ok(SelectionOutcome {
            table: table.project(&table_positions),
            selected,
            report,
        })
    }
}

/// Map candidate names to table positions, rejecting empty, unknown and
/// repeated names.
fn resolve_candidates(table: &FeatureTable, candidates: &[String]) -> PrepResult<Vec<usize>> {
    if candidates.is_empty() {
        return Err(PrepError::NoCandidateFeatures);
    }

    let mut seen = HashSet::with_capacity(candidates.len());
    candidates
        .iter()
        .map(|name| {
            if !seen.insert(name.as_str()) {
                return Err(PrepError::DuplicateFeature(name.clone()));
            }
            table
                .feature_index(name)
                .ok_or_else(|| PrepError::UnknownFeature(name.clone()))
        })
        .collect()
}
