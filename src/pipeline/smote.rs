//! Synthetic minority oversampling (SMOTE) with majority undersampling
//!
//! The balancer works in two steps:
//! 1. The majority class is shrunk to `round(|majority| × undersampling_ratio)`
//!    rows, picked by a seeded Fisher–Yates shuffle of its indices.
//! 2. New minority rows are interpolated between each minority point and one of
//!    its k nearest minority neighbors until the minority reaches
//!    `round(undersampled × minority_to_majority_ratio)` rows.
//!
//! Minority and majority are decided by row count, not by label value.
//! Synthetic generation runs in parallel over minority points. Each point draws
//! from its own RNG stream derived from the run seed and the point's index, and
//! the number of samples each point produces is fixed before the parallel
//! phase, so output is identical regardless of thread scheduling.

use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use rayon::prelude::*;
use serde::Serialize;
use tracing::{debug, info};

use super::cancel::CancelFlag;
use super::error::{PrepError, PrepResult};
use super::table::{FeatureTable, FeatureVector};
use crate::config::BalancingConfig;

/// Multiplier used to spread per-point seeds across the u64 range
const POINT_SEED_MIX: u64 = 0x9E37_79B9_7F4A_7C15;

/// Class sizes before and after balancing
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct BalanceStats {
    pub minority_label: u8,
    pub majority_label: u8,
    pub original_minority: usize,
    pub original_majority: usize,
    pub undersampled_majority: usize,
    pub target_minority: usize,
    /// Number of interpolated rows added
    pub synthetic: usize,
}

impl BalanceStats {
    /// Minority rows in the balanced table (original plus synthetic)
    pub fn final_minority(&self) -> usize {
        self.original_minority + self.synthetic
    }

    pub fn final_total(&self) -> usize {
        self.undersampled_majority + self.final_minority()
    }
}

/// Balanced table together with the counts that produced it
#[derive(Debug, Clone)]
pub struct BalanceOutcome {
    pub table: FeatureTable,
    pub stats: BalanceStats,
}

/// SMOTE-style balancer
#[derive(Debug, Clone)]
pub struct SmoteBalancer {
    config: BalancingConfig,
    seed: u64,
}

impl SmoteBalancer {
    /// Create a balancer, rejecting out-of-range ratios and `k_neighbors < 1`.
    pub fn new(config: BalancingConfig, seed: u64) -> PrepResult<Self> {
        config.validate()?;
        Ok(Self { config, seed })
    }

    pub fn config(&self) -> &BalancingConfig {
        &self.config
    }

    /// Balance `table` without a cancellation hook
    pub fn balance(
        &self,
        table: &FeatureTable,
        feature_names: &[String],
    ) -> PrepResult<BalanceOutcome> {
        self.balance_with_cancel(table, feature_names, &CancelFlag::new())
    }

    /// Balance `table`, checking `cancel` before each minority point's work.
    ///
    /// `feature_names` must be the table's own feature list. The input table is
    /// left untouched and a new table is returned. Output rows are the kept
    /// majority rows, then the original minority rows, then synthetic rows.
    ///
    /// Every row keeps its class's own label. When label 0 is the minority,
    /// original and synthetic minority rows stay 0; they are not relabelled
    /// as 1.
    pub fn balance_with_cancel(
        &self,
        table: &FeatureTable,
        feature_names: &[String],
        cancel: &CancelFlag,
    ) -> PrepResult<BalanceOutcome> {
        table.ensure_feature_names(feature_names)?;

        let (ones, zeros): (Vec<&FeatureVector>, Vec<&FeatureVector>) =
            table.rows().iter().partition(|r| r.label == 1);

        // Ties go to label 1 as the minority
        let (minority, majority, minority_label, majority_label) = if ones.len() <= zeros.len() {
            (ones, zeros, 1u8, 0u8)
        } else {
            (zeros, ones, 0u8, 1u8)
        };

        if minority.is_empty() {
            return Err(PrepError::EmptyMinorityClass);
        }

        let mut rng = StdRng::seed_from_u64(self.seed);
        let kept_majority = undersample(majority.len(), self.config.undersampling_ratio, &mut rng);

        let target_minority =
            scaled_count(kept_majority.len(), self.config.minority_to_majority_ratio);
        let synthetic_count = target_minority.saturating_sub(minority.len());

        debug!(
            minority = minority.len(),
            majority = majority.len(),
            kept_majority = kept_majority.len(),
            target_minority,
            synthetic_count,
            "Computed balancing targets"
        );

        let minority_points: Vec<&[f64]> =
            minority.iter().map(|r| r.features.as_slice()).collect();
        let synthetic = self.generate_synthetic(&minority_points, synthetic_count, cancel)?;

        let mut rows =
            Vec::with_capacity(kept_majority.len() + minority.len() + synthetic.len());
        rows.extend(
            kept_majority
                .iter()
                .map(|&i| FeatureVector::new(majority[i].features.clone(), majority_label)),
        );
        rows.extend(
            minority
                .iter()
                .map(|r| FeatureVector::new(r.features.clone(), minority_label)),
        );
        rows.extend(
            synthetic
                .into_iter()
                .map(|features| FeatureVector::new(features, minority_label)),
        );

        let stats = BalanceStats {
            minority_label,
            majority_label,
            original_minority: minority.len(),
            original_majority: majority.len(),
            undersampled_majority: kept_majority.len(),
            target_minority,
            synthetic: synthetic_count,
        };

        info!(
            rows_in = table.len(),
            rows_out = rows.len(),
            synthetic = stats.synthetic,
            "SMOTE balancing complete"
        );

        let table = FeatureTable::new(table.feature_names().to_vec(), rows)?;
        Ok(BalanceOutcome { table, stats })
    }

    /// Interpolate `synthetic_count` new points, in minority order.
    fn generate_synthetic(
        &self,
        points: &[&[f64]],
        synthetic_count: usize,
        cancel: &CancelFlag,
    ) -> PrepResult<Vec<Vec<f64>>> {
        let quotas = per_point_quotas(points.len(), synthetic_count);
        let k = self.config.k_neighbors;

        let per_point: Vec<Vec<Vec<f64>>> = quotas
            .par_iter()
            .enumerate()
            .filter(|(_, quota)| **quota > 0)
            .map(|(index, &quota)| -> PrepResult<Vec<Vec<f64>>> {
                cancel.check()?;

                let neighbors = nearest_neighbors(points, index, k);
                let mut rng = StdRng::seed_from_u64(point_seed(self.seed, index));
                let origin = points[index];

                let samples = (0..quota)
                    .map(|_| {
                        // A lone minority point has no neighbors and is duplicated
                        let neighbor = neighbors
                            .choose(&mut rng)
                            .map_or(origin, |&n| points[n]);
                        let ratio: f64 = rng.gen();
                        interpolate(origin, neighbor, ratio)
                    })
                    .collect();
                Ok(samples)
            })
            .collect::<PrepResult<_>>()?;

        Ok(per_point.into_iter().flatten().collect())
    }
}

/// `round(count × ratio)`
fn scaled_count(count: usize, ratio: f64) -> usize {
    (count as f64 * ratio).round() as usize
}

/// Indices of the kept majority rows: a uniform random subset without
/// replacement, taken as a prefix of a Fisher–Yates permutation.
fn undersample(len: usize, ratio: f64, rng: &mut StdRng) -> Vec<usize> {
    let keep = scaled_count(len, ratio).min(len);
    let mut order: Vec<usize> = (0..len).collect();
    order.shuffle(rng);
    order.truncate(keep);
    order
}

/// Samples each minority point must produce.
///
/// Every point gets `ceil(total / points)` draws, in order, until the total is
/// exhausted; later points may get fewer or none.
fn per_point_quotas(points: usize, total: usize) -> Vec<usize> {
    if points == 0 || total == 0 {
        return vec![0; points];
    }
    let per_point = total.div_ceil(points);
    (0..points)
        .map(|i| total.saturating_sub(i * per_point).min(per_point))
        .collect()
}

fn point_seed(base: u64, index: usize) -> u64 {
    base ^ (index as u64 + 1).wrapping_mul(POINT_SEED_MIX)
}

fn squared_distance(a: &[f64], b: &[f64]) -> f64 {
    a.iter().zip(b).map(|(x, y)| (x - y) * (x - y)).sum()
}

/// The `k` points closest to `points[target]`, excluding itself.
///
/// Ordering is by Euclidean distance; the sort is stable so equal distances
/// keep input order. `k` larger than the number of other points returns all
/// of them.
fn nearest_neighbors(points: &[&[f64]], target: usize, k: usize) -> Vec<usize> {
    let origin = points[target];
    let mut distances: Vec<(usize, f64)> = points
        .iter()
        .enumerate()
        .filter(|(i, _)| *i != target)
        .map(|(i, p)| (i, squared_distance(origin, p)))
        .collect();

    distances.sort_by(|a, b| a.1.total_cmp(&b.1));
    distances.truncate(k);
    distances.into_iter().map(|(i, _)| i).collect()
}

/// `origin + ratio × (neighbor − origin)`, feature by feature
fn interpolate(origin: &[f64], neighbor: &[f64], ratio: f64) -> Vec<f64> {
    origin
        .iter()
        .zip(neighbor)
        .map(|(p, n)| p + ratio * (n - p))
        .collect()
}
