//! In-memory feature table shared by the balancer and the selector

use serde::Serialize;

use super::error::{PrepError, PrepResult};

/// A single row: one value per feature plus a binary label (0 or 1)
#[derive(Debug, Clone, PartialEq)]
pub struct FeatureVector {
    pub features: Vec<f64>,
    pub label: u8,
}

impl FeatureVector {
    pub fn new(features: Vec<f64>, label: u8) -> Self {
        Self { features, label }
    }
}

/// Row counts per label value
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ClassCounts {
    pub zeros: usize,
    pub ones: usize,
}

impl ClassCounts {
    pub fn total(&self) -> usize {
        self.zeros + self.ones
    }
}

/// Rows with positional correspondence to an ordered feature-name list.
///
/// Index `i` of every row's feature vector holds the value of
/// `feature_names[i]`. The constructor enforces this, so every table a stage
/// receives is well formed.
#[derive(Debug, Clone, PartialEq)]
pub struct FeatureTable {
    feature_names: Vec<String>,
    rows: Vec<FeatureVector>,
}

impl FeatureTable {
    /// Build a table, rejecting rows whose length differs from the name list
    /// and labels other than 0 or 1.
    pub fn new(feature_names: Vec<String>, rows: Vec<FeatureVector>) -> PrepResult<Self> {
        let expected = feature_names.len();
        for (row, vector) in rows.iter().enumerate() {
            if vector.features.len() != expected {
                return Err(PrepError::FeatureLengthMismatch {
                    row,
                    expected,
                    actual: vector.features.len(),
                });
            }
            if vector.label > 1 {
                return Err(PrepError::InvalidLabel {
                    row,
                    label: vector.label,
                });
            }
        }

        Ok(Self {
            feature_names,
            rows,
        })
    }

    /// Build a table from column-major data.
    ///
    /// `columns[j]` holds every row's value for `feature_names[j]`.
    pub fn from_columns(
        feature_names: Vec<String>,
        columns: &[Vec<f64>],
        labels: &[u8],
    ) -> PrepResult<Self> {
        if columns.len() != feature_names.len() {
            return Err(PrepError::FeatureLengthMismatch {
                row: 0,
                expected: feature_names.len(),
                actual: columns.len(),
            });
        }

        let mut rows = Vec::with_capacity(labels.len());
        for (row, &label) in labels.iter().enumerate() {
            let mut features = Vec::with_capacity(columns.len());
            for column in columns {
                match column.get(row) {
                    Some(&value) => features.push(value),
                    None => {
                        return Err(PrepError::FeatureLengthMismatch {
                            row,
                            expected: feature_names.len(),
                            actual: features.len(),
                        })
                    }
                }
            }
            rows.push(FeatureVector::new(features, label));
        }

        Self::new(feature_names, rows)
    }

    pub fn feature_names(&self) -> &[String] {
        &self.feature_names
    }

    pub fn rows(&self) -> &[FeatureVector] {
        &self.rows
    }

    /// Number of rows
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn n_features(&self) -> usize {
        self.feature_names.len()
    }

    /// Position of a feature in the name list
    pub fn feature_index(&self, name: &str) -> Option<usize> {
        self.feature_names.iter().position(|n| n == name)
    }

    /// Copy out one feature column
    pub fn column(&self, index: usize) -> Vec<f64> {
        self.rows.iter().map(|r| r.features[index]).collect()
    }

    /// Labels as floating point, for correlation against feature columns
    pub fn labels_f64(&self) -> Vec<f64> {
        self.rows.iter().map(|r| f64::from(r.label)).collect()
    }

    pub fn class_counts(&self) -> ClassCounts {
        let ones = self.rows.iter().filter(|r| r.label == 1).count();
        ClassCounts {
            zeros: self.rows.len() - ones,
            ones,
        }
    }

    /// Check that a stage's feature-name list is exactly this table's list.
    pub fn ensure_feature_names(&self, names: &[String]) -> PrepResult<()> {
        if self.feature_names.as_slice() == names {
            Ok(())
        } else {
            Err(PrepError::FeatureNameMismatch {
                table: self.feature_names.clone(),
                given: names.to_vec(),
            })
        }
    }

    /// New table restricted to the given feature positions, in the given order.
    /// Labels are carried through unchanged.
    pub fn project(&self, indices: &[usize]) -> FeatureTable {
        let feature_names = indices
            .iter()
            .map(|&i| self.feature_names[i].clone())
            .collect();
        let rows = self
            .rows
            .iter()
            .map(|r| FeatureVector::new(indices.iter().map(|&i| r.features[i]).collect(), r.label))
            .collect();

        FeatureTable {
            feature_names,
            rows,
        }
    }
}
