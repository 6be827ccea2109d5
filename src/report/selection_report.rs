//! Feature selection report
//!
//! A `SelectionReport` is produced once per selection run and never changed
//! afterwards. It renders as plain text through `Display` and serializes into
//! the JSON run report.

use std::fmt;

use serde::Serialize;

use crate::config::SelectionMethod;

/// A feature with its absolute correlation to the label.
///
/// `target_correlation` is NaN for zero-variance features (serialized as null).
#[derive(Debug, Clone, Serialize)]
pub struct RankedFeature {
    pub name: String,
    pub target_correlation: f64,
}

/// A candidate rejected because it is too correlated with a selected feature
#[derive(Debug, Clone, Serialize)]
pub struct PrunedFeature {
    pub name: String,
    pub target_correlation: f64,
    /// Already-selected feature that blocked this candidate
    pub blocked_by: String,
    /// Absolute pairwise correlation with `blocked_by`
    pub pairwise_correlation: f64,
}

/// Outcome of one feature selection run
#[derive(Debug, Clone, Serialize)]
pub struct SelectionReport {
    pub method: SelectionMethod,
    pub candidate_count: usize,
    /// Every candidate, strongest target correlation first, NaN last
    pub ranking: Vec<RankedFeature>,
    /// Selected features in selection order
    pub selected: Vec<RankedFeature>,
    pub pruned: Vec<PrunedFeature>,
    /// Candidates never tested because `max_features` was already reached
    pub not_evaluated: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_features: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub multicollinearity_threshold: Option<f64>,
}

impl SelectionReport {
    /// Report for a run where selection was switched off: every feature is kept.
    pub fn disabled(features: &[String]) -> Self {
        let kept: Vec<RankedFeature> = features
            .iter()
            .map(|name| RankedFeature {
                name: name.clone(),
                target_correlation: f64::NAN,
            })
            .collect();

        Self {
            method: SelectionMethod::None,
            candidate_count: features.len(),
            ranking: Vec::new(),
            selected: kept,
            pruned: Vec::new(),
            not_evaluated: Vec::new(),
            max_features: None,
            multicollinearity_threshold: None,
        }
    }

    pub fn is_disabled(&self) -> bool {
        self.method == SelectionMethod::None
    }

    pub fn selected_names(&self) -> Vec<String> {
        self.selected.iter().map(|f| f.name.clone()).collect()
    }

    /// Candidates that did not make it into the selection for any reason
    pub fn dropped_count(&self) -> usize {
        self.candidate_count - self.selected.len()
    }
}

fn format_score(value: f64) -> String {
    if value.is_nan() {
        "NaN".to_string()
    } else {
        format!("{:.4}", value)
    }
}

impl fmt::Display for SelectionReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_disabled() {
            writeln!(f, "No Feature Selection Applied")?;
            writeln!(f, "{}", "-".repeat(40))?;
            writeln!(f, "Using all enabled features: {}", self.candidate_count)?;
            for feature in &self.selected {
                writeln!(f, "- {}", feature.name)?;
            }
            return Ok(());
        }

        writeln!(f, "Correlation-based Feature Selection Results:")?;
        writeln!(f, "{}", "-".repeat(46))?;
        writeln!(f)?;
        writeln!(f, "Features Ranked by Target Correlation:")?;
        for feature in &self.ranking {
            writeln!(
                f,
                "{:<40} | {}",
                feature.name,
                format_score(feature.target_correlation)
            )?;
        }

        writeln!(f)?;
        writeln!(f, "Selection Summary:")?;
        writeln!(f, "Original features: {}", self.candidate_count)?;
        writeln!(f, "Selected features: {}", self.selected.len())?;
        writeln!(f, "Pruned for multicollinearity: {}", self.pruned.len())?;
        writeln!(f, "Not evaluated (cap reached): {}", self.not_evaluated.len())?;
        if let Some(max) = self.max_features {
            writeln!(f, "Max features: {}", max)?;
        }
        if let Some(threshold) = self.multicollinearity_threshold {
            writeln!(f, "Multicollinearity threshold: {}", threshold)?;
        }

        writeln!(f)?;
        writeln!(f, "Selected Features:")?;
        for feature in &self.selected {
            writeln!(
                f,
                "- {} (correlation with target: {})",
                feature.name,
                format_score(feature.target_correlation)
            )?;
        }

        if !self.pruned.is_empty() {
            writeln!(f)?;
            writeln!(f, "Pruned Features:")?;
            for feature in &self.pruned {
                writeln!(
                    f,
                    "- {} (|r| = {} with {})",
                    feature.name,
                    format_score(feature.pairwise_correlation),
                    feature.blocked_by
                )?;
            }
        }

        if !self.not_evaluated.is_empty() {
            writeln!(f)?;
            writeln!(f, "Not Evaluated:")?;
            for name in &self.not_evaluated {
                writeln!(f, "- {}", name)?;
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_disabled_report_lists_all_features() {
        let features = vec!["a".to_string(), "b".to_string()];
        let report = SelectionReport::disabled(&features);

        assert!(report.is_disabled());
        assert_eq!(report.selected_names(), features);
        assert_eq!(report.dropped_count(), 0);

        let text = report.to_string();
        assert!(text.starts_with("No Feature Selection Applied"));
        assert!(text.contains("Using all enabled features: 2"));
        assert!(text.contains("- b"));
    }

    #[test]
    fn test_render_shows_nan_and_pruning() {
        let report = SelectionReport {
            method: SelectionMethod::Correlation,
            candidate_count: 3,
            ranking: vec![
                RankedFeature {
                    name: "a".to_string(),
                    target_correlation: 0.9,
                },
                RankedFeature {
                    name: "b".to_string(),
                    target_correlation: 0.85,
                },
                RankedFeature {
                    name: "c".to_string(),
                    target_correlation: f64::NAN,
                },
            ],
            selected: vec![RankedFeature {
                name: "a".to_string(),
                target_correlation: 0.9,
            }],
            pruned: vec![PrunedFeature {
                name: "b".to_string(),
                target_correlation: 0.85,
                blocked_by: "a".to_string(),
                pairwise_correlation: 0.99,
            }],
            not_evaluated: vec!["c".to_string()],
            max_features: Some(1),
            multicollinearity_threshold: Some(0.8),
        };

        let text = report.to_string();
        assert!(text.contains("Selected features: 1"));
        assert!(text.contains("| NaN"));
        assert!(text.contains("- b (|r| = 0.9900 with a)"));
        assert!(text.contains("Multicollinearity threshold: 0.8"));
        assert_eq!(report.dropped_count(), 2);
    }

    #[test]
    fn test_nan_serializes_as_null() {
        let feature = RankedFeature {
            name: "constant".to_string(),
            target_correlation: f64::NAN,
        };
        let json = serde_json::to_string(&feature).unwrap();
        assert_eq!(json, r#"{"name":"constant","target_correlation":null}"#);
    }
}
