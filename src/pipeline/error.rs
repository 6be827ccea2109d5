//! Error types for the rebalancing and feature-selection engine.
//!
//! Every failure the engine can report is a `PrepError`. Variants fall into
//! three kinds (see [`ErrorKind`]): configuration problems caught before any
//! computation, structurally invalid input data, and cooperative cancellation.
//! Zero-variance features are not errors; they surface as NaN correlations and
//! are handled by the selector's ranking policy.

use thiserror::Error;

/// Broad classification of a [`PrepError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Out-of-range or missing configuration value
    Config,
    /// Structurally invalid input table or feature list
    Data,
    /// The run was cancelled through a `CancelFlag`
    Cancelled,
}

/// Errors raised by the balancer, the selector and the coordinator.
#[derive(Debug, Error)]
pub enum PrepError {
    /// A configuration value is outside its permitted range.
    #[error("Invalid configuration for '{field}': {message}")]
    InvalidConfig {
        /// Name of the offending setting
        field: &'static str,
        /// Human-readable description of the accepted range
        message: String,
    },

    /// The minority class has no rows, so neighbor search is undefined.
    #[error("Minority class is empty: cannot synthesize samples without minority rows")]
    EmptyMinorityClass,

    /// A row's feature vector does not match the declared feature list.
    #[error("Row {row} has {actual} feature values, expected {expected}")]
    FeatureLengthMismatch {
        /// Zero-based row index
        row: usize,
        /// Length of the feature-name list
        expected: usize,
        /// Length of the offending vector
        actual: usize,
    },

    /// The feature-name list passed to a stage differs from the table's own list.
    #[error("Feature list mismatch: table has {table:?}, stage was given {given:?}")]
    FeatureNameMismatch {
        table: Vec<String>,
        given: Vec<String>,
    },

    /// A label other than 0 or 1 was found.
    #[error("Row {row} has label {label}, expected 0 or 1")]
    InvalidLabel { row: usize, label: u8 },

    /// Feature selection was asked to choose from nothing.
    #[error("No candidate features supplied for selection")]
    NoCandidateFeatures,

    /// A candidate feature is not present in the table.
    #[error("Unknown feature '{0}'")]
    UnknownFeature(String),

    /// A candidate feature was listed more than once.
    #[error("Feature '{0}' is listed more than once")]
    DuplicateFeature(String),

    /// Processing stopped because cancellation was requested.
    #[error("Processing cancelled")]
    Cancelled,
}

impl PrepError {
    /// Shorthand for an [`PrepError::InvalidConfig`] error.
    pub fn config(field: &'static str, message: impl Into<String>) -> Self {
        PrepError::InvalidConfig {
            field,
            message: message.into(),
        }
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            PrepError::InvalidConfig { .. } => ErrorKind::Config,
            PrepError::Cancelled => ErrorKind::Cancelled,
            PrepError::EmptyMinorityClass
            | PrepError::FeatureLengthMismatch { .. }
            | PrepError::FeatureNameMismatch { .. }
            | PrepError::InvalidLabel { .. }
            | PrepError::NoCandidateFeatures
            | PrepError::UnknownFeature(_)
            | PrepError::DuplicateFeature(_) => ErrorKind::Data,
        }
    }
}

/// Result alias used throughout the engine
pub type PrepResult<T> = Result<T, PrepError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_config_display() {
        let err = PrepError::config("k_neighbors", "must be at least 1, got 0");
        assert_eq!(
            err.to_string(),
            "Invalid configuration for 'k_neighbors': must be at least 1, got 0"
        );
        assert_eq!(err.kind(), ErrorKind::Config);
    }

    #[test]
    fn test_length_mismatch_display() {
        let err = PrepError::FeatureLengthMismatch {
            row: 3,
            expected: 4,
            actual: 2,
        };
        assert_eq!(err.to_string(), "Row 3 has 2 feature values, expected 4");
        assert_eq!(err.kind(), ErrorKind::Data);
    }

    #[test]
    fn test_unknown_feature_display() {
        let err = PrepError::UnknownFeature("income".to_string());
        assert_eq!(err.to_string(), "Unknown feature 'income'");
    }

    #[test]
    fn test_data_error_kinds() {
        assert_eq!(PrepError::EmptyMinorityClass.kind(), ErrorKind::Data);
        assert_eq!(PrepError::NoCandidateFeatures.kind(), ErrorKind::Data);
        assert_eq!(
            PrepError::InvalidLabel { row: 0, label: 2 }.kind(),
            ErrorKind::Data
        );
    }

    #[test]
    fn test_cancelled_kind() {
        assert_eq!(PrepError::Cancelled.kind(), ErrorKind::Cancelled);
        assert_eq!(PrepError::Cancelled.to_string(), "Processing cancelled");
    }
}
