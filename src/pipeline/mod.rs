//! Pipeline module: class balancing, feature selection and their coordinator

pub mod cancel;
pub mod coordinator;
pub mod correlation;
pub mod error;
pub mod loader;
pub mod smote;
pub mod stages;
pub mod table;
pub mod target;

pub use cancel::CancelFlag;
pub use coordinator::{PipelineCoordinator, ProcessedResult, StageKind, StageTiming};
pub use correlation::{
    compute_correlation_matrix, has_variance, is_redundant, pearson_correlation,
    CorrelationMatrix, CorrelationMethod, CorrelationSelector, SelectionOutcome,
    MATRIX_METHOD_COLUMN_THRESHOLD, NAN_CORRELATION_BLOCKS,
};
pub use error::{ErrorKind, PrepError, PrepResult};
pub use loader::*;
pub use smote::{BalanceOutcome, BalanceStats, SmoteBalancer};
pub use stages::{Balancer, Selector};
pub use table::{ClassCounts, FeatureTable, FeatureVector};
pub use target::*;
