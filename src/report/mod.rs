//! Report module: selection report, terminal summary and JSON export

pub mod run_report;
pub mod selection_report;
pub mod summary;

pub use run_report::*;
pub use selection_report::*;
pub use summary::*;
