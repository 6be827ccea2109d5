//! prepfit: class balancing and feature selection for tabular training data
//!
//! The engine lives in [`pipeline`]: a SMOTE-style balancer, a
//! correlation-driven feature selector, and a coordinator that runs them in
//! configured order. [`config`] loads run settings, [`report`] renders results.

pub mod cli;
pub mod config;
pub mod pipeline;
pub mod report;
pub mod utils;
