//! surveycut - deterministic survey cut engine
//!
//! Validates analysis specifications against a question catalog, turns
//! filter expressions into row masks, and computes metrics per cut with
//! per-cut error isolation.

pub mod cli;
pub mod config;
pub mod dataset;
pub mod executor;
pub mod mask;
pub mod metrics;
pub mod observability;
pub mod schema;
pub mod validator;
