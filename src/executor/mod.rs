//! Cut executor subsystem
//!
//! Turns validated cut specs into result tables.
//!
//! # Execution Flow (strict order)
//!
//! 1. Validate every segment; materialize masks for the valid ones
//! 2. Per cut: validate against the materialized segments
//! 3. Build the filter mask
//! 4. Split by the first dimension (question values or segment / Not_segment)
//! 5. Compute the metric per group
//! 6. Annotate base-size warnings
//!
//! # Invariants
//!
//! - The dataset is never mutated
//! - A failing cut becomes an error entry; the batch continues
//! - Tables and errors keep input order

mod base_size;
mod errors;
#[allow(clippy::module_inception)]
mod executor;
mod result;

pub use base_size::BaseSizePolicy;
pub use errors::{CutError, ExecutionError, ExecutionOutcome};
pub use executor::{execute_cuts, CutExecutor, SegmentMasks};
pub use result::{ExecutionResult, GroupResult, ResultData, TableResult, TabularView};
