//! Validator for surveycut
//!
//! Gates execution: a filter, segment or cut with any validation error must
//! not run.
//!
//! # Rules
//!
//! - Every referenced question id resolves in the catalog
//! - Metric type is known and compatible with the question type
//! - Predicate values name declared option codes (string-form fallback)
//! - `range` only on numeric-compatible questions, with `min <= max`
//! - `contains_any` only on multi-choice questions
//! - Every dimension resolves to a question or a segment
//!
//! All validation is pure and reports every error, not just the first.

mod compat;
mod errors;
#[allow(clippy::module_inception)]
mod validator;

pub use compat::{compatible_types, is_compatible};
pub use errors::{ValidationCode, ValidationError};
pub use validator::{
    check_metric_compatibility, validate_all_cuts, validate_all_segments, validate_cut_spec,
    validate_filter_expr, validate_segment_spec, SegmentLookup, SpecValidator,
};
