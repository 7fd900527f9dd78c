//! Schema model for surveycut
//!
//! Question catalog, filter-expression AST and analysis specifications.
//!
//! # Design Principles
//!
//! - Closed tagged unions: unknown filter kinds, question types and
//!   dimension kinds fail at deserialization
//! - Fallible constructors at the boundary (`Catalog::new`, `*::from_json`)
//! - One coercion routine for string/numeric code handling
//! - Immutable after load

pub mod coerce;
mod errors;
mod filter;
pub mod loader;
mod spec;
mod types;

pub use errors::{ParamError, SpecError, SpecErrorCode, SpecResult};
pub use filter::FilterExpr;
pub use loader::{
    fingerprint_files, load_batch, load_catalog, load_cuts, load_dataset, load_segments, DataLoader,
    LoadError, LoadResult,
};
pub use spec::{
    BatchSpec, CutSpec, DimensionKind, DimensionSpec, MetricParams, MetricSpec, MetricType,
    SegmentSpec, DEFAULT_DETRACTOR_MAX, DEFAULT_PROMOTER_MIN,
};
pub use types::{AnswerOption, Catalog, Question, QuestionType, Scalar};
