//! Executor error types
//!
//! Error kinds (recorded per cut in `ExecutionResult.errors`):
//! - validation_failed: the cut did not pass validation and never ran
//! - missing_column: a referenced column is absent from the dataset
//! - unknown_question: a referenced question is absent from the catalog
//! - unknown_metric_type: the metric type is not known
//! - segment_not_materialized: a segment dimension has no computed mask
//! - invalid_params: a metric parameter is unusable
//!
//! None of these abort the batch.

use serde::Serialize;
use thiserror::Error;

use crate::schema::ParamError;
use crate::validator::ValidationError;

fn summarize(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .map(ValidationError::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

/// Failure of a single cut
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ExecutionError {
    #[error("Validation failed: {}", summarize(.0))]
    ValidationFailed(Vec<ValidationError>),

    #[error("Column '{0}' not found in dataset")]
    MissingColumn(String),

    #[error("Question '{0}' not found in catalog")]
    UnknownQuestion(String),

    #[error("Unknown metric type: {0}")]
    UnknownMetricType(String),

    #[error("Segment '{0}' not materialized")]
    SegmentNotMaterialized(String),

    #[error(transparent)]
    InvalidParams(#[from] ParamError),
}

impl ExecutionError {
    /// Machine-readable error kind
    pub fn kind(&self) -> &'static str {
        match self {
            ExecutionError::ValidationFailed(_) => "validation_failed",
            ExecutionError::MissingColumn(_) => "missing_column",
            ExecutionError::UnknownQuestion(_) => "unknown_question",
            ExecutionError::UnknownMetricType(_) => "unknown_metric_type",
            ExecutionError::SegmentNotMaterialized(_) => "segment_not_materialized",
            ExecutionError::InvalidParams(_) => "invalid_params",
        }
    }
}

/// Result type for single-cut execution
pub type ExecutionOutcome<T> = Result<T, ExecutionError>;

/// A per-cut error entry of an execution result
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CutError {
    pub cut_id: String,
    pub error: String,
    pub kind: String,
    /// Validation errors, for `validation_failed`
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub details: Vec<ValidationError>,
}

impl CutError {
    pub fn new(cut_id: impl Into<String>, error: ExecutionError) -> Self {
        let message = error.to_string();
        let kind = error.kind().to_string();
        let details = match error {
            ExecutionError::ValidationFailed(errors) => errors,
            _ => Vec::new(),
        };
        Self {
            cut_id: cut_id.into(),
            error: message,
            kind,
            details,
        }
    }
}
