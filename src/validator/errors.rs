//! Validation error types
//!
//! Error codes:
//! - unknown_question
//! - invalid_option
//! - predicate_incompatible
//! - invalid_range
//! - unknown_metric_type
//! - metric_incompatible
//! - unknown_dimension
//!
//! Every code blocks execution of the specification that produced it.

use std::collections::BTreeMap;
use std::fmt;

use serde::Serialize;
use serde_json::{json, Value};

use crate::schema::{DimensionKind, QuestionType, Scalar};

/// Validation error codes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ValidationCode {
    /// Referenced question id is not in the catalog
    UnknownQuestion,
    /// Predicate value is not a declared option code
    InvalidOption,
    /// Predicate kind cannot apply to the question type
    PredicateIncompatible,
    /// Range lower bound exceeds upper bound
    InvalidRange,
    /// Metric type is not one of the known metrics
    UnknownMetricType,
    /// Metric cannot be computed on the question type
    MetricIncompatible,
    /// Dimension does not resolve to a question or segment
    UnknownDimension,
}

impl ValidationCode {
    /// Returns the machine-readable code
    pub fn code(&self) -> &'static str {
        match self {
            ValidationCode::UnknownQuestion => "unknown_question",
            ValidationCode::InvalidOption => "invalid_option",
            ValidationCode::PredicateIncompatible => "predicate_incompatible",
            ValidationCode::InvalidRange => "invalid_range",
            ValidationCode::UnknownMetricType => "unknown_metric_type",
            ValidationCode::MetricIncompatible => "metric_incompatible",
            ValidationCode::UnknownDimension => "unknown_dimension",
        }
    }
}

impl fmt::Display for ValidationCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

/// A single validation failure with its context
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ValidationError {
    code: ValidationCode,
    message: String,
    context: BTreeMap<String, Value>,
}

impl ValidationError {
    fn new(code: ValidationCode, message: String) -> Self {
        Self {
            code,
            message,
            context: BTreeMap::new(),
        }
    }

    fn with(mut self, key: &str, value: Value) -> Self {
        self.context.insert(key.to_string(), value);
        self
    }

    /// Create an unknown question error
    pub fn unknown_question(question_id: &str) -> Self {
        Self::new(
            ValidationCode::UnknownQuestion,
            format!("Question '{}' not found in catalog", question_id),
        )
        .with("question_id", json!(question_id))
    }

    /// Create an invalid option error
    pub fn invalid_option(question_id: &str, value: &Scalar, valid_codes: &[Scalar]) -> Self {
        Self::new(
            ValidationCode::InvalidOption,
            format!(
                "Option value '{}' is not valid for question '{}'",
                value, question_id
            ),
        )
        .with("question_id", json!(question_id))
        .with("value", json!(value))
        .with("valid_codes", json!(valid_codes))
    }

    /// Create a predicate incompatible error
    pub fn predicate_incompatible(
        predicate: &str,
        question_id: &str,
        question_type: QuestionType,
    ) -> Self {
        Self::new(
            ValidationCode::PredicateIncompatible,
            format!(
                "'{}' predicate cannot be used with question '{}' of type '{}'",
                predicate, question_id, question_type
            ),
        )
        .with("predicate", json!(predicate))
        .with("question_id", json!(question_id))
        .with("question_type", json!(question_type.name()))
    }

    /// Create an invalid range error
    pub fn invalid_range(question_id: &str, min: f64, max: f64) -> Self {
        Self::new(
            ValidationCode::InvalidRange,
            format!("Range min ({}) is greater than max ({})", min, max),
        )
        .with("question_id", json!(question_id))
        .with("min", json!(min))
        .with("max", json!(max))
    }

    /// Create an unknown metric type error
    pub fn unknown_metric_type(metric_type: &str, known: &[&str]) -> Self {
        Self::new(
            ValidationCode::UnknownMetricType,
            format!("Unknown metric type: {}", metric_type),
        )
        .with("metric_type", json!(metric_type))
        .with("known_types", json!(known))
    }

    /// Create a metric incompatible error
    pub fn metric_incompatible(
        metric_type: &str,
        question_type: QuestionType,
        compatible: &[QuestionType],
    ) -> Self {
        let names: Vec<&str> = compatible.iter().map(QuestionType::name).collect();
        Self::new(
            ValidationCode::MetricIncompatible,
            format!(
                "Metric '{}' is not compatible with question type '{}'",
                metric_type, question_type
            ),
        )
        .with("metric_type", json!(metric_type))
        .with("question_type", json!(question_type.name()))
        .with("compatible_types", json!(names))
    }

    /// Create an unknown dimension error
    pub fn unknown_dimension(kind: DimensionKind, id: &str) -> Self {
        Self::new(
            ValidationCode::UnknownDimension,
            format!("Dimension {} '{}' not found", kind.as_str(), id),
        )
        .with("dimension_id", json!(id))
        .with("dimension_kind", json!(kind.as_str()))
    }

    pub fn code(&self) -> ValidationCode {
        self.code
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn context(&self) -> &BTreeMap<String, Value> {
        &self.context
    }

    /// Looks up one context entry
    pub fn context_value(&self, key: &str) -> Option<&Value> {
        self.context.get(key)
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}", self.code, self.message)
    }
}

impl std::error::Error for ValidationError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_codes_are_snake_case() {
        assert_eq!(ValidationCode::UnknownQuestion.code(), "unknown_question");
        assert_eq!(ValidationCode::MetricIncompatible.code(), "metric_incompatible");
        assert_eq!(
            serde_json::to_value(ValidationCode::InvalidRange).unwrap(),
            json!("invalid_range")
        );
    }

    #[test]
    fn test_display_and_context() {
        let err = ValidationError::unknown_dimension(DimensionKind::Segment, "seg_x");
        assert_eq!(err.to_string(), "[unknown_dimension] Dimension segment 'seg_x' not found");
        assert_eq!(err.context_value("dimension_kind"), Some(&json!("segment")));
    }

    #[test]
    fn test_metric_incompatible_carries_compatible_set() {
        let err = ValidationError::metric_incompatible(
            "nps",
            QuestionType::SingleChoice,
            &[QuestionType::Nps],
        );
        assert_eq!(err.code(), ValidationCode::MetricIncompatible);
        assert_eq!(err.context_value("compatible_types"), Some(&json!(["nps_0_10"])));
        assert_eq!(err.context_value("question_type"), Some(&json!("single_choice")));
    }

    #[test]
    fn test_serializes_code_message_context() {
        let err = ValidationError::unknown_question("Q9");
        let value = serde_json::to_value(&err).unwrap();
        assert_eq!(value["code"], json!("unknown_question"));
        assert_eq!(value["context"]["question_id"], json!("Q9"));
    }
}
