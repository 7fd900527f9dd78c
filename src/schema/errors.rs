//! Boundary errors for specification construction
//!
//! Error codes:
//! - MALFORMED_SPEC: input does not match the schema (unknown kind, wrong shape)
//! - DUPLICATE_ID: two questions, segments or cuts share an id
//! - DUPLICATE_OPTION: two options of one question share a code
//!
//! These are raised before any validation or execution happens; business
//! logic downstream only ever sees values that parsed.

use std::fmt;

use serde::de::DeserializeOwned;
use thiserror::Error;

/// Specification error codes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SpecErrorCode {
    /// Input does not match the expected shape
    MalformedSpec,
    /// Identifier declared twice
    DuplicateId,
    /// Option code declared twice within one question
    DuplicateOption,
}

impl SpecErrorCode {
    /// Returns the string code
    pub fn code(&self) -> &'static str {
        match self {
            SpecErrorCode::MalformedSpec => "MALFORMED_SPEC",
            SpecErrorCode::DuplicateId => "DUPLICATE_ID",
            SpecErrorCode::DuplicateOption => "DUPLICATE_OPTION",
        }
    }
}

impl fmt::Display for SpecErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

/// Specification error with context
#[derive(Debug, Clone)]
pub struct SpecError {
    code: SpecErrorCode,
    message: String,
}

impl SpecError {
    /// Input could not be parsed as `what`
    pub fn malformed(what: impl fmt::Display, reason: impl fmt::Display) -> Self {
        Self {
            code: SpecErrorCode::MalformedSpec,
            message: format!("Malformed {}: {}", what, reason),
        }
    }

    /// `kind` id declared more than once
    pub fn duplicate_id(kind: &str, id: &str) -> Self {
        Self {
            code: SpecErrorCode::DuplicateId,
            message: format!("Duplicate {} id '{}'", kind, id),
        }
    }

    /// Option code declared more than once in a question
    pub fn duplicate_option(question_id: &str, code: impl fmt::Display) -> Self {
        Self {
            code: SpecErrorCode::DuplicateOption,
            message: format!(
                "Question '{}' declares option code '{}' more than once",
                question_id, code
            ),
        }
    }

    /// Returns the error code
    pub fn code(&self) -> SpecErrorCode {
        self.code
    }

    /// Returns the error message
    pub fn message(&self) -> &str {
        &self.message
    }
}

impl fmt::Display for SpecError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.code.code(), self.message)
    }
}

impl std::error::Error for SpecError {}

/// Result type for specification construction
pub type SpecResult<T> = Result<T, SpecError>;

/// Deserializes a JSON value, mapping serde failures to `MALFORMED_SPEC`.
pub(crate) fn parse_json<T: DeserializeOwned>(
    value: &serde_json::Value,
    what: &str,
) -> SpecResult<T> {
    T::deserialize(value).map_err(|e| SpecError::malformed(what, e))
}

/// A metric parameter that is present but unusable
#[derive(Debug, Clone, PartialEq, Error)]
#[error("invalid metric parameter '{param}': {reason}")]
pub struct ParamError {
    pub param: String,
    pub reason: String,
}

impl ParamError {
    pub fn new(param: impl Into<String>, reason: impl Into<String>) -> Self {
        Self {
            param: param.into(),
            reason: reason.into(),
        }
    }
}
