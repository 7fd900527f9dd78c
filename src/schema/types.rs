//! Question catalog types
//!
//! Supported question types:
//! - single_choice: one option code per respondent
//! - multi_choice: delimiter-joined option codes
//! - likert_1_5 / likert_1_7: bounded agreement scales
//! - numeric: free numeric answer
//! - nps_0_10: likelihood-to-recommend scale
//! - open_text: verbatim text

use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use std::fmt;

use super::coerce::{codes_match, option_key};
use super::errors::{SpecError, SpecResult};

/// A single response value or predicate operand.
///
/// Integers are tried before floats, so `1` stays an integer code while
/// `1.5` becomes a float.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Scalar {
    Int(i64),
    Float(f64),
    Text(String),
}

impl Scalar {
    /// Returns true for `Int` and `Float`
    pub fn is_numeric(&self) -> bool {
        matches!(self, Scalar::Int(_) | Scalar::Float(_))
    }

    /// Returns the text payload, if any
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Scalar::Text(s) => Some(s),
            _ => None,
        }
    }

    /// Returns the numeric payload without parsing text
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Scalar::Int(i) => Some(*i as f64),
            Scalar::Float(f) => Some(*f),
            Scalar::Text(_) => None,
        }
    }
}

impl fmt::Display for Scalar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Scalar::Int(i) => write!(f, "{}", i),
            Scalar::Float(x) => write!(f, "{}", x),
            Scalar::Text(s) => write!(f, "{}", s),
        }
    }
}

impl From<i64> for Scalar {
    fn from(v: i64) -> Self {
        Scalar::Int(v)
    }
}

impl From<i32> for Scalar {
    fn from(v: i32) -> Self {
        Scalar::Int(v as i64)
    }
}

impl From<f64> for Scalar {
    fn from(v: f64) -> Self {
        Scalar::Float(v)
    }
}

impl From<&str> for Scalar {
    fn from(v: &str) -> Self {
        Scalar::Text(v.to_string())
    }
}

impl From<String> for Scalar {
    fn from(v: String) -> Self {
        Scalar::Text(v)
    }
}

/// Question types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum QuestionType {
    #[serde(rename = "single_choice")]
    SingleChoice,
    #[serde(rename = "multi_choice")]
    MultiChoice,
    #[serde(rename = "likert_1_5")]
    Likert5,
    #[serde(rename = "likert_1_7")]
    Likert7,
    #[serde(rename = "numeric")]
    Numeric,
    #[serde(rename = "nps_0_10")]
    Nps,
    #[serde(rename = "open_text")]
    OpenText,
}

impl QuestionType {
    /// Returns the wire name used in catalogs and error context
    pub fn name(&self) -> &'static str {
        match self {
            QuestionType::SingleChoice => "single_choice",
            QuestionType::MultiChoice => "multi_choice",
            QuestionType::Likert5 => "likert_1_5",
            QuestionType::Likert7 => "likert_1_7",
            QuestionType::Numeric => "numeric",
            QuestionType::Nps => "nps_0_10",
            QuestionType::OpenText => "open_text",
        }
    }

    /// Types whose answers can be compared against numeric bounds
    pub fn is_numeric_compatible(&self) -> bool {
        matches!(
            self,
            QuestionType::Numeric | QuestionType::Likert5 | QuestionType::Likert7 | QuestionType::Nps
        )
    }

    /// Types whose predicate values are checked against declared option codes
    pub fn is_choice_bearing(&self) -> bool {
        matches!(
            self,
            QuestionType::SingleChoice
                | QuestionType::MultiChoice
                | QuestionType::Likert5
                | QuestionType::Likert7
        )
    }
}

impl fmt::Display for QuestionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A declared answer option
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnswerOption {
    /// Option code as stored in the responses
    pub code: Scalar,
    /// Human-readable label
    pub label: String,
}

impl AnswerOption {
    pub fn new(code: impl Into<Scalar>, label: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            label: label.into(),
        }
    }
}

/// A survey question definition
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Question {
    /// Unique question identifier
    #[serde(alias = "id")]
    pub question_id: String,
    /// Question text
    pub label: String,
    /// Question type
    #[serde(rename = "type")]
    pub question_type: QuestionType,
    /// Ordered answer options for choice-type questions
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub options: Option<Vec<AnswerOption>>,
    /// Column holding the answers (defaults to the question id)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub column_name: Option<String>,
}

impl Question {
    /// Create a question without options
    pub fn new(
        question_id: impl Into<String>,
        label: impl Into<String>,
        question_type: QuestionType,
    ) -> Self {
        Self {
            question_id: question_id.into(),
            label: label.into(),
            question_type,
            options: None,
            column_name: None,
        }
    }

    /// Attach answer options
    pub fn with_options(mut self, options: Vec<AnswerOption>) -> Self {
        self.options = Some(options);
        self
    }

    /// Override the responses column
    pub fn with_column(mut self, column: impl Into<String>) -> Self {
        self.column_name = Some(column.into());
        self
    }

    /// Returns the column this question's answers live in
    pub fn column_name(&self) -> &str {
        self.column_name.as_deref().unwrap_or(&self.question_id)
    }

    /// Returns the declared options (empty when none are declared)
    pub fn options(&self) -> &[AnswerOption] {
        self.options.as_deref().unwrap_or(&[])
    }

    /// Returns the declared option codes in declaration order
    pub fn option_codes(&self) -> Vec<Scalar> {
        self.options().iter().map(|o| o.code.clone()).collect()
    }

    /// Returns true if `value` names a declared code, including the
    /// string/numeric fallback ("1" vs 1).
    pub fn has_code(&self, value: &Scalar) -> bool {
        self.options().iter().any(|o| codes_match(value, &o.code))
    }

    /// Looks up the label for a response value
    pub fn option_label(&self, value: &Scalar) -> Option<&str> {
        self.options()
            .iter()
            .find(|o| codes_match(value, &o.code))
            .map(|o| o.label.as_str())
    }
}

/// Immutable question catalog keyed by question id.
///
/// Declaration order is preserved for iteration.
#[derive(Debug, Clone, Default)]
pub struct Catalog {
    questions: HashMap<String, Question>,
    order: Vec<String>,
}

impl Catalog {
    /// Builds a catalog, rejecting duplicate question ids and duplicate
    /// option codes within a question.
    pub fn new(questions: Vec<Question>) -> SpecResult<Self> {
        let mut catalog = Catalog::default();

        for question in questions {
            let mut seen = HashSet::new();
            for option in question.options() {
                if !seen.insert(option_key(&option.code)) {
                    return Err(SpecError::duplicate_option(
                        &question.question_id,
                        option.code.to_string(),
                    ));
                }
            }

            if catalog.questions.contains_key(&question.question_id) {
                return Err(SpecError::duplicate_id("question", &question.question_id));
            }

            catalog.order.push(question.question_id.clone());
            catalog
                .questions
                .insert(question.question_id.clone(), question);
        }

        Ok(catalog)
    }

    /// Parses a JSON array of questions into a catalog
    pub fn from_json(value: &serde_json::Value) -> SpecResult<Self> {
        let questions: Vec<Question> = super::errors::parse_json(value, "question catalog")?;
        Self::new(questions)
    }

    /// Returns the question with the given id
    pub fn get(&self, question_id: &str) -> Option<&Question> {
        self.questions.get(question_id)
    }

    /// Returns true if the id is known
    pub fn contains(&self, question_id: &str) -> bool {
        self.questions.contains_key(question_id)
    }

    /// Iterates questions in declaration order
    pub fn iter(&self) -> impl Iterator<Item = &Question> {
        self.order.iter().filter_map(|id| self.questions.get(id))
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }
}
