//! Filter expression AST
//!
//! A closed, tree-shaped boolean language over question answers. Leaves are
//! predicates on one question; `and`/`or`/`not` combine them. The `kind`
//! field discriminates variants on the wire; an unknown kind is rejected at
//! deserialization time.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use super::errors::{parse_json, SpecResult};
use super::types::Scalar;

fn default_inclusive() -> bool {
    true
}

/// Boolean filter expression
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum FilterExpr {
    /// Answer equals `value`
    Eq { question_id: String, value: Scalar },
    /// Answer is one of `values`
    In {
        question_id: String,
        values: Vec<Scalar>,
    },
    /// Numeric answer within bounds; either bound may be absent
    Range {
        question_id: String,
        #[serde(default)]
        min: Option<f64>,
        #[serde(default)]
        max: Option<f64>,
        #[serde(default = "default_inclusive")]
        inclusive: bool,
    },
    /// Multi-choice answer selected at least one of `values`
    ContainsAny {
        question_id: String,
        values: Vec<Scalar>,
    },
    /// All children hold (empty = always true)
    And { children: Vec<FilterExpr> },
    /// At least one child holds (empty = never true)
    Or { children: Vec<FilterExpr> },
    /// Child does not hold
    Not { child: Box<FilterExpr> },
}

impl FilterExpr {
    pub fn eq(question_id: impl Into<String>, value: impl Into<Scalar>) -> Self {
        FilterExpr::Eq {
            question_id: question_id.into(),
            value: value.into(),
        }
    }

    pub fn one_of<V: Into<Scalar>>(
        question_id: impl Into<String>,
        values: impl IntoIterator<Item = V>,
    ) -> Self {
        FilterExpr::In {
            question_id: question_id.into(),
            values: values.into_iter().map(Into::into).collect(),
        }
    }

    /// Inclusive range
    pub fn range(question_id: impl Into<String>, min: Option<f64>, max: Option<f64>) -> Self {
        FilterExpr::Range {
            question_id: question_id.into(),
            min,
            max,
            inclusive: true,
        }
    }

    /// Exclusive range
    pub fn range_exclusive(
        question_id: impl Into<String>,
        min: Option<f64>,
        max: Option<f64>,
    ) -> Self {
        FilterExpr::Range {
            question_id: question_id.into(),
            min,
            max,
            inclusive: false,
        }
    }

    pub fn contains_any<V: Into<Scalar>>(
        question_id: impl Into<String>,
        values: impl IntoIterator<Item = V>,
    ) -> Self {
        FilterExpr::ContainsAny {
            question_id: question_id.into(),
            values: values.into_iter().map(Into::into).collect(),
        }
    }

    pub fn and(children: Vec<FilterExpr>) -> Self {
        FilterExpr::And { children }
    }

    pub fn or(children: Vec<FilterExpr>) -> Self {
        FilterExpr::Or { children }
    }

    pub fn not(child: FilterExpr) -> Self {
        FilterExpr::Not {
            child: Box::new(child),
        }
    }

    /// Parses a filter expression from loosely-typed JSON.
    pub fn from_json(value: &serde_json::Value) -> SpecResult<Self> {
        parse_json(value, "filter expression")
    }

    /// Returns the wire kind of this node
    pub fn kind(&self) -> &'static str {
        match self {
            FilterExpr::Eq { .. } => "eq",
            FilterExpr::In { .. } => "in",
            FilterExpr::Range { .. } => "range",
            FilterExpr::ContainsAny { .. } => "contains_any",
            FilterExpr::And { .. } => "and",
            FilterExpr::Or { .. } => "or",
            FilterExpr::Not { .. } => "not",
        }
    }

    /// Collects every question id referenced anywhere in the tree
    pub fn question_ids(&self) -> BTreeSet<&str> {
        let mut ids = BTreeSet::new();
        self.collect_question_ids(&mut ids);
        ids
    }

    fn collect_question_ids<'a>(&'a self, ids: &mut BTreeSet<&'a str>) {
        match self {
            FilterExpr::Eq { question_id, .. }
            | FilterExpr::In { question_id, .. }
            | FilterExpr::Range { question_id, .. }
            | FilterExpr::ContainsAny { question_id, .. } => {
                ids.insert(question_id);
            }
            FilterExpr::And { children } | FilterExpr::Or { children } => {
                for child in children {
                    child.collect_question_ids(ids);
                }
            }
            FilterExpr::Not { child } => child.collect_question_ids(ids),
        }
    }
}
