//! Filter expression evaluation
//!
//! Turns a `FilterExpr` into a row mask. Evaluation never fails: a predicate
//! on a column the dataset does not carry selects nothing.

use std::collections::HashSet;

use crate::dataset::{Column, Dataset, Mask};
use crate::schema::coerce::{cell_matches, coerce_for_column, to_numeric};
use crate::schema::{Catalog, FilterExpr, Scalar};

/// Default separator of multi-choice cells
pub const DEFAULT_DELIMITER: &str = ";";

/// Evaluates filter expressions against one dataset
pub struct MaskBuilder<'a> {
    dataset: &'a Dataset,
    catalog: &'a Catalog,
    delimiter: &'a str,
}

impl<'a> MaskBuilder<'a> {
    pub fn new(dataset: &'a Dataset, catalog: &'a Catalog) -> Self {
        Self {
            dataset,
            catalog,
            delimiter: DEFAULT_DELIMITER,
        }
    }

    /// Overrides the multi-choice separator used by `contains_any`
    pub fn with_delimiter(mut self, delimiter: &'a str) -> Self {
        self.delimiter = delimiter;
        self
    }

    /// Evaluates `expr` into a mask of `dataset.len()` rows.
    pub fn build(&self, expr: &FilterExpr) -> Mask {
        let rows = self.dataset.len();

        match expr {
            FilterExpr::Eq { question_id, value } => self.with_column(question_id, |column| {
                Self::eval_in(column, std::slice::from_ref(value))
            }),
            FilterExpr::In {
                question_id,
                values,
            } => self.with_column(question_id, |column| Self::eval_in(column, values)),
            FilterExpr::Range {
                question_id,
                min,
                max,
                inclusive,
            } => self.with_column(question_id, |column| {
                Self::eval_range(column, *min, *max, *inclusive)
            }),
            FilterExpr::ContainsAny {
                question_id,
                values,
            } => self.with_column(question_id, |column| {
                Self::eval_contains_any(column, values, self.delimiter)
            }),
            FilterExpr::And { children } => children
                .iter()
                .fold(Mask::all(rows), |acc, child| &acc & &self.build(child)),
            FilterExpr::Or { children } => children
                .iter()
                .fold(Mask::none(rows), |acc, child| &acc | &self.build(child)),
            FilterExpr::Not { child } => !self.build(child),
        }
    }

    /// Resolves a question to its column; a missing column selects nothing
    fn with_column(&self, question_id: &str, eval: impl FnOnce(&Column) -> Mask) -> Mask {
        let name = self
            .catalog
            .get(question_id)
            .map(|q| q.column_name())
            .unwrap_or(question_id);

        match self.dataset.column(name) {
            Some(column) => eval(column),
            None => Mask::none(self.dataset.len()),
        }
    }

    /// Membership test; a single-value list is plain equality
    fn eval_in(column: &Column, values: &[Scalar]) -> Mask {
        let numeric = column.is_numeric();
        let targets: Vec<Scalar> = values
            .iter()
            .map(|v| coerce_for_column(v, numeric))
            .collect();

        Mask::from_bits(
            column
                .cells()
                .iter()
                .map(|cell| match cell {
                    Some(cell) => targets.iter().any(|t| cell_matches(cell, t)),
                    None => false,
                })
                .collect(),
        )
    }

    fn eval_range(column: &Column, min: Option<f64>, max: Option<f64>, inclusive: bool) -> Mask {
        Mask::from_bits(
            column
                .cells()
                .iter()
                .map(|cell| {
                    let Some(v) = to_numeric(cell.as_ref()) else {
                        return false;
                    };
                    let above = match min {
                        Some(lo) if inclusive => v >= lo,
                        Some(lo) => v > lo,
                        None => true,
                    };
                    let below = match max {
                        Some(hi) if inclusive => v <= hi,
                        Some(hi) => v < hi,
                        None => true,
                    };
                    above && below
                })
                .collect(),
        )
    }

    fn eval_contains_any(column: &Column, values: &[Scalar], delimiter: &str) -> Mask {
        let targets: HashSet<String> = values.iter().map(|v| v.to_string()).collect();

        Mask::from_bits(
            column
                .cells()
                .iter()
                .map(|cell| match cell {
                    Some(cell) => split_choices(&cell.to_string(), delimiter)
                        .any(|token| targets.contains(token)),
                    None => false,
                })
                .collect(),
        )
    }
}

/// Splits a multi-choice cell into trimmed, non-empty tokens.
pub fn split_choices<'c>(cell: &'c str, delimiter: &'c str) -> impl Iterator<Item = &'c str> {
    cell.split(delimiter)
        .map(str::trim)
        .filter(|token| !token.is_empty())
}

/// Evaluates `expr` with the default multi-choice separator.
pub fn build_mask(dataset: &Dataset, expr: &FilterExpr, catalog: &Catalog) -> Mask {
    MaskBuilder::new(dataset, catalog).build(expr)
}
