//! Specification validator
//!
//! Pure checks of filters, segments and cuts against a question catalog.
//! Every check accumulates: a combinator reports the errors of all of its
//! children, and a cut reports metric, dimension and filter errors together.

use std::collections::{BTreeMap, BTreeSet, HashMap, HashSet};

use crate::schema::{
    Catalog, CutSpec, DimensionKind, FilterExpr, MetricType, Question, QuestionType, Scalar,
    SegmentSpec,
};

use super::compat::compatible_types;
use super::errors::ValidationError;

/// Resolves segment ids referenced by cut dimensions
pub trait SegmentLookup {
    fn has_segment(&self, segment_id: &str) -> bool;
}

impl<V> SegmentLookup for HashMap<String, V> {
    fn has_segment(&self, segment_id: &str) -> bool {
        self.contains_key(segment_id)
    }
}

impl<V> SegmentLookup for BTreeMap<String, V> {
    fn has_segment(&self, segment_id: &str) -> bool {
        self.contains_key(segment_id)
    }
}

impl SegmentLookup for HashSet<String> {
    fn has_segment(&self, segment_id: &str) -> bool {
        self.contains(segment_id)
    }
}

impl SegmentLookup for BTreeSet<String> {
    fn has_segment(&self, segment_id: &str) -> bool {
        self.contains(segment_id)
    }
}

impl SegmentLookup for [SegmentSpec] {
    fn has_segment(&self, segment_id: &str) -> bool {
        self.iter().any(|s| s.segment_id == segment_id)
    }
}

impl SegmentLookup for Vec<SegmentSpec> {
    fn has_segment(&self, segment_id: &str) -> bool {
        self.as_slice().has_segment(segment_id)
    }
}

/// Validates specifications against one catalog
pub struct SpecValidator<'a> {
    catalog: &'a Catalog,
}

impl<'a> SpecValidator<'a> {
    pub fn new(catalog: &'a Catalog) -> Self {
        Self { catalog }
    }

    /// Validates a filter expression tree
    pub fn validate_filter(&self, expr: &FilterExpr) -> Vec<ValidationError> {
        let mut errors = Vec::new();
        self.check_filter(expr, &mut errors);
        errors
    }

    /// Validates a segment definition
    pub fn validate_segment(&self, segment: &SegmentSpec) -> Vec<ValidationError> {
        self.validate_filter(&segment.definition)
    }

    /// Validates a cut: metric, dimensions, then filter
    pub fn validate_cut<S>(&self, cut: &CutSpec, segments: &S) -> Vec<ValidationError>
    where
        S: SegmentLookup + ?Sized,
    {
        let mut errors = Vec::new();

        self.check_metric(&cut.metric.metric_type, &cut.metric.question_id, &mut errors);

        for dimension in &cut.dimensions {
            let resolves = match dimension.kind {
                DimensionKind::Question => self.catalog.contains(&dimension.id),
                DimensionKind::Segment => segments.has_segment(&dimension.id),
            };
            if !resolves {
                errors.push(ValidationError::unknown_dimension(
                    dimension.kind,
                    &dimension.id,
                ));
            }
        }

        if let Some(filter) = &cut.filter {
            self.check_filter(filter, &mut errors);
        }

        errors
    }

    fn check_metric(&self, metric_type: &str, question_id: &str, errors: &mut Vec<ValidationError>) {
        let question = self.catalog.get(question_id);
        if question.is_none() {
            errors.push(ValidationError::unknown_question(question_id));
        }

        match (MetricType::parse(metric_type), question) {
            (None, _) => errors.push(unknown_metric(metric_type)),
            (Some(metric), Some(question)) => {
                if let Some(err) = incompatible(metric, question.question_type) {
                    errors.push(err);
                }
            }
            (Some(_), None) => {}
        }
    }

    fn check_filter(&self, expr: &FilterExpr, errors: &mut Vec<ValidationError>) {
        match expr {
            FilterExpr::Eq { question_id, value } => {
                if let Some(question) = self.resolve(question_id, errors) {
                    if question.question_type.is_choice_bearing() {
                        check_codes(question, std::slice::from_ref(value), errors);
                    }
                }
            }
            FilterExpr::In {
                question_id,
                values,
            } => {
                if let Some(question) = self.resolve(question_id, errors) {
                    if question.question_type.is_choice_bearing() {
                        check_codes(question, values, errors);
                    }
                }
            }
            FilterExpr::Range {
                question_id,
                min,
                max,
                ..
            } => {
                if let Some(question) = self.resolve(question_id, errors) {
                    if !question.question_type.is_numeric_compatible() {
                        errors.push(ValidationError::predicate_incompatible(
                            "range",
                            question_id,
                            question.question_type,
                        ));
                    }
                }
                if let (Some(lo), Some(hi)) = (min, max) {
                    if lo > hi {
                        errors.push(ValidationError::invalid_range(question_id, *lo, *hi));
                    }
                }
            }
            FilterExpr::ContainsAny {
                question_id,
                values,
            } => {
                if let Some(question) = self.resolve(question_id, errors) {
                    if question.question_type != QuestionType::MultiChoice {
                        errors.push(ValidationError::predicate_incompatible(
                            "contains_any",
                            question_id,
                            question.question_type,
                        ));
                    }
                    check_codes(question, values, errors);
                }
            }
            FilterExpr::And { children } | FilterExpr::Or { children } => {
                for child in children {
                    self.check_filter(child, errors);
                }
            }
            FilterExpr::Not { child } => self.check_filter(child, errors),
        }
    }

    fn resolve(&self, question_id: &str, errors: &mut Vec<ValidationError>) -> Option<&'a Question> {
        let question = self.catalog.get(question_id);
        if question.is_none() {
            errors.push(ValidationError::unknown_question(question_id));
        }
        question
    }
}

/// Reports every value that names no declared option code.
///
/// Questions without declared options accept any value.
fn check_codes(question: &Question, values: &[Scalar], errors: &mut Vec<ValidationError>) {
    if question.options().is_empty() {
        return;
    }
    for value in values {
        if !question.has_code(value) {
            errors.push(ValidationError::invalid_option(
                &question.question_id,
                value,
                &question.option_codes(),
            ));
        }
    }
}

fn unknown_metric(metric_type: &str) -> ValidationError {
    let known: Vec<&str> = MetricType::ALL.iter().map(MetricType::as_str).collect();
    ValidationError::unknown_metric_type(metric_type, &known)
}

fn incompatible(metric: MetricType, question_type: QuestionType) -> Option<ValidationError> {
    let compatible = compatible_types(metric);
    if compatible.contains(&question_type) {
        None
    } else {
        Some(ValidationError::metric_incompatible(
            metric.as_str(),
            question_type,
            compatible,
        ))
    }
}

/// Checks a metric type name against a question type.
pub fn check_metric_compatibility(
    metric_type: &str,
    question_type: QuestionType,
) -> Option<ValidationError> {
    match MetricType::parse(metric_type) {
        Some(metric) => incompatible(metric, question_type),
        None => Some(unknown_metric(metric_type)),
    }
}

pub fn validate_filter_expr(expr: &FilterExpr, catalog: &Catalog) -> Vec<ValidationError> {
    SpecValidator::new(catalog).validate_filter(expr)
}

pub fn validate_segment_spec(segment: &SegmentSpec, catalog: &Catalog) -> Vec<ValidationError> {
    SpecValidator::new(catalog).validate_segment(segment)
}

pub fn validate_cut_spec<S>(cut: &CutSpec, catalog: &Catalog, segments: &S) -> Vec<ValidationError>
where
    S: SegmentLookup + ?Sized,
{
    SpecValidator::new(catalog).validate_cut(cut, segments)
}

/// Validates every segment; only failing ids appear in the result.
pub fn validate_all_segments(
    segments: &[SegmentSpec],
    catalog: &Catalog,
) -> BTreeMap<String, Vec<ValidationError>> {
    let validator = SpecValidator::new(catalog);
    segments
        .iter()
        .filter_map(|segment| {
            let errors = validator.validate_segment(segment);
            (!errors.is_empty()).then(|| (segment.segment_id.clone(), errors))
        })
        .collect()
}

/// Validates every cut; only failing ids appear in the result.
pub fn validate_all_cuts<S>(
    cuts: &[CutSpec],
    catalog: &Catalog,
    segments: &S,
) -> BTreeMap<String, Vec<ValidationError>>
where
    S: SegmentLookup + ?Sized,
{
    let validator = SpecValidator::new(catalog);
    cuts.iter()
        .filter_map(|cut| {
            let errors = validator.validate_cut(cut, segments);
            (!errors.is_empty()).then(|| (cut.cut_id.clone(), errors))
        })
        .collect()
}
