//! Cut executor
//!
//! Runs a batch of cuts against an immutable dataset. Segment masks are
//! computed once per batch and shared read-only by every cut; each cut then
//! succeeds or fails on its own.

use std::collections::BTreeMap;

use rayon::prelude::*;

use crate::config::EngineConfig;
use crate::dataset::{Cell, Column, Dataset, Mask};
use crate::mask::MaskBuilder;
use crate::metrics::{compute_metric, MetricInput, MetricValue};
use crate::observability::{log_event_with_fields, EngineMetrics, Event};
use crate::schema::coerce::ScalarKey;
use crate::schema::{Catalog, CutSpec, DimensionKind, DimensionSpec, MetricType, Question, SegmentSpec};
use crate::validator::{validate_cut_spec, validate_segment_spec, SegmentLookup, ValidationError};

use super::base_size::BaseSizePolicy;
use super::errors::{CutError, ExecutionError, ExecutionOutcome};
use super::result::{ExecutionResult, GroupResult, ResultData, TableResult};

/// Masks of the segments that passed validation, plus the rejected ones
#[derive(Debug, Clone, Default)]
pub struct SegmentMasks {
    masks: BTreeMap<String, Mask>,
    rejected: BTreeMap<String, Vec<ValidationError>>,
}

impl SegmentMasks {
    pub fn get(&self, segment_id: &str) -> Option<&Mask> {
        self.masks.get(segment_id)
    }

    /// Base size (selected rows) of every materialized segment
    pub fn base_sizes(&self) -> BTreeMap<String, usize> {
        self.masks
            .iter()
            .map(|(id, mask)| (id.clone(), mask.count()))
            .collect()
    }

    pub fn rejected(&self) -> &BTreeMap<String, Vec<ValidationError>> {
        &self.rejected
    }
}

impl SegmentLookup for SegmentMasks {
    fn has_segment(&self, segment_id: &str) -> bool {
        self.masks.contains_key(segment_id)
    }
}

/// One group of rows and its label
struct Group {
    label: String,
    mask: Mask,
}

/// Executes validated cuts against a dataset
pub struct CutExecutor<'a> {
    dataset: &'a Dataset,
    catalog: &'a Catalog,
    segments: &'a [SegmentSpec],
    config: EngineConfig,
    metrics: EngineMetrics,
}

impl<'a> CutExecutor<'a> {
    pub fn new(dataset: &'a Dataset, catalog: &'a Catalog) -> Self {
        Self {
            dataset,
            catalog,
            segments: &[],
            config: EngineConfig::default(),
            metrics: EngineMetrics::new(),
        }
    }

    /// Segments available as dimensions for this batch
    pub fn with_segments(mut self, segments: &'a [SegmentSpec]) -> Self {
        self.segments = segments;
        self
    }

    pub fn with_config(mut self, config: EngineConfig) -> Self {
        self.config = config;
        self
    }

    pub fn metrics(&self) -> &EngineMetrics {
        &self.metrics
    }

    fn policy(&self) -> BaseSizePolicy {
        self.config.base_size_policy()
    }

    fn mask_builder(&self) -> MaskBuilder<'_> {
        MaskBuilder::new(self.dataset, self.catalog).with_delimiter(&self.config.multi_choice_delimiter)
    }

    /// Validates every segment and computes masks for the valid ones.
    pub fn materialize_segments(&self) -> SegmentMasks {
        let builder = self.mask_builder();
        let mut result = SegmentMasks::default();

        for segment in self.segments {
            let errors = validate_segment_spec(segment, self.catalog);
            if !errors.is_empty() {
                self.metrics.increment_segments_rejected();
                log_event_with_fields(
                    Event::SegmentRejected,
                    &[
                        ("segment_id", &segment.segment_id),
                        ("errors", &errors.len().to_string()),
                    ],
                );
                result.rejected.insert(segment.segment_id.clone(), errors);
                continue;
            }

            let mask = builder.build(&segment.definition);
            self.metrics.increment_segments_materialized();
            log_event_with_fields(
                Event::SegmentMaterialized,
                &[
                    ("segment_id", &segment.segment_id),
                    ("base_n", &mask.count().to_string()),
                ],
            );
            result.masks.insert(segment.segment_id.clone(), mask);
        }

        result
    }

    /// Executes every cut; one cut's failure never affects another.
    ///
    /// Tables and errors keep input order, also in parallel mode.
    pub fn execute_cuts(&self, cuts: &[CutSpec]) -> ExecutionResult {
        log_event_with_fields(
            Event::BatchStart,
            &[
                ("cuts", &cuts.len().to_string()),
                ("segments", &self.segments.len().to_string()),
                ("parallel", &self.config.parallel.to_string()),
            ],
        );

        let masks = self.materialize_segments();

        let outcomes: Vec<Result<TableResult, CutError>> = if self.config.parallel {
            cuts.par_iter().map(|cut| self.run_cut(cut, &masks)).collect()
        } else {
            cuts.iter().map(|cut| self.run_cut(cut, &masks)).collect()
        };

        let mut result = ExecutionResult {
            segments_computed: masks.base_sizes(),
            segment_errors: masks.rejected,
            ..Default::default()
        };

        for outcome in outcomes {
            match outcome {
                Ok(table) => result.tables.push(table),
                Err(error) => result.errors.push(error),
            }
        }

        log_event_with_fields(
            Event::BatchComplete,
            &[
                ("tables", &result.tables.len().to_string()),
                ("errors", &result.errors.len().to_string()),
            ],
        );

        result
    }

    fn run_cut(&self, cut: &CutSpec, masks: &SegmentMasks) -> Result<TableResult, CutError> {
        match self.execute_cut(cut, masks) {
            Ok(table) => {
                self.metrics.increment_cuts_executed();
                log_event_with_fields(
                    Event::CutComplete,
                    &[("cut_id", &cut.cut_id), ("base_n", &table.base_n.to_string())],
                );
                Ok(table)
            }
            Err(error) => {
                let event = match error {
                    ExecutionError::ValidationFailed(_) => {
                        self.metrics.increment_cuts_rejected();
                        Event::CutRejected
                    }
                    _ => {
                        self.metrics.increment_cuts_failed();
                        Event::CutFailed
                    }
                };
                let message = error.to_string();
                log_event_with_fields(
                    event,
                    &[("cut_id", &cut.cut_id), ("kind", error.kind()), ("error", &message)],
                );
                Err(CutError::new(cut.cut_id.clone(), error))
            }
        }
    }

    /// Validates and computes one cut against already-materialized segments.
    pub fn execute_cut(&self, cut: &CutSpec, masks: &SegmentMasks) -> ExecutionOutcome<TableResult> {
        let errors = validate_cut_spec(cut, self.catalog, masks);
        if !errors.is_empty() {
            return Err(ExecutionError::ValidationFailed(errors));
        }

        let metric = cut
            .metric
            .kind()
            .ok_or_else(|| ExecutionError::UnknownMetricType(cut.metric.metric_type.clone()))?;
        let question = self.question(&cut.metric.question_id)?;
        let column = self.column(question.column_name())?;

        let mut mask = Mask::all(self.dataset.len());
        if let Some(filter) = &cut.filter {
            mask = &mask & &self.mask_builder().build(filter);
        }

        let mut warnings = Vec::new();
        let weights = match (&cut.weight_column, metric) {
            (Some(name), MetricType::Mean) => Some(self.column(name)?),
            (Some(name), other) => {
                warnings.push(format!(
                    "Weight column '{}' ignored: weighting applies to mean only, not {}",
                    name, other
                ));
                None
            }
            (None, _) => None,
        };

        let context = CutContext {
            cut,
            metric,
            question,
            column,
            weights,
            delimiter: &self.config.multi_choice_delimiter,
        };

        let Some(first) = cut.dimensions.first() else {
            let (base_n, value) = context.compute(&mask)?;
            warnings.extend(self.policy().warnings(base_n));
            return Ok(TableResult {
                cut_id: cut.cut_id.clone(),
                metric_type: metric.as_str().to_string(),
                question_id: cut.metric.question_id.clone(),
                result_data: ResultData::Single(value),
                base_n,
                dimensions: Vec::new(),
                warnings,
            });
        };

        if cut.dimensions.len() > 1 {
            let ignored: Vec<&str> = cut.dimensions[1..].iter().map(|d| d.id.as_str()).collect();
            warnings.push(format!(
                "Multi-dimension cross-tabs not fully supported. Using first dimension only. Ignored: {:?}",
                ignored
            ));
        }

        let groups = self.groups(first, &mask, masks)?;
        let mut by_dimension = Vec::with_capacity(groups.len());
        let mut total_base = 0;

        for group in groups {
            let (base_n, value) = context.compute(&group.mask)?;
            total_base += base_n;
            warnings.extend(
                self.policy()
                    .warnings(base_n)
                    .into_iter()
                    .map(|w| format!("[{}] {}", group.label, w)),
            );
            by_dimension.push(GroupResult {
                group: group.label,
                base_n,
                result: value,
            });
        }

        Ok(TableResult {
            cut_id: cut.cut_id.clone(),
            metric_type: metric.as_str().to_string(),
            question_id: cut.metric.question_id.clone(),
            result_data: ResultData::Grouped {
                dimension: first.id.clone(),
                by_dimension,
            },
            base_n: total_base,
            dimensions: vec![first.label()],
            warnings,
        })
    }

    fn question(&self, question_id: &str) -> ExecutionOutcome<&'a Question> {
        self.catalog
            .get(question_id)
            .ok_or_else(|| ExecutionError::UnknownQuestion(question_id.to_string()))
    }

    fn column(&self, name: &str) -> ExecutionOutcome<&'a Column> {
        self.dataset
            .column(name)
            .ok_or_else(|| ExecutionError::MissingColumn(name.to_string()))
    }

    /// Splits the filtered rows by the honored dimension
    fn groups(
        &self,
        dimension: &DimensionSpec,
        filtered: &Mask,
        masks: &SegmentMasks,
    ) -> ExecutionOutcome<Vec<Group>> {
        match dimension.kind {
            DimensionKind::Segment => {
                let segment = masks
                    .get(&dimension.id)
                    .ok_or_else(|| ExecutionError::SegmentNotMaterialized(dimension.id.clone()))?;
                Ok(vec![
                    Group {
                        label: dimension.id.clone(),
                        mask: filtered & segment,
                    },
                    Group {
                        label: format!("Not_{}", dimension.id),
                        mask: filtered & &!segment,
                    },
                ])
            }
            DimensionKind::Question => {
                let question = self.question(&dimension.id)?;
                let column = self.column(question.column_name())?;

                let mut groups: BTreeMap<ScalarKey, Group> = BTreeMap::new();
                for row in filtered.selected() {
                    let Some(value) = column.get(row) else {
                        continue;
                    };
                    groups
                        .entry(ScalarKey::of(value))
                        .or_insert_with(|| Group {
                            label: value.to_string(),
                            mask: Mask::none(self.dataset.len()),
                        })
                        .mask
                        .set(row);
                }

                Ok(groups.into_values().collect())
            }
        }
    }
}

/// Per-cut inputs shared by every group
struct CutContext<'c> {
    cut: &'c CutSpec,
    metric: MetricType,
    question: &'c Question,
    column: &'c Column,
    weights: Option<&'c Column>,
    delimiter: &'c str,
}

impl CutContext<'_> {
    /// Computes the metric over `mask`; returns the base size and value
    fn compute(&self, mask: &Mask) -> ExecutionOutcome<(usize, MetricValue)> {
        let cells = self.column.select(mask);
        let weights: Option<Vec<Cell>> = self.weights.map(|w| w.select(mask));
        let base_n = self.column.non_null_count(mask);

        let value = compute_metric(
            self.metric,
            &MetricInput {
                cells: &cells,
                question: Some(self.question),
                params: &self.cut.metric.params,
                weights: weights.as_deref(),
                delimiter: self.delimiter,
            },
        )?;

        Ok((base_n, value))
    }
}

/// Executes `cuts` with the default configuration.
pub fn execute_cuts(
    dataset: &Dataset,
    catalog: &Catalog,
    segments: &[SegmentSpec],
    cuts: &[CutSpec],
) -> ExecutionResult {
    CutExecutor::new(dataset, catalog)
        .with_segments(segments)
        .execute_cuts(cuts)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::{AnswerOption, FilterExpr, MetricSpec, QuestionType, Scalar};

    fn fixture() -> (Dataset, Catalog) {
        let region = ["NORTH", "SOUTH", "NORTH", "SOUTH", "NORTH", "EAST"];
        let nps = [10, 9, 3, 8, 6, 10];
        let dataset = Dataset::from_columns(vec![
            (
                "Q_REGION",
                region.iter().map(|r| Some(Scalar::from(*r))).collect(),
            ),
            ("Q_NPS", nps.iter().map(|v| Some(Scalar::Int(*v))).collect()),
        ])
        .unwrap();

        let catalog = Catalog::new(vec![
            Question::new("Q_REGION", "Region", QuestionType::SingleChoice).with_options(vec![
                AnswerOption::new("NORTH", "North"),
                AnswerOption::new("SOUTH", "South"),
                AnswerOption::new("EAST", "East"),
            ]),
            Question::new("Q_NPS", "Recommend", QuestionType::Nps),
        ])
        .unwrap();

        (dataset, catalog)
    }

    #[test]
    fn test_simple_cut() {
        let (ds, cat) = fixture();
        let result = execute_cuts(&ds, &cat, &[], &[CutSpec::new("c1", MetricSpec::new(MetricType::Nps, "Q_NPS"))]);

        assert!(result.errors.is_empty());
        let table = &result.tables[0];
        assert_eq!(table.base_n, 6);
        assert_eq!(table.metric_type, "nps");
        assert!(table.warnings[0].contains("below minimum threshold"));
        match &table.result_data {
            ResultData::Single(value) => assert_eq!(value.headline(), Some(16.67)),
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn test_question_dimension_groups_sorted() {
        let (ds, cat) = fixture();
        let cut = CutSpec::new("c1", MetricSpec::new(MetricType::Mean, "Q_NPS"))
            .with_dimension(DimensionSpec::question("Q_REGION"));
        let table = &execute_cuts(&ds, &cat, &[], &[cut]).tables[0];

        let ResultData::Grouped { by_dimension, .. } = &table.result_data else {
            panic!("expected grouped result");
        };
        let labels: Vec<&str> = by_dimension.iter().map(|g| g.group.as_str()).collect();
        assert_eq!(labels, vec!["EAST", "NORTH", "SOUTH"]);
        assert_eq!(by_dimension[1].base_n, 3);
        assert_eq!(table.base_n, 6);
        assert_eq!(table.dimensions, vec!["question:Q_REGION"]);
        assert!(table.warnings.iter().any(|w| w.starts_with("[EAST] ")));
    }

    #[test]
    fn test_segment_dimension_binary_split() {
        let (ds, cat) = fixture();
        let segments = vec![SegmentSpec::new("north", "North", FilterExpr::eq("Q_REGION", "NORTH"))];
        let cut = CutSpec::new("c1", MetricSpec::new(MetricType::Nps, "Q_NPS"))
            .with_dimension(DimensionSpec::segment("north"));
        let result = execute_cuts(&ds, &cat, &segments, &[cut]);

        assert_eq!(result.segments_computed.get("north"), Some(&3));
        let ResultData::Grouped { by_dimension, .. } = &result.tables[0].result_data else {
            panic!("expected grouped result");
        };
        assert_eq!(by_dimension[0].group, "north");
        assert_eq!(by_dimension[1].group, "Not_north");
        assert_eq!(by_dimension[0].base_n + by_dimension[1].base_n, 6);
    }

    #[test]
    fn test_extra_dimensions_warned() {
        let (ds, cat) = fixture();
        let cut = CutSpec::new("c1", MetricSpec::new(MetricType::Nps, "Q_NPS"))
            .with_dimension(DimensionSpec::question("Q_REGION"))
            .with_dimension(DimensionSpec::question("Q_NPS"));
        let table = &execute_cuts(&ds, &cat, &[], &[cut]).tables[0];
        assert!(table.warnings[0].contains("Ignored: [\"Q_NPS\"]"));
        assert_eq!(table.dimensions.len(), 1);
    }

    #[test]
    fn test_filter_applies_before_metric() {
        let (ds, cat) = fixture();
        let cut = CutSpec::new("c1", MetricSpec::new(MetricType::Nps, "Q_NPS"))
            .with_filter(FilterExpr::eq("Q_REGION", "SOUTH"));
        let table = &execute_cuts(&ds, &cat, &[], &[cut]).tables[0];
        assert_eq!(table.base_n, 2);
    }

    #[test]
    fn test_rejected_segment_makes_dimension_unknown() {
        let (ds, cat) = fixture();
        let segments = vec![SegmentSpec::new("west", "West", FilterExpr::eq("Q_REGION", "WEST"))];
        let cut = CutSpec::new("c1", MetricSpec::new(MetricType::Nps, "Q_NPS"))
            .with_dimension(DimensionSpec::segment("west"));

        let executor = CutExecutor::new(&ds, &cat).with_segments(&segments);
        let result = executor.execute_cuts(&[cut]);

        assert!(result.segment_errors.contains_key("west"));
        assert!(result.segments_computed.is_empty());
        assert_eq!(result.errors[0].kind, "validation_failed");
        assert_eq!(executor.metrics().snapshot().segments_rejected, 1);
        assert_eq!(executor.metrics().snapshot().cuts_rejected, 1);
    }

    #[test]
    fn test_weight_ignored_for_non_mean() {
        let (ds, cat) = fixture();
        let cut = CutSpec::new("c1", MetricSpec::new(MetricType::Nps, "Q_NPS")).with_weight("W");
        let table = &execute_cuts(&ds, &cat, &[], &[cut]).tables[0];
        assert!(table.warnings[0].starts_with("Weight column 'W' ignored"));
    }

    #[test]
    fn test_missing_weight_column_fails_mean() {
        let (ds, cat) = fixture();
        let cut = CutSpec::new("c1", MetricSpec::new(MetricType::Mean, "Q_NPS")).with_weight("W");
        let result = execute_cuts(&ds, &cat, &[], &[cut]);
        assert_eq!(result.errors[0].kind, "missing_column");
    }
}
