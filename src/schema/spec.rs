//! Analysis specifications: segments, metrics, dimensions and cuts

use std::collections::HashSet;
use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::coerce::parse_numeric;
use super::errors::{parse_json, ParamError, SpecError, SpecResult};
use super::filter::FilterExpr;

/// A named, reusable respondent filter
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SegmentSpec {
    /// Unique segment identifier
    #[serde(alias = "id")]
    pub segment_id: String,
    /// Human-readable name
    pub name: String,
    /// Membership rule
    pub definition: FilterExpr,
    /// Whether this segment is one part of a mutually exclusive partition
    #[serde(default)]
    pub intended_partition: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

impl SegmentSpec {
    pub fn new(
        segment_id: impl Into<String>,
        name: impl Into<String>,
        definition: FilterExpr,
    ) -> Self {
        Self {
            segment_id: segment_id.into(),
            name: name.into(),
            definition,
            intended_partition: false,
            notes: None,
        }
    }

    pub fn from_json(value: &Value) -> SpecResult<Self> {
        parse_json(value, "segment spec")
    }
}

/// Known metric types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MetricType {
    Frequency,
    Mean,
    Top2Box,
    Bottom2Box,
    Nps,
}

impl MetricType {
    /// All known metric types, in table order
    pub const ALL: [MetricType; 5] = [
        MetricType::Frequency,
        MetricType::Mean,
        MetricType::Top2Box,
        MetricType::Bottom2Box,
        MetricType::Nps,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            MetricType::Frequency => "frequency",
            MetricType::Mean => "mean",
            MetricType::Top2Box => "top2box",
            MetricType::Bottom2Box => "bottom2box",
            MetricType::Nps => "nps",
        }
    }

    /// Parses a wire name; `None` for unknown metric types
    pub fn parse(name: &str) -> Option<Self> {
        Self::ALL.iter().copied().find(|m| m.as_str() == name)
    }
}

impl fmt::Display for MetricType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Default NPS thresholds
pub const DEFAULT_PROMOTER_MIN: f64 = 9.0;
pub const DEFAULT_DETRACTOR_MAX: f64 = 6.0;

/// Free-form metric parameters with typed accessors
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MetricParams(Map<String, Value>);

impl MetricParams {
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets a parameter (builder style)
    pub fn with(mut self, key: impl Into<String>, value: Value) -> Self {
        self.0.insert(key.into(), value);
        self
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Explicit top-box values, overriding scale detection
    pub fn top_values(&self) -> Result<Option<Vec<f64>>, ParamError> {
        self.number_list("top_values")
    }

    /// Explicit bottom-box values, overriding scale detection
    pub fn bottom_values(&self) -> Result<Option<Vec<f64>>, ParamError> {
        self.number_list("bottom_values")
    }

    /// Minimum score counted as a promoter (default 9)
    pub fn promoter_min(&self) -> Result<f64, ParamError> {
        Ok(self.number("promoter_min")?.unwrap_or(DEFAULT_PROMOTER_MIN))
    }

    /// Maximum score counted as a detractor (default 6)
    pub fn detractor_max(&self) -> Result<f64, ParamError> {
        Ok(self.number("detractor_max")?.unwrap_or(DEFAULT_DETRACTOR_MAX))
    }

    fn number(&self, key: &str) -> Result<Option<f64>, ParamError> {
        match self.0.get(key) {
            None | Some(Value::Null) => Ok(None),
            Some(v) => value_as_number(v)
                .map(Some)
                .ok_or_else(|| ParamError::new(key, format!("expected a number, got {}", v))),
        }
    }

    fn number_list(&self, key: &str) -> Result<Option<Vec<f64>>, ParamError> {
        let items = match self.0.get(key) {
            None | Some(Value::Null) => return Ok(None),
            Some(Value::Array(items)) => items,
            Some(other) => {
                return Err(ParamError::new(
                    key,
                    format!("expected an array of numbers, got {}", other),
                ))
            }
        };

        items
            .iter()
            .map(|v| {
                value_as_number(v).ok_or_else(|| {
                    ParamError::new(key, format!("expected a number, got {}", v))
                })
            })
            .collect::<Result<Vec<_>, _>>()
            .map(Some)
    }
}

fn value_as_number(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => parse_numeric(s),
        _ => None,
    }
}

/// A metric on one question
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetricSpec {
    /// Metric type name; checked against the known set by the validator
    #[serde(rename = "type")]
    pub metric_type: String,
    pub question_id: String,
    #[serde(default, skip_serializing_if = "MetricParams::is_empty")]
    pub params: MetricParams,
}

impl MetricSpec {
    pub fn new(metric_type: MetricType, question_id: impl Into<String>) -> Self {
        Self {
            metric_type: metric_type.as_str().to_string(),
            question_id: question_id.into(),
            params: MetricParams::default(),
        }
    }

    pub fn with_params(mut self, params: MetricParams) -> Self {
        self.params = params;
        self
    }

    /// Returns the parsed metric type, or `None` when it is unknown
    pub fn kind(&self) -> Option<MetricType> {
        MetricType::parse(&self.metric_type)
    }
}

/// What a dimension groups by
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DimensionKind {
    Question,
    Segment,
}

impl DimensionKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            DimensionKind::Question => "question",
            DimensionKind::Segment => "segment",
        }
    }
}

/// A grouping dimension
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DimensionSpec {
    pub kind: DimensionKind,
    pub id: String,
}

impl DimensionSpec {
    pub fn question(id: impl Into<String>) -> Self {
        Self {
            kind: DimensionKind::Question,
            id: id.into(),
        }
    }

    pub fn segment(id: impl Into<String>) -> Self {
        Self {
            kind: DimensionKind::Segment,
            id: id.into(),
        }
    }

    /// Label used in `TableResult.dimensions`, e.g. `question:Q_REGION`
    pub fn label(&self) -> String {
        format!("{}:{}", self.kind.as_str(), self.id)
    }
}

/// One requested analysis
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CutSpec {
    /// Unique cut identifier
    #[serde(alias = "id")]
    pub cut_id: String,
    pub metric: MetricSpec,
    /// Grouping dimensions; only the first one is honored
    #[serde(default)]
    pub dimensions: Vec<DimensionSpec>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub filter: Option<FilterExpr>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub weight_column: Option<String>,
    /// Output preferences, passed through untouched
    #[serde(default, skip_serializing_if = "Map::is_empty")]
    pub output: Map<String, Value>,
}

impl CutSpec {
    pub fn new(cut_id: impl Into<String>, metric: MetricSpec) -> Self {
        Self {
            cut_id: cut_id.into(),
            metric,
            dimensions: Vec::new(),
            filter: None,
            weight_column: None,
            output: Map::new(),
        }
    }

    pub fn with_dimension(mut self, dimension: DimensionSpec) -> Self {
        self.dimensions.push(dimension);
        self
    }

    pub fn with_filter(mut self, filter: FilterExpr) -> Self {
        self.filter = Some(filter);
        self
    }

    pub fn with_weight(mut self, column: impl Into<String>) -> Self {
        self.weight_column = Some(column.into());
        self
    }

    pub fn from_json(value: &Value) -> SpecResult<Self> {
        parse_json(value, "cut spec")
    }
}

/// A batch of segments and cuts submitted together
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BatchSpec {
    #[serde(default)]
    pub segments: Vec<SegmentSpec>,
    pub cuts: Vec<CutSpec>,
}

impl BatchSpec {
    /// Parses a batch and rejects duplicate segment or cut ids.
    pub fn from_json(value: &Value) -> SpecResult<Self> {
        let batch: BatchSpec = parse_json(value, "batch")?;
        batch.check_unique_ids()?;
        Ok(batch)
    }

    pub(crate) fn check_unique_ids(&self) -> SpecResult<()> {
        let mut seen = HashSet::new();
        for segment in &self.segments {
            if !seen.insert(segment.segment_id.as_str()) {
                return Err(SpecError::duplicate_id("segment", &segment.segment_id));
            }
        }

        let mut seen = HashSet::new();
        for cut in &self.cuts {
            if !seen.insert(cut.cut_id.as_str()) {
                return Err(SpecError::duplicate_id("cut", &cut.cut_id));
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_metric_type_round_trip_names() {
        for metric in MetricType::ALL {
            assert_eq!(MetricType::parse(metric.as_str()), Some(metric));
        }
        assert_eq!(MetricType::parse("median"), None);
    }

    #[test]
    fn test_cut_spec_from_json_with_aliases() {
        let cut = CutSpec::from_json(&json!({
            "id": "nps_by_region",
            "metric": {"type": "nps", "question_id": "Q_NPS"},
            "dimensions": [{"kind": "question", "id": "Q_REGION"}]
        }))
        .unwrap();

        assert_eq!(cut.cut_id, "nps_by_region");
        assert_eq!(cut.metric.kind(), Some(MetricType::Nps));
        assert_eq!(cut.dimensions[0].label(), "question:Q_REGION");
        assert!(cut.filter.is_none());
    }

    #[test]
    fn test_unknown_metric_type_survives_parsing() {
        // The validator owns the unknown_metric_type decision
        let cut = CutSpec::from_json(&json!({
            "cut_id": "c1",
            "metric": {"type": "median", "question_id": "Q_AGE"}
        }))
        .unwrap();
        assert_eq!(cut.metric.kind(), None);
    }

    #[test]
    fn test_unknown_dimension_kind_rejected() {
        let result = CutSpec::from_json(&json!({
            "cut_id": "c1",
            "metric": {"type": "mean", "question_id": "Q_AGE"},
            "dimensions": [{"kind": "wave", "id": "W1"}]
        }));
        assert!(result.is_err());
    }

    #[test]
    fn test_params_defaults_and_overrides() {
        let params = MetricParams::new();
        assert_eq!(params.promoter_min().unwrap(), 9.0);
        assert_eq!(params.detractor_max().unwrap(), 6.0);
        assert_eq!(params.top_values().unwrap(), None);

        let params = MetricParams::new()
            .with("promoter_min", json!(8))
            .with("top_values", json!([3, "4", 5.0]));
        assert_eq!(params.promoter_min().unwrap(), 8.0);
        assert_eq!(params.top_values().unwrap(), Some(vec![3.0, 4.0, 5.0]));
    }

    #[test]
    fn test_params_reject_malformed_values() {
        let params = MetricParams::new()
            .with("top_values", json!("4,5"))
            .with("detractor_max", json!(true));
        assert!(params.top_values().is_err());
        assert!(params.detractor_max().is_err());

        let params = MetricParams::new().with("bottom_values", json!([1, "low"]));
        assert!(params.bottom_values().is_err());
    }

    #[test]
    fn test_batch_rejects_duplicate_cut_ids() {
        let result = BatchSpec::from_json(&json!({
            "cuts": [
                {"cut_id": "c1", "metric": {"type": "mean", "question_id": "Q_AGE"}},
                {"cut_id": "c1", "metric": {"type": "nps", "question_id": "Q_NPS"}}
            ]
        }));
        assert!(result.is_err());
    }

    #[test]
    fn test_segment_from_json() {
        let segment = SegmentSpec::from_json(&json!({
            "segment_id": "promoters",
            "name": "Promoters",
            "definition": {"kind": "range", "question_id": "Q_NPS", "min": 9, "max": 10}
        }))
        .unwrap();
        assert_eq!(segment.segment_id, "promoters");
        assert!(!segment.intended_partition);
    }
}
