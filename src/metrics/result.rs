//! Metric result records
//!
//! Percentages and NPS scores are rounded to two decimals, means and
//! standard deviations to four.

use serde::ser::SerializeMap;
use serde::{Serialize, Serializer};

use crate::schema::{MetricType, Scalar};

pub(crate) fn round_to(value: f64, places: i32) -> f64 {
    let factor = 10f64.powi(places);
    (value * factor).round() / factor
}

/// Percentage of `part` in `total`, rounded to two decimals (0 when empty)
pub(crate) fn percentage(part: usize, total: usize) -> f64 {
    if total == 0 {
        return 0.0;
    }
    round_to(part as f64 / total as f64 * 100.0, 2)
}

fn cell_text(value: Option<f64>) -> String {
    value.map(|v| v.to_string()).unwrap_or_default()
}

/// One entry of a frequency distribution
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FrequencyRow {
    pub value: Scalar,
    pub label: String,
    pub count: usize,
    pub percentage: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FrequencyResult {
    pub distribution: Vec<FrequencyRow>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MeanResult {
    pub mean: Option<f64>,
    pub std: Option<f64>,
    pub min: Option<f64>,
    pub max: Option<f64>,
    pub count: usize,
}

/// Which end of the scale a box result counts
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BoxSide {
    Top,
    Bottom,
}

impl BoxSide {
    fn prefix(&self) -> &'static str {
        match self {
            BoxSide::Top => "top2box",
            BoxSide::Bottom => "bottom2box",
        }
    }

    fn values_key(&self) -> &'static str {
        match self {
            BoxSide::Top => "top_values",
            BoxSide::Bottom => "bottom_values",
        }
    }
}

/// Top-2-box or bottom-2-box share.
///
/// Serializes with side-specific keys (`top2box_pct`, `bottom_values`, ...).
#[derive(Debug, Clone, PartialEq)]
pub struct BoxResult {
    pub side: BoxSide,
    /// `None` when there are no numeric answers
    pub pct: Option<f64>,
    pub count: usize,
    pub total: usize,
    /// Scale values counted into the box
    pub values: Vec<f64>,
}

impl Serialize for BoxResult {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let prefix = self.side.prefix();
        let mut map = serializer.serialize_map(Some(4))?;
        map.serialize_entry(&format!("{}_pct", prefix), &self.pct)?;
        map.serialize_entry(&format!("{}_count", prefix), &self.count)?;
        map.serialize_entry("total", &self.total)?;
        map.serialize_entry(self.side.values_key(), &self.values)?;
        map.end()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NpsResult {
    /// `None` when there are no numeric answers
    pub nps: Option<f64>,
    pub promoters_count: usize,
    pub promoters_pct: Option<f64>,
    pub passives_count: usize,
    pub passives_pct: Option<f64>,
    pub detractors_count: usize,
    pub detractors_pct: Option<f64>,
    pub total: usize,
}

/// A computed metric of any type
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum MetricValue {
    Frequency(FrequencyResult),
    Mean(MeanResult),
    Box(BoxResult),
    Nps(NpsResult),
}

impl MetricValue {
    pub fn metric_type(&self) -> MetricType {
        match self {
            MetricValue::Frequency(_) => MetricType::Frequency,
            MetricValue::Mean(_) => MetricType::Mean,
            MetricValue::Box(b) if b.side == BoxSide::Top => MetricType::Top2Box,
            MetricValue::Box(_) => MetricType::Bottom2Box,
            MetricValue::Nps(_) => MetricType::Nps,
        }
    }

    /// Single summary number: mean, box share or NPS. `None` for frequency.
    pub fn headline(&self) -> Option<f64> {
        match self {
            MetricValue::Frequency(_) => None,
            MetricValue::Mean(m) => m.mean,
            MetricValue::Box(b) => b.pct,
            MetricValue::Nps(n) => n.nps,
        }
    }

    /// Column names of the flat projection
    pub fn columns(&self) -> Vec<String> {
        let names: Vec<&str> = match self {
            MetricValue::Frequency(_) => vec!["value", "label", "count", "percentage"],
            MetricValue::Mean(_) => vec!["mean", "std", "min", "max", "count"],
            MetricValue::Box(b) => {
                return vec![
                    format!("{}_pct", b.side.prefix()),
                    format!("{}_count", b.side.prefix()),
                    "total".to_string(),
                ]
            }
            MetricValue::Nps(_) => vec![
                "nps",
                "promoters_count",
                "promoters_pct",
                "passives_count",
                "passives_pct",
                "detractors_count",
                "detractors_pct",
                "total",
            ],
        };
        names.into_iter().map(String::from).collect()
    }

    /// Rows of the flat projection; one per distribution entry for
    /// frequency, a single row otherwise. Missing values render empty.
    pub fn rows(&self) -> Vec<Vec<String>> {
        match self {
            MetricValue::Frequency(f) => f
                .distribution
                .iter()
                .map(|row| {
                    vec![
                        row.value.to_string(),
                        row.label.clone(),
                        row.count.to_string(),
                        row.percentage.to_string(),
                    ]
                })
                .collect(),
            MetricValue::Mean(m) => vec![vec![
                cell_text(m.mean),
                cell_text(m.std),
                cell_text(m.min),
                cell_text(m.max),
                m.count.to_string(),
            ]],
            MetricValue::Box(b) => vec![vec![
                cell_text(b.pct),
                b.count.to_string(),
                b.total.to_string(),
            ]],
            MetricValue::Nps(n) => vec![vec![
                cell_text(n.nps),
                n.promoters_count.to_string(),
                cell_text(n.promoters_pct),
                n.passives_count.to_string(),
                cell_text(n.passives_pct),
                n.detractors_count.to_string(),
                cell_text(n.detractors_pct),
                n.total.to_string(),
            ]],
        }
    }
}
