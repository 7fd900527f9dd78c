//! Result types for cut execution

use std::collections::BTreeMap;

use serde::Serialize;

use crate::metrics::MetricValue;
use crate::validator::ValidationError;

use super::errors::CutError;

/// Metric result of one group of a grouped cut
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GroupResult {
    /// Group label: the dimension value, or `<segment>` / `Not_<segment>`
    pub group: String,
    pub base_n: usize,
    pub result: MetricValue,
}

/// Metric-shaped payload of a table
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum ResultData {
    /// No dimension: one result over the filtered rows
    Single(MetricValue),
    /// One result per group of the honored dimension
    Grouped {
        dimension: String,
        by_dimension: Vec<GroupResult>,
    },
}

/// Result of executing a single cut; never mutated after construction
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TableResult {
    pub cut_id: String,
    pub metric_type: String,
    pub question_id: String,
    pub result_data: ResultData,
    /// Non-null respondents contributing (sum of group bases when grouped)
    pub base_n: usize,
    /// Dimension labels used, e.g. `segment:promoters`
    pub dimensions: Vec<String>,
    pub warnings: Vec<String>,
}

impl TableResult {
    /// Flat, row-per-group projection for export
    pub fn to_table(&self) -> TabularView {
        match &self.result_data {
            ResultData::Single(value) => TabularView {
                headers: value.columns(),
                rows: value.rows(),
            },
            ResultData::Grouped {
                dimension,
                by_dimension,
            } => {
                let metric_columns = by_dimension
                    .first()
                    .map(|g| g.result.columns())
                    .unwrap_or_default();

                let mut headers = vec!["dimension".to_string(), "group".to_string()];
                headers.extend(metric_columns.iter().cloned());
                headers.push("base_n".to_string());

                let mut rows = Vec::new();
                for group in by_dimension {
                    let mut metric_rows = group.result.rows();
                    if metric_rows.is_empty() {
                        metric_rows.push(vec![String::new(); metric_columns.len()]);
                    }
                    for metric_row in metric_rows {
                        let mut row = vec![dimension.clone(), group.group.clone()];
                        row.extend(metric_row);
                        row.push(group.base_n.to_string());
                        rows.push(row);
                    }
                }

                TabularView { headers, rows }
            }
        }
    }

    pub fn to_csv(&self) -> String {
        self.to_table().to_csv()
    }
}

/// Headers plus string rows
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TabularView {
    pub headers: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

impl TabularView {
    /// Renders CSV with RFC 4180 quoting, one record per line
    pub fn to_csv(&self) -> String {
        let mut out = String::new();
        for record in std::iter::once(&self.headers).chain(self.rows.iter()) {
            let line: Vec<String> = record.iter().map(|f| csv_field(f)).collect();
            out.push_str(&line.join(","));
            out.push('\n');
        }
        out
    }
}

fn csv_field(field: &str) -> String {
    if field.contains([',', '"', '\n', '\r']) {
        format!("\"{}\"", field.replace('"', "\"\""))
    } else {
        field.to_string()
    }
}

/// Result of executing a batch of cuts
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ExecutionResult {
    /// Successful tables, in input order
    pub tables: Vec<TableResult>,
    /// Per-cut failures, in input order
    pub errors: Vec<CutError>,
    /// Base size of every materialized segment
    pub segments_computed: BTreeMap<String, usize>,
    /// Segments rejected by validation (never materialized)
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub segment_errors: BTreeMap<String, Vec<ValidationError>>,
}

impl ExecutionResult {
    pub fn table(&self, cut_id: &str) -> Option<&TableResult> {
        self.tables.iter().find(|t| t.cut_id == cut_id)
    }

    pub fn error(&self, cut_id: &str) -> Option<&CutError> {
        self.errors.iter().find(|e| e.cut_id == cut_id)
    }

    /// True when every cut and segment succeeded
    pub fn is_success(&self) -> bool {
        self.errors.is_empty() && self.segment_errors.is_empty()
    }
}
