//! In-memory, column-oriented response table

use std::collections::HashMap;

use serde_json::Value;
use thiserror::Error;

use crate::schema::Scalar;

use super::mask::Mask;

/// A single response cell; `None` is a missing answer.
pub type Cell = Option<Scalar>;

/// Dataset construction errors
#[derive(Debug, Clone, PartialEq, Error)]
pub enum DatasetError {
    #[error("responses must be a JSON array of records")]
    NotAnArray,

    #[error("row {row} is not a JSON object")]
    NotARecord { row: usize },

    #[error("row {row}, column '{column}': nested objects are not valid cells")]
    UnsupportedCell { row: usize, column: String },

    #[error("column '{column}' has {actual} rows, expected {expected}")]
    RaggedColumn {
        column: String,
        expected: usize,
        actual: usize,
    },

    #[error("column '{0}' declared twice")]
    DuplicateColumn(String),
}

/// A named column of cells
#[derive(Debug, Clone, PartialEq)]
pub struct Column {
    name: String,
    cells: Vec<Cell>,
}

impl Column {
    pub fn new(name: impl Into<String>, cells: Vec<Cell>) -> Self {
        Self {
            name: name.into(),
            cells,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn cells(&self) -> &[Cell] {
        &self.cells
    }

    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    pub fn get(&self, row: usize) -> Option<&Scalar> {
        self.cells.get(row).and_then(|c| c.as_ref())
    }

    /// A column is numeric when every non-null cell is a number.
    pub fn is_numeric(&self) -> bool {
        self.cells.iter().flatten().all(Scalar::is_numeric)
    }

    /// Copies out the cells of the selected rows, in row order
    pub fn select(&self, mask: &Mask) -> Vec<Cell> {
        mask.selected()
            .filter_map(|row| self.cells.get(row).cloned())
            .collect()
    }

    /// Counts non-null cells among the selected rows
    pub fn non_null_count(&self, mask: &Mask) -> usize {
        mask.selected()
            .filter(|row| self.get(*row).is_some())
            .count()
    }
}

/// Immutable response table; every column has `len()` rows.
#[derive(Debug, Clone, Default)]
pub struct Dataset {
    len: usize,
    columns: Vec<Column>,
    index: HashMap<String, usize>,
}

impl Dataset {
    /// Builds a dataset from named columns of equal length.
    pub fn from_columns<S: Into<String>>(
        columns: Vec<(S, Vec<Cell>)>,
    ) -> Result<Self, DatasetError> {
        let mut dataset = Dataset::default();
        let mut expected = None;

        for (name, cells) in columns {
            let column = Column::new(name, cells);
            let expected_len = *expected.get_or_insert(column.len());
            if column.len() != expected_len {
                return Err(DatasetError::RaggedColumn {
                    column: column.name.clone(),
                    expected: expected_len,
                    actual: column.len(),
                });
            }
            if dataset.index.contains_key(column.name()) {
                return Err(DatasetError::DuplicateColumn(column.name.clone()));
            }
            dataset
                .index
                .insert(column.name.clone(), dataset.columns.len());
            dataset.columns.push(column);
        }

        dataset.len = expected.unwrap_or(0);
        Ok(dataset)
    }

    /// Builds a dataset from a JSON array of records.
    ///
    /// Columns appear in first-seen order; absent keys, `null` and blank
    /// strings are missing answers; arrays are joined with `delimiter`;
    /// booleans become text.
    pub fn from_records(value: &Value, delimiter: &str) -> Result<Self, DatasetError> {
        let records = value.as_array().ok_or(DatasetError::NotAnArray)?;

        let mut names: Vec<String> = Vec::new();
        let mut positions: HashMap<String, usize> = HashMap::new();
        let mut cells: Vec<Vec<Cell>> = Vec::new();

        for (row, record) in records.iter().enumerate() {
            let object = record
                .as_object()
                .ok_or(DatasetError::NotARecord { row })?;

            for (key, raw) in object {
                let position = match positions.get(key) {
                    Some(p) => *p,
                    None => {
                        positions.insert(key.clone(), names.len());
                        names.push(key.clone());
                        cells.push(vec![None; row]);
                        names.len() - 1
                    }
                };
                let cell = json_to_cell(raw, delimiter).ok_or_else(|| {
                    DatasetError::UnsupportedCell {
                        row,
                        column: key.clone(),
                    }
                })?;
                cells[position].push(cell);
            }

            for column in cells.iter_mut() {
                if column.len() < row + 1 {
                    column.push(None);
                }
            }
        }

        Self::from_columns(names.into_iter().zip(cells).collect())
    }

    /// Number of rows
    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn column(&self, name: &str) -> Option<&Column> {
        self.index.get(name).map(|i| &self.columns[*i])
    }

    pub fn has_column(&self, name: &str) -> bool {
        self.index.contains_key(name)
    }

    pub fn column_names(&self) -> Vec<&str> {
        self.columns.iter().map(Column::name).collect()
    }
}

/// Converts one JSON cell; `None` means the cell shape is unsupported.
fn json_to_cell(value: &Value, delimiter: &str) -> Option<Cell> {
    match value {
        Value::Null => Some(None),
        Value::Bool(b) => Some(Some(Scalar::Text(b.to_string()))),
        Value::Number(n) => Some(Some(number_to_scalar(n))),
        Value::String(s) if s.trim().is_empty() => Some(None),
        Value::String(s) => Some(Some(Scalar::Text(s.clone()))),
        Value::Array(items) => {
            let mut parts = Vec::with_capacity(items.len());
            for item in items {
                match json_to_cell(item, delimiter)? {
                    Some(Scalar::Text(s)) => parts.push(s),
                    Some(other) => parts.push(other.to_string()),
                    None => {}
                }
            }
            if parts.is_empty() {
                Some(None)
            } else {
                Some(Some(Scalar::Text(parts.join(delimiter))))
            }
        }
        Value::Object(_) => None,
    }
}

fn number_to_scalar(n: &serde_json::Number) -> Scalar {
    match n.as_i64() {
        Some(i) => Scalar::Int(i),
        None => Scalar::Float(n.as_f64().unwrap_or(f64::NAN)),
    }
}
