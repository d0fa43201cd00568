//! Flattened tabular frames and summary statistics.
//!
//! A [`Frame`] is the system's output artifact: one row per record, row
//! index = record id, rows in input order. Rows are the flattened form of
//! each record (`info` merged over the top level), and [`Frame::describe`]
//! reports count, mean, std, min, quartiles and max per numeric column.

use std::collections::BTreeMap;

use serde_json::{Map, Value};

use crate::model::Record;

/// Merge a record's `info` metadata into its top-level attribute mapping.
///
/// When `info` is an object, its keys are copied over the top level,
/// overwriting same-named attributes; any other `info` shape (scalar, null,
/// absent) leaves the mapping unchanged. Pure: the record itself is never
/// mutated, the returned map is a fresh copy.
pub fn explode_info<R: Record>(record: &R) -> Map<String, Value> {
    let mut row = record.attributes();

    if let Some(Value::Object(info)) = row.get("info").cloned() {
        for (key, value) in info {
            row.insert(key, value);
        }
    }
    row
}

/// An indexed tabular frame.
#[derive(Debug, Clone, PartialEq)]
pub struct Frame {
    index: Vec<i64>,
    columns: Vec<String>,
    rows: Vec<Map<String, Value>>,
}

impl Frame {
    /// Build a frame from records, preserving input order.
    ///
    /// Columns are the union of row keys, in first-seen order.
    pub fn from_records<R: Record>(records: &[R]) -> Frame {
        let mut index = Vec::with_capacity(records.len());
        let mut rows = Vec::with_capacity(records.len());
        let mut columns: Vec<String> = Vec::new();

        for record in records {
            let row = explode_info(record);
            for key in row.keys() {
                if !columns.iter().any(|c| c == key) {
                    columns.push(key.clone());
                }
            }
            index.push(record.id());
            rows.push(row);
        }

        Frame {
            index,
            columns,
            rows,
        }
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Row index: record ids in row order.
    pub fn index(&self) -> &[i64] {
        &self.index
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    /// First row carrying the given record id.
    pub fn row(&self, id: i64) -> Option<&Map<String, Value>> {
        let position = self.index.iter().position(|&i| i == id)?;
        self.rows.get(position)
    }

    /// Column values in row order; `None` where a row lacks the key.
    pub fn column(&self, name: &str) -> Vec<Option<&Value>> {
        self.rows.iter().map(|row| row.get(name)).collect()
    }

    /// Summary statistics per column.
    pub fn describe(&self) -> FrameSummary {
        let mut columns = BTreeMap::new();

        for name in &self.columns {
            let present: Vec<&Value> = self
                .rows
                .iter()
                .filter_map(|row| row.get(name))
                .filter(|v| !v.is_null())
                .collect();

            let numeric: Option<Vec<f64>> = present.iter().map(|v| v.as_f64()).collect();
            let stats = match numeric {
                Some(values) if !values.is_empty() => ColumnStats::numeric(&values),
                // Mixed or non-numeric column: count only.
                _ => ColumnStats::counted(present.len()),
            };
            columns.insert(name.clone(), stats);
        }

        FrameSummary {
            rows: self.rows.len(),
            columns,
        }
    }
}

/// Summary statistics for one column, as produced by [`Frame::describe`].
///
/// The numeric fields are `None` for non-numeric columns, and `std` needs at
/// least two values.
#[derive(Debug, Clone, PartialEq)]
pub struct ColumnStats {
    pub count: usize,
    pub mean: Option<f64>,
    pub std: Option<f64>,
    pub min: Option<f64>,
    pub q25: Option<f64>,
    pub median: Option<f64>,
    pub q75: Option<f64>,
    pub max: Option<f64>,
}

impl ColumnStats {
    fn counted(count: usize) -> Self {
        Self {
            count,
            mean: None,
            std: None,
            min: None,
            q25: None,
            median: None,
            q75: None,
            max: None,
        }
    }

    fn numeric(values: &[f64]) -> Self {
        let count = values.len();
        let mean = values.iter().sum::<f64>() / count as f64;

        // Sample standard deviation; undefined below two values.
        let std = if count > 1 {
            let variance = values
                .iter()
                .map(|v| (v - mean).powi(2))
                .sum::<f64>()
                / (count - 1) as f64;
            Some(variance.sqrt())
        } else {
            None
        };

        let mut sorted = values.to_vec();
        sorted.sort_by(|a, b| a.total_cmp(b));

        Self {
            count,
            mean: Some(mean),
            std,
            min: sorted.first().copied(),
            q25: Some(quantile(&sorted, 0.25)),
            median: Some(quantile(&sorted, 0.5)),
            q75: Some(quantile(&sorted, 0.75)),
            max: sorted.last().copied(),
        }
    }
}

/// Linear-interpolation quantile over sorted values.
fn quantile(sorted: &[f64], p: f64) -> f64 {
    let h = (sorted.len() - 1) as f64 * p;
    let lo = h.floor() as usize;
    let frac = h - lo as f64;

    match sorted.get(lo + 1) {
        Some(hi) => sorted[lo] + frac * (hi - sorted[lo]),
        None => sorted[lo],
    }
}

/// Per-column summary of a frame.
#[derive(Debug, Clone, PartialEq)]
pub struct FrameSummary {
    /// Total row count, including rows missing a given column.
    pub rows: usize,
    pub columns: BTreeMap<String, ColumnStats>,
}
