use std::collections::HashSet;

use serde::Deserialize;
use serde_json::Value;

use super::{SourceKind, TabularData};
use crate::model::value::CellValue;

/// Answer of `POST /execute-query`.
///
/// Rows arrive either as objects keyed by column name or as positional arrays.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct QueryResult {
    #[serde(default)]
    pub columns: Vec<String>,
    #[serde(default)]
    pub rows: Vec<Value>,
    #[serde(default)]
    pub total_count: Option<usize>,
}

/// Rows of a query result, addressed by position.
#[derive(Debug, Clone)]
pub struct QueryTable {
    header: Vec<String>,
    rows: Vec<Vec<CellValue>>,
}

impl QueryTable {
    /// Materializes rows in column order. When the server sent no column list,
    /// the columns are the first-seen union of the row object keys.
    pub fn from_result(result: QueryResult) -> Self {
        let header = if result.columns.is_empty() {
            object_keys(&result.rows)
        } else {
            result.columns
        };
        let rows: Vec<Vec<CellValue>> = result
            .rows
            .into_iter()
            .map(|row| match row {
                Value::Object(mut map) => header
                    .iter()
                    .map(|col| CellValue::from_json(map.remove(col).unwrap_or(Value::Null)))
                    .collect(),
                Value::Array(items) => items.into_iter().map(CellValue::from_json).collect(),
                scalar => vec![CellValue::from_json(scalar)],
            })
            .collect();
        Self { header, rows }
    }
}

fn object_keys(rows: &[Value]) -> Vec<String> {
    let mut seen = HashSet::new();
    rows.iter()
        .filter_map(Value::as_object)
        .flat_map(|map| map.keys())
        .filter(|k| seen.insert(k.to_string()))
        .cloned()
        .collect()
}

impl TabularData for QueryTable {
    fn kind(&self) -> SourceKind {
        SourceKind::Db
    }

    fn header(&self) -> &[String] {
        &self.header
    }

    fn row_count(&self) -> usize {
        self.rows.len()
    }

    fn value(&self, row: usize, field: &str) -> Option<&CellValue> {
        let column = self.header.iter().position(|h| h == field)?;
        self.value_at(row, column)
    }

    fn value_at(&self, row: usize, column: usize) -> Option<&CellValue> {
        self.rows.get(row)?.get(column)
    }
}
