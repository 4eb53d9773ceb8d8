use std::collections::{HashMap, HashSet};

use serde_json::Value;

use super::{SourceKind, TabularData};
use crate::error::IngestError;
use crate::model::value::CellValue;

/// Rows of a JSON document, addressed by key.
#[derive(Debug, Clone)]
pub struct JsonTable {
    header: Vec<String>,
    rows: Vec<HashMap<String, CellValue>>,
}

impl JsonTable {
    /// Parses JSON text.
    ///
    /// A top-level value that is not an array is treated as a one-element
    /// array. Only non-null, non-array objects are kept. The header is the
    /// union of their keys in first-seen order.
    pub fn parse(text: &str) -> Result<Self, IngestError> {
        let parsed: Value = serde_json::from_str(text)?;
        let elements = match parsed {
            Value::Array(items) => items,
            other => vec![other],
        };
        Self::from_values(elements)
    }

    /// Builds a table from already decoded values, with the same filtering
    /// rules as `parse`.
    pub fn from_values(elements: Vec<Value>) -> Result<Self, IngestError> {
        let objects: Vec<_> = elements
            .into_iter()
            .filter_map(|v| match v {
                Value::Object(map) => Some(map),
                _ => None,
            })
            .collect();
        if objects.is_empty() {
            return Err(IngestError::NoObjects);
        }

        let mut seen = HashSet::new();
        let mut header = Vec::new();
        for object in &objects {
            for key in object.keys() {
                if seen.insert(key.clone()) {
                    header.push(key.clone());
                }
            }
        }
        if header.is_empty() {
            return Err(IngestError::NoKeys);
        }

        let rows = objects
            .into_iter()
            .map(|object| {
                object
                    .into_iter()
                    .map(|(k, v)| (k, CellValue::from_json(v)))
                    .collect()
            })
            .collect();

        Ok(Self { header, rows })
    }
}

impl TabularData for JsonTable {
    fn kind(&self) -> SourceKind {
        SourceKind::Json
    }

    fn header(&self) -> &[String] {
        &self.header
    }

    fn row_count(&self) -> usize {
        self.rows.len()
    }

    fn value(&self, row: usize, field: &str) -> Option<&CellValue> {
        self.rows.get(row)?.get(field)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn header_is_first_seen_union() {
        let table = JsonTable::parse(r#"[{"b":1,"a":2},{"c":3,"a":4},{"d":null}]"#).unwrap();
        assert_eq!(table.header(), ["b", "a", "c", "d"]);
        assert_eq!(table.row_count(), 3);
    }

    #[test]
    fn sparse_rows_resolve_missing_keys_to_none() {
        let table = JsonTable::parse(r#"[{"a":1},{"b":2}]"#).unwrap();
        assert_eq!(table.value(0, "a"), Some(&CellValue::from_json(json!(1))));
        assert_eq!(table.value(0, "b"), None);
        assert_eq!(table.value(1, "b"), Some(&CellValue::from_json(json!(2))));
    }

    #[test]
    fn single_object_is_wrapped() {
        let table = JsonTable::parse(r#"{"id":7}"#).unwrap();
        assert_eq!(table.row_count(), 1);
        assert_eq!(table.value_at(0, 0), Some(&CellValue::from_json(json!(7))));
    }

    #[test]
    fn non_objects_are_filtered_out() {
        let table = JsonTable::parse(r#"[1, null, [2], {"x": "y"}, "s"]"#).unwrap();
        assert_eq!(table.row_count(), 1);
        assert!(matches!(
            JsonTable::parse("[1, 2, [3]]"),
            Err(IngestError::NoObjects)
        ));
        assert!(matches!(JsonTable::parse("null"), Err(IngestError::NoObjects)));
    }

    #[test]
    fn objects_without_keys_fail() {
        assert!(matches!(JsonTable::parse("[{}, {}]"), Err(IngestError::NoKeys)));
    }

    #[test]
    fn invalid_json_fails() {
        assert!(matches!(
            JsonTable::parse("not json"),
            Err(IngestError::InvalidJson(_))
        ));
    }
}
