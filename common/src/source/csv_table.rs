use std::collections::HashMap;

use super::{SourceKind, TabularData};
use crate::csv::{parse_line, split_lines};
use crate::error::IngestError;
use crate::model::value::CellValue;

/// Rows of a CSV file, addressed by position.
#[derive(Debug, Clone)]
pub struct CsvTable {
    header: Vec<String>,
    positions: HashMap<String, usize>,
    rows: Vec<Vec<CellValue>>,
}

impl CsvTable {
    /// Parses CSV text.
    ///
    /// Blank lines are dropped. The first remaining line is the header: its
    /// tokens are trimmed and empty ones discarded. Every other line is a row,
    /// parsed verbatim.
    pub fn parse(text: &str) -> Result<Self, IngestError> {
        let lines = split_lines(text);
        let (first, rest) = lines.split_first().ok_or(IngestError::EmptyInput)?;

        let header: Vec<String> = parse_line(first)
            .into_iter()
            .map(|h| h.trim().to_string())
            .filter(|h| !h.is_empty())
            .collect();
        let positions = header
            .iter()
            .enumerate()
            .map(|(i, h)| (h.clone(), i))
            .collect();
        let rows = rest
            .iter()
            .map(|line| parse_line(line).into_iter().map(CellValue::Text).collect())
            .collect();

        Ok(Self {
            header,
            positions,
            rows,
        })
    }
}

impl TabularData for CsvTable {
    fn kind(&self) -> SourceKind {
        SourceKind::Csv
    }

    fn header(&self) -> &[String] {
        &self.header
    }

    fn row_count(&self) -> usize {
        self.rows.len()
    }

    fn value(&self, row: usize, field: &str) -> Option<&CellValue> {
        let column = *self.positions.get(field)?;
        self.rows.get(row)?.get(column)
    }

    fn value_at(&self, row: usize, column: usize) -> Option<&CellValue> {
        self.rows.get(row)?.get(column)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn text(table: &CsvTable, row: usize, field: &str) -> Option<String> {
        table.value(row, field).map(CellValue::to_csv_text)
    }

    #[test]
    fn parses_header_and_rows() {
        let table = CsvTable::parse("name,age\nAlice,30\nBob,\n").unwrap();
        assert_eq!(table.header(), ["name", "age"]);
        assert_eq!(table.row_count(), 2);
        assert_eq!(text(&table, 0, "name").as_deref(), Some("Alice"));
        assert_eq!(text(&table, 1, "age").as_deref(), Some(""));
        assert_eq!(text(&table, 1, "missing"), None);
    }

    #[test]
    fn header_is_trimmed_and_empty_tokens_dropped() {
        let table = CsvTable::parse(" id , ,name,\r\n1,x,y\r\n").unwrap();
        assert_eq!(table.header(), ["id", "name"]);
        assert_eq!(text(&table, 0, "id").as_deref(), Some("1"));
        assert_eq!(text(&table, 0, "name").as_deref(), Some("x"));
    }

    #[test]
    fn short_rows_resolve_to_none() {
        let table = CsvTable::parse("a,b,c\n1\n").unwrap();
        assert!(table.value(0, "c").is_none());
        assert!(table.value_at(0, 0).is_some());
    }

    #[test]
    fn empty_input_fails() {
        assert!(matches!(CsvTable::parse(""), Err(IngestError::EmptyInput)));
        assert!(matches!(CsvTable::parse("\r\n\r\n"), Err(IngestError::EmptyInput)));
    }
}
