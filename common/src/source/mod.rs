//! Loaded datasets behind one interface.
//!
//! CSV files, JSON files and query results all become a `TabularSource`: a
//! header, indexed rows of `CellValue`s, plus the per-source selection,
//! pagination and column mapping state. Row indices never change for the
//! lifetime of a source.

use std::fmt;

use log::debug;

mod csv_table;
mod json_table;
mod pager;
mod query_table;
mod selection;

pub use csv_table::CsvTable;
pub use json_table::JsonTable;
pub use pager::{Pager, PAGE_SIZE};
pub use query_table::{QueryResult, QueryTable};
pub use selection::RowSelection;

use crate::error::IngestError;
use crate::mapping::ColumnMapping;
use crate::model::value::CellValue;

/// Where the rows came from.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SourceKind {
    Csv,
    Json,
    Db,
}

impl SourceKind {
    /// Detects the kind from a file name suffix, case-insensitively.
    pub fn from_file_name(name: &str) -> Result<Self, IngestError> {
        let lower = name.to_lowercase();
        if lower.ends_with(".csv") {
            Ok(SourceKind::Csv)
        } else if lower.ends_with(".json") {
            Ok(SourceKind::Json)
        } else {
            Err(IngestError::UnsupportedFile(name.to_string()))
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            SourceKind::Csv => "CSV",
            SourceKind::Json => "JSON",
            SourceKind::Db => "Query",
        }
    }
}

impl fmt::Display for SourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Read access shared by every dataset kind.
pub trait TabularData: fmt::Debug {
    fn kind(&self) -> SourceKind;

    /// Field names, unique, in discovery order.
    fn header(&self) -> &[String];

    fn row_count(&self) -> usize;

    /// Raw value of `field` in row `row`; `None` when either is absent.
    fn value(&self, row: usize, field: &str) -> Option<&CellValue>;

    /// Raw value by header position.
    fn value_at(&self, row: usize, column: usize) -> Option<&CellValue> {
        let field = self.header().get(column)?;
        self.value(row, field)
    }
}

/// One loaded dataset with its UI state.
#[derive(Debug)]
pub struct TabularSource {
    name: String,
    data: Box<dyn TabularData>,
    pub selection: RowSelection,
    pub pager: Pager,
    pub mapping: ColumnMapping,
}

impl TabularSource {
    pub fn new(name: impl Into<String>, data: Box<dyn TabularData>) -> Self {
        Self {
            name: name.into(),
            data,
            selection: RowSelection::default(),
            pager: Pager::default(),
            mapping: ColumnMapping::default(),
        }
    }

    /// Parses `text` according to `kind`. Query results are not text: use
    /// `from_query` for those.
    pub fn load(kind: SourceKind, name: &str, text: &str) -> Result<Self, IngestError> {
        let data: Box<dyn TabularData> = match kind {
            SourceKind::Csv => Box::new(CsvTable::parse(text)?),
            SourceKind::Json => Box::new(JsonTable::parse(text)?),
            SourceKind::Db => Box::new(QueryTable::from_result(serde_json::from_str(text)?)),
        };
        debug!(
            "loaded {} source {}: {} fields, {} rows",
            kind,
            name,
            data.header().len(),
            data.row_count()
        );
        Ok(Self::new(name, data))
    }

    /// Loads a file, picking the parser from its name.
    pub fn load_file(name: &str, text: &str) -> Result<Self, IngestError> {
        Self::load(SourceKind::from_file_name(name)?, name, text)
    }

    /// Wraps an already materialized query result.
    pub fn from_query(result: QueryResult) -> Self {
        Self::new("query_result", Box::new(QueryTable::from_result(result)))
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn kind(&self) -> SourceKind {
        self.data.kind()
    }

    pub fn header(&self) -> &[String] {
        self.data.header()
    }

    pub fn row_count(&self) -> usize {
        self.data.row_count()
    }

    pub fn data(&self) -> &dyn TabularData {
        self.data.as_ref()
    }

    /// Raw value of `field` in `row`.
    pub fn row_value(&self, row: usize, field: &str) -> Option<&CellValue> {
        self.data.value(row, field)
    }

    /// Row indices an export includes: the selection in ascending order, or
    /// every row when nothing is selected.
    pub fn selected_or_all(&self) -> Vec<usize> {
        self.selection.selected_or_all(self.row_count())
    }

    pub fn toggle_row(&mut self, row: usize) {
        if row < self.row_count() {
            self.selection.toggle(row);
        }
    }

    pub fn select_all(&mut self) {
        self.selection.select_all(self.row_count());
    }

    pub fn clear_selection(&mut self) {
        self.selection.clear();
    }

    /// Selects the visible page, or deselects it if it is fully selected.
    pub fn toggle_page(&mut self) {
        let range = self.pager.range(self.row_count());
        self.selection.toggle_range(range);
    }

    pub fn next_page(&mut self) {
        self.pager.next(self.row_count());
    }

    pub fn prev_page(&mut self) {
        self.pager.prev();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn detects_kind_from_name() {
        assert_eq!(SourceKind::from_file_name("a.CSV").unwrap(), SourceKind::Csv);
        assert_eq!(SourceKind::from_file_name("b.json").unwrap(), SourceKind::Json);
        assert!(matches!(
            SourceKind::from_file_name("c.xlsx"),
            Err(IngestError::UnsupportedFile(_))
        ));
    }

    #[test]
    fn selection_and_paging_through_source() {
        let text: String = std::iter::once("n".to_string())
            .chain((0..25).map(|i| i.to_string()))
            .collect::<Vec<_>>()
            .join("\n");
        let mut source = TabularSource::load_file("n.csv", &text).unwrap();
        assert_eq!(source.row_count(), 25);
        assert_eq!(source.selected_or_all().len(), 25);

        source.toggle_row(12);
        source.toggle_row(3);
        source.toggle_row(99);
        assert_eq!(source.selected_or_all(), vec![3, 12]);

        source.next_page();
        source.toggle_page();
        assert_eq!(source.selection.len(), 11);
        source.toggle_page();
        assert_eq!(source.selected_or_all(), vec![3]);

        source.select_all();
        assert_eq!(source.selection.len(), 25);
        source.clear_selection();
        assert!(source.selection.is_empty());
    }

    #[test]
    fn failed_load_returns_error() {
        assert!(matches!(
            TabularSource::load(SourceKind::Csv, "x.csv", "\n\n"),
            Err(IngestError::EmptyInput)
        ));
        assert!(matches!(
            TabularSource::load(SourceKind::Json, "x.json", "{"),
            Err(IngestError::InvalidJson(_))
        ));
    }
}
