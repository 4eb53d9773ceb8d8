//! Upload payload construction.
//!
//! Given a loaded source, its mapping and the target schema, builds the file
//! sent to `POST /upload-data` together with the `table`, `columns` and
//! `primary_key` form fields. Only attributes mapped to a source field are
//! included, and only the rows of `selected_or_all()`.

use log::info;
use serde_json::{Map, Value};

use crate::csv::join_record;
use crate::error::IngestError;
use crate::model::schema::TableSchema;
use crate::model::value::CellValue;
use crate::source::{SourceKind, TabularSource};

pub const CSV_MIME: &str = "text/csv";
pub const JSON_MIME: &str = "application/json";

/// A file-like blob ready for multipart submission.
#[derive(Clone, Debug, PartialEq)]
pub struct Payload {
    pub bytes: Vec<u8>,
    pub mime: &'static str,
    pub filename: String,
}

impl Payload {
    pub fn text(&self) -> String {
        String::from_utf8_lossy(&self.bytes).into_owned()
    }
}

/// Every field of the multipart upload form.
#[derive(Clone, Debug, PartialEq)]
pub struct UploadForm {
    pub file: Payload,
    pub table: String,
    /// Comma-joined included attributes.
    pub columns: String,
    /// Comma-joined mapped primary-key attributes; empty asks the server to
    /// generate keys.
    pub primary_key: String,
}

/// Serializes one source against one schema.
pub struct PayloadBuilder<'a> {
    source: &'a TabularSource,
    attributes: Vec<String>,
}

impl<'a> PayloadBuilder<'a> {
    /// Resolves the included attributes. Fails with `NoMappedAttributes`
    /// when no target attribute is mapped to a source field.
    pub fn new(
        source: &'a TabularSource,
        target_attributes: &[String],
    ) -> Result<Self, IngestError> {
        let attributes = source.mapping.included_attributes(target_attributes);
        if attributes.is_empty() {
            return Err(IngestError::NoMappedAttributes);
        }
        Ok(Self { source, attributes })
    }

    pub fn included_attributes(&self) -> &[String] {
        &self.attributes
    }

    fn cell(&self, row: usize, attribute: &str) -> Option<&CellValue> {
        let field = self.source.mapping.get(attribute).field()?;
        self.source.row_value(row, field)
    }

    /// Header line of attribute names, then one escaped line per row.
    pub fn build_csv(&self) -> Payload {
        let rows = self.source.selected_or_all();
        let mut lines = Vec::with_capacity(rows.len() + 1);
        lines.push(join_record(&self.attributes));
        for row in &rows {
            let cells: Vec<String> = self
                .attributes
                .iter()
                .map(|attr| {
                    self.cell(*row, attr)
                        .map(CellValue::to_csv_text)
                        .unwrap_or_default()
                })
                .collect();
            lines.push(join_record(&cells));
        }
        info!(
            "built CSV payload for {}: {} rows, {} columns",
            self.source.name(),
            rows.len(),
            self.attributes.len()
        );
        Payload {
            bytes: lines.join("\n").into_bytes(),
            mime: CSV_MIME,
            filename: self.filename("csv"),
        }
    }

    /// JSON array of objects keyed by attribute, with normalized values.
    pub fn build_json(&self) -> Payload {
        let rows = self.source.selected_or_all();
        let objects: Vec<Value> = rows
            .iter()
            .map(|row| {
                let object: Map<String, Value> = self
                    .attributes
                    .iter()
                    .map(|attr| {
                        let value = self
                            .cell(*row, attr)
                            .map(CellValue::to_payload)
                            .unwrap_or_else(|| Value::String(String::new()));
                        (attr.clone(), value)
                    })
                    .collect();
                Value::Object(object)
            })
            .collect();
        info!(
            "built JSON payload for {}: {} rows, {} columns",
            self.source.name(),
            objects.len(),
            self.attributes.len()
        );
        Payload {
            bytes: Value::Array(objects).to_string().into_bytes(),
            mime: JSON_MIME,
            filename: self.filename("json"),
        }
    }

    /// CSV for CSV files, JSON for JSON files and query results.
    pub fn build(&self) -> Payload {
        match self.source.kind() {
            SourceKind::Csv => self.build_csv(),
            SourceKind::Json | SourceKind::Db => self.build_json(),
        }
    }

    /// Payload plus form fields for `schema`.
    pub fn upload_form(&self, schema: &TableSchema) -> UploadForm {
        UploadForm {
            file: self.build(),
            table: schema.table.clone(),
            columns: self.attributes.join(","),
            primary_key: self.source.mapping.mapped_primary_key(schema).join(","),
        }
    }

    fn filename(&self, extension: &str) -> String {
        let name = self.source.name();
        let suffix = format!(".{}", extension);
        if name.to_lowercase().ends_with(&suffix) {
            name.to_string()
        } else {
            format!("{}{}", name, suffix)
        }
    }
}
